// ============================================================
// Layer 4b — Staged, Resumable Harvester
// ============================================================
// Produces the transitive closure
//   {modelYear} → {make} → {model} → [ComplaintRecord]
// from the remote source, tolerating partial failures.
//
// Four sequential stages, each a separate resumable pass:
//   Stage A: all model years                  → model_years.json
//   Stage B: makes per model year             → makes.json
//   Stage C: models per {year, make}          → vehicles.json
//   Stage D: complaints per vehicle triple    → complaints.json
//
// Each stage persists its full output before the next stage
// starts; on restart a stage whose file already exists is loaded
// from disk instead of re-fetched, so a crash mid-harvest never
// re-runs completed stages. A stage file is only a valid resume
// point when the stage completed cleanly — if any query in the
// run failed, enumeration output is not persisted and the next
// run re-fetches it. Between C and D the vehicle triples are
// deduplicated and rows with null fields dropped.
//
// Within Stage D the accumulated complaints are checkpointed
// (overwrite-in-place) every `checkpoint_every` newly appended
// records plus a final write, bounding both memory-resident
// unsaved work and data loss on interruption.
//
// Failure policy: any single failed query is logged and treated
// as zero results for that query — the harvest continues with
// the next item. Callers needing completeness re-run the harvest.
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::complaint::{ComplaintRecord, MakeRow, VehicleKey};
use crate::domain::traits::VehicleApi;

/// Counters reported at the end of a harvest run.
#[derive(Debug, Default, Clone)]
pub struct HarvestReport {
    pub model_years:       usize,
    pub make_pairs:        usize,
    pub vehicles:          usize,
    pub records:           usize,
    pub checkpoint_writes: usize,
    pub failed_queries:    usize,
}

pub struct Harvester<A: VehicleApi> {
    api:              A,
    out_dir:          PathBuf,
    checkpoint_every: usize,
}

impl<A: VehicleApi> Harvester<A> {
    pub fn new(api: A, out_dir: impl Into<PathBuf>, checkpoint_every: usize) -> Self {
        Self {
            api,
            out_dir: out_dir.into(),
            // A zero interval would checkpoint after every query
            checkpoint_every: checkpoint_every.max(1),
        }
    }

    /// Run stages A–D in order, resuming from persisted stage
    /// files where they exist.
    pub fn run(&self) -> Result<HarvestReport> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Cannot create '{}'", self.out_dir.display()))?;

        let mut report = HarvestReport::default();

        // ── Stage A: model years (single call) ───────────────────────────────
        let (years, stage_failed): (Vec<String>, usize) =
            self.load_or_fetch("model_years.json", report.failed_queries, || {
                let mut failed = 0;
                let out = self.fail_soft("model years", self.api.model_years(), &mut failed);
                (out, failed)
            })?;
        report.failed_queries += stage_failed;
        report.model_years = years.len();
        tracing::info!("Stage A: {} model years", years.len());

        // ── Stage B: makes per model year ────────────────────────────────────
        let (makes, stage_failed): (Vec<MakeRow>, usize) =
            self.load_or_fetch("makes.json", report.failed_queries, || {
                let mut failed = 0;
                let mut out    = Vec::new();
                for year in &years {
                    out.extend(self.fail_soft(
                        &format!("makes for {year}"),
                        self.api.makes_for_year(year),
                        &mut failed,
                    ));
                }
                (out, failed)
            })?;
        report.failed_queries += stage_failed;
        report.make_pairs = makes.len();
        tracing::info!("Stage B: {} {{year, make}} pairs", makes.len());

        // ── Stage C: models per pair, then dedup + null-drop ─────────────────
        let (vehicles, stage_failed): (Vec<VehicleKey>, usize) =
            self.load_or_fetch("vehicles.json", report.failed_queries, || {
                let mut failed = 0;
                let mut rows   = Vec::new();
                for pair in &makes {
                    let (Some(year), Some(make)) = (&pair.model_year, &pair.make) else {
                        continue;
                    };
                    rows.extend(self.fail_soft(
                        &format!("models for {year} {make}"),
                        self.api.models_for(year, make),
                        &mut failed,
                    ));
                }

                // Drop incomplete rows, then dedup exact triples,
                // keeping first occurrence order
                let mut seen = HashSet::new();
                let vehicles: Vec<VehicleKey> = rows
                    .into_iter()
                    .filter_map(|row| row.complete())
                    .filter(|key| seen.insert(key.clone()))
                    .collect();
                (vehicles, failed)
            })?;
        report.failed_queries += stage_failed;
        report.vehicles = vehicles.len();
        tracing::info!("Stage C: {} unique vehicle triples", vehicles.len());

        // ── Stage D: complaints per vehicle, with checkpointing ──────────────
        let complaints_path = self.out_dir.join("complaints.json");
        let mut complaints: Vec<ComplaintRecord> = Vec::new();
        let mut since_checkpoint = 0usize;

        for vehicle in &vehicles {
            let rows = self.fail_soft(
                &format!(
                    "complaints for {} {} {}",
                    vehicle.model_year, vehicle.make, vehicle.model
                ),
                self.api.complaints_for(vehicle),
                &mut report.failed_queries,
            );

            since_checkpoint += rows.len();
            complaints.extend(rows);

            if since_checkpoint >= self.checkpoint_every {
                write_json(&complaints_path, &complaints)?;
                report.checkpoint_writes += 1;
                since_checkpoint = 0;
                tracing::debug!("Checkpointed {} complaints", complaints.len());
            }
        }

        // Final write covers the remainder (and the zero-result case,
        // where the output must still be an empty array on disk)
        write_json(&complaints_path, &complaints)?;
        report.checkpoint_writes += 1;
        report.records = complaints.len();

        tracing::info!(
            "Stage D: {} complaint records ({} failed queries over the whole run)",
            report.records, report.failed_queries,
        );
        Ok(report)
    }

    /// Resume support: load a completed stage's file if present,
    /// otherwise run `fetch` and persist its output.
    ///
    /// Returns the items plus the number of failed queries inside
    /// this stage. A stage touched by failures — its own or an
    /// earlier stage's (`prior_failures`) — is NOT persisted: a
    /// partial stage file would otherwise become a silent resume
    /// point and a completeness re-run could never fill the gaps.
    fn load_or_fetch<T, F>(
        &self,
        file:           &str,
        prior_failures: usize,
        fetch:          F,
    ) -> Result<(Vec<T>, usize)>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> (Vec<T>, usize),
    {
        let path = self.out_dir.join(file);
        if path.exists() {
            tracing::info!("Resuming from existing stage file '{}'", path.display());
            return Ok((read_json(&path)?, 0));
        }

        let (items, failed) = fetch();
        if prior_failures + failed == 0 {
            write_json(&path, &items)?;
        } else {
            tracing::warn!(
                "Not persisting '{}': {} queries failed so far and the stage \
                 output is incomplete; the next run will re-fetch it",
                path.display(),
                prior_failures + failed,
            );
        }
        Ok((items, failed))
    }

    /// The fail-soft policy: a failed query becomes an empty
    /// result, the failure is logged and counted, the harvest
    /// continues with the next item.
    fn fail_soft<T>(&self, what: &str, result: Result<Vec<T>>, failed: &mut usize) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                *failed += 1;
                tracing::warn!("Query for {what} failed, treating as empty: {e:#}");
                Vec::new()
            }
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed stage file '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Canned in-memory source. `complaints_per_vehicle` complaints
    /// come back for every vehicle; vehicles listed in
    /// `failing_models` error out at Stage D.
    struct MockApi {
        years:                  Vec<String>,
        makes_per_year:         usize,
        models_per_make:        usize,
        complaints_per_vehicle: usize,
        failing_models:         Vec<String>,
        queries:                RefCell<usize>,
    }

    impl MockApi {
        fn new(
            years: usize,
            makes_per_year: usize,
            models_per_make: usize,
            complaints_per_vehicle: usize,
        ) -> Self {
            Self {
                years: (0..years).map(|i| format!("{}", 2014 + i)).collect(),
                makes_per_year,
                models_per_make,
                complaints_per_vehicle,
                failing_models: Vec::new(),
                queries: RefCell::new(0),
            }
        }
    }

    impl VehicleApi for MockApi {
        fn model_years(&self) -> Result<Vec<String>> {
            Ok(self.years.clone())
        }

        fn makes_for_year(&self, model_year: &str) -> Result<Vec<MakeRow>> {
            Ok((0..self.makes_per_year)
                .map(|i| MakeRow {
                    model_year: Some(model_year.to_string()),
                    make:       Some(format!("MAKE{i}")),
                })
                .collect())
        }

        fn models_for(&self, model_year: &str, make: &str) -> Result<Vec<crate::domain::complaint::VehicleRow>> {
            Ok((0..self.models_per_make)
                .map(|i| crate::domain::complaint::VehicleRow {
                    model_year: Some(model_year.to_string()),
                    make:       Some(make.to_string()),
                    model:      Some(format!("MODEL{i}")),
                })
                .collect())
        }

        fn complaints_for(&self, vehicle: &VehicleKey) -> Result<Vec<ComplaintRecord>> {
            *self.queries.borrow_mut() += 1;
            if self.failing_models.contains(&vehicle.model) {
                anyhow::bail!("simulated outage");
            }
            let base = *self.queries.borrow() as u64 * 1000;
            Ok((0..self.complaints_per_vehicle)
                .map(|i| {
                    ComplaintRecord::new(
                        base + i as u64,
                        "06/15/2020",
                        "SERVICE BRAKES",
                        format!("{} {} complaint {i}", vehicle.make, vehicle.model),
                    )
                })
                .collect())
        }
    }

    fn read_complaints(dir: &Path) -> Vec<ComplaintRecord> {
        read_json(&dir.join("complaints.json")).unwrap()
    }

    #[test]
    fn test_empty_source_yields_empty_array_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new(0, 0, 0, 0);

        let report = Harvester::new(api, dir.path(), 100).run().unwrap();

        assert_eq!(report.records, 0);
        assert!(read_complaints(dir.path()).is_empty());
    }

    #[test]
    fn test_checkpoint_cadence_and_final_count() {
        // 1 year × 1 make × 5 models × 50 complaints = 250 records.
        // With checkpoint_every=100 the file is overwritten at 100
        // and 200 before the final write.
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new(1, 1, 5, 50);

        let report = Harvester::new(api, dir.path(), 100).run().unwrap();

        assert_eq!(report.records, 250);
        assert!(report.checkpoint_writes >= 3, "got {}", report.checkpoint_writes);
        assert_eq!(read_complaints(dir.path()).len(), 250);
    }

    #[test]
    fn test_one_failing_query_never_aborts_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockApi::new(1, 1, 4, 10);
        api.failing_models = vec!["MODEL2".to_string()];

        let report = Harvester::new(api, dir.path(), 100).run().unwrap();

        // 3 of 4 vehicles answered
        assert_eq!(report.records, 30);
        assert_eq!(report.failed_queries, 1);
    }

    #[test]
    fn test_vehicle_triples_are_deduplicated() {
        // 2 years × 1 make × 2 models, but the mock returns the
        // same year inside each model row, so year2's triples are
        // distinct — build a direct duplicate instead.
        struct DupApi;
        impl VehicleApi for DupApi {
            fn model_years(&self) -> Result<Vec<String>> {
                Ok(vec!["2020".into(), "2020".into()])
            }
            fn makes_for_year(&self, model_year: &str) -> Result<Vec<MakeRow>> {
                Ok(vec![MakeRow {
                    model_year: Some(model_year.into()),
                    make:       Some("FORD".into()),
                }])
            }
            fn models_for(&self, model_year: &str, make: &str) -> Result<Vec<crate::domain::complaint::VehicleRow>> {
                Ok(vec![
                    crate::domain::complaint::VehicleRow {
                        model_year: Some(model_year.into()),
                        make:       Some(make.into()),
                        model:      Some("FUSION".into()),
                    },
                    // Null-field row, must be dropped
                    crate::domain::complaint::VehicleRow {
                        model_year: Some(model_year.into()),
                        make:       Some(make.into()),
                        model:      None,
                    },
                ])
            }
            fn complaints_for(&self, vehicle: &VehicleKey) -> Result<Vec<ComplaintRecord>> {
                Ok(vec![ComplaintRecord::new(
                    1,
                    "06/15/2020",
                    "STRUCTURE",
                    format!("{} complaint", vehicle.model),
                )])
            }
        }

        let dir    = tempfile::tempdir().unwrap();
        let report = Harvester::new(DupApi, dir.path(), 100).run().unwrap();

        // Two identical {2020, FORD, FUSION} triples collapse to one
        assert_eq!(report.vehicles, 1);
        assert_eq!(report.records, 1);
    }

    #[test]
    fn test_resumes_from_existing_stage_files() {
        let dir = tempfile::tempdir().unwrap();

        // Pre-seed Stage C output with a single vehicle; Stages A–C
        // must be loaded from disk, not re-fetched.
        write_json::<String>(&dir.path().join("model_years.json"), &[]).unwrap();
        write_json::<MakeRow>(&dir.path().join("makes.json"), &[]).unwrap();
        write_json(
            &dir.path().join("vehicles.json"),
            &[VehicleKey {
                model_year: "2019".into(),
                make:       "HONDA".into(),
                model:      "CIVIC".into(),
            }],
        )
        .unwrap();

        let api    = MockApi::new(3, 4, 5, 7);
        let report = Harvester::new(api, dir.path(), 100).run().unwrap();

        // One vehicle from the seeded file, 7 complaints for it
        assert_eq!(report.vehicles, 1);
        assert_eq!(report.records, 7);
    }

    #[test]
    fn test_failed_stage_is_not_persisted_as_resume_point() {
        // Stage B errors out entirely; the run must still finish
        // fail-soft, but neither makes.json nor vehicles.json may
        // be written — a re-run has to re-fetch them.
        struct BrokenMakesApi;
        impl VehicleApi for BrokenMakesApi {
            fn model_years(&self) -> Result<Vec<String>> {
                Ok(vec!["2020".into()])
            }
            fn makes_for_year(&self, _model_year: &str) -> Result<Vec<MakeRow>> {
                anyhow::bail!("simulated outage")
            }
            fn models_for(&self, _model_year: &str, _make: &str) -> Result<Vec<crate::domain::complaint::VehicleRow>> {
                Ok(Vec::new())
            }
            fn complaints_for(&self, _vehicle: &VehicleKey) -> Result<Vec<ComplaintRecord>> {
                Ok(Vec::new())
            }
        }

        let dir    = tempfile::tempdir().unwrap();
        let report = Harvester::new(BrokenMakesApi, dir.path(), 100).run().unwrap();

        assert_eq!(report.failed_queries, 1);
        assert!(dir.path().join("model_years.json").exists());
        assert!(!dir.path().join("makes.json").exists());
        assert!(!dir.path().join("vehicles.json").exists());

        // A second run against a healthy source re-fetches the
        // failed stages instead of resuming from empty files.
        let api    = MockApi::new(1, 2, 2, 3);
        let report = Harvester::new(api, dir.path(), 100).run().unwrap();
        assert_eq!(report.failed_queries, 0);
        assert_eq!(report.vehicles, 4);
        assert_eq!(report.records, 12);
    }
}
