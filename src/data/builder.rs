// ============================================================
// Layer 4 — Dataset Builder
// ============================================================
// Turns raw harvested ComplaintRecords into the three partition
// tables the trainer consumes. The whole pipeline is a single
// deterministic pass: same input + same seed ⇒ byte-identical
// train/eval/test partitions.
//
// The pipeline, in order:
//   1. Validate   — project to the four required fields, parse
//                   the MM/DD/YYYY filing date; invalid rows are
//                   dropped and counted, never panicked on
//   2. Dedup      — exact summary text, first occurrence wins
//   3. Label      — components → fixed taxonomy (else catch-all)
//   4. Temporal   — filing year in [2014, 2024] → working pool,
//                   year < 2014 → held-out pool, year > 2024
//                   dropped explicitly
//   5. Balance    — floor(min class count / 2) per class,
//                   sampled without replacement
//   6. Held-out   — sampled down to 20% of the balanced size
//   7. Normalize  — Normalizer on every summary
//   8. Stratify   — 80/20 train/eval split per class
//
// Failures here are fatal to the run; a bad row is filtered in
// step 1, not recovered from mid-pipeline.
//
// Reference: Rust Book §13 (Iterators and Closures)

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::data::normalizer::Normalizer;
use crate::data::splitter::{sample_exact, stratified_split};
use crate::domain::complaint::ComplaintRecord;
use crate::domain::example::LabeledExample;
use crate::domain::labels::{label_for_components, CLASSES};

/// Working-pool bounds on the complaint filing year.
const WORKING_YEAR_MIN: i32 = 2014;
const WORKING_YEAR_MAX: i32 = 2024;

/// Fraction of the balanced pool size the held-out test set is
/// sampled down to, and the train share of the stratified split.
const HELD_OUT_FRACTION: f64 = 0.2;
const TRAIN_FRACTION:    f64 = 0.8;

// ─── Row validation ───────────────────────────────────────────────────────────
// Explicit tagged result instead of exception-as-control-flow:
// the builder's filtering step consumes the Invalid reason, the
// record itself is never mutated.

/// A record that survived projection and date parsing.
#[derive(Debug, Clone)]
struct ValidRow {
    filed:      NaiveDate,
    components: String,
    summary:    String,
}

enum RowValidation {
    Valid(ValidRow),
    Invalid(&'static str),
}

fn validate(record: &ComplaintRecord) -> RowValidation {
    let Some(date) = record.date_complaint_filed.as_deref() else {
        return RowValidation::Invalid("missing dateComplaintFiled");
    };
    let Some(components) = record.components.as_deref() else {
        return RowValidation::Invalid("missing components");
    };
    let Some(summary) = record.summary.as_deref() else {
        return RowValidation::Invalid("missing summary");
    };
    if record.odi_number.is_none() {
        return RowValidation::Invalid("missing odiNumber");
    }

    let Ok(filed) = NaiveDate::parse_from_str(date, "%m/%d/%Y") else {
        return RowValidation::Invalid("unparsable filing date");
    };

    RowValidation::Valid(ValidRow {
        filed,
        components: components.to_string(),
        summary:    summary.to_string(),
    })
}

// ─── Outputs ──────────────────────────────────────────────────────────────────

/// The three disjoint partitions the trainer consumes.
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    pub train: Vec<LabeledExample>,
    pub eval:  Vec<LabeledExample>,
    pub test:  Vec<LabeledExample>,
}

/// Counters for everything the pipeline dropped or kept —
/// logged at the end of a build so data loss is visible.
#[derive(Debug, Default, Clone)]
pub struct BuildReport {
    pub loaded:         usize,
    pub invalid:        usize,
    pub duplicates:     usize,
    pub dropped_future: usize,
    pub working_pool:   usize,
    pub held_out_pool:  usize,
    pub per_class:      usize,
    pub balanced:       usize,
}

// ─── DatasetBuilder ───────────────────────────────────────────────────────────

pub struct DatasetBuilder {
    seed: u64,
}

impl DatasetBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Run the full pipeline over raw records.
    pub fn build(&self, records: Vec<ComplaintRecord>) -> (DatasetSplits, BuildReport) {
        let mut report = BuildReport {
            loaded: records.len(),
            ..BuildReport::default()
        };
        let mut rng = StdRng::seed_from_u64(self.seed);

        // ── Steps 1–2: validate, then dedup by exact summary ─────────────────
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(records.len());

        for record in &records {
            match validate(record) {
                RowValidation::Valid(row) => {
                    // First occurrence wins, in input order
                    if seen.insert(row.summary.clone()) {
                        rows.push(row);
                    } else {
                        report.duplicates += 1;
                    }
                }
                RowValidation::Invalid(reason) => {
                    report.invalid += 1;
                    tracing::debug!("Dropping record: {}", reason);
                }
            }
        }

        // ── Steps 3–4: label, then split by filing year ──────────────────────
        let mut working:  Vec<(ValidRow, &'static str)> = Vec::new();
        let mut held_out: Vec<(ValidRow, &'static str)> = Vec::new();

        for row in rows {
            let label = label_for_components(&row.components);
            let year  = row.filed.year();

            if (WORKING_YEAR_MIN..=WORKING_YEAR_MAX).contains(&year) {
                working.push((row, label));
            } else if year < WORKING_YEAR_MIN {
                held_out.push((row, label));
            } else {
                // Filing years beyond the working window carry no
                // partition assignment; dropping them is explicit.
                report.dropped_future += 1;
            }
        }
        report.working_pool  = working.len();
        report.held_out_pool = held_out.len();

        // ── Step 5: balance the working pool ─────────────────────────────────
        // floor(min class count / 2) examples per class, sampled
        // without replacement. A class absent from the pool counts
        // as zero, which empties the balanced pool entirely.
        let min_count = CLASSES
            .iter()
            .map(|class| working.iter().filter(|(_, l)| l == class).count())
            .min()
            .unwrap_or(0);
        let per_class = min_count / 2;
        report.per_class = per_class;

        let mut balanced: Vec<(ValidRow, &'static str)> = Vec::new();
        for class in CLASSES {
            let members: Vec<(ValidRow, &'static str)> = working
                .iter()
                .filter(|(_, l)| *l == class)
                .cloned()
                .collect();
            balanced.extend(sample_exact(members, per_class, &mut rng));
        }
        report.balanced = balanced.len();

        // ── Step 6: sample the held-out pool down to 20% ─────────────────────
        let test_target = ((balanced.len() as f64) * HELD_OUT_FRACTION).round() as usize;
        let test_target = test_target.min(held_out.len());
        let held_out    = sample_exact(held_out, test_target, &mut rng);

        // ── Step 7: normalize summaries on both pools ────────────────────────
        let normalizer = Normalizer::new();
        let to_example = |(row, label): (ValidRow, &'static str)| {
            LabeledExample::new(normalizer.clean(&row.summary), label)
        };
        let balanced: Vec<LabeledExample> = balanced.into_iter().map(|p| to_example(p)).collect();
        let test:     Vec<LabeledExample> = held_out.into_iter().map(|p| to_example(p)).collect();

        // ── Step 8: stratified 80/20 train/eval split ────────────────────────
        let (train, eval) = stratified_split(balanced, TRAIN_FRACTION, &CLASSES, &mut rng);

        tracing::info!(
            "Dataset built: {} train, {} eval, {} test \
             ({} invalid, {} duplicate, {} post-window records dropped)",
            train.len(), eval.len(), test.len(),
            report.invalid, report.duplicates, report.dropped_future,
        );

        (DatasetSplits { train, eval, test }, report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// One record per call with a unique summary.
    fn record(id: u64, date: &str, components: &str, summary: &str) -> ComplaintRecord {
        ComplaintRecord::new(id, date, components, summary)
    }

    /// `counts` gives the number of working-pool records per class,
    /// in CLASSES order. All summaries unique, all filed in 2020.
    fn corpus(counts: [usize; 5]) -> Vec<ComplaintRecord> {
        let mut records = Vec::new();
        let mut id = 0;
        for (class, count) in CLASSES.iter().zip(counts) {
            for i in 0..count {
                id += 1;
                // "UNMAPPED" exercises the catch-all for the OTHER slot
                let components = if *class == "OTHER" { "UNMAPPED COMPONENT" } else { class };
                records.push(record(
                    id,
                    "06/15/2020",
                    components,
                    &format!("{class} failure number {i}"),
                ));
            }
        }
        records
    }

    #[test]
    fn test_balanced_pool_arithmetic() {
        let (splits, report) = DatasetBuilder::new(42).build(corpus([10, 8, 6, 4, 12]));

        // min class count 4 → floor(4/2) = 2 per class → 10 balanced
        assert_eq!(report.per_class, 2);
        assert_eq!(report.balanced, 10);
        assert_eq!(splits.train.len() + splits.eval.len(), 10);

        // each class contributes exactly per_class rows
        for class in CLASSES {
            let total = splits.train.iter().chain(&splits.eval)
                .filter(|e| e.label == class)
                .count();
            assert_eq!(total, 2, "class {class}");
        }
    }

    #[test]
    fn test_deterministic_given_fixed_seed() {
        let input = corpus([9, 7, 11, 5, 8]);
        let (a, _) = DatasetBuilder::new(7).build(input.clone());
        let (b, _) = DatasetBuilder::new(7).build(input);

        assert_eq!(a.train, b.train);
        assert_eq!(a.eval,  b.eval);
        assert_eq!(a.test,  b.test);
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let mut input = corpus([10, 10, 10, 10, 10]);
        // Held-out records, filed before the working window
        for i in 0..20 {
            input.push(record(
                1000 + i,
                "03/01/2010",
                "STRUCTURE",
                &format!("old structure complaint {i}"),
            ));
        }

        let (splits, _) = DatasetBuilder::new(42).build(input);

        let mut seen = HashSet::new();
        for example in splits.train.iter().chain(&splits.eval).chain(&splits.test) {
            assert!(seen.insert(example.summary.clone()), "duplicate: {}", example.summary);
        }
    }

    #[test]
    fn test_one_record_per_class_yields_empty_pool() {
        // min_class_count = 1 ⇒ floor(1/2) = 0 ⇒ every class discarded
        let (splits, report) = DatasetBuilder::new(42).build(corpus([1, 1, 1, 1, 1]));
        assert_eq!(report.balanced, 0);
        assert!(splits.train.is_empty());
        assert!(splits.eval.is_empty());
        assert!(splits.test.is_empty());
    }

    #[test]
    fn test_held_out_sampled_to_fifth_of_balanced() {
        let mut input = corpus([10, 10, 10, 10, 10]);
        for i in 0..30 {
            input.push(record(
                2000 + i,
                "05/20/2012",
                "AIR BAGS",
                &format!("pre-window airbag complaint {i}"),
            ));
        }

        let (splits, report) = DatasetBuilder::new(42).build(input);

        // 5 per class → balanced 25 → test target round(25 * 0.2) = 5
        assert_eq!(report.balanced, 25);
        assert_eq!(splits.test.len(), 5);
    }

    #[test]
    fn test_invalid_rows_dropped_not_fatal() {
        let mut input = corpus([4, 4, 4, 4, 4]);
        input.push(ComplaintRecord {
            odi_number:           Some(9999),
            date_complaint_filed: Some("not-a-date".into()),
            components:           Some("AIR BAGS".into()),
            summary:              Some("bad date row".into()),
            extra:                serde_json::Map::new(),
        });
        input.push(ComplaintRecord {
            odi_number:           Some(9998),
            date_complaint_filed: Some("01/01/2020".into()),
            components:           Some("AIR BAGS".into()),
            summary:              None,
            extra:                serde_json::Map::new(),
        });

        let (_, report) = DatasetBuilder::new(42).build(input);
        assert_eq!(report.invalid, 2);
    }

    #[test]
    fn test_duplicate_summaries_first_occurrence_wins() {
        let input = vec![
            record(1, "06/15/2020", "AIR BAGS", "same summary text"),
            record(2, "07/20/2021", "STRUCTURE", "same summary text"),
        ];
        let (_, report) = DatasetBuilder::new(42).build(input);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.working_pool, 1);
    }

    #[test]
    fn test_post_window_years_dropped() {
        let input = vec![
            record(1, "06/15/2026", "AIR BAGS", "future complaint"),
            record(2, "06/15/2020", "AIR BAGS", "current complaint"),
        ];
        let (_, report) = DatasetBuilder::new(42).build(input);
        assert_eq!(report.dropped_future, 1);
        assert_eq!(report.working_pool, 1);
    }

    #[test]
    fn test_summaries_are_normalized() {
        let mut input = corpus([4, 4, 4, 4, 4]);
        for record in &mut input {
            let raw = record.summary.take().unwrap();
            record.summary = Some(format!("  {} ••", raw.to_uppercase()));
        }

        let (splits, _) = DatasetBuilder::new(42).build(input);
        for example in splits.train.iter().chain(&splits.eval) {
            assert_eq!(example.summary, example.summary.to_lowercase());
            assert!(!example.summary.contains('•'));
            assert!(!example.summary.ends_with(' '));
        }
    }
}
