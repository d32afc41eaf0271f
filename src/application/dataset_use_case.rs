// ============================================================
// Layer 2 — DatasetUseCase
// ============================================================
// Orchestrates the raw-records → partition-CSVs workflow:
//
//   Step 1: Load complaints.json       (raw harvest output)
//   Step 2: Run the DatasetBuilder     (Layer 4 - data)
//   Step 3: Write train/eval/test CSVs (Layer 4 - data)
//
// Failures at this stage are fatal to the run — a bad record is
// filtered inside the builder, never recovered from here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::builder::{BuildReport, DatasetBuilder};
use crate::data::csv_store::write_partition;
use crate::domain::complaint::ComplaintRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub input:   String,
    pub out_dir: String,
    pub seed:    u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            input:   "data/json/complaints.json".to_string(),
            out_dir: "data/csv".to_string(),
            seed:    42,
        }
    }
}

pub struct DatasetUseCase {
    config: DatasetConfig,
}

impl DatasetUseCase {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    /// Execute the full dataset build end to end.
    pub fn execute(&self) -> Result<BuildReport> {
        let cfg = &self.config;

        // ── Step 1: load the raw harvest output ──────────────────────────────
        tracing::info!("Loading raw complaints from '{}'", cfg.input);
        let json = std::fs::read_to_string(&cfg.input)
            .with_context(|| {
                format!(
                    "Cannot read '{}'. Have you run 'harvest' first?",
                    cfg.input
                )
            })?;
        let records: Vec<ComplaintRecord> = serde_json::from_str(&json)
            .with_context(|| format!("Malformed complaints file '{}'", cfg.input))?;
        tracing::info!("Loaded {} raw records", records.len());

        // ── Step 2: run the pipeline ─────────────────────────────────────────
        let builder = DatasetBuilder::new(cfg.seed);
        let (splits, report) = builder.build(records);

        // ── Step 3: persist the partitions ───────────────────────────────────
        let out_dir = PathBuf::from(&cfg.out_dir);
        write_partition(&out_dir.join("train.csv"), &splits.train)?;
        write_partition(&out_dir.join("eval.csv"),  &splits.eval)?;
        write_partition(&out_dir.join("test.csv"),  &splits.test)?;

        tracing::info!(
            "Partitions written to '{}': {} train, {} eval, {} test",
            cfg.out_dir, splits.train.len(), splits.eval.len(), splits.test.len(),
        );
        Ok(report)
    }
}
