// ============================================================
// Layer 2 — HarvestUseCase
// ============================================================
// Wires the HTTP client into the staged harvester:
//
//   Step 1: Build the NHTSA client   (Layer 4b - harvest)
//   Step 2: Run stages A–D           (Layer 4b - harvest)
//
// The heavy lifting — per-stage persistence, checkpointing,
// fail-soft error handling — all lives in the harvester; this
// use case only supplies configuration.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::harvest::client::NhtsaClient;
use crate::harvest::harvester::{Harvester, HarvestReport};

/// All knobs for a harvest run.
/// Serialisable so a run's configuration can be kept with its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub out_dir:          String,
    pub timeout_secs:     u64,
    pub checkpoint_every: usize,
    pub retries:          usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            out_dir:          "data/json".to_string(),
            timeout_secs:     30,
            checkpoint_every: 100,
            retries:          0,
        }
    }
}

pub struct HarvestUseCase {
    config: HarvestConfig,
}

impl HarvestUseCase {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Execute the full harvest end to end.
    pub fn execute(&self) -> Result<HarvestReport> {
        let cfg = &self.config;

        let client = NhtsaClient::new(Duration::from_secs(cfg.timeout_secs), cfg.retries)?;
        let harvester = Harvester::new(client, &cfg.out_dir, cfg.checkpoint_every);

        let report = harvester.run()?;
        tracing::info!(
            "Harvest finished: {} vehicles, {} records, {} checkpoint writes",
            report.vehicles, report.records, report.checkpoint_writes,
        );
        Ok(report)
    }
}
