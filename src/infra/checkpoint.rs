// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the training run artifact using Burn's
// CompactRecorder.
//
// What one completed run leaves on disk:
//   model_best.mpk.gz     — weights of the best epoch (lowest
//                           eval loss), overwritten whenever a
//                           new best is found
//   best_epoch.json       — which epoch the weights came from
//   train_config.json     — model/loop hyperparameters
//   label_map.json        — the id↔label mapping of this run
//   metrics_eval_*.json   — metric suite on the eval partition
//   metrics_test_*.json   — metric suite on the test partition
//   metrics.csv           — per-epoch loss curve
//
// Why save the config separately?
//   When loading for inference, we need to know the exact model
//   architecture (d_model, num_layers, etc.) to rebuild the
//   model before loading the weights into it.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//
// The artifact is immutable after the run completes; a crash
// mid-training leaves at worst the previous best intact.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::labels::LabelMap;
use crate::ml::model::ComplaintClassifierModel;

const RUN_NAME: &str = "complaints_classifier";

/// Manages saving and loading of the training run artifact.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    /// Path to the directory where checkpoints are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save the model as the new best, together with the epoch
    /// pointer used by the inferencer.
    pub fn save_best<B: AutodiffBackend>(
        &self,
        model: &ComplaintClassifierModel<B>,
        epoch: usize,
    ) -> Result<()> {
        // Recorder adds the .mpk.gz extension itself
        let path = self.dir.join("model_best");

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let pointer = self.dir.join("best_epoch.json");
        fs::write(&pointer, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write best_epoch.json")?;

        tracing::debug!("Saved best checkpoint at epoch {}", epoch);
        Ok(())
    }

    /// Load the best saved weights into `model`.
    ///
    /// The model parameter must have the correct architecture
    /// (matching the saved checkpoint) or loading will fail.
    pub fn load_best<B: Backend>(
        &self,
        model:  ComplaintClassifierModel<B>,
        device: &B::Device,
    ) -> Result<ComplaintClassifierModel<B>> {
        let epoch = self.best_epoch()?;
        let path  = self.dir.join("model_best");

        tracing::info!("Loading best checkpoint (epoch {})", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    ///
    /// This must be called before training starts so inference
    /// can reconstruct the exact model architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'classify'.",
                    path.display()
                )
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Persist this run's id↔label mapping.
    pub fn save_label_map(&self, map: &LabelMap) -> Result<()> {
        map.save(&self.dir.join("label_map.json"))
    }

    /// Reload the exact mapping the checkpoint was trained with.
    pub fn load_label_map(&self) -> Result<LabelMap> {
        LabelMap::load(&self.dir.join("label_map.json"))
    }

    /// Where the metric suite for one partition is written,
    /// e.g. metrics_eval_complaints_classifier.json
    pub fn metrics_path(&self, partition: &str) -> PathBuf {
        self.dir.join(format!("metrics_{partition}_{RUN_NAME}.json"))
    }

    /// Read best_epoch.json and return the epoch number.
    /// Returns an error if training hasn't been run yet.
    fn best_epoch(&self) -> Result<usize> {
        let path = self.dir.join("best_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'best_epoch.json'. Have you run 'train' first?"
            })?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
