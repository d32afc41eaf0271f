// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full fine-tuning pipeline in order:
//
//   Step 1: Load partition CSVs        (Layer 4 - data)
//   Step 2: Build / load tokenizer     (Layer 6 - infra)
//   Step 3: Fix the label map          (Layer 3 - domain)
//   Step 4: Save config + label map    (Layer 6 - infra)
//   Step 5: Tokenise into datasets     (Layer 4 - data)
//   Step 6: Run the training loop      (Layer 5 - ml)
//   Step 7: Evaluate best checkpoint   (Layer 5 - ml)
//   Step 8: Persist metric reports     (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::module::AutodiffModule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::csv_store::read_partition;
use crate::data::dataset::ComplaintDataset;
use crate::domain::labels::LabelMap;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::ClassificationReport;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::trainer::{collect_predictions, run_training, TrainBackend};
use crate::ml::model::{ComplaintClassifierConfig, ComplaintClassifierModel};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub max_seq_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub patience:       usize,
    pub seed:           u64,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub vocab_size:     usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            max_seq_len:    512,
            batch_size:     8,
            epochs:         30,
            lr:             1e-5,
            patience:       3,
            seed:           42,
            d_model:        256,
            num_heads:      8,
            num_layers:     6,
            d_ff:           1024,
            dropout:        0.1,
            vocab_size:     30000,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full fine-tuning pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg      = &self.config;
        let data_dir = PathBuf::from(&cfg.data_dir);

        // ── Step 1: load the three partitions ────────────────────────────────
        let train_examples = read_partition(&data_dir.join("train.csv"))?;
        let eval_examples  = read_partition(&data_dir.join("eval.csv"))?;
        let test_examples  = read_partition(&data_dir.join("test.csv"))?;
        tracing::info!(
            "Partitions loaded: {} train, {} eval, {} test",
            train_examples.len(), eval_examples.len(), test_examples.len(),
        );

        // ── Step 2: build / load tokenizer on the train corpus ───────────────
        let summaries: Vec<String> = train_examples.iter().map(|e| e.summary.clone()).collect();
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.load_or_build(&summaries, cfg.vocab_size)?;

        // ── Step 3: the label map for this run ───────────────────────────────
        // Always the full fixed taxonomy, so a class that balancing
        // left rare can still be predicted by the trained model.
        let label_map = LabelMap::fixed();

        // ── Step 4: persist run metadata before training starts ──────────────
        // The inferencer needs both to rebuild the exact model.
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_label_map(&label_map)?;

        // ── Step 5: tokenise everything into Burn datasets ───────────────────
        let train_dataset =
            ComplaintDataset::from_examples(&train_examples, &tokenizer, &label_map, cfg.max_seq_len)?;
        let eval_dataset =
            ComplaintDataset::from_examples(&eval_examples, &tokenizer, &label_map, cfg.max_seq_len)?;
        tracing::info!("Tokenised {} training samples", train_dataset.sample_count());

        // ── Step 6: run the training loop (Layer 5) ──────────────────────────
        let summary = run_training(
            cfg,
            label_map.num_classes(),
            train_dataset,
            eval_dataset,
            &ckpt_manager,
        )?;
        tracing::info!(
            "Best epoch {} (eval_loss={:.4}) after {} epochs",
            summary.best_epoch, summary.best_eval_loss, summary.epochs_run,
        );

        // ── Step 7: evaluate the best checkpoint on eval AND test ────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        let model_cfg = ComplaintClassifierConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, 0.0,
            label_map.num_classes(),
        );
        let model: ComplaintClassifierModel<TrainBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_best(model, &device)?;
        let model = model.valid();

        for (partition, examples) in [("eval", &eval_examples), ("test", &test_examples)] {
            let dataset =
                ComplaintDataset::from_examples(examples, &tokenizer, &label_map, cfg.max_seq_len)?;
            let (predictions, labels) =
                collect_predictions(&model, dataset, cfg.batch_size, &device)?;

            // ── Step 8: persist the metric report ────────────────────────────
            let report =
                ClassificationReport::compute(&predictions, &labels, label_map.num_classes());
            tracing::info!(
                "{partition}: accuracy={:.4} f1={:.4} hamming={:.4}",
                report.accuracy, report.f1, report.hamming_loss,
            );
            report.save(&ckpt_manager.metrics_path(partition))?;
        }

        Ok(())
    }
}
