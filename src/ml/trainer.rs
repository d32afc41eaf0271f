// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full fine-tuning loop using Burn's DataLoader and Adam, with
// per-epoch evaluation, best-model selection on the lowest eval
// loss, and early stopping after `patience` non-improving epochs.
//
// Key Burn 0.16 insight:
//   - Training uses TrainBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on EvalBackend (Wgpu)
//   - The eval batcher must also use EvalBackend
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// Failure policy: no partial-run recovery. A crash requires
// restarting the run; the best checkpoint written so far is the
// only thing that survives.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClassificationBatcher, dataset::ComplaintDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{ComplaintClassifierConfig, ComplaintClassifierModel};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type EvalBackend  = burn::backend::Wgpu;

/// What the loop reports back to the orchestrating use case.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs_run:     usize,
    pub best_epoch:     usize,
    pub best_eval_loss: f64,
}

pub fn run_training(
    cfg:           &TrainConfig,
    num_classes:   usize,
    train_dataset: ComplaintDataset,
    eval_dataset:  ComplaintDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<TrainingSummary> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, num_classes, train_dataset, eval_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    num_classes:   usize,
    train_dataset: ComplaintDataset,
    eval_dataset:  ComplaintDataset,
    ckpt_manager:  &CheckpointManager,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<TrainingSummary> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = ComplaintClassifierConfig::new(
        cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
        num_classes,
    );
    let mut model: ComplaintClassifierModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} layers, d_model={}, {} classes",
        cfg.num_layers, cfg.d_model, num_classes,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ClassificationBatcher::<TrainBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Eval data loader (inner backend — no autodiff overhead) ───────────────
    let eval_batcher = ClassificationBatcher::<EvalBackend>::new(device.clone());
    let eval_loader  = DataLoaderBuilder::new(eval_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(eval_dataset);

    let logger = MetricsLogger::new(ckpt_manager.dir().clone())?;

    // ── Epoch loop with early stopping ────────────────────────────────────────
    let mut best_eval_loss = f64::INFINITY;
    let mut best_epoch     = 0usize;
    let mut stale_epochs   = 0usize;
    let mut epochs_run     = 0usize;

    for epoch in 1..=cfg.epochs {
        epochs_run = epoch;

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.input_ids, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Evaluation phase ──────────────────────────────────────────────────
        // model.valid() → ComplaintClassifierModel<EvalBackend>
        // dropout disabled for deterministic evaluation
        let model_valid = model.valid();

        let mut eval_loss_sum = 0.0f64;
        let mut eval_batches  = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in eval_loader.iter() {
            let logits = model_valid.forward(batch.input_ids);

            let ce = burn::nn::loss::CrossEntropyLossConfig::new()
                .init(&logits.device());
            let batch_loss: f64 = ce
                .forward(logits.clone(), batch.targets.clone())
                .into_scalar().elem::<f64>();
            eval_loss_sum += batch_loss;
            eval_batches  += 1;

            // argmax(1) returns shape [batch, 1] — flatten to [batch]
            // before comparing with targets which is [batch]
            let predicted = logits.argmax(1).flatten::<1>(0, 1);

            total_samples += batch.targets.dims()[0];
            let batch_correct: i64 = predicted
                .equal(batch.targets)
                .int().sum().into_scalar().elem::<i64>();
            correct += batch_correct as usize;
        }

        let avg_eval_loss = if eval_batches  > 0 { eval_loss_sum / eval_batches as f64 } else { f64::NAN };
        let eval_accuracy = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | eval_loss={:.4} | eval_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_eval_loss, eval_accuracy * 100.0,
        );

        let epoch_metrics = EpochMetrics::new(epoch, avg_train_loss, avg_eval_loss, eval_accuracy);
        logger.log(&epoch_metrics)?;

        // ── Model selection + early stopping ──────────────────────────────────
        if epoch_metrics.is_improvement(best_eval_loss) {
            best_eval_loss = avg_eval_loss;
            best_epoch     = epoch;
            stale_epochs   = 0;
            ckpt_manager.save_best(&model, epoch)?;
            tracing::info!("New best checkpoint at epoch {} (eval_loss={:.4})", epoch, avg_eval_loss);
        } else {
            stale_epochs += 1;
            if stale_epochs >= cfg.patience {
                tracing::info!(
                    "Early stopping after {} non-improving epochs (best epoch {})",
                    stale_epochs, best_epoch,
                );
                break;
            }
        }
    }

    tracing::info!("Training complete: best epoch {} of {}", best_epoch, epochs_run);
    Ok(TrainingSummary { epochs_run, best_epoch, best_eval_loss })
}

/// Run the (already trained) model over one partition and collect
/// parallel prediction/label id vectors for the metric suite.
pub fn collect_predictions(
    model:      &ComplaintClassifierModel<EvalBackend>,
    dataset:    ComplaintDataset,
    batch_size: usize,
    device:     &burn::backend::wgpu::WgpuDevice,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let batcher = ClassificationBatcher::<EvalBackend>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut predictions = Vec::new();
    let mut labels      = Vec::new();

    for batch in loader.iter() {
        let logits    = model.forward(batch.input_ids);
        let predicted = logits.argmax(1).flatten::<1>(0, 1);

        let batch_preds: Vec<i32> = predicted.into_data().to_vec::<i32>()
            .map_err(|e| anyhow::anyhow!("Cannot read predictions: {e:?}"))?;
        let batch_labels: Vec<i32> = batch.targets.into_data().to_vec::<i32>()
            .map_err(|e| anyhow::anyhow!("Cannot read targets: {e:?}"))?;

        predictions.extend(batch_preds.into_iter().map(|p| p as usize));
        labels.extend(batch_labels.into_iter().map(|l| l as usize));
    }

    Ok((predictions, labels))
}
