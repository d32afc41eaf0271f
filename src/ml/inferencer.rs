// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads a completed training-run artifact (config, tokenizer,
// label map, best weights) and classifies single complaints.
//
// ClassifierHandle is the serving-side wrapper: it owns the
// current Classifier behind RwLock<Arc<..>>. reload() builds a
// fresh Classifier from disk and atomically swaps the Arc, so
// readers either see the old version or the new one, never a
// half-mutated model. In-flight requests keep the Arc they
// cloned and finish against the version they started with.

use anyhow::Result;
use burn::prelude::*;
use std::sync::{Arc, RwLock};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::data::normalizer::Normalizer;
use crate::domain::labels::{LabelMap, Prediction};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::model::{ComplaintClassifierConfig, ComplaintClassifierModel};

type InferBackend = burn::backend::Wgpu;

pub struct Classifier {
    model:       ComplaintClassifierModel<InferBackend>,
    tokenizer:   Tokenizer,
    label_map:   LabelMap,
    normalizer:  Normalizer,
    max_seq_len: usize,
    device:      burn::backend::wgpu::WgpuDevice,
}

impl Classifier {
    /// Rebuild the exact trained model from a checkpoint directory.
    pub fn from_checkpoint(checkpoint_dir: &Path) -> Result<Self> {
        let device       = burn::backend::wgpu::WgpuDevice::default();
        let ckpt_manager = CheckpointManager::new(checkpoint_dir);

        let cfg       = ckpt_manager.load_config()?;
        let label_map = ckpt_manager.load_label_map()?;
        let tokenizer = TokenizerStore::new(checkpoint_dir).load()?;

        // Dropout 0 — inference never drops activations
        let model_cfg = ComplaintClassifierConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, 0.0,
            label_map.num_classes(),
        );
        let model: ComplaintClassifierModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_best(model, &device)?;

        tracing::info!("Classifier loaded from '{}'", checkpoint_dir.display());
        Ok(Self {
            model,
            tokenizer,
            label_map,
            normalizer: Normalizer::new(),
            max_seq_len: cfg.max_seq_len,
            device,
        })
    }

    /// Normalize, tokenize, forward, softmax — returns the top
    /// label and its probability.
    pub fn predict(&self, complaint: &str) -> Result<Prediction> {
        let cleaned = self.normalizer.clean(complaint);
        if cleaned.is_empty() {
            anyhow::bail!("Complaint text is empty after normalization");
        }

        let encoding = self.tokenizer.encode(cleaned.as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenise: {e}"))?;

        let mut input_ids: Vec<u32> = encoding.get_ids().to_vec();
        input_ids.truncate(self.max_seq_len);
        while input_ids.len() < self.max_seq_len { input_ids.push(0); }

        // Forward pass — a batch of one
        let input_flat: Vec<i32> = input_ids.iter().map(|&x| x as i32).collect();
        let input_tensor = Tensor::<InferBackend, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device,
        ).reshape([1, self.max_seq_len]);

        let logits = self.model.forward(input_tensor); // [1, num_classes]

        let probs: Vec<f32> = burn::tensor::activation::softmax(logits, 1)
            .into_data().to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;

        let (best_id, best_score) = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(id, score)| (id, *score))
            .unwrap_or((0, 0.0));

        let label = self.label_map
            .label_of(best_id)
            .ok_or_else(|| anyhow::anyhow!("Model produced unknown class id {best_id}"))?
            .to_string();

        tracing::debug!("Classified as '{}' (score {:.4})", label, best_score);
        Ok(Prediction { label, score: best_score })
    }
}

// ─── ClassifierHandle ─────────────────────────────────────────────────────────
/// Versioned handle over the current Classifier.
///
/// Single-writer/multi-reader: `current()` clones the Arc (cheap),
/// `reload()` builds a replacement off to the side and swaps the
/// pointer once it is fully loaded. The model behind an Arc is
/// never mutated in place.
pub struct ClassifierHandle {
    checkpoint_dir: PathBuf,
    current:        RwLock<Arc<Classifier>>,
}

impl ClassifierHandle {
    /// Load the initial version; fails if no checkpoint exists,
    /// so a handle always serves a ready model.
    pub fn load(checkpoint_dir: impl Into<PathBuf>) -> Result<Self> {
        let checkpoint_dir = checkpoint_dir.into();
        let classifier     = Classifier::from_checkpoint(&checkpoint_dir)?;
        Ok(Self {
            checkpoint_dir,
            current: RwLock::new(Arc::new(classifier)),
        })
    }

    /// The current version — callers keep the Arc for the whole
    /// request so a concurrent reload never swaps it out from
    /// under them.
    pub fn current(&self) -> Arc<Classifier> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Build a fresh Classifier from disk and atomically replace
    /// the current one. On failure the old version keeps serving.
    pub fn reload(&self) -> Result<()> {
        let replacement = Arc::new(Classifier::from_checkpoint(&self.checkpoint_dir)?);
        let mut guard = self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = replacement;
        tracing::info!("Classifier reloaded from '{}'", self.checkpoint_dir.display());
        Ok(())
    }
}
