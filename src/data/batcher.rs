// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec of
// ComplaintSamples into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N samples, each with sequences of length S
//   Output: ClassificationBatch with an input tensor [N, S]
//           and a target tensor [N]
//
//   We flatten all input_ids into one long Vec, then reshape:
//   [s1_t1, s1_t2, ..., s1_tS, s2_t1, ..., sN_tS] → [N, S]
//
// Why is this easy here?
//   Because all sequences are already padded to the same length
//   in ComplaintSample. If they weren't, we'd need dynamic
//   padding here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ComplaintSample;

// ─── ClassificationBatch ──────────────────────────────────────────────────────
/// A batch of complaint samples ready for the model forward pass.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ID sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Ground truth class ids — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ClassificationBatcher ────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the
/// correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ComplaintSample, ClassificationBatch<B>> for ClassificationBatcher<B> {
    /// Convert a Vec of ComplaintSamples into a single batch.
    fn batch(&self, items: Vec<ComplaintSample>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        // All sequences have the same length (pre-padded)
        let seq_len    = items[0].input_ids.len();

        // Vec<Vec<u32>> → flat Vec<i32> (Burn uses i32 for Int tensors)
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let class_ids: Vec<i32> = items
            .iter()
            .map(|s| s.class_id as i32)
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(
            class_ids.as_slice(), &self.device
        );

        ClassificationBatch { input_ids, targets }
    }
}
