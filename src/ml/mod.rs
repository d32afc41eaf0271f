// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// (plus the dataset/batcher glue in Layer 4).
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - Other layers are testable without a GPU
//   - The model architecture is clearly separated from
//     data loading and application logic
//
// What's in this layer:
//
//   model.rs      — The encoder classifier architecture:
//                   • Token embeddings
//                   • Positional embeddings
//                   • Multi-head self-attention
//                   • Feed-forward networks (GELU activation)
//                   • Layer normalisation + residual connections
//                   • Mean pooling + classification head
//
//   trainer.rs    — The fine-tuning loop
//                   Forward pass, cross-entropy loss, backward
//                   pass, Adam step, per-epoch evaluation,
//                   best-model selection and early stopping
//
//   inferencer.rs — The inference engine
//                   Loads a checkpoint, normalizes + tokenizes
//                   input, returns the top label with its score;
//                   ClassifierHandle adds atomic hot reload
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Encoder classifier model architecture
pub mod model;

/// Fine-tuning loop with evaluation, early stopping and checkpointing
pub mod trainer;

/// Inference engine — checkpoint loading, prediction, hot reload
pub mod inferencer;
