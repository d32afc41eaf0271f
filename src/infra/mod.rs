// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   checkpoint.rs      — The training-run artifact on disk.
//                        Uses Burn's CompactRecorder for the
//                        model weights and plain JSON for the
//                        TrainConfig and the id↔label mapping,
//                        so inference can rebuild the exact
//                        model the run produced.
//
//   tokenizer_store.rs — Tokenizer persistence.
//                        Builds a word-level tokenizer on the
//                        training summaries if none exists, or
//                        loads a previously saved one. Ensures
//                        the same vocabulary is used for
//                        training and inference.
//
//   metrics.rs         — Per-epoch CSV logging plus the
//                        post-training classification metric
//                        suite (accuracy, weighted F1/precision/
//                        recall, Hamming loss) persisted as
//                        flat JSON reports.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//     (e.g. swap file checkpoints for S3 cloud storage)
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint, config and label-map persistence
pub mod checkpoint;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Epoch CSV logging and the classification metric suite
pub mod metrics;
