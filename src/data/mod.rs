// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw harvested JSON and GPU-ready tensor
// batches lives here.
//
// The pipeline flows in this order:
//
//   complaints.json (raw records)
//       │
//       ▼
//   DatasetBuilder    → validates, dedups, labels, splits by
//       │               filing year, balances and stratifies
//       ▼
//   Normalizer        → cleans narratives (same code at
//       │               training and inference time)
//       ▼
//   csv_store         → persists train/eval/test partitions
//       │
//       ▼
//   ComplaintDataset  → tokenised samples behind Burn's
//       │               Dataset trait
//       ▼
//   ClassificationBatcher → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Deterministic text cleaning shared by training and inference
pub mod normalizer;

/// Seeded sampling, balancing and stratified splitting helpers
pub mod splitter;

/// The raw-records → partitions pipeline
pub mod builder;

/// CSV read/write for the partition files
pub mod csv_store;

/// Implements Burn's Dataset trait for tokenised complaints
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
