// ============================================================
// Layer 4b — Harvesting
// ============================================================
// Walks the NHTSA three-level vehicle hierarchy and stores the
// complaints filed against every enumerated vehicle.
//
//   client.rs    — blocking HTTP client for the four endpoints
//                  (bounded timeout, identifying user agent,
//                  optional retries)
//
//   harvester.rs — the staged, resumable walk itself, with
//                  per-stage persistence, triple deduplication
//                  and Stage D checkpointing
//
// A single logical thread issues sequential calls; checkpoint
// writes are ordered relative to the accumulating result list
// and one item's failure never aborts its siblings.

/// HTTP client for the NHTSA products/complaints API
pub mod client;

/// The staged A→B→C→D harvest with checkpointing
pub mod harvester;
