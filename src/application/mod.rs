// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (harvesting, dataset building, training or
// classifying one complaint).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct HTTP or file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The NHTSA harvest workflow
pub mod harvest_use_case;

// The raw-records → partition-CSVs workflow
pub mod dataset_use_case;

// The fine-tuning workflow
pub mod train_use_case;

// The single-complaint classification workflow
pub mod classify_use_case;
