// ============================================================
// Layer 3 — LabeledExample Domain Type
// ============================================================
// The derived entity produced by the dataset builder: one
// normalized complaint narrative plus its taxonomy label.
// Invariant: `label` is always a member of the fixed class set —
// unmapped component text collapses to the catch-all before a
// LabeledExample is ever created.
//
// Serialized directly to/from the partition CSVs, so the serde
// field names are also the CSV column names.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// One row of a train/eval/test partition: `summary,label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// The normalized complaint narrative
    pub summary: String,

    /// One of the five taxonomy class names
    pub label: String,
}

impl LabeledExample {
    pub fn new(summary: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            label:   label.into(),
        }
    }
}
