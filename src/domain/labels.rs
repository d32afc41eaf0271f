// ============================================================
// Layer 3 — Fault Class Taxonomy
// ============================================================
// The fixed 5-class vocabulary shared by the dataset builder
// and the training orchestrator. The id↔label correspondence is
// training-run metadata: it is saved next to the checkpoint and
// reloaded at inference time, so the mapping used to interpret
// logits is always the one the model was trained with.
//
// The mapping is built from the FULL fixed taxonomy, not from
// whatever labels happen to survive balancing. A class that is
// rare in one harvest would otherwise silently vanish from
// label2id and the model could never predict it again.
//
// Reference: Rust Book §5 (Structs), §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The four named fault categories plus the catch-all, in id order.
pub const CLASSES: [&str; 5] = [
    "ELECTRICAL SYSTEM",
    "AIR BAGS",
    "STRUCTURE",
    "SERVICE BRAKES",
    "OTHER",
];

/// The catch-all class for raw component text that matches
/// none of the four named categories.
pub const CATCH_ALL: &str = "OTHER";

/// The top classification for one complaint: a taxonomy label
/// and its softmax score. Serialised as-is into CLI/API output.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Map a raw `components` value to a taxonomy label.
/// Exact match on the trimmed text, else the catch-all.
pub fn label_for_components(raw: &str) -> &'static str {
    let trimmed = raw.trim();
    CLASSES
        .iter()
        .find(|&&c| c == trimmed)
        .copied()
        .unwrap_or(CATCH_ALL)
}

/// The bidirectional label↔id mapping persisted with every
/// training run as `label_map.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMap {
    pub label2id: HashMap<String, usize>,
    pub id2label: Vec<String>,
}

impl LabelMap {
    /// Build the mapping over the full fixed taxonomy.
    pub fn fixed() -> Self {
        let id2label: Vec<String> = CLASSES.iter().map(|c| c.to_string()).collect();
        let label2id = id2label
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();
        Self { label2id, id2label }
    }

    pub fn num_classes(&self) -> usize {
        self.id2label.len()
    }

    pub fn id_of(&self, label: &str) -> Option<usize> {
        self.label2id.get(label).copied()
    }

    pub fn label_of(&self, id: usize) -> Option<&str> {
        self.id2label.get(id).map(|s| s.as_str())
    }

    /// Save as pretty JSON next to the model checkpoint.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write label map to '{}'", path.display()))?;
        Ok(())
    }

    /// Reload the exact mapping a checkpoint was trained with.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read label map from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_maps_to_named_class() {
        assert_eq!(label_for_components("SERVICE BRAKES"), "SERVICE BRAKES");
        assert_eq!(label_for_components("  AIR BAGS  "), "AIR BAGS");
    }

    #[test]
    fn test_unknown_component_collapses_to_catch_all() {
        assert_eq!(label_for_components("POWER TRAIN"), "OTHER");
        assert_eq!(label_for_components(""), "OTHER");
    }

    #[test]
    fn test_fixed_map_round_trips_every_class() {
        let map = LabelMap::fixed();
        assert_eq!(map.num_classes(), 5);
        for class in CLASSES {
            let id = map.id_of(class).unwrap();
            assert_eq!(map.label_of(id), Some(class));
        }
    }

    #[test]
    fn test_prediction_serialises_flat() {
        let p = Prediction { label: "AIR BAGS".to_string(), score: 0.92 };
        let json: serde_json::Value = serde_json::to_value(&p).unwrap();
        assert_eq!(json["label"], "AIR BAGS");
        assert!((json["score"].as_f64().unwrap() - 0.92).abs() < 1e-6);
    }

    #[test]
    fn test_save_and_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("label_map.json");
        let map  = LabelMap::fixed();
        map.save(&path).unwrap();

        let loaded = LabelMap::load(&path).unwrap();
        assert_eq!(loaded.id2label, map.id2label);
        assert_eq!(loaded.id_of("STRUCTURE"), map.id_of("STRUCTURE"));
    }
}
