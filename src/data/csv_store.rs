// ============================================================
// Layer 4 — CSV Partition Store
// ============================================================
// Reads and writes the train/eval/test partition files.
// Each partition is a flat `summary,label` table; row order
// carries no meaning.
//
// Why the csv crate instead of hand-written rows?
//   Complaint narratives routinely contain commas, quotes and
//   embedded newlines. The csv crate handles RFC 4180 quoting
//   on both sides, so a round trip is lossless.
//
// Reference: Rust Book §9 (Error Handling)
//            csv crate documentation

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::example::LabeledExample;

/// Write one partition to `path`, creating parent directories.
pub fn write_partition(path: &Path, examples: &[LabeledExample]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create partition file '{}'", path.display()))?;

    for example in examples {
        writer.serialize(example)?;
    }
    writer.flush()?;

    tracing::debug!("Wrote {} rows to '{}'", examples.len(), path.display());
    Ok(())
}

/// Read one partition back into memory.
pub fn read_partition(path: &Path) -> Result<Vec<LabeledExample>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| {
            format!(
                "Cannot read partition '{}'. Have you run 'build-dataset' first?",
                path.display()
            )
        })?;

    let mut examples = Vec::new();
    for row in reader.deserialize() {
        let example: LabeledExample = row?;
        examples.push(example);
    }
    Ok(examples)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_awkward_characters() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");

        let examples = vec![
            LabeledExample::new("brakes failed, twice, on the \"highway\"", "SERVICE BRAKES"),
            LabeledExample::new("wiring melted\nunder the dash", "ELECTRICAL SYSTEM"),
            LabeledExample::new("plain row", "OTHER"),
        ];

        write_partition(&path, &examples).unwrap();
        let loaded = read_partition(&path).unwrap();
        assert_eq!(loaded, examples);
    }

    #[test]
    fn test_empty_partition_round_trips() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.csv");

        write_partition(&path, &[]).unwrap();
        let loaded = read_partition(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_partition(&dir.path().join("nope.csv")).is_err());
    }
}
