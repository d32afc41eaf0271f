// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two concerns live here:
//
//   1. EpochMetrics / MetricsLogger — one CSV row per training
//      epoch (loss curves, eval accuracy) for diagnosing runs.
//      Open it in a spreadsheet to spot overfitting: eval_loss
//      rising while train_loss falls.
//
//   2. ClassificationReport — the post-training metric suite
//      computed on the eval and test partitions and persisted
//      as flat {metricName: value} JSON records:
//      accuracy, weighted F1, weighted precision, weighted
//      recall and Hamming loss. For single-label multiclass
//      prediction the Hamming loss reduces to 1 - accuracy,
//      but it is reported because downstream dashboards expect
//      the field.
//
// Weighted averaging: per-class metric × (class support / total),
// summed over classes. Classes with no predicted positives get
// precision 0 rather than a division by zero.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

// ─── Per-epoch logging ────────────────────────────────────────────────────────

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the eval partition.
    /// Should track train_loss — divergence indicates overfitting
    pub eval_loss: f64,

    /// Fraction of eval examples classified correctly
    pub eval_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, eval_loss: f64, eval_accuracy: f64) -> Self {
        Self { epoch, train_loss, eval_loss, eval_accuracy }
    }

    /// Returns true if this epoch improved over the previous best eval loss
    pub fn is_improvement(&self, best_eval_loss: f64) -> bool {
        self.eval_loss < best_eval_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Write CSV header only if file is new —
        // this allows appending to an existing log across runs
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,eval_loss,eval_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.eval_loss, m.eval_accuracy,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, eval_loss={:.4}",
            m.epoch, m.train_loss, m.eval_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Post-training metric suite ───────────────────────────────────────────────

/// The flat metric record written as metrics_eval_*.json and
/// metrics_test_*.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy:     f64,
    pub f1:           f64,
    pub precision:    f64,
    pub recall:       f64,
    pub hamming_loss: f64,
}

impl ClassificationReport {
    /// Compute the full suite from parallel prediction/label id
    /// vectors. Both must be class ids < num_classes.
    pub fn compute(predictions: &[usize], labels: &[usize], num_classes: usize) -> Self {
        let total = labels.len();
        if total == 0 {
            return Self {
                accuracy:     0.0,
                f1:           0.0,
                precision:    0.0,
                recall:       0.0,
                hamming_loss: 0.0,
            };
        }

        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();
        let accuracy = correct as f64 / total as f64;

        // Per-class confusion counts
        let mut precision = 0.0;
        let mut recall    = 0.0;
        let mut f1        = 0.0;

        for class in 0..num_classes {
            let tp = predictions.iter().zip(labels)
                .filter(|(p, l)| **p == class && **l == class)
                .count() as f64;
            let fp = predictions.iter().zip(labels)
                .filter(|(p, l)| **p == class && **l != class)
                .count() as f64;
            let fn_ = predictions.iter().zip(labels)
                .filter(|(p, l)| **p != class && **l == class)
                .count() as f64;

            let support = tp + fn_;
            if support == 0.0 {
                continue;
            }
            let weight = support / total as f64;

            let class_precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let class_recall    = tp / support;
            let class_f1 = if class_precision + class_recall > 0.0 {
                2.0 * class_precision * class_recall / (class_precision + class_recall)
            } else {
                0.0
            };

            precision += weight * class_precision;
            recall    += weight * class_recall;
            f1        += weight * class_f1;
        }

        Self {
            accuracy,
            f1,
            precision,
            recall,
            // Single-label multiclass: the fraction of wrong labels
            hamming_loss: 1.0 - accuracy,
        }
    }

    /// Persist as a flat pretty-printed JSON record.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write metric report to '{}'", path.display()))?;
        tracing::info!("Metric report saved to '{}'", path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.4);
        // 2.3 < 3.0 → this is an improvement
        assert!(m.is_improvement(3.0));
        // 2.3 is NOT less than 2.0 → not an improvement
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_perfect_predictions() {
        let labels = vec![0, 1, 2, 3, 4, 0, 1];
        let report = ClassificationReport::compute(&labels, &labels, 5);

        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.hamming_loss, 0.0);
        assert_eq!(report.f1, 1.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
    }

    #[test]
    fn test_weighted_averaging_on_skewed_labels() {
        // 4 examples of class 0 (all correct), 1 of class 1 (wrong)
        let labels      = vec![0, 0, 0, 0, 1];
        let predictions = vec![0, 0, 0, 0, 0];
        let report = ClassificationReport::compute(&predictions, &labels, 2);

        assert!((report.accuracy - 0.8).abs() < 1e-9);
        assert!((report.hamming_loss - 0.2).abs() < 1e-9);
        // class 0: precision 4/5, recall 1, weight 0.8; class 1: all 0, weight 0.2
        assert!((report.recall - 0.8).abs() < 1e-9);
        assert!((report.precision - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_do_not_divide_by_zero() {
        let report = ClassificationReport::compute(&[], &[], 5);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.hamming_loss, 0.0);
    }

    #[test]
    fn test_report_save_is_flat_json() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics_eval_complaints_classifier.json");

        let labels = vec![0, 1];
        ClassificationReport::compute(&labels, &labels, 2).save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("accuracy").unwrap().is_number());
        assert!(value.get("hamming_loss").unwrap().is_number());
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        logger.log(&EpochMetrics::new(1, 1.5, 1.4, 0.3)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.2, 1.1, 0.5)).unwrap();

        let contents = std::fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(contents.lines().count(), 3); // header + 2 rows
    }
}
