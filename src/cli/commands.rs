// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands: `harvest`, `build-dataset`,
// `train` and `classify`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::harvest_use_case::HarvestConfig;
use crate::application::dataset_use_case::DatasetConfig;
use crate::application::train_use_case::TrainConfig;

/// The four top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest complaint records from the NHTSA API
    Harvest(HarvestArgs),

    /// Clean, balance and split raw complaints into train/eval/test CSVs
    BuildDataset(DatasetArgs),

    /// Fine-tune the fault classifier on the dataset partitions
    Train(TrainArgs),

    /// Classify a single complaint text using a trained checkpoint
    Classify(ClassifyArgs),
}

/// All arguments for the `harvest` command.
#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Directory for the per-stage JSON files and the final complaints.json
    #[arg(long, default_value = "data/json")]
    pub out_dir: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Write the accumulated complaints file every N newly fetched records
    #[arg(long, default_value_t = 100)]
    pub checkpoint_every: usize,

    /// Extra attempts per failed request (0 = fail-soft immediately)
    #[arg(long, default_value_t = 0)]
    pub retries: usize,
}

impl From<HarvestArgs> for HarvestConfig {
    fn from(a: HarvestArgs) -> Self {
        HarvestConfig {
            out_dir:          a.out_dir,
            timeout_secs:     a.timeout_secs,
            checkpoint_every: a.checkpoint_every,
            retries:          a.retries,
        }
    }
}

/// All arguments for the `build-dataset` command.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Raw harvested complaints (JSON array)
    #[arg(long, default_value = "data/json/complaints.json")]
    pub input: String,

    /// Directory to write train.csv, eval.csv and test.csv
    #[arg(long, default_value = "data/csv")]
    pub out_dir: String,

    /// Seed for every sampling/shuffling step — same seed, same partitions
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<DatasetArgs> for DatasetConfig {
    fn from(a: DatasetArgs) -> Self {
        DatasetConfig {
            input:   a.input,
            out_dir: a.out_dir,
            seed:    a.seed,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing train.csv, eval.csv and test.csv
    #[arg(long, default_value = "data/csv")]
    pub data_dir: String,

    /// Directory to save model checkpoints, tokenizer and metric reports
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Maximum number of tokens per complaint summary
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Upper bound on full passes through the training data
    #[arg(long, default_value_t = 30)]
    pub epochs: usize,

    /// How fast the model learns — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-5)]
    pub lr: f64,

    /// Stop after this many consecutive epochs without eval-loss improvement
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Seed for shuffling the training batches
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Hidden dimension of the encoder (d_model in the paper)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads in multi-head attention
    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    /// Typically 4x d_model
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability — randomly zeroes activations during training
    /// to prevent overfitting
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Total number of unique tokens the tokenizer can produce
    #[arg(long, default_value_t = 30000)]
    pub vocab_size: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            max_seq_len:    a.max_seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            patience:       a.patience,
            seed:           a.seed,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
        }
    }
}

/// All arguments for the `classify` command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The complaint text to classify
    #[arg(long)]
    pub complaint: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
