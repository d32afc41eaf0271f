// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `harvest`       — walks the NHTSA API and stores raw complaints
//   2. `build-dataset` — cleans, balances and splits the raw records
//   3. `train`         — fine-tunes the fault classifier on the CSVs
//   4. `classify`      — loads a checkpoint and classifies one complaint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, HarvestArgs, DatasetArgs, TrainArgs, ClassifyArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "complaints-classifier",
    version = "0.1.0",
    about = "Harvest NHTSA vehicle complaints, build datasets, train and run a fault classifier."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Harvest(args)      => Self::run_harvest(args),
            Commands::BuildDataset(args) => Self::run_build_dataset(args),
            Commands::Train(args)        => Self::run_train(args),
            Commands::Classify(args)     => Self::run_classify(args),
        }
    }

    /// Handles the `harvest` subcommand.
    fn run_harvest(args: HarvestArgs) -> Result<()> {
        use crate::application::harvest_use_case::HarvestUseCase;

        tracing::info!("Starting NHTSA harvest into: {}", args.out_dir);

        let use_case = HarvestUseCase::new(args.into());
        let report   = use_case.execute()?;

        println!(
            "Harvest complete: {} records from {} vehicles ({} failed queries).",
            report.records, report.vehicles, report.failed_queries
        );
        Ok(())
    }

    /// Handles the `build-dataset` subcommand.
    fn run_build_dataset(args: DatasetArgs) -> Result<()> {
        use crate::application::dataset_use_case::DatasetUseCase;

        let use_case = DatasetUseCase::new(args.into());
        use_case.execute()?;

        println!("Dataset built. train/eval/test CSVs written.");
        Ok(())
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training from datasets in: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint and metric reports saved.");
        Ok(())
    }

    /// Handles the `classify` subcommand.
    /// Loads the model from checkpoint and prints the predicted fault class.
    fn run_classify(args: ClassifyArgs) -> Result<()> {
        use crate::application::classify_use_case::ClassifyUseCase;

        let use_case   = ClassifyUseCase::new(&args.checkpoint_dir)?;
        let prediction = use_case.classify(&args.complaint)?;

        println!("\nLabel: {}  (score: {:.4})", prediction.label, prediction.score);
        Ok(())
    }
}
