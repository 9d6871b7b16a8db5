//! Argument surface of the `motion-forge` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Generate, analyze, and verify motion scripts.
#[derive(Parser, Debug)]
#[command(name = "motion-forge")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub(crate) command: Command,

    /// Raise the default log filter from `info` to `debug`.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Generate a script and write it as JSON.
    Generate {
        /// Destination of the generated artifact.
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for the random stream; a fresh seed is drawn and logged when omitted.
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON file with generation tuning; omitted fields keep their defaults.
        #[arg(short, long)]
        tuning: Option<PathBuf>,

        /// Override the target duration in milliseconds.
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Override the number of scheduled full-range cycles.
        #[arg(long)]
        full_cycles: Option<usize>,
    },

    /// Print shape statistics of an artifact as JSON.
    Analyze {
        /// Artifact to inspect.
        input: PathBuf,
    },

    /// Print the full-range cycles found in an artifact as JSON.
    Verify {
        /// Artifact to inspect.
        input: PathBuf,
    },
}
