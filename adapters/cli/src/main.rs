#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Motion Forge generation and analysis.

mod cli;

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use motion_forge_core::Script;
use motion_forge_system_analysis::{analyze, verify_cycles, AnalysisTuning, VerifierTuning};
use motion_forge_system_generation::{Generation, GenerationTuning};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

/// Entry point for the Motion Forge command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Generate {
            output,
            seed,
            tuning,
            duration_ms,
            full_cycles,
        } => run_generate(&output, seed, tuning, duration_ms, full_cycles),
        Command::Analyze { input } => {
            let script = load_script(&input)?;
            let timeline = script.timeline().context("artifact violates ordering")?;
            let report = analyze(timeline.actions(), &AnalysisTuning::default())?;
            print_json(&report)
        }
        Command::Verify { input } => {
            let script = load_script(&input)?;
            let timeline = script.timeline().context("artifact violates ordering")?;
            let report = verify_cycles(timeline.actions(), &VerifierTuning::default())?;
            info!(cycles = report.count, "verification finished");
            print_json(&report)
        }
    }
}

fn run_generate(
    output: &Path,
    seed: Option<u64>,
    tuning_path: Option<PathBuf>,
    duration_ms: Option<u64>,
    full_cycles: Option<usize>,
) -> Result<()> {
    let mut tuning = match tuning_path {
        Some(path) => load_tuning(&path)?,
        None => GenerationTuning::default(),
    };
    if let Some(duration_ms) = duration_ms {
        tuning.total_duration_ms = duration_ms;
    }
    if let Some(count) = full_cycles {
        tuning.full_range.count = count;
    }

    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "generating script");

    let generation = Generation::new(tuning).context("rejected generation tuning")?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let script = generation.generate_script(&mut rng)?;

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    script
        .write_pretty(&mut writer)
        .and_then(|()| writer.flush().map_err(Into::into))
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        path = %output.display(),
        actions = script.actions.len(),
        duration_ms = script.metadata.duration,
        average_speed = script.metadata.average_speed,
        "script written"
    );
    Ok(())
}

fn load_tuning(path: &Path) -> Result<GenerationTuning> {
    let file =
        File::open(path).with_context(|| format!("failed to open tuning {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse tuning {}", path.display()))
}

fn load_script(path: &Path) -> Result<Script> {
    let file =
        File::open(path).with_context(|| format!("failed to open artifact {}", path.display()))?;
    Script::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read artifact {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to encode report")?;
    writeln!(stdout)?;
    Ok(())
}
