use std::path::PathBuf;

use clap::Parser;

use napoleon_bench::config::{BenchmarkConfig, ResolvedOutputs};
use napoleon_bench::logging::init_telemetry;
use napoleon_bench::tournament::TournamentRunner;

/// Tournament benchmarking harness for Napoleon AIs.
#[derive(Debug, Parser)]
#[command(
    name = "napoleon-bench",
    author,
    version,
    about = "Deterministic Napoleon tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to deal.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seat permutations per deal.
    #[arg(long, value_name = "COUNT")]
    permutations: Option<usize>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(permutations) = cli.permutations {
        config.games.permutations = permutations;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let permutations = config.games.permutations;

    println!(
        "Loaded configuration '{run_id}' with {} agents ({games} games, {permutations} permutations)",
        config.agents.len()
    );

    let telemetry = init_telemetry(&config.logging, &outputs, &run_id)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} games × {} permutations → {} rows at {}",
        summary.games_played,
        summary.permutations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if summary.abandoned > 0 {
        println!(
            "Abandoned {} games after exhausting the redeal cap",
            summary.abandoned
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry) = telemetry.as_ref() {
        println!("Telemetry log: {}", telemetry.path.display());
    }

    Ok(())
}
