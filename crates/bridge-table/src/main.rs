use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use bridge_core::AppInfo;
use bridge_table::config::TableConfig;
use bridge_table::logging::init_logging;
use bridge_table::runner::TableRunner;
use bridge_table::script::load_script;

/// Plays a scripted Bridge-125 table and writes the final snapshot.
#[derive(Debug, Parser)]
#[command(
    name = "bridge-table",
    author,
    version,
    about = "Scripted Bridge-125 table runner"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "table/table.yaml")]
    config: PathBuf,

    /// Move script to replay; without one the table is only dealt.
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Override the shuffle seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Exit after validating the configuration and script.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = TableConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.table.seed = Some(seed);
    }

    config.validate()?;

    let script = match cli.script.as_ref() {
        Some(path) => {
            load_script(path).with_context(|| format!("loading script {}", path.display()))?
        }
        None => Vec::new(),
    };

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let players = config.table.players.len();

    println!(
        "{} {}: loaded table '{run_id}' with {players} players and {} scripted command{}",
        AppInfo::name(),
        AppInfo::version(),
        script.len(),
        if script.len() == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: table not played.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = TableRunner::new(config, outputs);
    let summary = runner.run(&script)?;

    println!(
        "Table '{run_id}' finished in state '{}': {} accepted, {} rejected, {} round{} finished",
        summary.final_state,
        summary.accepted,
        summary.rejected,
        summary.rounds_finished,
        if summary.rounds_finished == 1 { "" } else { "s" }
    );
    println!("Snapshot: {}", summary.snapshot_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Event log: {}", guard.events_path.display());
    }

    Ok(())
}
