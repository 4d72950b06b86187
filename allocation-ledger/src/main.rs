//! CLI for the allocation ledger
//!
//! Seeds a ledger from configuration and runs operations against it.
//!
//! # Usage
//!
//! ```bash
//! # Validate a configuration file
//! allocation-ledger --config ledger.toml check-config
//!
//! # Show seeded quotas
//! allocation-ledger --config ledger.toml show --json
//!
//! # Run a script of define/check/commit/release/get steps
//! allocation-ledger --config ledger.toml replay ops.toml --strict
//! ```

use allocation_ledger::config::Config;
use allocation_ledger::replay::{self, ReplayOutcome, ReplayScript};
use allocation_ledger::{logging, QuotaLedger};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "allocation-ledger")]
#[command(about = "Period/region quota ledger", long_about = None)]
struct Cli {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "ledger.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    CheckConfig,
    /// Print every seeded quota
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a replay script against the seeded ledger
    Replay {
        /// Script file
        script: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Exit with an error if any step failed
        #[arg(long)]
        strict: bool,
    },
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))
    } else {
        Ok(Config::development())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.logging)?;

    info!("Starting allocation-ledger v{}", env!("CARGO_PKG_VERSION"));
    if !cli.config.exists() {
        info!("No config file found at {}, using defaults", cli.config.display());
    }

    match cli.command {
        Commands::CheckConfig => {
            config.validate()?;
            println!("✓ Configuration is valid");
            println!("  Owner: {}", config.ledger.owner);
            println!("  Seed quotas: {}", config.quotas.len());
        }
        Commands::Show { json } => {
            let ledger = QuotaLedger::from_config(&config).await?;
            print_quotas(&ledger, json).await?;
        }
        Commands::Replay {
            script,
            json,
            strict,
        } => {
            let ledger = QuotaLedger::from_config(&config).await?;
            let script = ReplayScript::from_file(&script)
                .with_context(|| format!("loading replay script {}", script.display()))?;

            let outcomes = script.run(&ledger).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                for outcome in &outcomes {
                    print_outcome(outcome);
                }
                println!();
            }
            print_quotas(&ledger, json).await?;

            if strict && replay::has_failures(&outcomes) {
                anyhow::bail!("replay finished with failed steps");
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &ReplayOutcome) {
    let mark = if outcome.ok { "✓" } else { "✗" };
    let mut line = format!("{} [{}] {} {}", mark, outcome.index, outcome.op, outcome.key);
    if let Some(available) = outcome.available {
        line.push_str(&format!(" -> available: {}", available));
    }
    if let Some(record) = &outcome.record {
        line.push_str(&format!(
            " -> {}/{}",
            record.committed_amount, record.total_capacity
        ));
    }
    if let Some(error) = &outcome.error {
        line.push_str(&format!(" -> {}", error));
    }
    println!("{}", line);
}

async fn print_quotas(ledger: &QuotaLedger, json: bool) -> anyhow::Result<()> {
    let quotas = ledger.list_quotas().await;

    if json {
        let rows: Vec<_> = quotas
            .iter()
            .map(|(key, record)| {
                serde_json::json!({
                    "period": key.period,
                    "region": key.region,
                    "total_capacity": record.total_capacity,
                    "committed_amount": record.committed_amount,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if quotas.is_empty() {
        println!("No quotas defined.");
        return Ok(());
    }

    println!(
        "{:<8} {:<30} {:>12} {:>12} {:>8}",
        "Period", "Region", "Committed", "Capacity", "Used"
    );
    println!("{:-<74}", "");
    for (key, record) in &quotas {
        println!(
            "{:<8} {:<30} {:>12} {:>12} {:>7.1}%",
            key.period,
            key.region,
            record.committed_amount,
            record.total_capacity,
            record.usage_percent()
        );
    }

    let stats = ledger.stats().await;
    println!(
        "\nTotal: {} quota(s), {}/{} committed, {} exhausted",
        stats.quota_count, stats.total_committed, stats.total_capacity, stats.exhausted
    );
    Ok(())
}
