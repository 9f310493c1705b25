use funds::{FundsLedger, ProgressState, ProgressView, Standing, GOAL,
    backend::{JsonStore, StoreConfig, DocumentStore},
    progress::{format_amount, is_valid_goal}};

use std::{fs, path::{Path, PathBuf}, sync::Arc};
use anyhow::Context;
use colored::Colorize;
use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_STORE: &str = "resources/funds.json";

#[derive(Parser, Debug)]
#[clap(version, about = "Show and add to the raised funds", propagate_version = true)]
struct Cli {
    /// Server configuration file to take the store and goal from
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Action to perform
    #[clap(subcommand)]
    action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Show the raised amount and how it compares to the goal
    Show,
    /// Add a contribution to the raised amount
    Add {
        /// Amount contributed
        #[clap(value_parser, allow_hyphen_values = true)]
        amount: String
    }
}

/// The parts of the server configuration the CLI cares about.
#[derive(Deserialize)]
struct CliConfig {
    #[serde(default = "default_goal")]
    goal: f64,
    store: StoreConfig
}

fn default_goal() -> f64 {
    GOAL
}

fn read_config(path: &Path) -> anyhow::Result<CliConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&content)
}

fn parse_config(content: &str) -> anyhow::Result<CliConfig> {
    let config: CliConfig = toml::from_str(content)
        .with_context(|| "failed to parse config file")?;
    anyhow::ensure!(is_valid_goal(config.goal),
        "goal must be a positive number, got {}", config.goal);
    Ok(config)
}

fn print_progress(view: &ProgressView) {
    println!("{}: {} Kwacha", "Raised".bold(), format_amount(view.amount));
    println!("{}: {} Kwacha", "Goal".bold(), format_amount(view.goal));
    let standing = view.standing.to_string();
    let line = match view.standing {
        Standing::Remaining(_) => standing.normal(),
        Standing::GoalReached => standing.green().bold(),
        Standing::Surplus(_) => standing.bright_blue().bold()
    };
    println!("{}", line);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let (store, goal): (Arc<dyn DocumentStore>, f64) = match &args.config {
        Some(path) => {
            let config = read_config(path)?;
            (config.store.open(), config.goal)
        },
        None => (Arc::new(JsonStore::new(DEFAULT_STORE)), GOAL)
    };

    let ledger = FundsLedger::new(store, ProgressState::new(goal));
    ledger.load().await.context("could not load the raised amount")?;

    match args.action {
        Subcommands::Show => {},
        Subcommands::Add { amount } => {
            ledger.submit_contribution(&amount)
                .await
                .with_context(|| format!("could not add {:?}", amount))?;
        }
    }

    print_progress(&ledger.state().view());
    Ok(())
}
