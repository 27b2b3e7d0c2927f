//! wstate-replay - Replay recorded actions through a wallet state store

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use libwalletstate::{logging, Action, AppState, Config, WalletStateError, WalletStateService};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "wstate-replay")]
#[command(version, about = "Replay JSON-lines actions through a wallet state store")]
#[command(long_about = r#"Replay JSON-lines actions through a wallet state store and print the
resulting snapshot.

Each input line is one action: {"type":"<concern>/<event>","payload":...}.
Actions with tags the store does not know are counted and skipped.

EXAMPLES:
    # Replay a recorded session and print the final state
    wstate-replay session.jsonl

    # Watch the keyboard slot change action by action
    wstate-replay session.jsonl --each --slot keyboard

    # Pipe actions in, starting from the persisted state
    cat actions.jsonl | wstate-replay --hydrate --config ~/.config/walletstate/config.toml

EXIT CODES:
    0 - Success
    1 - Configuration, storage or I/O error
    2 - A transition panicked
    3 - Malformed input line or unknown slot
"#)]
struct Cli {
    /// JSON-lines file of actions (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Print a snapshot after every action instead of only the last one
    #[arg(long)]
    each: bool,

    /// Only print this slot of the snapshot (e.g. settings, keyboard)
    #[arg(long, value_name = "SLOT")]
    slot: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    #[arg(value_parser = ["json", "pretty"])]
    format: String,

    /// Load persisted settings, caches and sessions before replaying
    #[arg(long)]
    hydrate: bool,

    /// Configuration file (defaults to WALLETSTATE_CONFIG or the XDG location)
    #[arg(short, long, value_name = "PATH", env = "WALLETSTATE_CONFIG")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<WalletStateError>()
            .map(WalletStateError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(slot) = &cli.slot {
        if !AppState::SLOTS.contains(&slot.as_str()) {
            return Err(WalletStateError::InvalidInput(format!(
                "Unknown slot '{}'. Valid slots: {}",
                slot,
                AppState::SLOTS.join(", ")
            ))
            .into());
        }
    }

    let input = read_input(cli.input.as_ref())?;
    let actions = parse_actions(&input)?;

    let config = load_config(&cli)?;
    let service = WalletStateService::from_config(config).await?;
    if cli.hydrate {
        service.hydrate(chrono::Utc::now()).await?;
    }

    let mut unrecognized: BTreeMap<String, usize> = BTreeMap::new();
    for action in actions {
        if !action.is_recognized() {
            *unrecognized.entry(action.tag().to_string()).or_default() += 1;
        }
        debug!("Dispatching {}", action.tag());
        service.dispatch(action)?;

        if cli.each {
            print_snapshot(&service.state(), &cli)?;
        }
    }

    if !cli.each {
        print_snapshot(&service.state(), &cli)?;
    }

    if !unrecognized.is_empty() {
        let total: usize = unrecognized.values().sum();
        warn!("{} unrecognized action(s) left the state unchanged", total);
        for (tag, count) in &unrecognized {
            eprintln!("Unrecognized action: {} ({})", tag, count);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            let path = PathBuf::from(shellexpand::tilde(path).to_string());
            Ok(Config::load_from_path(&path)?)
        }
        None if cli.hydrate => Ok(Config::load_or_default()?),
        None => Ok(Config::ephemeral()),
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse one action per non-blank line
fn parse_actions(input: &str) -> Result<Vec<Action>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<Action>(line).map_err(|e| {
                anyhow::Error::from(WalletStateError::InvalidInput(format!(
                    "line {}: {}",
                    index + 1,
                    e
                )))
            })
        })
        .collect()
}

fn print_snapshot(state: &Arc<AppState>, cli: &Cli) -> Result<()> {
    let mut value = serde_json::to_value(&**state).context("Failed to encode snapshot")?;
    if let Some(slot) = &cli.slot {
        value = value.get(slot.as_str()).cloned().unwrap_or_default();
    }

    let rendered = if cli.format == "pretty" {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", rendered);
    Ok(())
}
