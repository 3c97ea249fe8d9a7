//! Settle CLI - settle command

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tokio::sync::oneshot;

use settle_cli::action::ShellAction;
use settle_cli::watch::{self, WatchOpts};
use settle_watcher::{EventSource, DEFAULT_POLL_INTERVAL, DEFAULT_QUIET_THRESHOLD};

/// Settle - watch a directory tree and run a command once it stops changing
#[derive(Parser)]
#[command(name = "settle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to run after changes settle (default: bash ./run.sh)
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    command: Vec<String>,

    /// Quiet seconds a burst needs before the command runs
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_QUIET_THRESHOLD.as_secs_f64())]
    settle: f64,

    /// Poll cadence in milliseconds
    #[arg(long, value_name = "MILLIS", default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    interval: u64,

    /// Directory to watch (default: current directory)
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    anyhow::ensure!(
        cli.settle.is_finite() && cli.settle > 0.0,
        "--settle must be a positive number of seconds"
    );
    anyhow::ensure!(cli.interval > 0, "--interval must be at least 1 millisecond");

    let root = match cli.root {
        Some(path) => path,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    anyhow::ensure!(root.is_dir(), "watch root {} is not a directory", root.display());

    let opts = WatchOpts {
        quiet_threshold: Duration::from_secs_f64(cli.settle),
        poll_interval: Duration::from_millis(cli.interval),
    };
    let action = ShellAction::new(cli.command);

    println!("Watching {}", root.display().to_string().cyan());
    println!(
        "Rule: {:.1}s of quiet after a change runs `{}`",
        opts.quiet_threshold.as_secs_f64(),
        action.command_line().yellow()
    );
    println!("{}", "Press Ctrl+C to stop".dimmed());

    let (_source, events) = EventSource::subscribe(&root)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    watch::run(events, action, opts, shutdown_rx).await?;

    println!("{}", "Stopped".dimmed());
    Ok(())
}
