// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout is for command output)
// 2. Parse the command line
// 3. Load config (writing defaults on first run) and dispatch

use anyhow::Context;
use tracing::{error, info};

use courtside_app::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("courtside starting up");

    let matches = cli::get_matches();
    let result = cli::commands::run_command(&matches).await;

    match &result {
        Ok(()) => info!("courtside finished"),
        Err(e) => error!("courtside failed: {e:#}"),
    }
    result
}

/// Initialize tracing to log to `logs/courtside.log` under the working
/// directory. `RUST_LOG` overrides the default filter.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("courtside=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
