use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

mod cli;
mod report;
mod runner;
mod scenario;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("rowscan error: {error:#}");
            ExitCode::from(1)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = rowscan_config::RowscanConfig::load_with_dotenv()
        .context("failed to load configuration")?;

    let outcome = runner::run(&config, cli.mode()).await?;
    let report = report::RunReport::new(outcome);
    report.print(cli.format)?;

    Ok(ExitCode::from(report.exit_code()))
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ROWSCAN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
