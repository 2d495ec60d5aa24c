use clap::{Parser, ValueEnum};

use crate::scenario::RunMode;

/// Top-level CLI parser for the `rowscan` binary.
#[derive(Debug, Parser)]
#[command(
    name = "rowscan",
    version,
    about = "Row-Level Security authorization probe runner"
)]
pub struct Cli {
    /// Verify the fixed policies (exit non-zero on any vulnerable verdict)
    /// instead of discovering vulnerabilities.
    #[arg(long)]
    pub verify_fix: bool,

    /// Output format: text, json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Which policy table this run feeds the classifier.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        if self.verify_fix {
            RunMode::VerifyFix
        } else {
            RunMode::Discovery
        }
    }
}

/// Report output mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
