//! Run reporting.
//!
//! All console output lives here so the executor and classifier stay pure.
//! Text output is one verdict line per probe plus a summary; JSON output is
//! the whole report serialized for machine consumption. The exit status is
//! part of the report: discovery always exits zero (vulnerabilities are the
//! expected finding), fix verification exits non-zero on any vulnerable
//! verdict.

use serde::Serialize;

use rowscan_core::{AccessPolicy, Observation, ProbeResult, Verdict};

use crate::cli::OutputFormat;
use crate::runner::RunOutcome;
use crate::scenario::RunMode;

/// Verdict tally over the classified probes. Cleanup deletes are excluded;
/// they carry no policy verdict worth counting.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub secure: usize,
    pub vulnerable: usize,
    pub inconclusive: usize,
}

/// The finished report handed to the console and to `--format json`.
#[derive(Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub counts: VerdictCounts,
    pub results: Vec<ProbeResult>,
}

impl RunReport {
    #[must_use]
    pub fn new(outcome: RunOutcome) -> Self {
        let mut counts = VerdictCounts::default();
        for result in &outcome.results {
            if result.probe.policy == AccessPolicy::Cleanup {
                continue;
            }
            match result.verdict {
                Verdict::Secure => counts.secure += 1,
                Verdict::ConfirmedVulnerable => counts.vulnerable += 1,
                Verdict::Inconclusive => counts.inconclusive += 1,
            }
        }
        Self {
            mode: outcome.mode,
            counts,
            results: outcome.results,
        }
    }

    /// Render the report as console text.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = format!("rowscan: {} run\n", self.mode);

        for result in &self.results {
            let line = if result.probe.policy == AccessPolicy::Cleanup {
                format!(
                    "[{:<20}] {}: {}",
                    "cleanup",
                    result.probe.label,
                    describe(&result.observation)
                )
            } else {
                format!(
                    "[{:<20}] {}: {}",
                    result.verdict.to_string(),
                    result.probe.label,
                    describe(&result.observation)
                )
            };
            out.push_str(&line);
            out.push('\n');
        }

        out.push_str(&format!(
            "summary: {} secure, {} vulnerable, {} inconclusive\n",
            self.counts.secure, self.counts.vulnerable, self.counts.inconclusive
        ));
        out
    }

    /// Print in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Text => print!("{}", self.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
        }
        Ok(())
    }

    /// Exit status policy: only fix verification fails the process, and only
    /// on a confirmed-vulnerable verdict.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(self.mode == RunMode::VerifyFix && self.counts.vulnerable > 0)
    }
}

/// One-line description of an observation for the text report.
fn describe(observation: &Observation) -> String {
    match observation {
        Observation::Rows { total, foreign } => {
            format!("{total} rows ({foreign} foreign)")
        }
        Observation::Inserted {
            returned: true,
            id: Some(id),
            ..
        } => format!("created record {id}"),
        Observation::Inserted { returned: true, .. } => "created record (no id returned)".into(),
        Observation::Inserted {
            returned: false, ..
        } => "insert accepted without representation".into(),
        Observation::Rejected { reason } => format!("rejected: {reason}"),
        Observation::Failed { message } => format!("error: {message}"),
    }
}
