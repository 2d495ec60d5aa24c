//! Sequential probe execution.
//!
//! Probes run strictly in order: later probes read records created by
//! earlier ones, and every probe depends on the session produced by the
//! authentication step. A failing probe is contained (INCONCLUSIVE) so it
//! never hides the verdicts of the rest; only configuration and
//! authentication failures abort a run. Cleanup deletes always run after the
//! probe sequence, even when probes failed, so tagged test records never
//! leak into the shared backing store.

use anyhow::Context;

use rowscan_client::{AuthClient, AuthError, QueryApi, QueryReply, Record, ScopedClient};
use rowscan_config::RowscanConfig;
use rowscan_core::tag::{tagged_record_name, unique_tag};
use rowscan_core::{Observation, Probe, ProbeOp, ProbeResult};

use crate::scenario::{self, RunMode};

/// Everything a finished run hands to the reporter.
#[derive(Debug)]
pub struct RunOutcome {
    pub mode: RunMode,
    pub results: Vec<ProbeResult>,
}

/// Authenticate the identities a mode needs and drive its probe table.
///
/// # Errors
///
/// Fails on incomplete configuration or refused authentication; probe-level
/// failures are contained in the results instead.
pub async fn run(config: &RowscanConfig, mode: RunMode) -> anyhow::Result<RunOutcome> {
    config.require_supabase()?;
    config.require_main_identity()?;
    if mode == RunMode::VerifyFix {
        config.require_attacker_identity()?;
    }

    let url = &config.supabase.url;
    let key = &config.supabase.anon_key;
    let timeout = config.probe.timeout();

    let auth = AuthClient::new(url, key, timeout)?;

    let main_identity = config.identities.main.to_identity("main");
    let main_session = auth
        .authenticate(&main_identity)
        .await
        .context("could not authenticate the main identity")?;
    let main_client = ScopedClient::new(url, key, main_session, timeout)?;

    let run_tag = unique_tag("rowscan")?;
    tracing::info!(%run_tag, %mode, "starting probe run");

    let results = match mode {
        RunMode::Discovery => run_discovery(&main_client, &run_tag).await,
        RunMode::VerifyFix => {
            let attacker_identity = config.identities.attacker.to_identity("attacker");
            let attacker_session = auth.authenticate(&attacker_identity).await.map_err(|e| {
                let remediation = attacker_auth_remediation(&e);
                anyhow::Error::from(e).context(remediation)
            })?;
            let attacker_client = ScopedClient::new(url, key, attacker_session, timeout)?;
            run_verify_fix(&main_client, &attacker_client, &run_tag).await
        }
    };

    Ok(RunOutcome { mode, results })
}

/// Remediation guidance for a failed attacker login. A refusal means the
/// second account does not exist (or its credentials are stale); anything
/// else is a transport problem, not a provisioning one.
fn attacker_auth_remediation(error: &AuthError) -> &'static str {
    if error.is_rejected() {
        "fix verification needs a second, pre-provisioned account; create it in \
         the project's auth dashboard and set ROWSCAN_IDENTITIES__ATTACKER__EMAIL \
         and ROWSCAN_IDENTITIES__ATTACKER__PASSWORD"
    } else {
        "could not reach the auth endpoint for the attacker identity"
    }
}

/// Execute one probe and classify what came back. Transport and provider
/// errors become observations; this function never fails.
pub async fn execute<C: QueryApi>(client: &C, probe: &Probe) -> ProbeResult {
    let reply = match &probe.op {
        ProbeOp::ReadAll => client.select_all(&probe.table).await,
        ProbeOp::ReadById { column, value } => {
            client.select_eq(&probe.table, column, value).await
        }
        ProbeOp::Insert { fields } => client.insert(&probe.table, fields).await,
        ProbeOp::Delete { column, value } => {
            client.delete_eq(&probe.table, column, value).await
        }
    };

    let observation = match reply {
        Err(error) => {
            tracing::debug!(probe = %probe.label, %error, "probe call failed");
            Observation::Failed {
                message: error.to_string(),
            }
        }
        Ok(QueryReply::Rejected(rejection)) => Observation::Rejected {
            reason: rejection.to_string(),
        },
        Ok(QueryReply::Rows(rows)) => observe_rows(client, probe, &rows),
    };

    ProbeResult::classify(probe.clone(), observation)
}

/// Reduce returned rows to the typed observation the classifier consumes.
fn observe_rows<C: QueryApi>(client: &C, probe: &Probe, rows: &[Record]) -> Observation {
    match &probe.op {
        ProbeOp::Insert { .. } => {
            let created = rows.first();
            Observation::Inserted {
                returned: created.is_some(),
                id: created.and_then(Record::id),
                owned_by_self: created
                    .and_then(|row| row.owned_by(&probe.owner_column, client.user_id())),
            }
        }
        _ => {
            let foreign = rows
                .iter()
                .filter(|row| {
                    row.owned_by(&probe.owner_column, client.user_id()) == Some(false)
                })
                .count();
            Observation::Rows {
                total: rows.len(),
                foreign,
            }
        }
    }
}

/// Discovery table: sweep the shared tables as the main user, then probe the
/// write path with a tagged record.
async fn run_discovery<C: QueryApi>(client: &C, run_tag: &str) -> Vec<ProbeResult> {
    let mut results = Vec::new();

    for probe in scenario::discovery_read_probes() {
        results.push(execute(client, &probe).await);
    }

    let record_name = tagged_record_name(run_tag, "main");
    results.push(execute(client, &scenario::discovery_insert_probe(&record_name)).await);

    results.push(run_cleanup(client, "main", &record_name).await);
    results
}

/// Fix-verification table: main creates, attacker probes, both clean up.
async fn run_verify_fix<M: QueryApi, A: QueryApi>(
    main: &M,
    attacker: &A,
    run_tag: &str,
) -> Vec<ProbeResult> {
    let mut results = Vec::new();

    let main_name = tagged_record_name(run_tag, "main");
    let attacker_name = tagged_record_name(run_tag, "attacker");
    let spoof_name = tagged_record_name(run_tag, "attacker-spoof");

    let insert_result = execute(main, &scenario::main_insert_probe(&main_name)).await;
    let created_id = match &insert_result.observation {
        Observation::Inserted { id, .. } => id.clone(),
        _ => None,
    };
    results.push(insert_result);

    // The read-by-id probe depends on the record created above; without an
    // id it is reported inconclusive, never silently skipped.
    if let Some(id) = created_id {
        results.push(execute(attacker, &scenario::attacker_read_by_id_probe(&id)).await);
    } else {
        tracing::warn!("main-user insert returned no record id; dependent read-by-id probe is inconclusive");
        results.push(ProbeResult::classify(
            scenario::attacker_read_by_id_probe("(unknown)"),
            Observation::Failed {
                message: "main-user insert returned no record id".into(),
            },
        ));
    }

    results.push(execute(attacker, &scenario::attacker_read_all_probe()).await);
    results.push(execute(attacker, &scenario::attacker_insert_probe(&attacker_name)).await);
    results.push(
        execute(
            attacker,
            &scenario::attacker_spoof_insert_probe(&spoof_name, main.user_id()),
        )
        .await,
    );

    // Cleanup runs unconditionally; each identity deletes its own records.
    // The spoofed record may have landed under either ownership, so both
    // identities try it.
    results.push(run_cleanup(main, "main", &main_name).await);
    results.push(run_cleanup(attacker, "attacker", &attacker_name).await);
    results.push(run_cleanup(attacker, "attacker", &spoof_name).await);
    results.push(run_cleanup(main, "main", &spoof_name).await);

    results
}

/// Best-effort cleanup delete. Failures are warnings requiring manual
/// remediation, never run failures.
async fn run_cleanup<C: QueryApi>(client: &C, identity_tag: &str, record_name: &str) -> ProbeResult {
    let result = execute(client, &scenario::cleanup_probe(identity_tag, record_name)).await;

    match &result.observation {
        Observation::Failed { message } | Observation::Rejected { reason: message } => {
            tracing::warn!(
                identity = identity_tag,
                record = record_name,
                %message,
                "cleanup delete failed; remove the record manually"
            );
        }
        _ => {}
    }

    result
}
