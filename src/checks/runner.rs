// SPDX-License-Identifier: MIT
//! Check execution engine.
//!
//! Runs a collection of named checks — sequentially with [`run_checks`] or
//! concurrently with [`run_checks_async`] — and aggregates their messages
//! into a single [`CheckResults`]: a status label per check, a detail entry
//! for every non-passing check, and one overall worst-case level.
//!
//! Both entry points share the same aggregation. The engine never catches
//! panics from check functions; checks are expected to convert their own
//! failure modes (an unreachable database, a full disk) into messages, and a
//! check that panics aborts the whole batch.

use std::collections::BTreeMap;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::checks::messages::{level_to_text, CheckMessage, ERROR, INFO, WARNING};
use crate::checks::registry::{Check, CheckImpl};

/// Detail payload for one non-passing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDetail {
    /// Status label for the check's worst message level.
    pub status: String,
    /// The check's worst message level.
    pub level: u8,
    /// Message texts keyed by message id. Messages without an id are keyed
    /// by the empty string; when several messages share an id, the last one
    /// wins.
    pub messages: BTreeMap<String, String>,
}

/// Aggregated outcome of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResults {
    /// Status label per check, present for every check that ran.
    pub statuses: BTreeMap<String, String>,
    /// Detail entries, present only for checks whose level is above zero.
    pub details: BTreeMap<String, CheckDetail>,
    /// Worst level across all checks after silencing; `0` when everything
    /// passed.
    pub level: u8,
}

impl CheckResults {
    /// Status label for the overall level.
    pub fn status(&self) -> &'static str {
        level_to_text(self.level)
    }

    /// Returns `true` if the overall level is below `threshold`.
    ///
    /// The threshold is caller policy: load-balancer adapters conventionally
    /// pass [`ERROR`], stricter ones pass [`WARNING`](crate::checks::WARNING).
    pub fn passes(&self, threshold: u8) -> bool {
        self.level < threshold
    }
}

/// Run checks sequentially on the calling thread and aggregate the results.
///
/// `checks` supplies `(name, check)` pairs; each check is invoked in the
/// order given, so a check that blocks delays everything after it. Names
/// must be unique within one invocation — duplicates overwrite each other in
/// the output maps.
///
/// `silenced_check_ids` lists message ids to drop from the aggregate; pass
/// an empty slice to silence nothing.
///
/// ```rust
/// use dockerflow::checks::{run_checks, CheckMessage};
///
/// let results = run_checks(
///     [("always_ok", || Vec::<CheckMessage>::new())],
///     &[],
/// );
/// assert_eq!(results.level, 0);
/// ```
pub fn run_checks<N, F, I>(checks: I, silenced_check_ids: &[String]) -> CheckResults
where
    N: Into<String>,
    F: Fn() -> Vec<CheckMessage>,
    I: IntoIterator<Item = (N, F)>,
{
    let results: Vec<(String, Vec<CheckMessage>)> = checks
        .into_iter()
        .map(|(name, check)| (name.into(), check()))
        .collect();
    build_results(results, silenced_check_ids)
}

/// Run checks concurrently and aggregate the results.
///
/// All checks are launched together and joined before aggregation.
/// Asynchronous checks are polled as futures; synchronous checks are moved
/// to [`tokio::task::spawn_blocking`] so a blocking check cannot stall the
/// concurrently running async ones. Results are keyed by check name, so
/// completion order never affects the payload.
///
/// A check that panics aborts the whole batch: the panic resumes on the
/// caller's task. There is no per-check timeout — a check that never returns
/// hangs the aggregate, and callers needing deadlines must wrap the check
/// function themselves.
pub async fn run_checks_async<N, I>(checks: I, silenced_check_ids: &[String]) -> CheckResults
where
    N: Into<String>,
    I: IntoIterator<Item = (N, Check)>,
{
    let tasks: Vec<_> = checks
        .into_iter()
        .map(|(name, check)| {
            let name = name.into();
            async move {
                let messages = match &*check.inner {
                    CheckImpl::Async(f) => f().await,
                    CheckImpl::Sync(f) => {
                        let f = f.clone();
                        match tokio::task::spawn_blocking(move || f()).await {
                            Ok(messages) => messages,
                            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                            Err(e) => {
                                // Cancellation only happens at runtime shutdown.
                                error!(check = %name, error = %e, "check task cancelled");
                                Vec::new()
                            }
                        }
                    }
                };
                (name, messages)
            }
        })
        .collect();

    let results = join_all(tasks).await;
    build_results(results, silenced_check_ids)
}

/// Shared aggregation for both execution modes.
fn build_results(
    checks_results: Vec<(String, Vec<CheckMessage>)>,
    silenced_check_ids: &[String],
) -> CheckResults {
    let mut statuses = BTreeMap::new();
    let mut details = BTreeMap::new();
    let mut max_level = 0u8;

    for (name, messages) in checks_results {
        // Every message is emitted for observability before silencing; the
        // silenced list only shapes the returned payload.
        for message in &messages {
            emit_message(message);
        }

        let kept: Vec<&CheckMessage> = messages
            .iter()
            .filter(|m| !is_silenced(m, silenced_check_ids))
            .collect();
        let level = kept.iter().map(|m| m.level()).max().unwrap_or(0);

        statuses.insert(name.clone(), level_to_text(level).to_string());
        max_level = max_level.max(level);

        if level > 0 {
            let mut message_map = BTreeMap::new();
            for message in &kept {
                // Later messages with a duplicate id overwrite earlier ones.
                message_map.insert(
                    message.id().unwrap_or_default().to_string(),
                    message.text().to_string(),
                );
            }
            details.insert(
                name,
                CheckDetail {
                    status: level_to_text(level).to_string(),
                    level,
                    messages: message_map,
                },
            );
        }
    }

    CheckResults {
        statuses,
        details,
        level: max_level,
    }
}

fn is_silenced(message: &CheckMessage, silenced_check_ids: &[String]) -> bool {
    message
        .id()
        .is_some_and(|id| silenced_check_ids.iter().any(|s| s == id))
}

fn emit_message(message: &CheckMessage) {
    let id = message.id().unwrap_or_default();
    let level = message.level();
    if level >= ERROR {
        error!(id, level, "{}", message.text());
    } else if level >= WARNING {
        warn!(id, level, "{}", message.text());
    } else if level >= INFO {
        info!(id, level, "{}", message.text());
    } else {
        debug!(id, level, "{}", message.text());
    }
}
