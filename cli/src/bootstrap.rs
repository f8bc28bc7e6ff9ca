//! The one-shot startup pass: make sure the desired rule exists remotely.

use streamrule_core::error::{ApiProblem, ReconcileError};
use streamrule_core::reconcile::{self, Decision};
use streamrule_core::rules::{NewRule, RulesResponse, RulesSummary};

use crate::client::RulesClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Listing already contained the rule; nothing was sent
    AlreadyPresent,
    Created { summary: Option<RulesSummary> },
    /// Dry run: the remote validated the addition without storing it
    Validated { summary: Option<RulesSummary> },
    /// The create call failed. Not retried.
    CreateFailed { exit_code: i32 },
}

impl EnsureOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            EnsureOutcome::CreateFailed { exit_code } => *exit_code,
            _ => 0,
        }
    }
}

/// Fetch the current rules, decide, and create the desired rule if needed.
///
/// A failed listing is treated like an empty one, so creation is still
/// attempted. Only an invalid desired rule is returned as an error, and it is
/// rejected before any request goes out.
pub async fn ensure_rule(
    client: &RulesClient,
    desired: &NewRule,
    dry_run: bool,
) -> Result<EnsureOutcome, ReconcileError> {
    reconcile::validate_desired(&desired.value)?;

    tracing::info!(url = %client.rules_url(), "Fetching current stream rules");

    let listing = match client.list_rules().await {
        Ok(listing) => {
            log_problems(&listing.errors);
            Some(listing)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch stream rules, treating rule as missing");
            None
        }
    };

    let current = listing.as_ref().and_then(RulesResponse::rules);
    tracing::info!(
        count = current.map_or(0, |rules| rules.len()),
        "Retrieved stream rules"
    );

    let mut payload = match reconcile::evaluate(current, &desired.value)? {
        Decision::NoActionNeeded => {
            tracing::info!(rule = %desired.value, "Rule already present");
            return Ok(EnsureOutcome::AlreadyPresent);
        }
        Decision::CreateRequired(payload) => payload,
    };
    for addition in &mut payload.additions {
        addition.tag = desired.tag.clone();
    }

    tracing::info!(rule = %desired.value, dry_run, "Rule missing, adding rule");

    match client.create_rules(&payload, dry_run).await {
        Ok(response) => {
            log_problems(&response.errors);
            let summary = response.summary().copied();
            if let Some(s) = &summary {
                tracing::info!(
                    created = s.created,
                    not_created = s.not_created,
                    valid = s.valid,
                    invalid = s.invalid,
                    "Rules API accepted request"
                );
            }
            if rejected_without_effect(&response, dry_run) {
                tracing::error!(
                    rule = %desired.value,
                    dry_run,
                    "Rules API rejected stream rule"
                );
                return Ok(EnsureOutcome::CreateFailed { exit_code: 1 });
            }
            if dry_run {
                Ok(EnsureOutcome::Validated { summary })
            } else {
                Ok(EnsureOutcome::Created { summary })
            }
        }
        Err(e) => {
            let detail = e.problem().map(|p| p.summary().to_string());
            tracing::error!(
                error = %e,
                detail = detail.as_deref().unwrap_or(""),
                rule = %desired.value,
                "Failed to create stream rule"
            );
            Ok(EnsureOutcome::CreateFailed {
                exit_code: e.exit_code(),
            })
        }
    }
}

/// A 2xx body can still carry a refusal. Duplicates are not refusals; any
/// other problem is, unless the summary shows the addition went through.
fn rejected_without_effect(response: &RulesResponse, dry_run: bool) -> bool {
    let refused = response.errors.iter().any(|p| !p.is_duplicate_rule());
    let accepted = response
        .summary()
        .is_some_and(|s| if dry_run { s.valid > 0 } else { s.created > 0 });
    refused && !accepted
}

fn log_problems(problems: &[ApiProblem]) {
    for problem in problems {
        let value = problem.value.as_deref().unwrap_or("");
        if problem.is_duplicate_rule() {
            tracing::info!(
                rule = value,
                id = problem.id.as_deref().unwrap_or(""),
                "Rule already exists remotely"
            );
        } else {
            tracing::warn!(
                rule = value,
                "Rules API reported a problem: {}",
                problem.summary()
            );
        }
    }
}
