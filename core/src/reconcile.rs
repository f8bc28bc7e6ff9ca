//! Decides whether a desired filter rule has to be created remotely.
//!
//! Pure function over a rule snapshot: no I/O, no retained state.

use crate::error::ReconcileError;
use crate::rules::{CreateRuleRequest, FilterRule, NewRule};

/// What the caller has to do to converge remote rules on the desired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A rule with the exact desired value already exists
    NoActionNeeded,
    /// Submit this payload to create the rule
    CreateRequired(CreateRuleRequest),
}

impl Decision {
    pub fn is_create_required(&self) -> bool {
        matches!(self, Decision::CreateRequired(_))
    }

    pub fn payload(&self) -> Option<&CreateRuleRequest> {
        match self {
            Decision::CreateRequired(payload) => Some(payload),
            Decision::NoActionNeeded => None,
        }
    }
}

/// Reject desired values the reconciler cannot act on.
pub fn validate_desired(desired: &str) -> Result<(), ReconcileError> {
    if desired.is_empty() {
        return Err(ReconcileError::InvalidInput(
            "desired rule value must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Compare the current remote rules against the desired rule value.
///
/// `current` is `None` when the listing failed or carried no rules. That case
/// yields `CreateRequired`: on uncertainty, attempt creation. Matching is an
/// exact, case-sensitive comparison on `value`.
pub fn evaluate(
    current: Option<&[FilterRule]>,
    desired: &str,
) -> Result<Decision, ReconcileError> {
    validate_desired(desired)?;

    let exists = current
        .map(|rules| rules.iter().any(|rule| rule.value == desired))
        .unwrap_or(false);

    if exists {
        return Ok(Decision::NoActionNeeded);
    }

    Ok(Decision::CreateRequired(CreateRuleRequest {
        additions: vec![NewRule::new(desired)],
    }))
}
