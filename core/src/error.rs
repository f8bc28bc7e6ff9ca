use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the reconciler itself. Remote and transport failures
/// never surface here; they are folded into the decision or handled by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// One entry of the `errors` array the filtering API returns, either on a
/// failed request or next to partial results in a 200 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProblem {
    /// Short machine-ish label (e.g. "DuplicateRule")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Problem type URI
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The rule value the problem refers to (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Id of the existing rule (duplicate-rule problems only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Problem type URIs the startup pass reacts to
pub mod problem_types {
    pub const DUPLICATE_RULES: &str = "https://api.twitter.com/2/problems/duplicate-rules";
    pub const INVALID_RULES: &str = "https://api.twitter.com/2/problems/invalid-rules";
}

impl ApiProblem {
    /// Best human-readable line for logs.
    pub fn summary(&self) -> &str {
        [&self.detail, &self.message, &self.title]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("unknown error")
    }

    /// The remote refused an addition because the same value already exists.
    pub fn is_duplicate_rule(&self) -> bool {
        self.problem_type.as_deref() == Some(problem_types::DUPLICATE_RULES)
            || self.title.as_deref() == Some("DuplicateRule")
    }
}
