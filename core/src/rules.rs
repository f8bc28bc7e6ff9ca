use serde::{Deserialize, Serialize};

use crate::error::ApiProblem;

/// A stream filter rule as stored by the remote filtering API.
/// Rules are immutable once created; identity is the server-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Server-assigned id. Absent before creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The filter expression (e.g. "to:BBC")
    pub value: String,
    /// Optional label attached to the rule. Not used for matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A rule to be added remotely. It has a value and an optional tag, but no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl NewRule {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }
}

/// Batch creation payload. Serialized as `{"add": [...]}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRuleRequest {
    #[serde(rename = "add")]
    pub additions: Vec<NewRule>,
}

/// Body returned by both the rule listing and the rule creation call.
///
/// `data` is missing entirely when no rules are configured, so it stays
/// optional rather than defaulting to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<FilterRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<RulesMeta>,
    /// Per-rule or request-level problems reported alongside a 200
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiProblem>,
}

impl RulesResponse {
    /// The listed rules, or `None` when the body carried no `data` array.
    pub fn rules(&self) -> Option<&[FilterRule]> {
        self.data.as_deref()
    }

    pub fn summary(&self) -> Option<&RulesSummary> {
        self.meta.as_ref().and_then(|m| m.summary.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesMeta {
    /// Server timestamp of the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RulesSummary>,
}

/// Outcome counters reported by the create call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesSummary {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub not_created: u64,
    #[serde(default)]
    pub valid: u64,
    #[serde(default)]
    pub invalid: u64,
}
