use std::time::Duration;

use clap::Args;
use streamrule_core::rules::NewRule;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search";
pub const DEFAULT_RULE_PATH: &str = "/stream/rules";
pub const DEFAULT_RULE: &str = "to:BBC";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid rules URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Rules URL '{url}' must use http or https, got '{scheme}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Request timeout must be at least one second")]
    InvalidTimeout,
}

/// Where the filtering API lives and how to talk to it.
#[derive(Debug, Clone, Args)]
pub struct RulesApiConfig {
    /// Base URL of the search API
    #[arg(long, env = "TWITTER_SEARCH_URL", default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Path of the stream rules resource, appended verbatim to the search URL
    #[arg(long, env = "TWITTER_RULE_PATH", default_value = DEFAULT_RULE_PATH)]
    pub rule_path: String,

    /// Bearer token sent as `Authorization: Bearer <token>`
    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "STREAMRULE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl RulesApiConfig {
    /// Compose `<search_url><rule_path>` and check it is an absolute http(s) URL.
    pub fn rules_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}{}", self.search_url, self.rule_path);
        let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme {
                url: raw,
                scheme: other.to_string(),
            }),
        }
    }

    /// Configured token, treating an empty value as unset.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

// Flags normally populate this; tests build it by hand.
#[cfg(test)]
impl RulesApiConfig {
    pub fn new(search_url: impl Into<String>, rule_path: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
            rule_path: rule_path.into(),
            bearer_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

/// The one rule this process keeps alive.
#[derive(Debug, Clone, Args)]
pub struct DesiredRuleArgs {
    /// Filter expression that must exist remotely
    #[arg(long = "rule", env = "STREAMRULE_RULE", default_value = DEFAULT_RULE)]
    pub value: String,

    /// Tag attached to the rule when it gets created
    #[arg(long, env = "STREAMRULE_TAG")]
    pub tag: Option<String>,
}

impl DesiredRuleArgs {
    pub fn to_new_rule(&self) -> NewRule {
        NewRule::new(self.value.clone()).with_tag(self.tag.clone().filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, DEFAULT_RULE_PATH, DEFAULT_SEARCH_URL, DesiredRuleArgs, RulesApiConfig,
    };

    #[test]
    fn rules_url_concatenates_base_and_path() {
        let config = RulesApiConfig::new(DEFAULT_SEARCH_URL, DEFAULT_RULE_PATH);
        let url = config.rules_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twitter.com/2/tweets/search/stream/rules"
        );
    }

    #[test]
    fn rules_url_rejects_relative_input() {
        let config = RulesApiConfig::new("api.twitter.com", DEFAULT_RULE_PATH);
        assert!(matches!(
            config.rules_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rules_url_rejects_non_http_scheme() {
        let config = RulesApiConfig::new("ftp://example.com", "/rules");
        match config.rules_url() {
            Err(ConfigError::UnsupportedScheme { scheme, .. }) => assert_eq!(scheme, "ftp"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    #[test]
    fn empty_bearer_token_counts_as_unset() {
        let config = RulesApiConfig::new(DEFAULT_SEARCH_URL, DEFAULT_RULE_PATH);
        assert_eq!(config.bearer_token(), None);
        assert_eq!(config.clone().with_bearer_token("  ").bearer_token(), None);
        assert_eq!(
            config.with_bearer_token("secret").bearer_token(),
            Some("secret")
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = RulesApiConfig::new(DEFAULT_SEARCH_URL, DEFAULT_RULE_PATH);
        assert_eq!(config.timeout().unwrap().as_secs(), 10);
        config.timeout_secs = 0;
        assert!(matches!(config.timeout(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn empty_tag_is_dropped_from_new_rule() {
        let args = DesiredRuleArgs {
            value: "to:BBC".into(),
            tag: Some(String::new()),
        };
        assert_eq!(args.to_new_rule().tag, None);
    }
}
