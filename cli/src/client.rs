use reqwest::Method;
use streamrule_core::error::ApiProblem;
use streamrule_core::rules::{CreateRuleRequest, RulesResponse};
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, RulesApiConfig};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Request to rules API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Rules API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse rules API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Exit codes: 1=client error (4xx), 2=server error (5xx),
    ///             3=connection/decode error, 4=usage error
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Config(_) => 4,
            ClientError::Status { status, .. } if (400..500).contains(status) => 1,
            ClientError::Status { .. } => 2,
            ClientError::Transport(_) | ClientError::Decode(_) => 3,
        }
    }

    /// Problem details carried in an error response body, if it has any.
    pub fn problem(&self) -> Option<ApiProblem> {
        let ClientError::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<ApiProblem>(body)
            .ok()
            .filter(|p| *p != ApiProblem::default())
    }
}

/// Thin client for the stream rules resource.
pub struct RulesClient {
    http: reqwest::Client,
    rules_url: Url,
    bearer_token: Option<String>,
}

impl RulesClient {
    pub fn from_config(config: &RulesApiConfig) -> Result<Self, ClientError> {
        let rules_url = config.rules_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout()?)
            .build()?;

        Ok(Self {
            http,
            rules_url,
            bearer_token: config.bearer_token().map(str::to_string),
        })
    }

    pub fn rules_url(&self) -> &Url {
        &self.rules_url
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        req.header("Accept", "application/json")
    }

    /// `GET <rules_url>`
    pub async fn list_rules(&self) -> Result<RulesResponse, ClientError> {
        let resp = self
            .request(Method::GET, self.rules_url.clone())
            .send()
            .await?;
        handle_response(resp).await
    }

    /// `POST <rules_url>` with the payload as JSON body. With `dry_run` the
    /// remote validates the additions without storing them.
    pub async fn create_rules(
        &self,
        payload: &CreateRuleRequest,
        dry_run: bool,
    ) -> Result<RulesResponse, ClientError> {
        let mut url = self.rules_url.clone();
        if dry_run {
            url.query_pairs_mut().append_pair("dry_run", "true");
        }

        let resp = self.request(Method::POST, url).json(payload).send().await?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<RulesResponse, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(RulesResponse::default());
    }

    Ok(serde_json::from_str(&body)?)
}
