use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{ApiResponse, QueryOutcome};
use crate::config::Config;
use crate::config::ConfigError;

const USER_AGENT: &str = "apology-miner";

/// Client for GitHub's GraphQL endpoint.
///
/// Holds the resolved token explicitly; nothing here reads ambient state.
/// Designed for unattended batch collection: transport failures and
/// secondary rate limits are absorbed internally (see [`Self::run_query`]),
/// so a call either eventually yields a response or reports a genuine query
/// error.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    rate_limit_pause: Duration,
}

impl GitHubClient {
    /// Build a client from configuration. Fails fast when the token is
    /// missing or empty — before any network activity.
    pub fn from_config(config: &Config) -> Result<GitHubClient, ConfigError> {
        Ok(GitHubClient {
            http: reqwest::Client::new(),
            endpoint: config.endpoint(),
            token: config.github_token()?,
            rate_limit_pause: config.rate_limit_pause(),
        })
    }

    /// Submit one query and return its decoded `data`, or `None` for a
    /// genuine query error.
    ///
    /// Failure handling, in line with long-running batch collection where
    /// eventual success matters more than bounded latency:
    /// - transport failures (connection reset, malformed body) are logged
    ///   and the identical query is resubmitted immediately, without limit;
    /// - a secondary rate limit (signalled by `documentation_url` in the
    ///   body) sleeps for the configured pause, then resubmits;
    /// - an `errors` response is logged and returned as `None` — never
    ///   retried. Callers treat `None` as "this page failed".
    pub async fn run_query<T: DeserializeOwned>(&self, query: &str) -> Option<T> {
        let value = self.run_query_value(query).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(error = %e, "response data did not match the expected shape");
                None
            }
        }
    }

    /// Like [`Self::run_query`] but returns the raw `data` value. Used where
    /// the response is only displayed, not processed.
    pub async fn run_query_value(&self, query: &str) -> Option<serde_json::Value> {
        loop {
            let response = match self
                .http
                .post(&self.endpoint)
                .header("User-Agent", USER_AGENT)
                .header("Authorization", format!("token {}", self.token))
                .json(&json!({ "query": query }))
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "query transport failure; retrying");
                    continue;
                }
            };

            let body: ApiResponse = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "failed to read response body; retrying");
                    continue;
                }
            };

            match body.into_outcome() {
                QueryOutcome::RateLimited { documentation_url } => {
                    warn!(
                        pause_secs = self.rate_limit_pause.as_secs(),
                        documentation_url,
                        "hit secondary rate limit; waiting before retry"
                    );
                    tokio::time::sleep(self.rate_limit_pause).await;
                }
                QueryOutcome::Failed { messages } => {
                    warn!(?messages, "query failed");
                    return None;
                }
                QueryOutcome::Data(value) => {
                    debug!("query succeeded");
                    return Some(value);
                }
            }
        }
    }
}
