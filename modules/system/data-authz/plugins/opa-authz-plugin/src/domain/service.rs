//! HTTP exchange with an OPA-compatible policy engine.

use data_authz_sdk::{ConfigurationError, DecisionPayload, PolicyQuery, PolicyQueryError};
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::OpaAuthzPluginConfig;

/// Longest error body kept from a non-success response, in bytes.
pub const MAX_ERROR_BODY_BYTES: usize = 1024;

/// OPA policy engine client.
///
/// Every query opens a fresh connection: idle connections are not pooled,
/// so no transport state is shared between access checks.
#[derive(Debug, Clone)]
pub struct Service {
    client: reqwest::Client,
    endpoint: Url,
}

impl Service {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` from [`OpaAuthzPluginConfig::validate`]
    /// - `ConfigurationError::Client` if the HTTP client cannot be built
    pub fn new(config: &OpaAuthzPluginConfig) -> Result<Self, ConfigurationError> {
        let endpoint = config.validate()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.connect_timeout + config.read_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ConfigurationError::Client(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one query and return the response body verbatim.
    ///
    /// # Errors
    ///
    /// One `PolicyQueryError` variant per failure class; nothing is retried.
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn query(&self, query: &PolicyQuery) -> Result<DecisionPayload, PolicyQueryError> {
        let body = serde_json::to_vec(query)
            .map_err(|e| PolicyQueryError::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "policy engine responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PolicyQueryError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                PolicyQueryError::Timeout(e.to_string())
            } else {
                PolicyQueryError::Body(e.to_string())
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(PolicyQueryError::EmptyBody);
        }

        Ok(DecisionPayload::new(bytes.to_vec()))
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut end = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

// Timeout is checked first: a connect timeout reports both flags.
fn classify(err: reqwest::Error) -> PolicyQueryError {
    if err.is_timeout() {
        PolicyQueryError::Timeout(err.to_string())
    } else if err.is_connect() {
        PolicyQueryError::Connect(err.to_string())
    } else if err.is_body() || err.is_decode() {
        PolicyQueryError::Body(err.to_string())
    } else {
        PolicyQueryError::Request(err.to_string())
    }
}
