//! Configuration for the OPA authorizer plugin.

use std::time::Duration;

use data_authz_sdk::ConfigurationError;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Default decision endpoint of a local OPA sidecar.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8181/v1/data/cassandra/allow";

/// Plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpaAuthzPluginConfig {
    /// Absolute `http`/`https` URL of the decision endpoint.
    pub endpoint_url: String,

    /// Bound on establishing the connection, e.g. `"2s"`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,

    /// Bound on waiting for response data, e.g. `"5s"`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,
}

impl Default for OpaAuthzPluginConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_owned(),
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
        }
    }
}

impl OpaAuthzPluginConfig {
    /// Check the configuration without contacting the engine.
    ///
    /// Returns the parsed endpoint.
    ///
    /// # Errors
    ///
    /// - `InvalidEndpoint` if the URL is not an absolute `http`/`https` URL with a host
    /// - `ZeroTimeout` if either timeout is zero
    pub fn validate(&self) -> Result<Url, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidEndpoint {
            url: self.endpoint_url.clone(),
            reason,
        };

        let url = Url::parse(&self.endpoint_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_owned()));
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigurationError::ZeroTimeout {
                field: "connect_timeout",
            });
        }
        if self.read_timeout.is_zero() {
            return Err(ConfigurationError::ZeroTimeout {
                field: "read_timeout",
            });
        }

        Ok(url)
    }
}

/// Deserialize a human-readable duration such as `"500ms"` or `"2s"`.
///
/// # Errors
///
/// Fails if the value is not a string or not a valid duration.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = OpaAuthzPluginConfig::default();
        let url = config.validate().unwrap();

        assert_eq!(url.as_str(), DEFAULT_ENDPOINT_URL);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.read_timeout, Duration::from_secs(5));
    }

    #[test]
    fn durations_parse_from_human_strings() {
        let config: OpaAuthzPluginConfig = serde_json::from_value(serde_json::json!({
            "connect_timeout": "500ms",
            "read_timeout": "1m"
        }))
        .unwrap();

        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.read_timeout, Duration::from_secs(60));
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
    }

    #[test]
    fn bad_duration_is_rejected() {
        let result: Result<OpaAuthzPluginConfig, _> =
            serde_json::from_value(serde_json::json!({ "read_timeout": "soon" }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<OpaAuthzPluginConfig, _> =
            serde_json::from_value(serde_json::json!({ "endpoint": "http://x" }));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_endpoints() {
        for url in ["not a url", "ftp://opa/allow", "/v1/data/allow", "file:///tmp/allow"] {
            let config = OpaAuthzPluginConfig {
                endpoint_url: url.to_owned(),
                ..OpaAuthzPluginConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigurationError::InvalidEndpoint { .. })),
                "expected {url} to be rejected"
            );
        }
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let config = OpaAuthzPluginConfig {
            read_timeout: Duration::ZERO,
            ..OpaAuthzPluginConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::ZeroTimeout {
                field: "read_timeout"
            })
        );
    }
}
