//! Configuration for the data authorizer.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional YAML file
//! 3. environment variables prefixed `DATA_AUTHZ_`, with `__` separating
//!    nested keys (`DATA_AUTHZ_ENGINE__READ_TIMEOUT=750ms`)

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use opa_authz_plugin::OpaAuthzPluginConfig;
use serde::Deserialize;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "DATA_AUTHZ_";

/// Configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataAuthzConfig {
    /// Outcome of a check when the policy engine cannot be reached.
    pub fail_mode: FailMode,

    /// Policy engine connection settings.
    pub engine: OpaAuthzPluginConfig,
}

/// What a data check resolves to when the engine is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    /// Deny everything.
    #[default]
    Closed,
    /// Grant every permission applicable to the resource.
    Open,
}

impl DataAuthzConfig {
    /// Layered sources: YAML file (if given) then environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::new();
        let figment = match path {
            Some(path) => figment.merge(Yaml::file(path)),
            None => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from the default layers.
    ///
    /// # Errors
    ///
    /// Fails if a source cannot be read or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::from_figment(&Self::figment(path))
    }

    /// Extract configuration from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Fails if a value has the wrong shape or an unknown key is present.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        figment
            .extract()
            .context("failed to load data_authz configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use figment::Jail;

    use super::*;

    fn from_yaml(yaml: &str) -> anyhow::Result<DataAuthzConfig> {
        DataAuthzConfig::from_figment(&Figment::from(Yaml::string(yaml)))
    }

    #[test]
    fn empty_source_yields_defaults() {
        let config = DataAuthzConfig::from_figment(&Figment::new()).unwrap();
        assert_eq!(config, DataAuthzConfig::default());
        assert_eq!(config.fail_mode, FailMode::Closed);
    }

    #[test]
    fn yaml_overrides_nested_values() {
        let config = from_yaml(
            "fail_mode: open\n\
             engine:\n\
             \x20 endpoint_url: https://opa.internal:8443/v1/data/db/allow\n\
             \x20 read_timeout: 750ms\n",
        )
        .unwrap();

        assert_eq!(config.fail_mode, FailMode::Open);
        assert_eq!(
            config.engine.endpoint_url,
            "https://opa.internal:8443/v1/data/db/allow"
        );
        assert_eq!(config.engine.read_timeout, Duration::from_millis(750));
        assert_eq!(config.engine.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn env_overrides_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "data_authz.yaml",
                "fail_mode: closed\n\
                 engine:\n\
                 \x20 endpoint_url: http://file:8181/v1/data/db/allow\n\
                 \x20 read_timeout: 750ms\n",
            )?;
            jail.set_env("DATA_AUTHZ_FAIL_MODE", "open");
            jail.set_env("DATA_AUTHZ_ENGINE__ENDPOINT_URL", "http://opa:9999/v1/x");

            let config = DataAuthzConfig::load(Some(Path::new("data_authz.yaml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.fail_mode, FailMode::Open);
            assert_eq!(config.engine.endpoint_url, "http://opa:9999/v1/x");
            assert_eq!(config.engine.read_timeout, Duration::from_millis(750));
            assert_eq!(config.engine.connect_timeout, Duration::from_secs(2));
            Ok(())
        });
    }

    #[test]
    fn load_without_file_reads_env_only() {
        Jail::expect_with(|jail| {
            jail.set_env("DATA_AUTHZ_ENGINE__CONNECT_TIMEOUT", "500ms");

            let config = DataAuthzConfig::load(None).map_err(|e| e.to_string())?;

            assert_eq!(config.fail_mode, FailMode::Closed);
            assert_eq!(config.engine.connect_timeout, Duration::from_millis(500));
            assert_eq!(
                config.engine.endpoint_url,
                opa_authz_plugin::config::DEFAULT_ENDPOINT_URL
            );
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(from_yaml("failmode: open\n").is_err());
        assert!(from_yaml("engine:\n  retries: 3\n").is_err());
    }

    #[test]
    fn unknown_fail_mode_is_rejected() {
        assert!(from_yaml("fail_mode: sometimes\n").is_err());
    }
}
