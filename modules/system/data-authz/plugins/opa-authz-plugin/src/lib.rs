#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! OPA Data Authorizer Plugin
//!
//! Implements [`PolicyQueryClient`](data_authz_sdk::PolicyQueryClient) by
//! POSTing the query document to an OPA-compatible decision endpoint and
//! returning the response body unparsed.
//!
//! ## Configuration
//!
//! ```yaml
//! endpoint_url: "http://localhost:8181/v1/data/cassandra/allow"
//! connect_timeout: 2s
//! read_timeout: 5s
//! ```

pub mod config;
pub mod domain;

pub use config::OpaAuthzPluginConfig;
pub use domain::Service as OpaPolicyClient;
