//! Data Authorizer Module
//!
//! Plugs into the host's access-control layer and delegates every data
//! permission check to an external policy engine. Superusers and non-data
//! resources are answered locally; grants cannot be managed through the host.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{DataAuthzConfig, FailMode};
pub use module::DataAuthzModule;
