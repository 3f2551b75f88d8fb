#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Data Authorizer SDK
//!
//! This crate provides the public API for the `data_authz` module:
//!
//! - [`DataAuthorizer`] - Host-facing authorizer trait
//! - [`PolicyQueryClient`] - Capability trait for policy engine clients
//! - [`Principal`], [`Resource`], [`DataResource`], [`PermissionSet`] - Access-control model
//! - [`PolicyQuery`] - Query document sent to the engine
//! - [`interpret_decision`] - Maps the engine's answer onto permissions
//!
//! ## Usage
//!
//! ```ignore
//! use data_authz_sdk::{DataResource, Permission, Principal, Resource};
//!
//! let alice = Principal::builder().name("alice").role("analyst").build();
//! let table = Resource::from(DataResource::table("ks", "t"));
//!
//! let granted = authorizer.decide(&alice, &table).await?;
//! assert!(granted.contains(Permission::Select));
//! ```

pub mod api;
pub mod decision;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod query;

pub use api::DataAuthorizer;
pub use decision::{DecisionPayload, interpret_decision};
pub use error::{
    AuthorizeError, ConfigurationError, DecisionError, HierarchyError, PolicyQueryError,
    UnsupportedOperation,
};
pub use models::{
    AUTH_KEYSPACE, DataResource, Permission, PermissionDetails, PermissionSet, Principal,
    PrincipalBuilder, ROLE_PERMISSIONS_TABLE, ROOT_DATA_NAME, Resource, ResourceLevel,
    UnknownPermission,
};
pub use plugin_api::PolicyQueryClient;
pub use query::{PolicyQuery, QueryInput, QueryResource, QueryUser};
