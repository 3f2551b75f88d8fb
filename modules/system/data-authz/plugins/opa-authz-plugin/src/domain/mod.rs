//! Domain layer for the OPA authorizer plugin.

mod client;
pub mod service;

pub use service::Service;
