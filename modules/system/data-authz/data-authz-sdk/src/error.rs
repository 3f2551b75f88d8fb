//! Error types for the data authorizer.

use thiserror::Error;

use crate::models::ResourceLevel;

/// Failures of a single exchange with the policy engine.
///
/// Access denial is never an error: an engine that says "no" produces a
/// well-formed decision payload.
#[derive(Debug, Error)]
pub enum PolicyQueryError {
    /// The request did not complete within the configured bound.
    #[error("policy engine request timed out: {0}")]
    Timeout(String),

    /// The engine could not be reached.
    #[error("policy engine connection failed: {0}")]
    Connect(String),

    /// The engine answered with a non-success status.
    #[error("policy engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be read.
    #[error("failed to read policy engine response body: {0}")]
    Body(String),

    /// The engine answered with an empty body.
    #[error("policy engine returned an empty response body")]
    EmptyBody,

    /// Any other transport failure.
    #[error("policy engine request failed: {0}")]
    Request(String),

    /// The query document could not be encoded.
    #[error("failed to serialize policy query: {0}")]
    Serialization(String),
}

impl PolicyQueryError {
    /// `true` for failures caused by the engine or the network, as opposed to
    /// a fault in building the request.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }
}

/// The engine's answer does not match any recognised decision shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("malformed decision payload: {0}")]
    Malformed(String),
}

/// A mutating administrative operation that this authorizer does not support.
///
/// Grants live in the policy engine; manage them there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} operation is not supported by the policy-engine authorizer")]
pub struct UnsupportedOperation {
    pub operation: &'static str,
}

impl UnsupportedOperation {
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self { operation }
    }
}

/// The authorizer's configuration cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("failed to build policy engine client: {0}")]
    Client(String),
}

/// A live access check could not be answered.
///
/// Engine outages never surface here; they degrade to the configured fail
/// mode. Only faults in building the request do.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error("failed to serialize policy query: {0}")]
    SerializationFault(String),
}

/// A resource document does not describe a valid data hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("{level} resource is missing its parent")]
    MissingParent { level: ResourceLevel },

    #[error("root resource must not have a parent")]
    RootWithParent,

    #[error("root resource must be named '{expected}', got '{name}'")]
    UnexpectedRootName {
        name: String,
        expected: &'static str,
    },

    #[error("{child} resource cannot sit under a {parent} resource")]
    InvalidParent {
        child: ResourceLevel,
        parent: ResourceLevel,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn serialization_is_not_a_transport_failure() {
        assert!(!PolicyQueryError::Serialization("boom".to_owned()).is_transport());
        assert!(PolicyQueryError::EmptyBody.is_transport());
        assert!(
            PolicyQueryError::Status {
                status: 503,
                body: String::new()
            }
            .is_transport()
        );
    }

    #[test]
    fn unsupported_operation_names_the_operation() {
        let err = UnsupportedOperation::new("GRANT");
        assert_eq!(
            err.to_string(),
            "GRANT operation is not supported by the policy-engine authorizer"
        );
    }

    #[test]
    fn hierarchy_error_messages_use_level_tokens() {
        let err = HierarchyError::InvalidParent {
            child: ResourceLevel::Table,
            parent: ResourceLevel::Root,
        };
        assert_eq!(err.to_string(), "table resource cannot sit under a root resource");
    }
}
