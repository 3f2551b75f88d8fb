//! Domain errors for the data authorizer.

use data_authz_sdk::{DecisionError, PolicyQueryError};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    /// The engine could not produce an answer.
    #[error(transparent)]
    EngineUnavailable(PolicyQueryError),

    /// The engine answered with something that is not a decision.
    #[error(transparent)]
    MalformedDecision(#[from] DecisionError),

    #[error("failed to serialize policy query: {0}")]
    Serialization(String),

    #[error("data authorizer is not set up")]
    NotInitialized,
}

impl DomainError {
    /// `true` if the failure is an engine or network outage.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_))
    }
}

impl From<PolicyQueryError> for DomainError {
    fn from(e: PolicyQueryError) -> Self {
        match e {
            PolicyQueryError::Serialization(reason) => Self::Serialization(reason),
            other => Self::EngineUnavailable(other),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn query_errors_split_into_transport_and_serialization() {
        let timeout = DomainError::from(PolicyQueryError::Timeout("deadline".to_owned()));
        assert!(timeout.is_transport());
        assert_eq!(timeout.to_string(), "policy engine request timed out: deadline");

        let encode = DomainError::from(PolicyQueryError::Serialization("bad key".to_owned()));
        assert!(!encode.is_transport());
        assert!(matches!(encode, DomainError::Serialization(reason) if reason == "bad key"));
    }

    #[test]
    fn malformed_decision_is_not_transport() {
        let err = DomainError::from(DecisionError::Malformed("result is a number".to_owned()));
        assert!(!err.is_transport());
    }
}
