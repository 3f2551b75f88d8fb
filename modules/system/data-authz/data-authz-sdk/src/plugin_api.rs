//! Capability trait for policy engine clients.

use async_trait::async_trait;

use crate::decision::DecisionPayload;
use crate::error::PolicyQueryError;
use crate::query::PolicyQuery;

/// Sends one query document to a policy engine and returns its raw answer.
///
/// Implementations perform exactly one exchange per call. Retries, pooling or
/// circuit breaking belong in a wrapping implementation.
#[async_trait]
pub trait PolicyQueryClient: Send + Sync {
    /// Query the engine.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the document cannot be encoded
    /// - a transport variant if the exchange fails
    async fn query(&self, query: &PolicyQuery) -> Result<DecisionPayload, PolicyQueryError>;
}
