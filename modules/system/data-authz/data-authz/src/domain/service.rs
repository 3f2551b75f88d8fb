//! Domain service for the data authorizer.

use std::sync::Arc;

use data_authz_sdk::{
    AuthorizeError, DataResource, PermissionSet, PolicyQuery, PolicyQueryClient, Principal,
    Resource, interpret_decision,
};
use tracing::{debug, warn};

use super::error::DomainError;
use crate::config::FailMode;

/// Data authorizer service.
///
/// Holds only read-only state, so one instance serves concurrent checks.
pub struct Service {
    client: Arc<dyn PolicyQueryClient>,
    fail_mode: FailMode,
}

impl Service {
    #[must_use]
    pub fn new(client: Arc<dyn PolicyQueryClient>, fail_mode: FailMode) -> Self {
        Self { client, fail_mode }
    }

    /// Permissions `principal` holds on `resource`.
    ///
    /// First match wins:
    /// - superuser → every permission applicable to the resource, no query
    /// - non-data resource → `PermissionSet::all()`, no query
    /// - otherwise one engine query; outages resolve to the fail mode and a
    ///   malformed answer always denies
    ///
    /// # Errors
    ///
    /// `SerializationFault` if the query document cannot be encoded.
    #[tracing::instrument(skip_all, fields(principal = %principal.name(), resource = %resource))]
    pub async fn decide(
        &self,
        principal: &Principal,
        resource: &Resource,
    ) -> Result<PermissionSet, AuthorizeError> {
        if let Some(granted) = local_decision(principal, resource) {
            return Ok(granted);
        }

        let Some(data) = resource.as_data() else {
            return Ok(PermissionSet::all());
        };

        match self.query_engine(principal, data).await {
            Ok(granted) => {
                debug!(%granted, "policy decision");
                Ok(granted)
            }
            Err(DomainError::Serialization(reason)) => {
                Err(AuthorizeError::SerializationFault(reason))
            }
            Err(e) if e.is_transport() => {
                let fallback = match self.fail_mode {
                    FailMode::Closed => PermissionSet::none(),
                    FailMode::Open => data.applicable_permissions(),
                };
                warn!(
                    principal = %principal.name(),
                    resource = %data,
                    fail_mode = ?self.fail_mode,
                    granted = %fallback,
                    error = %e,
                    "policy engine unavailable, applying fail mode"
                );
                Ok(fallback)
            }
            Err(e) => {
                warn!(
                    principal = %principal.name(),
                    resource = %data,
                    error = %e,
                    "unusable policy decision, denying access"
                );
                Ok(PermissionSet::none())
            }
        }
    }

    async fn query_engine(
        &self,
        principal: &Principal,
        resource: &DataResource,
    ) -> Result<PermissionSet, DomainError> {
        let query = PolicyQuery::new(principal, resource);
        let payload = self.client.query(&query).await?;
        Ok(interpret_decision(
            &payload,
            &resource.applicable_permissions(),
        )?)
    }
}

/// Decision reachable without the policy engine, if any.
///
/// Superusers get every permission applicable to the resource and non-data
/// resources get `PermissionSet::all()`. Data checks by other principals
/// return `None`.
#[must_use]
pub fn local_decision(principal: &Principal, resource: &Resource) -> Option<PermissionSet> {
    if principal.is_superuser() {
        debug!("superuser, skipping policy engine");
        return Some(resource.applicable_permissions());
    }

    if resource.as_data().is_none() {
        debug!("not a data resource, skipping policy engine");
        return Some(PermissionSet::all());
    }

    None
}
