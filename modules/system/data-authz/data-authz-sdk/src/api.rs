//! Host-facing authorizer trait.

use async_trait::async_trait;

use crate::error::{AuthorizeError, ConfigurationError, UnsupportedOperation};
use crate::models::{PermissionDetails, PermissionSet, Principal, Resource};

/// Authorizer plugged into the host's access-control layer.
///
/// The host calls [`setup`](Self::setup) once after
/// [`validate_configuration`](Self::validate_configuration), then
/// [`decide`](Self::decide) for every permission check:
///
/// ```ignore
/// authorizer.validate_configuration()?;
/// authorizer.setup()?;
///
/// let granted = authorizer.decide(&principal, &resource).await?;
/// if granted.contains(Permission::Select) { /* ... */ }
/// ```
///
/// Grants are owned by the policy engine, so every mutating administrative
/// operation is refused.
#[async_trait]
pub trait DataAuthorizer: Send + Sync {
    /// Permissions `principal` holds on `resource`.
    ///
    /// Engine outages do not fail the call; they resolve to the configured
    /// fail mode.
    ///
    /// # Errors
    ///
    /// `SerializationFault` if the query document cannot be encoded.
    async fn decide(
        &self,
        principal: &Principal,
        resource: &Resource,
    ) -> Result<PermissionSet, AuthorizeError>;

    /// # Errors
    ///
    /// Always `UnsupportedOperation`.
    fn grant(
        &self,
        performer: &Principal,
        permissions: &PermissionSet,
        resource: &Resource,
        grantee: &str,
    ) -> Result<(), UnsupportedOperation>;

    /// # Errors
    ///
    /// Always `UnsupportedOperation`.
    fn revoke(
        &self,
        performer: &Principal,
        permissions: &PermissionSet,
        resource: &Resource,
        revokee: &str,
    ) -> Result<(), UnsupportedOperation>;

    /// # Errors
    ///
    /// Always `UnsupportedOperation`.
    fn list(
        &self,
        performer: &Principal,
        permissions: &PermissionSet,
        resource: Option<&Resource>,
        grantee: Option<&str>,
    ) -> Result<Vec<PermissionDetails>, UnsupportedOperation>;

    /// Called by the host when a role is dropped.
    ///
    /// # Errors
    ///
    /// Always `UnsupportedOperation`.
    fn revoke_all_from(&self, role: &str) -> Result<(), UnsupportedOperation>;

    /// Called by the host when a resource is dropped.
    ///
    /// # Errors
    ///
    /// Always `UnsupportedOperation`.
    fn revoke_all_on(&self, resource: &Resource) -> Result<(), UnsupportedOperation>;

    /// Resources the host must refuse to let users modify directly.
    fn protected_resources(&self) -> Vec<Resource>;

    /// # Errors
    ///
    /// `ConfigurationError` describing the first invalid setting.
    fn validate_configuration(&self) -> Result<(), ConfigurationError>;

    /// Prepare the authorizer for use. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` if the configuration is invalid or the engine
    /// client cannot be built.
    fn setup(&self) -> Result<(), ConfigurationError>;
}
