//! Data authorizer module.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use data_authz_sdk::{
    AUTH_KEYSPACE, AuthorizeError, ConfigurationError, DataAuthorizer, DataResource,
    PermissionDetails, PermissionSet, PolicyQueryClient, Principal, ROLE_PERMISSIONS_TABLE,
    Resource, UnsupportedOperation,
};
use opa_authz_plugin::OpaPolicyClient;
use tracing::{debug, info, warn};

use crate::config::DataAuthzConfig;
use crate::domain::service::local_decision;
use crate::domain::{DomainError, Service};

const GRANT: &str = "GRANT";
const REVOKE: &str = "REVOKE";
const LIST_PERMISSIONS: &str = "LIST PERMISSIONS";
const REVOKE_ALL_FROM_ROLE: &str = "REVOKE ALL FROM ROLE";
const REVOKE_ALL_ON_RESOURCE: &str = "REVOKE ALL ON RESOURCE";

/// Data authorizer module.
///
/// This module:
/// 1. Validates its configuration when asked by the host
/// 2. Builds the policy engine client once, in [`setup`](DataAuthorizer::setup)
/// 3. Routes every data permission check to the engine
///
/// Superusers and non-data resources are answered before setup too; data
/// checks made before setup are denied.
pub struct DataAuthzModule {
    config: DataAuthzConfig,
    service: OnceLock<Arc<Service>>,
}

impl DataAuthzModule {
    /// Create a module that connects to the configured engine on setup.
    #[must_use]
    pub fn new(config: DataAuthzConfig) -> Self {
        Self {
            config,
            service: OnceLock::new(),
        }
    }

    /// Create a module already wired to `client`. Setup becomes a no-op.
    #[must_use]
    pub fn with_client(config: DataAuthzConfig, client: Arc<dyn PolicyQueryClient>) -> Self {
        let svc = Arc::new(Service::new(client, config.fail_mode));
        Self {
            config,
            service: OnceLock::from(svc),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DataAuthzConfig {
        &self.config
    }

    fn service(&self) -> Result<&Arc<Service>, DomainError> {
        self.service.get().ok_or(DomainError::NotInitialized)
    }
}

#[async_trait]
impl DataAuthorizer for DataAuthzModule {
    async fn decide(
        &self,
        principal: &Principal,
        resource: &Resource,
    ) -> Result<PermissionSet, AuthorizeError> {
        match self.service() {
            Ok(svc) => svc.decide(principal, resource).await,
            Err(e) => {
                if let Some(granted) = local_decision(principal, resource) {
                    return Ok(granted);
                }
                warn!(
                    principal = %principal.name(),
                    resource = %resource,
                    error = %e,
                    "permission check before setup, denying access"
                );
                Ok(PermissionSet::none())
            }
        }
    }

    fn grant(
        &self,
        _performer: &Principal,
        _permissions: &PermissionSet,
        _resource: &Resource,
        _grantee: &str,
    ) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new(GRANT))
    }

    fn revoke(
        &self,
        _performer: &Principal,
        _permissions: &PermissionSet,
        _resource: &Resource,
        _revokee: &str,
    ) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new(REVOKE))
    }

    fn list(
        &self,
        _performer: &Principal,
        _permissions: &PermissionSet,
        _resource: Option<&Resource>,
        _grantee: Option<&str>,
    ) -> Result<Vec<PermissionDetails>, UnsupportedOperation> {
        Err(UnsupportedOperation::new(LIST_PERMISSIONS))
    }

    fn revoke_all_from(&self, _role: &str) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new(REVOKE_ALL_FROM_ROLE))
    }

    fn revoke_all_on(&self, _resource: &Resource) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new(REVOKE_ALL_ON_RESOURCE))
    }

    fn protected_resources(&self) -> Vec<Resource> {
        vec![DataResource::table(AUTH_KEYSPACE, ROLE_PERMISSIONS_TABLE).into()]
    }

    fn validate_configuration(&self) -> Result<(), ConfigurationError> {
        self.config.engine.validate().map(|_| ())
    }

    #[tracing::instrument(skip_all, fields(endpoint = %self.config.engine.endpoint_url))]
    fn setup(&self) -> Result<(), ConfigurationError> {
        if self.service.get().is_some() {
            debug!("data authorizer already set up");
            return Ok(());
        }

        let client = OpaPolicyClient::new(&self.config.engine)?;
        let svc = Arc::new(Service::new(Arc::new(client), self.config.fail_mode));

        if self.service.set(svc).is_err() {
            debug!("data authorizer set up concurrently, keeping existing client");
            return Ok(());
        }

        info!(fail_mode = ?self.config.fail_mode, "data authorizer initialized");
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use data_authz_sdk::{DecisionPayload, Permission, PolicyQuery, PolicyQueryError};
    use tracing_test::traced_test;

    use super::*;

    #[derive(Default)]
    struct CountingMock {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PolicyQueryClient for CountingMock {
        async fn query(&self, _query: &PolicyQuery) -> Result<DecisionPayload, PolicyQueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DecisionPayload::new(r#"{"result": {"permissions": ["SELECT"]}}"#))
        }
    }

    fn alice() -> Principal {
        Principal::builder().name("alice").role("analyst").build()
    }

    fn table() -> Resource {
        DataResource::table("ks", "t").into()
    }

    #[test]
    fn admin_operations_are_refused_without_query() {
        let mock = Arc::new(CountingMock::default());
        let module = DataAuthzModule::with_client(DataAuthzConfig::default(), mock.clone());
        let perms = PermissionSet::from([Permission::Select]);

        let refusals = [
            module.grant(&alice(), &perms, &table(), "bob").unwrap_err(),
            module.revoke(&alice(), &perms, &table(), "bob").unwrap_err(),
            module
                .list(&alice(), &perms, Some(&table()), None)
                .unwrap_err(),
            module.revoke_all_from("analyst").unwrap_err(),
            module.revoke_all_on(&table()).unwrap_err(),
        ];

        let names: Vec<_> = refusals.iter().map(|e| e.operation).collect();
        assert_eq!(
            names,
            [
                "GRANT",
                "REVOKE",
                "LIST PERMISSIONS",
                "REVOKE ALL FROM ROLE",
                "REVOKE ALL ON RESOURCE"
            ]
        );
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn protects_role_permissions_table() {
        let module = DataAuthzModule::new(DataAuthzConfig::default());
        let protected = module.protected_resources();

        assert_eq!(protected.len(), 1);
        assert_eq!(protected[0].full_name(), "data/system_auth/role_permissions");
    }

    #[test]
    fn validate_configuration_fails_fast() {
        let mut config = DataAuthzConfig::default();
        config.engine.endpoint_url = "localhost".to_owned();
        let module = DataAuthzModule::new(config);

        assert!(matches!(
            module.validate_configuration(),
            Err(ConfigurationError::InvalidEndpoint { .. })
        ));
        assert!(module.setup().is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn decide_before_setup_denies_with_warning() {
        let module = DataAuthzModule::new(DataAuthzConfig::default());

        let granted = module.decide(&alice(), &table()).await.unwrap();

        assert!(granted.is_empty());
        assert!(logs_contain("permission check before setup"));
    }

    #[tokio::test]
    #[traced_test]
    async fn fast_paths_answer_before_setup() {
        let module = DataAuthzModule::new(DataAuthzConfig::default());
        let admin = Principal::builder().name("cassandra").superuser(true).build();

        let superuser_on_table = module.decide(&admin, &table()).await.unwrap();
        let anonymous_on_roles = module
            .decide(&Principal::anonymous(), &Resource::Role { name: None })
            .await
            .unwrap();

        assert_eq!(superuser_on_table, table().applicable_permissions());
        assert_eq!(anonymous_on_roles, PermissionSet::all());
        assert!(!logs_contain("permission check before setup"));
    }

    #[tokio::test]
    async fn setup_is_idempotent() {
        let module = DataAuthzModule::new(DataAuthzConfig::default());

        module.setup().unwrap();
        let first = Arc::as_ptr(module.service().unwrap());
        module.setup().unwrap();
        let second = Arc::as_ptr(module.service().unwrap());

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn injected_client_serves_checks() {
        let mock = Arc::new(CountingMock::default());
        let module = DataAuthzModule::with_client(DataAuthzConfig::default(), mock.clone());

        module.setup().unwrap();
        let granted = module.decide(&alice(), &table()).await.unwrap();

        assert_eq!(granted, PermissionSet::from([Permission::Select]));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }
}
