//! `PolicyQueryClient` implementation for the OPA plugin.

use async_trait::async_trait;
use data_authz_sdk::{DecisionPayload, PolicyQuery, PolicyQueryClient, PolicyQueryError};

use super::service::Service;

#[async_trait]
impl PolicyQueryClient for Service {
    async fn query(&self, query: &PolicyQuery) -> Result<DecisionPayload, PolicyQueryError> {
        Service::query(self, query).await
    }
}
