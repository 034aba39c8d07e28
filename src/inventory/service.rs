//! Lifecycle service façade.
//!
//! Single entry point for the two exposed operations. Owns request logging
//! and the validation-vs-provider error split the HTTP layer maps onto
//! response classes.

use super::deletion::{self, DeletionOutcome, DeletionRequest};
use super::discovery::{self, InstanceRecord};
use super::provider::ComputeProvider;
use super::query::{self, DomainRule, QueryConfig};
use crate::error::EngineError;
use std::sync::Arc;

/// Stateless service over an already-authenticated provider handle. Safe to
/// share across concurrent requests.
#[derive(Clone)]
pub struct LifecycleService {
    provider: Arc<dyn ComputeProvider>,
    default_project: String,
}

impl LifecycleService {
    pub fn new(provider: Arc<dyn ComputeProvider>, default_project: impl Into<String>) -> Self {
        Self {
            provider,
            default_project: default_project.into(),
        }
    }

    /// List instances matching the query. The domain filter is optional for
    /// this operation.
    pub async fn list_instances(
        &self,
        config: QueryConfig,
    ) -> Result<Vec<InstanceRecord>, EngineError> {
        let query = match query::resolve(&config, &self.default_project, DomainRule::Optional) {
            Ok(query) => query,
            Err(error) => {
                tracing::warn!(error = %error, "rejected list request");
                return Err(error);
            }
        };

        tracing::info!(
            project = %query.project_id,
            scope = ?query.scope,
            domain = ?query.domain,
            "listing instances"
        );

        discovery::discover(self.provider.as_ref(), &query).await
    }

    /// Delete one instance, or all instances in a zone when the request
    /// carries the `ALL` sentinel. Returns one outcome per attempted target.
    pub async fn delete_instances(
        &self,
        request: DeletionRequest,
    ) -> Result<Vec<DeletionOutcome>, EngineError> {
        tracing::info!(
            project = ?request.project_id,
            zone = ?request.zone,
            instance = ?request.instance_id,
            "delete instances requested"
        );

        match deletion::delete(self.provider.as_ref(), &request).await {
            Ok(outcomes) => Ok(outcomes),
            Err(error) => {
                tracing::warn!(error = %error, "delete request failed");
                Err(error)
            }
        }
    }
}
