//! Deletion orchestration.
//!
//! Single deletes are a one-shot provider call. Bulk deletes ("ALL") are
//! explicit two-phase orchestration: enumerate targets through the discovery
//! engine, then delete target-after-target. Deletion is independent per
//! target: one failure never stops the rest of the batch, and every
//! candidate produces exactly one outcome.

use super::discovery;
use super::provider::ComputeProvider;
use super::query::{ListScope, ResolvedQuery};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Reserved instance identifier requesting bulk deletion of every discovered
/// instance in the zone.
pub const DELETE_ALL: &str = "ALL";

/// Caller-supplied deletion request, as decoded from the HTTP body. All
/// fields are optional at the wire; the orchestrator validates presence
/// before any provider call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeletionRequest {
    pub project_id: Option<String>,
    pub zone: Option<String>,
    pub instance_id: Option<String>,
}

/// What a validated request asks to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteTarget {
    All,
    One(String),
}

/// Per-target result of a deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Deleted,
    Failed,
}

/// One outcome per attempted deletion, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub instance_id: String,
    pub status: OutcomeStatus,
}

fn required<'a>(field: Option<&'a str>, name: &str) -> Result<&'a str, EngineError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| EngineError::validation(format!("missing required field '{name}'")))
}

impl DeletionRequest {
    fn validate(&self) -> Result<(String, String, DeleteTarget), EngineError> {
        let project = required(self.project_id.as_deref(), "project_id")?;
        let zone = required(self.zone.as_deref(), "zone")?;
        let instance = required(self.instance_id.as_deref(), "instance_id")?;

        let target = if instance == DELETE_ALL {
            DeleteTarget::All
        } else {
            DeleteTarget::One(instance.to_string())
        };

        Ok((project.to_string(), zone.to_string(), target))
    }
}

/// Delete the requested instance(s) and report one outcome per target.
///
/// Errors: `ValidationError` before any provider call when a field is
/// missing; `ProviderError` only when the discovery pass of an "ALL" request
/// fails. Individual delete failures become `failed` outcomes, never a
/// request-level error.
pub async fn delete(
    provider: &dyn ComputeProvider,
    request: &DeletionRequest,
) -> Result<Vec<DeletionOutcome>, EngineError> {
    let (project, zone, target) = request.validate()?;

    let candidates = match target {
        DeleteTarget::One(instance) => vec![instance],
        DeleteTarget::All => {
            let query = ResolvedQuery {
                project_id: project.clone(),
                scope: ListScope::Zonal(zone.clone()),
                domain: None,
            };
            let records = discovery::discover(provider, &query).await?;
            tracing::info!(
                project = %project,
                zone = %zone,
                candidates = records.len(),
                "bulk delete discovered targets"
            );
            records.into_iter().map(|record| record.name).collect()
        }
    };

    let mut outcomes = Vec::with_capacity(candidates.len());
    for instance in candidates {
        let status = match provider.delete_instance(&project, &zone, &instance).await {
            Ok(()) => {
                tracing::info!(project = %project, zone = %zone, instance = %instance, "instance deleted");
                OutcomeStatus::Deleted
            }
            Err(error) => {
                tracing::warn!(
                    project = %project,
                    zone = %zone,
                    instance = %instance,
                    error = %format!("{error:#}"),
                    "instance deletion failed"
                );
                OutcomeStatus::Failed
            }
        };
        outcomes.push(DeletionOutcome {
            instance_id: instance,
            status,
        });
    }

    Ok(outcomes)
}
