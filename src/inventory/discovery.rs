//! Instance discovery engine.
//!
//! Executes a resolved query against the provider, drains every continuation
//! token, and yields a flat list of normalized [`InstanceRecord`]s. Listing
//! is all-or-nothing: a provider error anywhere discards pages already
//! collected and aborts the whole operation.

use super::normalize::{short_name, short_name_or, UNKNOWN_TYPE, UNKNOWN_ZONE};
use super::provider::{ComputeProvider, RawInstance};
use super::query::{ListScope, ResolvedQuery};
use crate::error::EngineError;
use serde::Serialize;

/// Lifecycle state of an instance as reported by Compute Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Stopped,
    Terminated,
    Suspending,
    Suspended,
    /// Missing or unrecognized provider status.
    Unknown,
}

impl InstanceStatus {
    pub fn parse(status: Option<&str>) -> Self {
        match status {
            Some("PROVISIONING") => Self::Provisioning,
            Some("STAGING") => Self::Staging,
            Some("RUNNING") => Self::Running,
            Some("STOPPING") => Self::Stopping,
            Some("STOPPED") => Self::Stopped,
            Some("TERMINATED") => Self::Terminated,
            Some("SUSPENDING") => Self::Suspending,
            Some("SUSPENDED") => Self::Suspended,
            _ => Self::Unknown,
        }
    }
}

/// Normalized snapshot of one instance at query time. Never mutated, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceRecord {
    pub name: String,
    /// Short zone name, e.g. `us-central1-a`.
    pub zone: String,
    /// Short machine type name, e.g. `e2-medium`.
    pub machine_type: String,
    pub status: InstanceStatus,
}

impl InstanceRecord {
    /// Build a record from one raw provider item. `group_zone` is the
    /// per-zone key of an aggregated listing, used when the item itself
    /// omits its zone URL.
    fn from_raw(raw: &RawInstance, group_zone: Option<&str>) -> Self {
        let zone = match raw.zone.as_deref() {
            Some(zone) => short_name(zone, UNKNOWN_ZONE),
            None => short_name_or(group_zone, UNKNOWN_ZONE),
        };
        Self {
            name: raw.name.clone().unwrap_or_default(),
            zone,
            machine_type: short_name_or(raw.machine_type.as_deref(), UNKNOWN_TYPE),
            status: InstanceStatus::parse(raw.status.as_deref()),
        }
    }
}

/// True when `name` matches the domain-suffix filter: an exact, byte-wise,
/// case-sensitive suffix match. No wildcard semantics.
pub fn domain_matches(name: &str, domain: &str) -> bool {
    name.ends_with(domain)
}

/// Run the resolved query to completion and return every matching record.
///
/// Provider order is preserved: deterministic within a zone, while zones of
/// an aggregated listing interleave in provider-defined order.
pub async fn discover(
    provider: &dyn ComputeProvider,
    query: &ResolvedQuery,
) -> Result<Vec<InstanceRecord>, EngineError> {
    let records = match &query.scope {
        ListScope::Zonal(zone) => discover_zonal(provider, &query.project_id, zone).await,
        ListScope::Aggregated => discover_aggregated(provider, &query.project_id).await,
    }
    .map_err(EngineError::provider)?;

    tracing::debug!(
        project = %query.project_id,
        total = records.len(),
        domain = ?query.domain,
        "discovery drained"
    );

    Ok(match &query.domain {
        Some(domain) => records
            .into_iter()
            .filter(|record| domain_matches(&record.name, domain))
            .collect(),
        None => records,
    })
}

async fn discover_zonal(
    provider: &dyn ComputeProvider,
    project: &str,
    zone: &str,
) -> anyhow::Result<Vec<InstanceRecord>> {
    let mut records = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = provider
            .list_zone_page(project, zone, page_token.as_deref())
            .await?;
        records.extend(
            page.instances
                .iter()
                .map(|raw| InstanceRecord::from_raw(raw, Some(zone))),
        );

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(records)
}

async fn discover_aggregated(
    provider: &dyn ComputeProvider,
    project: &str,
) -> anyhow::Result<Vec<InstanceRecord>> {
    let mut records = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = provider
            .list_aggregated_page(project, page_token.as_deref())
            .await?;
        // Zones with an empty instance set contribute nothing.
        for group in &page.groups {
            records.extend(
                group
                    .instances
                    .iter()
                    .map(|raw| InstanceRecord::from_raw(raw, Some(&group.zone))),
            );
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(records)
}
