//! Provider client seam.
//!
//! The discovery engine and deletion orchestrator only ever talk to this
//! trait. The production implementation ([`crate::gcp::compute`]) drives the
//! Compute Engine REST API; tests swap in an in-memory fake.

use async_trait::async_trait;
use serde::Deserialize;

/// One instance item as returned by the provider, before normalization.
///
/// Fields are optional because the provider occasionally omits them; the
/// normalizer supplies sentinels downstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInstance {
    pub name: Option<String>,
    /// Full resource URL, e.g. `.../projects/p/zones/us-central1-a`.
    pub zone: Option<String>,
    /// Full resource URL, e.g. `.../zones/us-central1-a/machineTypes/e2-medium`.
    pub machine_type: Option<String>,
    pub status: Option<String>,
}

/// One page of a zone-scoped listing.
#[derive(Debug, Clone, Default)]
pub struct InstancePage {
    pub instances: Vec<RawInstance>,
    /// Continuation token; `None` terminates the sequence.
    pub next_page_token: Option<String>,
}

/// One per-zone group inside an aggregated listing page. Zones with no
/// instances appear as empty groups.
#[derive(Debug, Clone)]
pub struct InstanceGroup {
    /// Provider zone key, e.g. `zones/us-central1-a`.
    pub zone: String,
    pub instances: Vec<RawInstance>,
}

/// One page of an aggregated (project-wide) listing. The continuation token
/// spans the whole aggregated result, not any single zone.
#[derive(Debug, Clone, Default)]
pub struct AggregatedPage {
    pub groups: Vec<InstanceGroup>,
    pub next_page_token: Option<String>,
}

/// Already-authenticated compute provider. Safe for concurrent reuse; the
/// engine injects only logical parameters.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Fetch one page of instances in a single zone.
    async fn list_zone_page(
        &self,
        project: &str,
        zone: &str,
        page_token: Option<&str>,
    ) -> anyhow::Result<InstancePage>;

    /// Fetch one page of the project-wide aggregated listing.
    async fn list_aggregated_page(
        &self,
        project: &str,
        page_token: Option<&str>,
    ) -> anyhow::Result<AggregatedPage>;

    /// Delete a single instance. One-shot; the orchestrator does not retry.
    async fn delete_instance(&self, project: &str, zone: &str, instance: &str)
        -> anyhow::Result<()>;
}
