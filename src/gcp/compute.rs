//! Compute Engine provider client.
//!
//! Implements [`ComputeProvider`] over the Compute Engine REST API: builds
//! zonal/aggregated listing URLs, parses paginated responses, and issues
//! instance deletes. The API endpoint is injectable so tests can point at a
//! mock server.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use crate::inventory::provider::{
    AggregatedPage, ComputeProvider, InstanceGroup, InstancePage, RawInstance,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Production Compute Engine API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

/// Compute Engine client over an authenticated HTTP handle. Cheap to clone
/// and safe for concurrent reuse.
#[derive(Clone)]
pub struct GcpComputeProvider {
    credentials: GcpCredentials,
    http: GcpHttpClient,
    endpoint: String,
}

impl GcpComputeProvider {
    /// Create a client against the production endpoint using Application
    /// Default Credentials.
    pub async fn new() -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;
        Self::with_parts(credentials, DEFAULT_ENDPOINT)
    }

    /// Create a client from explicit credentials and endpoint.
    pub fn with_parts(credentials: GcpCredentials, endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            endpoint: endpoint.into(),
        })
    }

    /// Build a Compute Engine API URL under a project. `path` is a
    /// pre-built resource path; caller-supplied segments inside it must
    /// already be encoded.
    fn compute_url(&self, project: &str, path: &str) -> String {
        format!(
            "{}/projects/{}/{}",
            self.endpoint,
            urlencoding::encode(project),
            path
        )
    }

    /// Build a zonal instances URL.
    fn zonal_instances_url(&self, project: &str, zone: &str) -> String {
        self.compute_url(
            project,
            &format!("zones/{}/instances", urlencoding::encode(zone)),
        )
    }

    /// Build an aggregated (all zones) instances URL.
    fn aggregated_instances_url(&self, project: &str) -> String {
        self.compute_url(project, "aggregated/instances")
    }

    fn with_page_token(url: String, page_token: Option<&str>) -> String {
        match page_token {
            Some(token) => format!("{}?pageToken={}", url, urlencoding::encode(token)),
            None => url,
        }
    }

    async fn get(&self, url: &str) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }
}

/// Parse the `items` array of a zone-scoped listing response.
fn parse_instances(items: Option<&Value>) -> Result<Vec<RawInstance>> {
    items
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .cloned()
                .map(|item| {
                    serde_json::from_value(item).context("Failed to parse instance item")
                })
                .collect()
        })
        .unwrap_or_else(|| Ok(Vec::new()))
}

fn parse_page_token(response: &Value) -> Option<String> {
    response
        .get("nextPageToken")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_instance_page(response: Value) -> Result<InstancePage> {
    Ok(InstancePage {
        instances: parse_instances(response.get("items"))?,
        next_page_token: parse_page_token(&response),
    })
}

/// Parse an aggregated listing response. `items` maps zone keys
/// (`zones/us-central1-a`) to per-zone objects; zones with no instances
/// carry only a `warning` entry and yield an empty group.
fn parse_aggregated_page(response: Value) -> Result<AggregatedPage> {
    let mut groups = Vec::new();

    if let Some(items) = response.get("items").and_then(Value::as_object) {
        for (zone_key, zone_data) in items {
            groups.push(InstanceGroup {
                zone: zone_key.clone(),
                instances: parse_instances(zone_data.get("instances"))?,
            });
        }
    }

    Ok(AggregatedPage {
        next_page_token: parse_page_token(&response),
        groups,
    })
}

#[async_trait]
impl ComputeProvider for GcpComputeProvider {
    async fn list_zone_page(
        &self,
        project: &str,
        zone: &str,
        page_token: Option<&str>,
    ) -> Result<InstancePage> {
        let url =
            Self::with_page_token(self.zonal_instances_url(project, zone), page_token);
        parse_instance_page(self.get(&url).await?)
    }

    async fn list_aggregated_page(
        &self,
        project: &str,
        page_token: Option<&str>,
    ) -> Result<AggregatedPage> {
        let url = Self::with_page_token(self.aggregated_instances_url(project), page_token);
        parse_aggregated_page(self.get(&url).await?)
    }

    async fn delete_instance(&self, project: &str, zone: &str, instance: &str) -> Result<()> {
        let url = self.compute_url(
            project,
            &format!(
                "zones/{}/instances/{}",
                urlencoding::encode(zone),
                urlencoding::encode(instance)
            ),
        );
        let token = self.credentials.get_token().await?;
        self.http.delete(&url, &token).await?;
        Ok(())
    }
}
