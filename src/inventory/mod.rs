//! Instance directory & lifecycle engine.
//!
//! # Module Structure
//!
//! - [`normalize`] - resource URL to short-name normalization
//! - [`query`] - query resolution (zone-scoped vs aggregated)
//! - [`discovery`] - paginated instance discovery
//! - [`deletion`] - single and bulk deletion orchestration
//! - [`service`] - the façade combining the above
//! - [`provider`] - the provider client seam

pub mod deletion;
pub mod discovery;
pub mod normalize;
pub mod provider;
pub mod query;
pub mod service;

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory provider fake shared by the engine's unit tests.

    use super::provider::{
        AggregatedPage, ComputeProvider, InstanceGroup, InstancePage, RawInstance,
    };
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Scripted compute provider. Pages are served in insertion order and
    /// chained with numeric continuation tokens; an error entry makes the
    /// corresponding page fetch fail.
    #[derive(Default)]
    pub struct FakeCompute {
        zone_pages: Vec<Result<Vec<RawInstance>, String>>,
        aggregated_pages: Vec<Result<Vec<InstanceGroup>, String>>,
        failing_deletes: HashSet<String>,
        deleted: Mutex<Vec<String>>,
    }

    fn raw(zone: Option<String>, name: &str, status: &str) -> RawInstance {
        RawInstance {
            name: Some(name.to_string()),
            zone,
            machine_type: Some(
                "projects/fixture/zones/fixture/machineTypes/e2-medium".to_string(),
            ),
            status: Some(status.to_string()),
        }
    }

    impl FakeCompute {
        pub fn new() -> Self {
            Self::default()
        }

        /// Append one zone-scoped page of `(name, status)` instances.
        pub fn with_zone_page(mut self, zone: &str, instances: &[(&str, &str)]) -> Self {
            let items = instances
                .iter()
                .map(|(name, status)| {
                    raw(Some(format!("projects/fixture/zones/{zone}")), name, status)
                })
                .collect();
            self.zone_pages.push(Ok(items));
            self
        }

        /// Append one zone-scoped page of pre-built raw items.
        pub fn with_raw_zone_page(mut self, _zone: &str, instances: Vec<RawInstance>) -> Self {
            self.zone_pages.push(Ok(instances));
            self
        }

        /// Append one aggregated page of `(zone_key, instances)` groups.
        pub fn with_aggregated_groups(mut self, groups: &[(&str, &[(&str, &str)])]) -> Self {
            let groups = groups
                .iter()
                .map(|(zone, instances)| InstanceGroup {
                    zone: zone.to_string(),
                    instances: instances
                        .iter()
                        .map(|(name, status)| raw(None, name, status))
                        .collect(),
                })
                .collect();
            self.aggregated_pages.push(Ok(groups));
            self
        }

        /// Make the next listing page (zonal and aggregated alike) fail.
        pub fn with_list_error(mut self, message: &str) -> Self {
            self.zone_pages.push(Err(message.to_string()));
            self.aggregated_pages.push(Err(message.to_string()));
            self
        }

        /// Make deletion of the named instance fail.
        pub fn with_delete_failure(mut self, instance: &str) -> Self {
            self.failing_deletes.insert(instance.to_string());
            self
        }

        /// `project/zone/instance` triples deleted so far, in call order.
        pub fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    fn page_index(token: Option<&str>) -> anyhow::Result<usize> {
        match token {
            Some(token) => Ok(token.parse()?),
            None => Ok(0),
        }
    }

    fn next_token(index: usize, total: usize) -> Option<String> {
        (index + 1 < total).then(|| (index + 1).to_string())
    }

    #[async_trait]
    impl ComputeProvider for FakeCompute {
        async fn list_zone_page(
            &self,
            _project: &str,
            _zone: &str,
            page_token: Option<&str>,
        ) -> anyhow::Result<InstancePage> {
            let index = page_index(page_token)?;
            match self.zone_pages.get(index) {
                Some(Ok(instances)) => Ok(InstancePage {
                    instances: instances.clone(),
                    next_page_token: next_token(index, self.zone_pages.len()),
                }),
                Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
                None => Err(anyhow::anyhow!("no scripted page {index}")),
            }
        }

        async fn list_aggregated_page(
            &self,
            _project: &str,
            page_token: Option<&str>,
        ) -> anyhow::Result<AggregatedPage> {
            let index = page_index(page_token)?;
            match self.aggregated_pages.get(index) {
                Some(Ok(groups)) => Ok(AggregatedPage {
                    groups: groups.clone(),
                    next_page_token: next_token(index, self.aggregated_pages.len()),
                }),
                Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
                None => Err(anyhow::anyhow!("no scripted page {index}")),
            }
        }

        async fn delete_instance(
            &self,
            project: &str,
            zone: &str,
            instance: &str,
        ) -> anyhow::Result<()> {
            if self.failing_deletes.contains(instance) {
                anyhow::bail!("API request failed: 404 Not Found");
            }
            self.deleted
                .lock()
                .unwrap()
                .push(format!("{project}/{zone}/{instance}"));
            Ok(())
        }
    }
}
