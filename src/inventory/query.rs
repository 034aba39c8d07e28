//! Query resolution.
//!
//! The single place that decides which provider call shape a listing uses:
//! zone-scoped when the caller named a zone, aggregated across the whole
//! project otherwise. Downstream code is shape-agnostic.

use crate::error::EngineError;
use serde::Deserialize;

/// Caller-supplied listing request, as decoded from the HTTP body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub project_id: Option<String>,
    pub zone: Option<String>,
    /// Retain only instances whose name ends with this suffix.
    pub domain: Option<String>,
}

/// Which provider call shape the resolved query uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// One listing call against a single zone.
    Zonal(String),
    /// One project-wide call returning per-zone groups.
    Aggregated,
}

/// Whether the calling operation requires a domain filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainRule {
    Optional,
    Required,
}

/// A fully resolved listing query, ready for the discovery engine.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub project_id: String,
    pub scope: ListScope,
    pub domain: Option<String>,
}

/// Resolve a caller query against the ambient default project.
///
/// Project resolution never fails: an absent project falls back to
/// `default_project`, which the server obtained once at startup. An absent
/// or empty domain is a validation error only under [`DomainRule::Required`].
pub fn resolve(
    config: &QueryConfig,
    default_project: &str,
    rule: DomainRule,
) -> Result<ResolvedQuery, EngineError> {
    let domain = config
        .domain
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    if rule == DomainRule::Required && domain.is_none() {
        return Err(EngineError::validation(
            "missing required 'domain' filter",
        ));
    }

    let project_id = config
        .project_id
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(default_project)
        .to_string();

    let scope = match config.zone.as_deref().filter(|z| !z.is_empty()) {
        Some(zone) => ListScope::Zonal(zone.to_string()),
        None => ListScope::Aggregated,
    };

    Ok(ResolvedQuery {
        project_id,
        scope,
        domain,
    })
}
