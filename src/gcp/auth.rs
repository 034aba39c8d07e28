//! GCP Authentication
//!
//! Handles authentication using Application Default Credentials (ADC) and
//! resolves the ambient default project the way gcloud does.

use anyhow::{Context, Result};
use gcp_auth::TokenProvider;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// GCP credentials holder with token caching. The static variant carries a
/// fixed token for tests against mocked endpoints.
#[derive(Clone)]
pub enum GcpCredentials {
    Adc {
        provider: Arc<dyn TokenProvider>,
        token_cache: Arc<RwLock<Option<CachedToken>>>,
    },
    Static(String),
}

#[derive(Clone)]
pub struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GcpCredentials {
    /// Create new GCP credentials using Application Default Credentials
    pub async fn new() -> Result<Self> {
        let provider = gcp_auth::provider().await.context(
            "Failed to initialize GCP authentication. Run 'gcloud auth application-default login'",
        )?;

        Ok(Self::Adc {
            provider,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials that always yield the given token. Intended for tests
    /// against mocked endpoints.
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// Get an access token for API calls, reusing the cached token while it
    /// is still valid.
    pub async fn get_token(&self) -> Result<String> {
        let (provider, token_cache) = match self {
            Self::Static(token) => return Ok(token.clone()),
            Self::Adc {
                provider,
                token_cache,
            } => (provider, token_cache),
        };

        {
            let cache = token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = provider
            .token(DEFAULT_SCOPES)
            .await
            .context("Failed to get access token")?;

        let token_str = token.as_str().to_string();

        // gcp_auth does not expose a reliable expiry, so apply a
        // conservative TTL with the refresh buffer subtracted.
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        Ok(token_str)
    }
}

/// Get the gcloud configuration directory
fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // Default to ~/.config/gcloud on Linux/macOS
    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Read the ambient default project: environment variables first, then the
/// gcloud configuration files. Invalid project IDs are skipped.
pub fn get_default_project() -> Option<String> {
    for var in [
        "CLOUDSDK_CORE_PROJECT",
        "GOOGLE_CLOUD_PROJECT",
        "GCLOUD_PROJECT",
    ] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    let config_dir = get_gcloud_config_dir()?;

    if let Some(project) = read_project_property(&config_dir.join("properties")) {
        return Some(project);
    }

    // Fall back to the active named configuration.
    let active_config = std::fs::read_to_string(config_dir.join("active_config")).ok()?;
    let config_name = active_config.trim();

    // Reject names that could traverse outside the configurations dir.
    if !config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        tracing::warn!("Invalid characters in active_config name");
        return None;
    }

    let config_path = config_dir
        .join("configurations")
        .join(format!("config_{}", config_name));
    read_project_property(&config_path)
}

/// Scan a gcloud ini-style file for a `[core]`-section `project` value.
/// Top-of-file values (the `properties` file layout) count as `[core]`.
fn read_project_property(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let mut in_core_section = true;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_core_section = line == "[core]";
        } else if in_core_section && line.starts_with("project") && line.contains('=') {
            if let Some(value) = line.split('=').nth(1) {
                let project = value.trim().to_string();
                if validate_project_id(&project) {
                    return Some(project);
                }
            }
        }
    }

    None
}
