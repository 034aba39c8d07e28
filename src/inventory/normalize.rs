//! Resource name normalization.
//!
//! Compute Engine identifies zones and machine types by full resource URLs
//! (`https://.../projects/p/zones/us-central1-a`). Reports and responses use
//! only the trailing short form.

/// Sentinel for a missing or unparseable zone reference.
pub const UNKNOWN_ZONE: &str = "unknown_zone";

/// Sentinel for a missing or unparseable machine type reference.
pub const UNKNOWN_TYPE: &str = "unknown_type";

/// Extract the short name (final `/` segment) from a GCP resource path.
/// e.g., "projects/my-project/zones/us-central1-a" -> "us-central1-a"
///
/// Total over all inputs: an empty path, or one with no non-empty segment,
/// yields the call-site `fallback` instead of failing.
pub fn short_name(path: &str, fallback: &'static str) -> String {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// [`short_name`] over an optional field, as the provider returns them.
pub fn short_name_or(path: Option<&str>, fallback: &'static str) -> String {
    match path {
        Some(path) => short_name(path, fallback),
        None => fallback.to_string(),
    }
}
