//! GCP API interaction module
//!
//! Provides the authenticated Compute Engine client behind the engine's
//! provider seam.
//!
//! # Module Structure
//!
//! - [`auth`] - Application Default Credentials and the ambient default project
//! - [`http`] - HTTP utilities for REST API calls
//! - [`compute`] - Compute Engine provider client

pub mod auth;
pub mod compute;
pub mod http;
