//! vminv - HTTP service for inventorying and managing Google Compute Engine
//! instances.
//!
//! The [`inventory`] module is the engine: query resolution, paginated
//! discovery, normalization, and deletion orchestration. [`gcp`] provides the
//! authenticated provider client behind the engine's seam, and [`server`]
//! wires both behind an axum router.

pub mod error;
pub mod gcp;
pub mod inventory;
pub mod server;
