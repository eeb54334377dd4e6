//! # API Shared
//!
//! Wire types shared by the search backend and its clients.
//!
//! Contains:
//! - request/response bodies with OpenAPI schemas (`types` module)
//! - the `HealthService` used by the REST server
//!
//! The search response shape (`{ results: [{ pageid, title, snippet }] }`) is what
//! `wikinav-core`'s `HttpSearchBackend` decodes.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
