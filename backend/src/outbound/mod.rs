//! Outbound adapters implementing the `DataPort`.
//!
//! - **postgrest**: HTTP adapter for the hosted database.
//! - **memory**: in-process tables for tests and local runs.
//!
//! Adapters are thin translators between the filter algebra and the backend.
//! They contain no business logic.

pub mod memory;
pub mod postgrest;
