//! PostgREST outbound adapter.
//!
//! Provides a reqwest implementation of the `DataPort` for hosted Postgres
//! projects that expose the PostgREST interface.

mod client;
mod query;

pub use client::PostgrestDataPort;
