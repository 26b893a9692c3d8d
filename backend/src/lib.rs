//! Product and category domain for the clothing marketplace.
//!
//! The crate is laid out hexagonally: `domain` holds entities, ports,
//! repositories and services; `outbound` implements the data port; `config`
//! and `telemetry` cover process start-up.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
