//! Common utilities for the Folio layout engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - deduplicated notices for unsupported style values
//! - **Logging** - `tracing` subscriber installation for hosts and tests

pub mod logging;
pub mod warning;
