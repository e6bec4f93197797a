//! `katelect` library crate.
//!
//! The binary (`katelect`) is a thin wrapper around this library so that:
//!
//! - the aggregation and projection engines are testable without spawning processes
//! - a read-only serving layer can reuse the `store` lookups
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod projection;
pub mod report;
pub mod store;
