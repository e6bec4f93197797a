//! Input/output helpers.
//!
//! - data directory layout (`paths`)
//! - JSON ingest + row validation (`ingest`)
//! - JSON/CSV exports (`export`)
//! - published file schemas and readers (`series`)

pub mod export;
pub mod ingest;
pub mod paths;
pub mod series;

pub use export::*;
pub use ingest::*;
pub use paths::*;
pub use series::*;
