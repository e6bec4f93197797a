//! Poll aggregation.
//!
//! Responsibilities:
//!
//! - clean and average one region's raw polls per date (`normalizer`)
//! - smooth the daily series and renormalize it to 100 (`smoothing`)

pub mod normalizer;
pub mod smoothing;

pub use normalizer::*;
pub use smoothing::*;
