//! Riding projection.
//!
//! Responsibilities:
//!
//! - pick each riding's historical baseline and the national anchor (`baseline`)
//! - apply proportional swing per riding, in parallel (`swing`)
//! - reduce riding winners to seat counts and a verdict (`tally`)

pub mod baseline;
pub mod swing;
pub mod tally;

pub use baseline::*;
pub use swing::*;
pub use tally::*;
