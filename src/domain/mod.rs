//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the party taxonomy and per-party maps (`Party`, `PartyMap`)
//! - raw and aggregated poll records (`RawPoll`, `DailyAggregate`, `SmoothedPoint`)
//! - projection records (`RidingBaseline`, `RidingProjection`, `SeatTally`)

pub mod party;
pub mod types;

pub use party::*;
pub use types::*;
