//! Recommendation Engine
//!
//! Four independent rule passes (denormalize, normalize, index, partition)
//! run in that order over per-table metrics and optional performance samples.
//! The combined list is ranked by confidence, highest first, keeping pass
//! order on ties.

mod config;
mod engine;
mod recommendation;

pub use config::*;
pub use engine::*;
pub use recommendation::*;
