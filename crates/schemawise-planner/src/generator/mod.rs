//! Plan generation
//!
//! One generator per [`Action`](schemawise_analyzer::Action); dispatch is an
//! exhaustive match, so adding an action forces a generator.

mod config;
mod denormalize;
mod index;
mod normalize;
mod partition;
mod planner;

#[cfg(test)]
mod tests;

pub use config::*;
pub use planner::*;
