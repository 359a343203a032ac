//! Query performance samples
//!
//! A [`PerfSample`] condenses one EXPLAIN run into the handful of signals the
//! recommendation engine and the CLI care about.

mod sample;

pub use sample::*;
