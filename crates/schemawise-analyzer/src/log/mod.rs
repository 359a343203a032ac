//! Query log analysis
//!
//! Turns a raw statement log (one statement per line) into [`QueryStatistics`].

mod analyzer;
mod source;

pub use analyzer::*;
pub use source::*;
