//! SQL plan records

mod sql_plan;

#[cfg(test)]
mod tests;

pub use sql_plan::*;
