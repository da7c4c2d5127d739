//! Expandable row details.

mod details;
mod tools;

pub use details::*;
pub use tools::*;
