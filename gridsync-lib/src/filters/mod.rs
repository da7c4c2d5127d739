//! Column and date-range filter installers.

mod column;
mod date_range;

pub use column::*;
pub use date_range::*;
