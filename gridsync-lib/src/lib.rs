//! Server-side grid session library
//!
//! Drives a server-side-processing data grid against a remote endpoint: fetches
//! the grid configuration, exchanges page requests, installs column and
//! date-range filters, expands row details and broadcasts lifecycle events.

pub mod config;
pub mod csrf;
pub mod error;
pub mod events;
pub mod filters;
pub mod grid;
pub mod protocol;
pub mod registry;
pub mod retry;
pub mod rows;
pub mod session;
pub mod transport;

mod controller;

pub use config::TableConfig;
pub use controller::*;
pub use error::Error;
pub use session::TableSession;
