//! Wire protocol between the grid session and its endpoint.
//!
//! - `GET <endpoint>?action=initialize` returns an [`InitPayload`].
//! - `GET <endpoint>?action=details&id=<key>` returns a [`DetailsResponse`].
//! - `POST <endpoint>` with a [`PageRequest`] returns a [`PageResponse`].

mod details;
mod init;
mod page;

pub use details::*;
pub use init::*;
pub use page::*;

/// Query value selecting the initialization action.
pub const ACTION_INITIALIZE: &str = "initialize";

/// Query value selecting the row details action.
pub const ACTION_DETAILS: &str = "details";
