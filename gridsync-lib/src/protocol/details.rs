//! Row details response.

use serde::Deserialize;
use serde::Serialize;

/// Response to `action=details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailsResponse {
    /// HTML fragment mounted into the row's detail pane.
    #[serde(default)]
    pub html: String,
}
