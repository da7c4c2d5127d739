//! Session error types

/// Errors raised by a table session or the grid it drives.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The grid library refused to construct a grid on the mount point.
    #[error("Grid construction failed on '{mount}': {message}")]
    GridConstruction { mount: String, message: String },

    /// The session has no grid attached yet.
    #[error("Grid not attached to session")]
    GridUnavailable,

    /// Post-initialization composition already ran for this session.
    #[error("Table session already composed")]
    AlreadyComposed,

    /// The endpoint reported an error inside an otherwise valid page response.
    #[error("Server error: {0}")]
    Server(String),

    /// The session was dropped while a request was pending.
    #[error("Table session closed")]
    Closed,

    /// The endpoint URL cannot carry query parameters.
    #[error("Endpoint URL cannot be a base: {0}")]
    InvalidEndpoint(String),
}

impl SessionError {
    /// Creates a new grid construction error.
    pub fn grid_construction(mount: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GridConstruction {
            mount: mount.into(),
            message: message.into(),
        }
    }
}
