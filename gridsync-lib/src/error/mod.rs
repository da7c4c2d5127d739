//! Error types

mod csrf;
mod session;
mod transport;

pub use csrf::*;
pub use session::*;
pub use transport::*;

/// Top-level error for grid session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange with the endpoint failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The anti-forgery token could not be obtained.
    #[error(transparent)]
    Csrf(#[from] CsrfError),

    /// The session or grid refused the operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The endpoint answered with JSON that does not match the protocol.
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}
