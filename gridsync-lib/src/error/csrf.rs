//! Anti-forgery token error types

/// Errors raised while reading the anti-forgery token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CsrfError {
    /// No cookie with the requested name is present.
    #[error("Cookie '{name}' not found")]
    Missing { name: String },

    /// The cookie is present more than once, so its value is ambiguous.
    #[error("Cookie '{name}' is ambiguous")]
    Ambiguous { name: String },
}

impl CsrfError {
    /// Creates a new missing cookie error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }
}
