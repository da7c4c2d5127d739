//! Anti-forgery token lookup.
//!
//! Page requests carry the token read from the ambient cookie store in a
//! request header. The header and cookie names come from
//! [`TableConfig`](crate::TableConfig).

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CsrfError;

/// Reads the value of the cookie `name` from a `Cookie` header string.
///
/// Returns `None` when the cookie is absent or appears more than once.
///
/// ```
/// use gridsync_lib::csrf::cookie_value;
///
/// let cookies = "sessionid=abc; csrftoken=Xy12; theme=dark";
/// assert_eq!(cookie_value(cookies, "csrftoken"), Some("Xy12"));
/// assert_eq!(cookie_value(cookies, "token"), None);
/// ```
pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    let mut found = None;
    for pair in cookies.split(';') {
        let pair = pair.trim_start();
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key == name {
            if found.is_some() {
                return None;
            }
            found = Some(value);
        }
    }
    found
}

/// Source of the anti-forgery token attached to page requests.
///
/// The session asks for the token before every page request, so
/// implementations may return a value that changes over the session's life.
#[async_trait]
pub trait CsrfTokenSource: Send + Sync {
    /// Returns the token stored under the cookie `name`.
    async fn token(&self, name: &str) -> Result<String, CsrfError>;
}

/// Token source backed by an ambient `Cookie` header string.
///
/// # Example
///
/// ```
/// use gridsync_lib::csrf::CookieJarToken;
///
/// let jar = CookieJarToken::new("csrftoken=abc123");
/// jar.set_cookies("csrftoken=rotated");
/// ```
#[derive(Debug, Default)]
pub struct CookieJarToken {
    cookies: RwLock<String>,
}

impl CookieJarToken {
    /// Creates a jar from a `Cookie` header string.
    pub fn new(cookies: impl Into<String>) -> Self {
        Self {
            cookies: RwLock::new(cookies.into()),
        }
    }

    /// Replaces the stored cookies.
    pub fn set_cookies(&self, cookies: impl Into<String>) {
        if let Ok(mut guard) = self.cookies.write() {
            *guard = cookies.into();
        }
    }

    /// Returns a copy of the stored cookies.
    pub fn cookies(&self) -> String {
        self.cookies
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl CsrfTokenSource for CookieJarToken {
    async fn token(&self, name: &str) -> Result<String, CsrfError> {
        let cookies = self.cookies();
        match cookie_value(&cookies, name) {
            Some(value) => Ok(value.to_string()),
            None if cookies
                .split(';')
                .any(|pair| pair.trim_start().starts_with(&format!("{name}="))) =>
            {
                Err(CsrfError::Ambiguous {
                    name: name.to_string(),
                })
            }
            None => Err(CsrfError::missing(name)),
        }
    }
}

/// A token source that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticCsrfToken {
    token: String,
}

impl StaticCsrfToken {
    /// Creates a new static token source.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CsrfTokenSource for StaticCsrfToken {
    async fn token(&self, _name: &str) -> Result<String, CsrfError> {
        Ok(self.token.clone())
    }
}
