//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CACHE_CONTROL;
use reqwest::header::COOKIE;
use serde_json::Value;
use url::Url;

use super::FormFields;
use super::Headers;
use super::Transport;
use crate::error::TransportError;
use crate::retry::RetryConfig;

/// Marks requests as same-origin XHR; server-side grid views reject others.
const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// HTTP transport over `reqwest`.
///
/// Cheap to clone; the underlying connection pool is shared.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridsync_lib::retry::RetryConfig;
/// use gridsync_lib::transport::HttpTransport;
///
/// let transport = HttpTransport::new()
///     .timeout(Duration::from_secs(15))
///     .retry(RetryConfig::bounded(2))
///     .cookies("csrftoken=abc; sessionid=xyz");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
    retry: RetryConfig,
    cookies: Option<String>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport with a default client, no timeout and no retry.
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a transport around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
            retry: RetryConfig::no_retry(),
            cookies: None,
        }
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sends `cookies` as the `Cookie` header of every request.
    pub fn cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    /// Sends a request, retrying transient failures per the retry policy.
    async fn request(
        &self,
        method: Method,
        url: &Url,
        headers: &Headers,
        form: Option<&FormFields>,
    ) -> Result<Value, TransportError> {
        let mut attempts = 0;
        let mut delay = self.retry.initial_delay;

        loop {
            let result = self.send_once(method.clone(), url, headers, form).await;

            let status = match &result {
                Ok(_) => return result,
                Err(TransportError::Http { status, .. }) => Some(*status),
                Err(TransportError::Network(_)) | Err(TransportError::Timeout(_)) => None,
                Err(_) => return result,
            };

            if !self.retry.should_retry(status, attempts) {
                return result;
            }

            log::warn!(
                "{} {} failed (attempt {}), retrying in {:?}",
                method,
                url,
                attempts + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            delay = self.retry.next_delay(delay);
            attempts += 1;
        }
    }

    /// Single attempt without retry logic.
    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        headers: &Headers,
        form: Option<&FormFields>,
    ) -> Result<Value, TransportError> {
        let mut request = self
            .client
            .request(method, url.clone())
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .header(ACCEPT, "application/json");

        if let Some(cookies) = &self.cookies {
            request = request.header(COOKIE, cookies.as_str());
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some(form) = form {
            request = request.header(CACHE_CONTROL, "no-cache").form(form);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(TransportError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| TransportError::parse_with_body(e.to_string(), body))
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => TransportError::Timeout(timeout),
            _ => TransportError::Network(err),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        log::debug!("GET {}", url);
        self.request(Method::GET, url, &Vec::new(), None).await
    }

    async fn post_form(
        &self,
        url: &Url,
        headers: &Headers,
        form: &FormFields,
    ) -> Result<Value, TransportError> {
        log::debug!("POST {} ({} fields)", url, form.len());
        self.request(Method::POST, url, headers, Some(form)).await
    }
}
