//! Asynchronous row detail loading.

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use url::Url;

use crate::error::Error;
use crate::protocol::ACTION_DETAILS;
use crate::protocol::DetailsResponse;
use crate::session::TableSession;
use crate::transport::Transport;
use crate::transport::with_query;

/// Text shown while details are being fetched.
pub const LOADING_TEXT: &str = "Loading...";

/// Content state of a detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Loaded(String),
    Failed(String),
}

/// Placeholder mounted as a row's child content.
///
/// Starts in [`DetailState::Loading`] and is filled in when the fetch
/// completes. Clones share the same pane.
#[derive(Clone)]
pub struct DetailPane {
    inner: Arc<PaneInner>,
}

struct PaneInner {
    state: watch::Sender<DetailState>,
    task: Mutex<Option<AbortHandle>>,
}

impl DetailPane {
    /// Creates a pane in the loading state.
    pub fn loading() -> Self {
        Self {
            inner: Arc::new(PaneInner {
                state: watch::channel(DetailState::Loading).0,
                task: Mutex::new(None),
            }),
        }
    }

    /// Current content state.
    pub fn state(&self) -> DetailState {
        self.inner.state.borrow().clone()
    }

    /// Waits until the fetch has completed or failed.
    ///
    /// Never resolves for a pane whose fetch was cancelled; callers that may
    /// cancel should bound the wait.
    pub async fn settled(&self) -> DetailState {
        let mut state = self.inner.state.subscribe();
        match state.wait_for(|state| *state != DetailState::Loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Returns `true` while the fetch is pending.
    pub fn is_loading(&self) -> bool {
        self.state() == DetailState::Loading
    }

    /// Markup of the pane.
    pub fn html(&self) -> String {
        match self.state() {
            DetailState::Loading => format!(r#"<div class="loading">{LOADING_TEXT}</div>"#),
            DetailState::Loaded(html) => format!("<div>{html}</div>"),
            DetailState::Failed(_) => r#"<div class="error">Details unavailable</div>"#.to_string(),
        }
    }

    /// Aborts the pending fetch, if any.
    pub fn cancel(&self) {
        if let Ok(mut task) = self.inner.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }

    fn set_state(&self, state: DetailState) {
        self.inner.state.send_replace(state);
    }

    fn set_task(&self, handle: AbortHandle) {
        if let Ok(mut task) = self.inner.task.lock() {
            *task = Some(handle);
        }
    }
}

impl std::fmt::Debug for DetailPane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailPane").field("state", &self.state()).finish()
    }
}

/// Builds the details query for `row`: `action=details&id=<row[id_field]>`.
///
/// `id` is omitted when the row has no scalar value under `id_field`.
pub fn details_url(endpoint: &Url, row: &Value, id_field: &str) -> Url {
    let id = match row.get(id_field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    };
    match id {
        Some(id) => with_query(endpoint, &[("action", ACTION_DETAILS), ("id", &id)]),
        None => {
            log::warn!("row has no '{}' value, requesting details without id", id_field);
            with_query(endpoint, &[("action", ACTION_DETAILS)])
        }
    }
}

/// Returns a loading placeholder and fetches the row's details in the background.
pub fn load_row_details(
    session: &TableSession,
    row: &Value,
    endpoint: &Url,
    id_field: &str,
) -> DetailPane {
    let pane = DetailPane::loading();
    let url = details_url(endpoint, row, id_field);
    let transport = session.transport();
    let target = pane.clone();

    let handle = session.runtime().spawn(async move {
        match fetch_details(transport.as_ref(), &url).await {
            Ok(html) => target.set_state(DetailState::Loaded(html)),
            Err(e) => {
                log::error!("details fetch {} failed: {}", url, e);
                target.set_state(DetailState::Failed(e.to_string()));
            }
        }
    });
    pane.set_task(handle.abort_handle());
    pane
}

async fn fetch_details(transport: &dyn Transport, url: &Url) -> Result<String, Error> {
    let value = transport.get_json(url).await?;
    let response: DetailsResponse = serde_json::from_value(value)?;
    Ok(response.html)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn endpoint() -> Url {
        Url::parse("https://example.com/orders/table/").unwrap()
    }

    #[test]
    fn test_details_url_with_numeric_id() {
        let url = details_url(&endpoint(), &json!({"id": 42, "code": "A-1"}), "id");
        assert_eq!(url.query(), Some("action=details&id=42"));
    }

    #[test]
    fn test_details_url_with_custom_field() {
        let url = details_url(&endpoint(), &json!({"id": 42, "code": "A-1"}), "code");
        assert_eq!(url.query(), Some("action=details&id=A-1"));
    }

    #[test]
    fn test_details_url_without_id() {
        let url = details_url(&endpoint(), &json!({"code": "A-1"}), "id");
        assert_eq!(url.query(), Some("action=details"));
    }

    #[tokio::test]
    async fn test_settled_waits_for_fetch() {
        let pane = DetailPane::loading();
        let target = pane.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            target.set_state(DetailState::Loaded("<p>ok</p>".into()));
        });

        assert_eq!(pane.settled().await, DetailState::Loaded("<p>ok</p>".into()));
        assert!(!pane.is_loading());
    }

    #[tokio::test]
    async fn test_settled_after_failure() {
        let pane = DetailPane::loading();
        pane.set_state(DetailState::Failed("HTTP 500".into()));
        assert_eq!(pane.settled().await, DetailState::Failed("HTTP 500".into()));
    }

    #[test]
    fn test_loading_placeholder() {
        let pane = DetailPane::loading();
        assert!(pane.is_loading());
        assert_eq!(pane.html(), r#"<div class="loading">Loading...</div>"#);
    }
}
