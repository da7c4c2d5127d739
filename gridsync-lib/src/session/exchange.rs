//! Grid hooks and the per-draw data exchange.

use std::sync::Arc;
use std::sync::Weak;

use async_trait::async_trait;
use serde_json::Value;

use super::DATE_FROM_FIELD;
use super::DATE_TO_FIELD;
use super::SessionInner;
use super::TableSession;
use crate::error::Error;
use crate::error::SessionError;
use crate::events::TableEvent;
use crate::grid::DrawInfo;
use crate::grid::FooterInfo;
use crate::grid::GridCallbacks;
use crate::grid::RowIndex;
use crate::protocol::PageRequest;
use crate::protocol::PageResponse;
use crate::transport::encode_form;

/// Hooks handed to the grid; holds the session weakly.
pub(crate) struct SessionCallbacks {
    session: Weak<SessionInner>,
}

impl SessionCallbacks {
    pub(crate) fn new(session: &TableSession) -> Arc<Self> {
        Arc::new(Self {
            session: Arc::downgrade(&session.inner),
        })
    }

    fn session(&self) -> Option<TableSession> {
        self.session.upgrade().map(TableSession::from_inner)
    }
}

#[async_trait]
impl GridCallbacks for SessionCallbacks {
    async fn exchange(&self, request: PageRequest) -> Result<PageResponse, Error> {
        let session = self.session().ok_or(SessionError::Closed)?;
        session.exchange(request).await
    }

    fn init_complete(&self) {
        let Some(session) = self.session() else {
            return;
        };
        session.emit(TableEvent::InitComplete);

        let delay = session.config().settle_delay;
        let registry = session.inner.registry.clone();
        let weak = self.session.clone();
        session.runtime().spawn(async move {
            tokio::time::sleep(delay).await;
            registry.adjust_columns();
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let session = TableSession::from_inner(inner);
            let payload = session.payload().clone();
            let endpoint = session.endpoint().clone();
            if let Err(e) = session.compose(&payload, &endpoint) {
                log::debug!("{}: composition skipped: {}", session.mount(), e);
            }
        });
    }

    fn draw(&self, info: &DrawInfo) {
        if let Some(session) = self.session() {
            session.emit(TableEvent::Draw(info.clone()));
        }
    }

    fn row(&self, row: RowIndex, data: &Value) {
        if let Some(session) = self.session() {
            session.emit(TableEvent::Row {
                row,
                data: data.clone(),
            });
        }
    }

    fn footer(&self, info: &FooterInfo) {
        if let Some(session) = self.session() {
            session.emit(TableEvent::Footer(info.clone()));
        }
    }
}

impl TableSession {
    /// Sends one page request and returns the page for the grid.
    ///
    /// Adds the date bounds and caller data to `request`, attaches the
    /// anti-forgery token and refreshes the footer when the response carries
    /// a message. Requests of one session are serialised; a second call waits
    /// for the first to finish. Failures are logged and broadcast as
    /// [`TableEvent::ExchangeFailed`], never retried here.
    pub async fn exchange(&self, mut request: PageRequest) -> Result<PageResponse, Error> {
        let _permit = self
            .inner
            .in_flight
            .acquire()
            .await
            .map_err(|_| SessionError::Closed)?;

        let range = self.date_range();
        request.set_extra(DATE_FROM_FIELD, range.from_param());
        request.set_extra(DATE_TO_FIELD, range.to_param());
        for (key, value) in self.extra_data() {
            request.set_extra(key.clone(), value.clone());
        }

        log::debug!(
            "{}: page request draw={} start={} length={}",
            self.mount(),
            request.draw,
            request.start,
            request.length
        );

        match self.send_page_request(&request).await {
            Ok(response) => {
                log::debug!(
                    "{}: page response draw={} rows={} filtered={}",
                    self.mount(),
                    response.draw,
                    response.data.len(),
                    response.records_filtered
                );
                if let Some(message) = &response.footer_message {
                    self.write_footer(message);
                }
                Ok(response)
            }
            Err(e) => {
                log::error!("{}: page request {} failed: {}", self.mount(), request.draw, e);
                self.emit(TableEvent::ExchangeFailed {
                    draw: request.draw,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn send_page_request(&self, request: &PageRequest) -> Result<PageResponse, Error> {
        let form = encode_form(&serde_json::to_value(request)?);

        let config = self.config();
        let mut headers = Vec::new();
        match self.inner.csrf.token(&config.csrf_cookie_name).await {
            Ok(token) => headers.push((config.csrf_header_name.clone(), token)),
            Err(e) => log::warn!(
                "{}: page request sent without anti-forgery token: {}",
                self.mount(),
                e
            ),
        }

        let value = self
            .inner
            .transport
            .post_form(self.endpoint(), &headers, &form)
            .await?;
        let response: PageResponse = serde_json::from_value(value)?;

        if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
            return Err(SessionError::Server(error.to_string()).into());
        }
        Ok(response)
    }
}
