//! Table session: one mounted grid synchronised with one endpoint.

mod annotations;
mod exchange;
mod footer;
mod ui;

pub use annotations::*;
pub use ui::*;

pub(crate) use exchange::SessionCallbacks;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_json::Map;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use url::Url;
use uuid::Uuid;

use crate::config::TableConfig;
use crate::csrf::CsrfTokenSource;
use crate::error::SessionError;
use crate::events::EventBus;
use crate::events::EventKind;
use crate::events::Listener;
use crate::events::SubscriptionId;
use crate::events::TableEvent;
use crate::filters;
use crate::grid::GridApi;
use crate::grid::MountPoint;
use crate::protocol::InitPayload;
use crate::registry::TableRegistry;
use crate::rows;
use crate::transport::Transport;

/// A mounted grid and the state synchronised with its endpoint.
///
/// Cheap to clone; clones share the same session. The controller's registry
/// keeps the session alive until the table is destroyed, whether or not the
/// caller holds a handle.
#[derive(Clone)]
pub struct TableSession {
    pub(crate) inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    pub(crate) id: Uuid,
    pub(crate) mount: MountPoint,
    pub(crate) endpoint: Url,
    pub(crate) payload: InitPayload,
    pub(crate) config: Arc<TableConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) csrf: Arc<dyn CsrfTokenSource>,
    pub(crate) registry: TableRegistry,
    pub(crate) runtime: Handle,
    pub(crate) extra_data: Map<String, Value>,
    pub(crate) grid: OnceLock<Arc<dyn GridApi>>,
    pub(crate) date_range: RwLock<DateRange>,
    pub(crate) footer: RwLock<Option<String>>,
    pub(crate) events: EventBus,
    pub(crate) bindings: RwLock<HashMap<UiEventKind, UiHandler>>,
    /// One permit: page requests of a session never overlap.
    pub(crate) in_flight: Semaphore,
    pub(crate) composed: AtomicBool,
}

/// Everything a session needs besides its grid.
pub(crate) struct SessionParts {
    pub(crate) mount: MountPoint,
    pub(crate) endpoint: Url,
    pub(crate) payload: InitPayload,
    pub(crate) config: Arc<TableConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) csrf: Arc<dyn CsrfTokenSource>,
    pub(crate) registry: TableRegistry,
    pub(crate) runtime: Handle,
    pub(crate) extra_data: Map<String, Value>,
}

impl TableSession {
    pub(crate) fn new(parts: SessionParts) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                mount: parts.mount,
                endpoint: parts.endpoint,
                payload: parts.payload,
                config: parts.config,
                transport: parts.transport,
                csrf: parts.csrf,
                registry: parts.registry,
                runtime: parts.runtime,
                extra_data: parts.extra_data,
                grid: OnceLock::new(),
                date_range: RwLock::new(DateRange::default()),
                footer: RwLock::new(None),
                events: EventBus::new(),
                bindings: RwLock::new(HashMap::new()),
                in_flight: Semaphore::new(1),
                composed: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn attach_grid(&self, grid: Arc<dyn GridApi>) {
        if self.inner.grid.set(grid).is_err() {
            log::warn!("{}: grid already attached", self.inner.mount);
        }
    }

    /// Unique id of this session.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Element the grid is mounted on.
    pub fn mount(&self) -> &MountPoint {
        &self.inner.mount
    }

    /// Endpoint serving pages for this session.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Initialization payload the grid was built from.
    pub fn payload(&self) -> &InitPayload {
        &self.inner.payload
    }

    /// Configuration of the controller that created the session.
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    /// Caller data merged into every page request.
    pub fn extra_data(&self) -> &Map<String, Value> {
        &self.inner.extra_data
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        self.inner.transport.clone()
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    /// The grid driven by this session.
    pub fn grid(&self) -> Result<Arc<dyn GridApi>, SessionError> {
        self.inner
            .grid
            .get()
            .cloned()
            .ok_or(SessionError::GridUnavailable)
    }

    /// Full redraw; paging goes back to the first page.
    pub fn draw(&self) -> Result<(), SessionError> {
        self.grid()?.draw();
        Ok(())
    }

    /// Reloads the current page without moving.
    pub fn reload(&self) -> Result<(), SessionError> {
        self.grid()?.reload(false);
        Ok(())
    }

    /// Current date bounds.
    pub fn date_range(&self) -> DateRange {
        self.inner
            .date_range
            .read()
            .map(|guard| *guard)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    /// Replaces the date bounds sent with every following page request.
    ///
    /// Does not redraw.
    pub fn set_date_range(&self, range: DateRange) {
        if let Ok(mut guard) = self.inner.date_range.write() {
            *guard = range;
        }
    }

    /// Registers a listener for events of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: Fn(&TableSession, &TableEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.inner.events.subscribe(kind, listener)
    }

    /// Removes a listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    pub(crate) fn emit(&self, event: TableEvent) {
        self.inner.events.emit(self, &event);
    }

    /// Returns `true` once post-initialization composition has run.
    pub fn is_composed(&self) -> bool {
        self.inner.composed.load(Ordering::SeqCst)
    }

    /// Binds row tools, then installs column filters. Runs at most once.
    pub(crate) fn compose(&self, payload: &InitPayload, endpoint: &Url) -> Result<(), SessionError> {
        if self.inner.composed.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyComposed);
        }
        let id_field = self.inner.config.detail_id_field.clone();
        rows::bind_row_tools(self, endpoint, &id_field);
        filters::install_column_filters(self, payload)?;
        log::debug!("{}: composed", self.inner.mount);
        Ok(())
    }
}

impl std::fmt::Debug for TableSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSession")
            .field("id", &self.inner.id)
            .field("mount", &self.inner.mount)
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish()
    }
}
