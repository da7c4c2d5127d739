//! Lifecycle events broadcast by a table session.
//!
//! Page code subscribes to a session's events instead of hooking the grid
//! library directly.

use std::sync::Arc;
use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

use crate::grid::DrawInfo;
use crate::grid::FooterInfo;
use crate::grid::RowIndex;
use crate::session::TableSession;

/// An event emitted by a table session.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// The grid finished its first render.
    InitComplete,
    /// A draw cycle completed.
    Draw(DrawInfo),
    /// A row was rendered.
    Row { row: RowIndex, data: Value },
    /// The footer was rendered.
    Footer(FooterInfo),
    /// A page request failed; the grid kept its previous page.
    ExchangeFailed { draw: u64, message: String },
}

impl TableEvent {
    /// Returns the kind used to route this event to subscribers.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::InitComplete => EventKind::InitComplete,
            Self::Draw(_) => EventKind::Draw,
            Self::Row { .. } => EventKind::Row,
            Self::Footer(_) => EventKind::Footer,
            Self::ExchangeFailed { .. } => EventKind::ExchangeFailed,
        }
    }
}

/// Event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    InitComplete,
    Draw,
    Row,
    Footer,
    ExchangeFailed,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

/// Callback invoked with the emitting session and the event.
pub type Listener = Arc<dyn Fn(&TableSession, &TableEvent) + Send + Sync>;

/// Per-session subscriber list.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<(SubscriptionId, EventKind, Listener)>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`.
    pub fn subscribe(&self, kind: EventKind, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push((id, kind, listener));
        }
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut listeners) = self.listeners.write() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(sid, _, _)| *sid != id);
        listeners.len() != before
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .map(|listeners| listeners.iter().filter(|(_, k, _)| *k == kind).count())
            .unwrap_or(0)
    }

    /// Delivers `event` to every listener of its kind, in subscription order.
    ///
    /// Listeners run outside the lock and may subscribe or unsubscribe.
    pub fn emit(&self, session: &TableSession, event: &TableEvent) {
        let kind = event.kind();
        let targets: Vec<Listener> = match self.listeners.read() {
            Ok(listeners) => listeners
                .iter()
                .filter(|(_, k, _)| *k == kind)
                .map(|(_, _, listener)| listener.clone())
                .collect(),
            Err(_) => return,
        };
        log::trace!("{}: {:?} -> {} listener(s)", session.mount(), kind, targets.len());
        for listener in targets {
            listener(session, event);
        }
    }
}
