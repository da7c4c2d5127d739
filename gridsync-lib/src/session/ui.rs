//! Delegated UI event handling.
//!
//! The host forwards clicks and input changes from inside the grid as
//! [`UiEvent`]s. Each event kind has at most one bound handler; binding again
//! replaces the previous one.

use std::sync::Arc;

use super::TableSession;
use crate::grid::RowIndex;

/// What fired a column filter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTrigger {
    KeyUp,
    Change,
}

/// A user interaction inside the grid's wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Click on a row's expand/collapse control.
    RowToolClick { row: RowIndex },
    /// Input in the column filter row.
    ColumnFilterInput {
        index: usize,
        value: String,
        trigger: InputTrigger,
    },
    /// Either date input changed; carries both current values.
    DateInputChanged { date_from: String, date_to: String },
}

impl UiEvent {
    /// Returns the handler slot this event is routed to.
    pub fn kind(&self) -> UiEventKind {
        match self {
            Self::RowToolClick { .. } => UiEventKind::RowTool,
            Self::ColumnFilterInput { .. } => UiEventKind::ColumnFilter,
            Self::DateInputChanged { .. } => UiEventKind::DateInput,
        }
    }
}

/// Handler slots of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    RowTool,
    ColumnFilter,
    DateInput,
}

/// Handles a UI event; returns `true` if it acted on it.
pub type UiHandler = Arc<dyn Fn(&TableSession, &UiEvent) -> bool + Send + Sync>;

impl TableSession {
    /// Binds `handler` to `kind`, replacing any handler already bound.
    pub fn on<F>(&self, kind: UiEventKind, handler: F)
    where
        F: Fn(&TableSession, &UiEvent) -> bool + Send + Sync + 'static,
    {
        if let Ok(mut bindings) = self.inner.bindings.write() {
            if bindings.insert(kind, Arc::new(handler)).is_some() {
                log::debug!("{}: replaced {:?} handler", self.mount(), kind);
            }
        }
    }

    /// Unbinds the handler of `kind`.
    pub fn off(&self, kind: UiEventKind) -> bool {
        self.inner
            .bindings
            .write()
            .map(|mut bindings| bindings.remove(&kind).is_some())
            .unwrap_or(false)
    }

    /// Returns `true` if a handler is bound to `kind`.
    pub fn is_bound(&self, kind: UiEventKind) -> bool {
        self.inner
            .bindings
            .read()
            .map(|bindings| bindings.contains_key(&kind))
            .unwrap_or(false)
    }

    /// Unbinds every handler.
    pub(crate) fn teardown(&self) {
        if let Ok(mut bindings) = self.inner.bindings.write() {
            bindings.clear();
        }
    }

    /// Routes `event` to its handler. Returns `false` if nothing handled it.
    pub fn dispatch(&self, event: UiEvent) -> bool {
        let handler = match self.inner.bindings.read() {
            Ok(bindings) => bindings.get(&event.kind()).cloned(),
            Err(_) => None,
        };
        match handler {
            Some(handler) => handler(self, &event),
            None => false,
        }
    }
}
