//! Coordination across the live tables of a controller.

use std::sync::Arc;

use dashmap::DashMap;

use crate::grid::ElementRef;
use crate::grid::MountPoint;
use crate::session::TableSession;

/// Index of the sessions created by one controller, keyed by mount point.
///
/// The registry owns its sessions: a table stays live after the caller drops
/// its [`TableSession`] handle, until it is removed with
/// [`TableRegistry::unregister`].
#[derive(Clone, Default)]
pub struct TableRegistry {
    sessions: Arc<DashMap<MountPoint, TableSession>>,
}

impl TableRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, session: &TableSession) {
        if let Some(previous) = self
            .sessions
            .insert(session.mount().clone(), session.clone())
        {
            log::warn!(
                "{}: replacing session {} with {}",
                session.mount(),
                previous.id(),
                session.id()
            );
        }
    }

    /// Removes the session mounted on `mount`, returning it.
    pub fn unregister(&self, mount: &MountPoint) -> Option<TableSession> {
        self.sessions.remove(mount).map(|(_, session)| session)
    }

    /// The session mounted on `mount`.
    pub fn get(&self, mount: &MountPoint) -> Option<TableSession> {
        self.sessions.get(mount).map(|entry| entry.value().clone())
    }

    /// Live sessions, in no particular order.
    pub fn sessions(&self) -> Vec<TableSession> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Recalculates column widths of every visible grid. Returns how many were adjusted.
    pub fn adjust_columns(&self) -> usize {
        let mut adjusted = 0;
        for session in self.sessions() {
            if let Ok(grid) = session.grid() {
                if grid.is_visible() {
                    grid.adjust_columns();
                    adjusted += 1;
                }
            }
        }
        adjusted
    }

    /// Redraws every live grid. Returns how many were redrawn.
    pub fn redraw_all(&self) -> usize {
        let mut redrawn = 0;
        for session in self.sessions() {
            if session.draw().is_ok() {
                redrawn += 1;
            }
        }
        log::debug!("redrew {} table(s)", redrawn);
        redrawn
    }

    /// Session whose grid contains `element`.
    pub fn find(&self, element: &ElementRef) -> Option<TableSession> {
        self.sessions()
            .into_iter()
            .find(|session| session.grid().is_ok_and(|grid| grid.contains(element)))
    }

    /// Reloads the grid enclosing `element`, keeping its current page.
    ///
    /// Returns `false` if no grid encloses the element.
    pub fn redraw_in_place(&self, element: &ElementRef) -> bool {
        match self.find(element) {
            Some(session) => session.reload().is_ok(),
            None => {
                log::warn!("no table encloses {}", element.path());
                false
            }
        }
    }
}
