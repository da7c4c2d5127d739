//! In-memory grid with server-side processing semantics.
//!
//! Keeps paging, search and row state the way a browser grid would, without
//! rendering anything. Backs the CLI and the integration tests.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::Weak;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::DrawInfo;
use super::FooterInfo;
use super::GridApi;
use super::GridCallbacks;
use super::GridFactory;
use super::GridOptions;
use super::MountPoint;
use super::RowIndex;
use crate::error::Error;
use crate::error::SessionError;
use crate::protocol::ColumnDescriptor;
use crate::protocol::ColumnRequest;
use crate::protocol::OrderRequest;
use crate::protocol::PageRequest;
use crate::protocol::SearchSpec;
use crate::rows::DetailPane;

struct ChildSlot {
    pane: DetailPane,
    shown: bool,
}

struct HeadlessState {
    visible: bool,
    page: usize,
    page_length: i64,
    order: Vec<OrderRequest>,
    search: String,
    column_search: Vec<String>,
    /// Latest draw counter issued.
    draw: u64,
    rows: Vec<Value>,
    records_total: u64,
    records_filtered: u64,
    header_rows: Vec<String>,
    toolbar: String,
    extra_footer: Option<String>,
    children: HashMap<RowIndex, ChildSlot>,
    row_classes: HashMap<RowIndex, BTreeSet<String>>,
    initialized: bool,
    draws_requested: usize,
    column_adjustments: usize,
}

/// A grid that holds its state in memory.
pub struct HeadlessGrid {
    me: Weak<HeadlessGrid>,
    mount: MountPoint,
    options: GridOptions,
    columns: Vec<ColumnDescriptor>,
    callbacks: Arc<dyn GridCallbacks>,
    runtime: Handle,
    state: RwLock<HeadlessState>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl HeadlessGrid {
    /// Creates a grid; no draw is issued until asked.
    pub fn new(
        mount: MountPoint,
        options: GridOptions,
        callbacks: Arc<dyn GridCallbacks>,
        runtime: Handle,
    ) -> Arc<Self> {
        let columns = options.columns();
        let order = options
            .order()
            .into_iter()
            .map(|o| OrderRequest {
                column: o.0,
                dir: o.1,
            })
            .collect();
        let state = HeadlessState {
            visible: true,
            page: 0,
            page_length: options.page_length(),
            order,
            search: String::new(),
            column_search: vec![String::new(); columns.len()],
            draw: 0,
            rows: Vec::new(),
            records_total: 0,
            records_filtered: 0,
            header_rows: Vec::new(),
            toolbar: String::new(),
            extra_footer: None,
            children: HashMap::new(),
            row_classes: HashMap::new(),
            initialized: false,
            draws_requested: 0,
            column_adjustments: 0,
        };

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            mount,
            options,
            columns,
            callbacks,
            runtime,
            state: RwLock::new(state),
            pending: Mutex::new(Vec::new()),
        })
    }

    fn state(&self) -> RwLockReadGuard<'_, HeadlessState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, HeadlessState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Builds the request for the next draw and bumps the draw counter.
    pub fn next_request(&self) -> PageRequest {
        let mut state = self.state_mut();
        state.draw += 1;
        let start = if state.page_length > 0 {
            state.page * state.page_length as usize
        } else {
            0
        };
        PageRequest {
            draw: state.draw,
            start,
            length: state.page_length,
            search: SearchSpec::plain(state.search.clone()),
            order: state.order.clone(),
            columns: self
                .columns
                .iter()
                .zip(&state.column_search)
                .map(|(column, search)| ColumnRequest::from_descriptor(column, search.clone()))
                .collect(),
            extra: Default::default(),
        }
    }

    /// Runs one full draw cycle and waits for it.
    ///
    /// On failure the previously rendered page stays in place.
    pub async fn draw_now(&self) -> Result<DrawInfo, Error> {
        let request = self.next_request();
        let response = self.callbacks.exchange(request).await?;

        let (info, footer, rows, first) = {
            let mut state = self.state_mut();
            if response.draw != 0 && response.draw < state.draw {
                log::debug!(
                    "{}: discarding stale draw {} (latest {})",
                    self.mount,
                    response.draw,
                    state.draw
                );
                return Ok(Self::draw_info(&state));
            }

            state.rows = response.data;
            state.records_total = response.records_total;
            state.records_filtered = response.records_filtered;
            state.children.clear();
            state.row_classes.clear();

            let first = !state.initialized;
            state.initialized = true;

            let info = Self::draw_info(&state);
            let footer = FooterInfo {
                data: state.rows.clone(),
                start: info.start,
                end: info.start + state.rows.len(),
                display: (0..state.rows.len()).collect(),
            };
            (info, footer, state.rows.clone(), first)
        };

        for (index, data) in rows.iter().enumerate() {
            self.callbacks.row(RowIndex(index), data);
        }
        self.callbacks.footer(&footer);
        self.callbacks.draw(&info);
        if first {
            self.callbacks.init_complete();
        }
        Ok(info)
    }

    fn draw_info(state: &HeadlessState) -> DrawInfo {
        let start = if state.page_length > 0 {
            state.page * state.page_length as usize
        } else {
            0
        };
        DrawInfo {
            draw: state.draw,
            page: state.page,
            start,
            length: state.page_length,
            records_total: state.records_total,
            records_filtered: state.records_filtered,
        }
    }

    fn spawn_draw(&self) {
        self.state_mut().draws_requested += 1;
        let Some(me) = self.me.upgrade() else {
            return;
        };
        let handle = self.runtime.spawn(async move {
            if let Err(e) = me.draw_now().await {
                log::debug!("{}: draw failed: {}", me.mount, e);
            }
        });
        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    /// Waits until every spawned draw has finished.
    pub async fn idle(&self) {
        loop {
            let handles: Vec<_> = match self.pending.lock() {
                Ok(mut pending) => pending.drain(..).collect(),
                Err(_) => return,
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                let _ = handle.await;
            }
        }
    }

    /// Moves to `page` without drawing.
    pub fn set_page(&self, page: usize) {
        self.state_mut().page = page;
    }

    /// Sets the page length without drawing.
    pub fn set_page_length(&self, length: i64) {
        self.state_mut().page_length = length;
    }

    /// Sets the global search term without drawing.
    pub fn set_search(&self, value: impl Into<String>) {
        self.state_mut().search = value.into();
    }

    /// Replaces the sort entries without drawing.
    pub fn set_order(&self, order: Vec<OrderRequest>) {
        self.state_mut().order = order;
    }

    /// Shows or hides the grid.
    pub fn set_visible(&self, visible: bool) {
        self.state_mut().visible = visible;
    }

    /// Options the grid was built with.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Column descriptors the grid was built with.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Rows of the current page.
    pub fn rows(&self) -> Vec<Value> {
        self.state().rows.clone()
    }

    /// Filtered record count reported by the last applied draw.
    pub fn records_filtered(&self) -> u64 {
        self.state().records_filtered
    }

    /// Rows appended to the header.
    pub fn header_rows(&self) -> Vec<String> {
        self.state().header_rows.clone()
    }

    /// Content of the toolbar area.
    pub fn toolbar(&self) -> String {
        self.state().toolbar.clone()
    }

    /// Content of the auxiliary footer, if it has been created.
    pub fn extra_footer(&self) -> Option<String> {
        self.state().extra_footer.clone()
    }

    /// The row's child pane, shown or not.
    pub fn child(&self, row: RowIndex) -> Option<DetailPane> {
        self.state().children.get(&row).map(|slot| slot.pane.clone())
    }

    /// Returns `true` if the row carries `class`.
    pub fn row_has_class(&self, row: RowIndex, class: &str) -> bool {
        self.state()
            .row_classes
            .get(&row)
            .is_some_and(|classes| classes.contains(class))
    }

    /// Number of draws requested through [`GridApi`].
    pub fn draws_requested(&self) -> usize {
        self.state().draws_requested
    }

    /// Number of column width recalculations.
    pub fn column_adjustments(&self) -> usize {
        self.state().column_adjustments
    }
}

impl GridApi for HeadlessGrid {
    fn mount(&self) -> &MountPoint {
        &self.mount
    }

    fn is_visible(&self) -> bool {
        self.state().visible
    }

    fn draw(&self) {
        self.state_mut().page = 0;
        self.spawn_draw();
    }

    fn reload(&self, reset_paging: bool) {
        if reset_paging {
            self.state_mut().page = 0;
        }
        self.spawn_draw();
    }

    fn adjust_columns(&self) {
        self.state_mut().column_adjustments += 1;
    }

    fn page(&self) -> usize {
        self.state().page
    }

    fn column_search(&self, index: usize) -> String {
        self.state()
            .column_search
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    fn set_column_search(&self, index: usize, value: &str) {
        let mut state = self.state_mut();
        match state.column_search.get_mut(index) {
            Some(search) => *search = value.to_string(),
            None => log::warn!("{}: no column at index {}", self.mount, index),
        }
    }

    fn append_header_row(&self, html: &str) {
        self.state_mut().header_rows.push(html.to_string());
    }

    fn set_toolbar(&self, html: &str) {
        self.state_mut().toolbar = html.to_string();
    }

    fn set_extra_footer(&self, html: &str) {
        self.state_mut().extra_footer = Some(html.to_string());
    }

    fn row_data(&self, row: RowIndex) -> Option<Value> {
        self.state().rows.get(row.0).cloned()
    }

    fn is_child_shown(&self, row: RowIndex) -> bool {
        self.state()
            .children
            .get(&row)
            .is_some_and(|slot| slot.shown)
    }

    fn show_child(&self, row: RowIndex, pane: DetailPane) {
        self.state_mut()
            .children
            .insert(row, ChildSlot { pane, shown: true });
    }

    fn hide_child(&self, row: RowIndex) -> Option<DetailPane> {
        let mut state = self.state_mut();
        let slot = state.children.get_mut(&row)?;
        slot.shown = false;
        Some(slot.pane.clone())
    }

    fn set_row_class(&self, row: RowIndex, class: &str, enabled: bool) {
        let mut state = self.state_mut();
        let classes = state.row_classes.entry(row).or_default();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }
}

/// Factory producing [`HeadlessGrid`]s and keeping track of the live ones.
///
/// Grids are owned by their sessions; the factory only holds weak references.
#[derive(Default)]
pub struct HeadlessGridFactory {
    auto_draw: bool,
    grids: Mutex<Vec<Weak<HeadlessGrid>>>,
}

impl HeadlessGridFactory {
    /// Creates a factory whose grids wait for an explicit first draw.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes new grids issue their first draw right after construction.
    pub fn auto_draw(mut self, enabled: bool) -> Self {
        self.auto_draw = enabled;
        self
    }

    /// The grid built on `mount`, if any.
    pub fn grid(&self, mount: &MountPoint) -> Option<Arc<HeadlessGrid>> {
        self.grids
            .lock()
            .ok()?
            .iter()
            .rev()
            .filter_map(Weak::upgrade)
            .find(|grid| grid.mount() == mount)
    }

    /// Number of grids still alive.
    pub fn live_grids(&self) -> usize {
        self.grids
            .lock()
            .map(|grids| grids.iter().filter(|grid| grid.strong_count() > 0).count())
            .unwrap_or(0)
    }
}

impl GridFactory for HeadlessGridFactory {
    fn create(
        &self,
        mount: &MountPoint,
        options: GridOptions,
        callbacks: Arc<dyn GridCallbacks>,
    ) -> Result<Arc<dyn GridApi>, SessionError> {
        let runtime = Handle::try_current()
            .map_err(|e| SessionError::grid_construction(mount.id(), e.to_string()))?;
        let grid = HeadlessGrid::new(mount.clone(), options, callbacks, runtime);
        if let Ok(mut grids) = self.grids.lock() {
            grids.retain(|grid| grid.strong_count() > 0);
            grids.push(Arc::downgrade(&grid));
        }
        if self.auto_draw {
            grid.spawn_draw();
        }
        Ok(grid)
    }
}
