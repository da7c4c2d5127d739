//! Grid library capability.
//!
//! The rendering engine (layout, pagination widgets, sorting UI) is external.
//! The session drives it through [`GridApi`], builds it through
//! [`GridFactory`] and is called back through [`GridCallbacks`].

mod headless;
mod options;

pub use headless::*;
pub use options::*;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::error::SessionError;
use crate::protocol::PageRequest;
use crate::protocol::PageResponse;
use crate::rows::DetailPane;

/// Element a grid is mounted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountPoint {
    id: String,
}

impl MountPoint {
    /// Creates a mount point from an element id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a reference to a descendant element at `path` below the mount point.
    pub fn descendant(&self, path: impl AsRef<str>) -> ElementRef {
        ElementRef::new(format!("{}/{}", self.id, path.as_ref()))
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Reference to an element somewhere in the page, as a `/`-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    /// Creates an element reference from its path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the element path.
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this element is `mount` or lies beneath it.
    pub fn is_within(&self, mount: &MountPoint) -> bool {
        self.0 == mount.id()
            || self
                .0
                .strip_prefix(mount.id())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Position of a row on the currently rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowIndex(pub usize);

/// Paging state reported after each draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawInfo {
    pub draw: u64,
    pub page: usize,
    pub start: usize,
    pub length: i64,
    pub records_total: u64,
    pub records_filtered: u64,
}

/// Arguments of the grid's footer hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FooterInfo {
    /// Rows on the current page.
    pub data: Vec<Value>,
    pub start: usize,
    pub end: usize,
    /// Display order of the rendered rows.
    pub display: Vec<usize>,
}

/// Command/query surface of a constructed grid.
pub trait GridApi: Send + Sync {
    /// Element the grid is mounted on.
    fn mount(&self) -> &MountPoint;

    /// Returns `true` while the grid is displayed.
    fn is_visible(&self) -> bool;

    /// Returns `true` if `element` is inside this grid.
    fn contains(&self, element: &ElementRef) -> bool {
        element.is_within(self.mount())
    }

    /// Full redraw: resets paging and requests a new page.
    fn draw(&self);

    /// Reloads data; keeps the current page unless `reset_paging`.
    fn reload(&self, reset_paging: bool);

    /// Recalculates column widths.
    fn adjust_columns(&self);

    /// Current page index (zero based).
    fn page(&self) -> usize;

    /// Current search term of column `index`.
    fn column_search(&self, index: usize) -> String;

    /// Sets the search term of column `index` without drawing.
    fn set_column_search(&self, index: usize, value: &str);

    /// Appends a row to the grid header.
    fn append_header_row(&self, html: &str);

    /// Replaces the content of the toolbar area.
    fn set_toolbar(&self, html: &str);

    /// Creates the auxiliary footer if needed and replaces its content.
    fn set_extra_footer(&self, html: &str);

    /// Data of a rendered row.
    fn row_data(&self, row: RowIndex) -> Option<Value>;

    /// Returns `true` if the row's child pane is shown.
    fn is_child_shown(&self, row: RowIndex) -> bool;

    /// Attaches `pane` as the row's child and reveals it.
    fn show_child(&self, row: RowIndex, pane: DetailPane);

    /// Hides the row's child pane, returning it.
    fn hide_child(&self, row: RowIndex) -> Option<DetailPane>;

    /// Adds or removes a marker class on a rendered row.
    fn set_row_class(&self, row: RowIndex, class: &str, enabled: bool);
}

/// Hooks the grid invokes on its session.
#[async_trait]
pub trait GridCallbacks: Send + Sync {
    /// Data exchange for one draw cycle.
    async fn exchange(&self, request: PageRequest) -> Result<PageResponse, Error>;

    /// First render completed.
    fn init_complete(&self);

    /// A draw completed.
    fn draw(&self, info: &DrawInfo);

    /// A row was rendered.
    fn row(&self, row: RowIndex, data: &Value);

    /// The footer was rendered.
    fn footer(&self, info: &FooterInfo);
}

/// Constructs grids.
pub trait GridFactory: Send + Sync {
    /// Builds a grid on `mount`. The grid issues its first draw on its own.
    fn create(
        &self,
        mount: &MountPoint,
        options: GridOptions,
        callbacks: Arc<dyn GridCallbacks>,
    ) -> Result<Arc<dyn GridApi>, SessionError>;
}
