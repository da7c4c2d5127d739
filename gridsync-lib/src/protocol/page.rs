//! Page request and response exchanged on every draw.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::ColumnDescriptor;

/// Sort direction of an ordered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A search term, global or per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub regex: bool,
}

impl SearchSpec {
    /// Creates a plain (non-regex) search term.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }
}

/// Per-column part of a page request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRequest {
    pub data: Value,
    #[serde(default)]
    pub name: String,
    pub searchable: bool,
    pub orderable: bool,
    pub search: SearchSpec,
}

impl ColumnRequest {
    /// Builds the request entry for `column` with its current search term.
    pub fn from_descriptor(column: &ColumnDescriptor, search: impl Into<String>) -> Self {
        Self {
            data: column
                .data
                .as_ref()
                .map(|d| Value::String(d.clone()))
                .unwrap_or(Value::Null),
            name: column.name.clone().unwrap_or_default(),
            searchable: column.searchable,
            orderable: column.orderable,
            search: SearchSpec::plain(search),
        }
    }
}

/// Sort entry of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub column: usize,
    pub dir: SortDirection,
}

/// Grid-native page request, plus session annotations merged into `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Draw counter; echoed back by the endpoint.
    pub draw: u64,
    /// Offset of the first row.
    pub start: usize,
    /// Page length; `-1` requests every row.
    pub length: i64,
    pub search: SearchSpec,
    #[serde(default)]
    pub order: Vec<OrderRequest>,
    #[serde(default)]
    pub columns: Vec<ColumnRequest>,
    /// Session annotations (`date_from`, `date_to`) and caller data.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageRequest {
    /// Sets an extra field, replacing any previous value.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Returns an extra field.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Grid-native page response, plus the optional footer message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub draw: u64,
    #[serde(rename = "recordsTotal", default)]
    pub records_total: u64,
    #[serde(rename = "recordsFiltered", default)]
    pub records_filtered: u64,
    #[serde(default)]
    pub data: Vec<Value>,
    /// HTML written under the grid when present.
    #[serde(default)]
    pub footer_message: Option<String>,
    /// Error reported by the endpoint instead of rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageResponse {
    /// Creates a response carrying `rows`, with both totals set to the row count.
    pub fn with_rows(draw: u64, rows: Vec<Value>) -> Self {
        let total = rows.len() as u64;
        Self {
            draw,
            records_total: total,
            records_filtered: total,
            data: rows,
            ..Default::default()
        }
    }

    /// Sets the footer message.
    pub fn footer(mut self, message: impl Into<String>) -> Self {
        self.footer_message = Some(message.into());
        self
    }
}
