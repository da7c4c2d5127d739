//! Initialization payload returned by `action=initialize`.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::SortDirection;

/// Page length used when the payload carries no usable length menu.
pub const DEFAULT_PAGE_LENGTH: i64 = 10;

/// Server-supplied description of one grid column.
///
/// Fields the session does not interpret are kept in `extra` and handed to
/// the grid verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub orderable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Row field rendered by this column; `null` for computed columns.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(rename = "defaultContent", default, skip_serializing_if = "Option::is_none")]
    pub default_content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl ColumnDescriptor {
    /// Creates a visible, non-searchable column with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            visible: true,
            searchable: false,
            orderable: false,
            name: None,
            data: None,
            class_name: None,
            default_content: None,
            extra: Map::new(),
        }
    }

    /// Sets the visibility flag.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the searchable flag.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Sets the orderable flag.
    pub fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    /// Sets the column name and the row field it renders.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.data = Some(name.clone());
        self.name = Some(name);
        self
    }

    /// Returns `true` if the column gets a text input in the filter row.
    pub fn is_filterable(&self) -> bool {
        self.visible && self.searchable
    }
}

/// Initial sort entry: `[column_index, "asc" | "desc"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialOrder(pub usize, pub SortDirection);

/// Grid configuration fetched once per session.
///
/// Missing fields fall back to their defaults, so a partial payload still
/// produces a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitPayload {
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub order: Vec<InitialOrder>,
    /// Either `[values]` or `[[values], [labels]]`.
    #[serde(default)]
    pub length_menu: Value,
    #[serde(default)]
    pub show_column_filters: bool,
    #[serde(default)]
    pub show_date_filters: bool,
}

impl InitPayload {
    /// Returns the page length the grid starts with: the first length menu entry.
    pub fn initial_page_length(&self) -> i64 {
        let values = match &self.length_menu {
            Value::Array(items) => match items.first() {
                Some(Value::Array(first)) => first.first(),
                first => first,
            },
            _ => None,
        };
        values
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_PAGE_LENGTH)
    }

    /// Number of visible columns.
    pub fn visible_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.visible).count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_server_payload() {
        let payload: InitPayload = serde_json::from_value(json!({
            "columns": [
                {"name": "", "data": null, "title": "", "visible": true, "searchable": false,
                 "orderable": false, "className": "dataTables_row-tools", "width": 30},
                {"name": "code", "data": "code", "title": "Code", "visible": true,
                 "searchable": true, "orderable": true, "foreign_field": null},
            ],
            "order": [[1, "asc"]],
            "length_menu": [[10, 20, 50, 100], [10, 20, 50, 100]],
            "show_date_filters": false,
            "show_column_filters": true,
        }))
        .unwrap();

        assert_eq!(payload.columns.len(), 2);
        assert_eq!(payload.columns[0].class_name.as_deref(), Some("dataTables_row-tools"));
        assert_eq!(payload.columns[0].extra.get("width"), Some(&json!(30)));
        assert!(payload.columns[1].is_filterable());
        assert_eq!(payload.order, vec![InitialOrder(1, SortDirection::Asc)]);
        assert_eq!(payload.initial_page_length(), 10);
        assert!(payload.show_column_filters);
    }

    #[test]
    fn test_partial_payload_uses_defaults() {
        let payload: InitPayload =
            serde_json::from_value(json!({"columns": [{"title": "Name"}]})).unwrap();
        assert!(payload.columns[0].visible);
        assert!(!payload.columns[0].searchable);
        assert!(!payload.show_column_filters);
        assert!(!payload.show_date_filters);
        assert_eq!(payload.initial_page_length(), DEFAULT_PAGE_LENGTH);
    }

    #[test]
    fn test_flat_length_menu() {
        let payload: InitPayload =
            serde_json::from_value(json!({"length_menu": [25, 50]})).unwrap();
        assert_eq!(payload.initial_page_length(), 25);
    }
}
