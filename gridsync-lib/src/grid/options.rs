//! Grid construction options.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::config::TableConfig;
use crate::protocol::ColumnDescriptor;
use crate::protocol::DEFAULT_PAGE_LENGTH;
use crate::protocol::InitPayload;
use crate::protocol::InitialOrder;

/// Layout template placing the toolbar area above the grid controls.
pub const DOM_LAYOUT: &str = r#"<"toolbar">lrftip"#;

/// Options handed to the grid library, keyed by the library's option names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridOptions {
    values: Map<String, Value>,
}

impl GridOptions {
    /// Server-side processing defaults plus the payload's columns, order and
    /// length menu.
    pub fn defaults(config: &TableConfig, payload: &InitPayload) -> Self {
        let mut values = Map::new();
        values.insert("processing".into(), Value::Bool(true));
        values.insert("serverSide".into(), Value::Bool(true));
        values.insert("scrollX".into(), Value::Bool(true));
        values.insert("autoWidth".into(), Value::Bool(true));
        values.insert("dom".into(), Value::String(DOM_LAYOUT.into()));
        values.insert("language".into(), Value::Object(config.language.clone()));
        values.insert("columns".into(), json!(payload.columns));
        values.insert("lengthMenu".into(), payload.length_menu.clone());
        values.insert("order".into(), json!(payload.order));
        Self { values }
    }

    /// Shallow-merges `overrides` over the current options.
    pub fn merge(mut self, overrides: Map<String, Value>) -> Self {
        for (key, value) in overrides {
            self.values.insert(key, value);
        }
        self
    }

    /// Returns an option value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns a boolean option, `false` when absent.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Column descriptors, or an empty list if the option is not a valid column list.
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        self.get("columns")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Initial sort entries.
    pub fn order(&self) -> Vec<InitialOrder> {
        self.get("order")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Initial page length taken from `pageLength` or the length menu.
    pub fn page_length(&self) -> i64 {
        if let Some(length) = self.get("pageLength").and_then(Value::as_i64) {
            return length;
        }
        let payload = InitPayload {
            length_menu: self.get("lengthMenu").cloned().unwrap_or(Value::Null),
            ..Default::default()
        };
        match payload.initial_page_length() {
            0 => DEFAULT_PAGE_LENGTH,
            n => n,
        }
    }

    /// Returns all options as a JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SortDirection;

    fn payload() -> InitPayload {
        InitPayload {
            columns: vec![ColumnDescriptor::new("Name").field("name").searchable(true)],
            order: vec![InitialOrder(0, SortDirection::Desc)],
            length_menu: json!([[20, 50], [20, 50]]),
            show_column_filters: true,
            show_date_filters: false,
        }
    }

    #[test]
    fn test_defaults() {
        let options = GridOptions::defaults(&TableConfig::default(), &payload());
        assert!(options.flag("serverSide"));
        assert!(options.flag("processing"));
        assert!(options.flag("autoWidth"));
        assert_eq!(options.get("dom"), Some(&json!(DOM_LAYOUT)));
        assert_eq!(options.columns().len(), 1);
        assert_eq!(options.order(), vec![InitialOrder(0, SortDirection::Desc)]);
        assert_eq!(options.page_length(), 20);
    }

    #[test]
    fn test_merge_overrides_defaults() {
        let mut overrides = Map::new();
        overrides.insert("autoWidth".into(), Value::Bool(false));
        overrides.insert("pageLength".into(), json!(50));

        let options = GridOptions::defaults(&TableConfig::default(), &payload()).merge(overrides);
        assert!(!options.flag("autoWidth"));
        assert!(options.flag("scrollX"));
        assert_eq!(options.page_length(), 50);
    }
}
