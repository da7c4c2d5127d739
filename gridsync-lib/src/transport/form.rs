//! Bracket-key form encoding of nested JSON.
//!
//! Objects become `parent[key]`, arrays of scalars `parent[]` and arrays of
//! containers `parent[index]`, which is how grid endpoints expect
//! `columns[0][search][value]` and friends.

use serde_json::Value;

use super::FormFields;

/// Flattens a JSON object into form fields.
///
/// Non-object values yield no fields. `null` encodes as the empty string.
pub fn encode_form(value: &Value) -> FormFields {
    let mut fields = Vec::new();
    if let Value::Object(map) = value {
        for (key, child) in map {
            push(key, child, &mut fields);
        }
    }
    fields
}

fn push(prefix: &str, value: &Value, out: &mut FormFields) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                push(&format!("{prefix}[{key}]"), child, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    push(&format!("{prefix}[{index}]"), item, out);
                } else {
                    push(&format!("{prefix}[]"), item, out);
                }
            }
        }
        Value::Null => out.push((prefix.to_string(), String::new())),
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn lookup<'a>(fields: &'a FormFields, key: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_nested_columns() {
        let fields = encode_form(&json!({
            "draw": 1,
            "columns": [
                {"data": "code", "search": {"value": "ab", "regex": false}},
                {"data": null, "search": {"value": "", "regex": false}},
            ],
            "order": [{"column": 1, "dir": "asc"}],
            "date_from": "",
        }));

        assert_eq!(lookup(&fields, "draw"), Some("1"));
        assert_eq!(lookup(&fields, "columns[0][data]"), Some("code"));
        assert_eq!(lookup(&fields, "columns[0][search][value]"), Some("ab"));
        assert_eq!(lookup(&fields, "columns[0][search][regex]"), Some("false"));
        assert_eq!(lookup(&fields, "columns[1][data]"), Some(""));
        assert_eq!(lookup(&fields, "order[0][dir]"), Some("asc"));
        assert_eq!(lookup(&fields, "date_from"), Some(""));
    }

    #[test]
    fn test_scalar_arrays_use_empty_brackets() {
        let fields = encode_form(&json!({"ids": [3, 4]}));
        assert_eq!(
            fields,
            vec![
                ("ids[]".to_string(), "3".to_string()),
                ("ids[]".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_object_yields_nothing() {
        assert!(encode_form(&json!([1, 2])).is_empty());
        assert!(encode_form(&json!("x")).is_empty());
    }
}
