// Chart descriptor as produced by the AI collaborator.
//
// Nothing in the incoming JSON is trusted: every field is optional, wrong-typed
// fields are treated as absent, and the kind tag is kept verbatim until the
// dispatcher resolves it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One chart instance requested for a dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct ChartDescriptor {
    pub title: String,
    /// Raw kind tag, resolved by `ChartKind::from_tag`
    pub kind: String,
    /// X-axis / category key
    pub category_column: Option<String>,
    /// Y-axis / value keys; the first one is the primary series
    pub value_columns: Vec<String>,
    /// Name key for donut and treemap
    pub group_column: Option<String>,
    /// Value key for donut and treemap
    pub single_value_column: Option<String>,
}

const TITLE_KEYS: &[&str] = &["title"];
const KIND_KEYS: &[&str] = &["kind", "type"];
const CATEGORY_KEYS: &[&str] = &["categoryColumn", "x_axis_column"];
const VALUE_KEYS: &[&str] = &["valueColumns", "y_axis_columns", "y_axis_column"];
const GROUP_KEYS: &[&str] = &["groupColumn", "category_column"];
const SINGLE_VALUE_KEYS: &[&str] = &["singleValueColumn", "value_column"];

impl ChartDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, column: impl Into<String>) -> Self {
        self.category_column = Some(column.into());
        self
    }

    pub fn with_values(mut self, columns: &[&str]) -> Self {
        self.value_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_group(mut self, column: impl Into<String>) -> Self {
        self.group_column = Some(column.into());
        self
    }

    pub fn with_single_value(mut self, column: impl Into<String>) -> Self {
        self.single_value_column = Some(column.into());
        self
    }

    /// Build a descriptor from arbitrary JSON. Never fails.
    pub fn from_json(value: &Value) -> Self {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);

        let single_value_column = string_field(obj, SINGLE_VALUE_KEYS);
        let mut value_columns = string_list_field(obj, VALUE_KEYS);
        if value_columns.is_empty() {
            if let Some(single) = &single_value_column {
                value_columns.push(single.clone());
            }
        }

        Self {
            title: string_field(obj, TITLE_KEYS).unwrap_or_default(),
            kind: string_field(obj, KIND_KEYS).unwrap_or_default(),
            category_column: string_field(obj, CATEGORY_KEYS),
            value_columns,
            group_column: string_field(obj, GROUP_KEYS),
            single_value_column,
        }
    }

    /// Primary value column, if any
    pub fn primary_value(&self) -> Option<&str> {
        self.value_columns.first().map(String::as_str)
    }

    /// Every column name the descriptor references, deduplicated, in declaration order
    pub fn referenced_columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        let candidates = self
            .category_column
            .iter()
            .chain(self.value_columns.iter())
            .chain(self.group_column.iter())
            .chain(self.single_value_column.iter());
        for name in candidates {
            if is_reference(name) && !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        columns
    }

    /// Columns in a numeric role: the value list plus the single-value column
    pub fn numeric_columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        for name in self.value_columns.iter().chain(self.single_value_column.iter()) {
            if is_reference(name) && !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        columns
    }
}

impl From<Value> for ChartDescriptor {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

fn is_reference(name: &str) -> bool {
    !name.trim().is_empty()
}

/// First key holding a non-empty string
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(Value::as_str)
        .find(|s| is_reference(s))
        .map(str::to_string)
}

/// First key holding a string or a list of strings. Non-string entries are dropped.
fn string_list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    for key in keys {
        let columns: Vec<String> = match obj.get(*key) {
            Some(Value::String(s)) if is_reference(s) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| is_reference(s))
                .map(str::to_string)
                .collect(),
            _ => continue,
        };
        if !columns.is_empty() {
            return columns;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_camel_case() {
        let d = ChartDescriptor::from_json(&json!({
            "title": "Sales",
            "kind": "BAR",
            "categoryColumn": "region",
            "valueColumns": ["sales", "cost"]
        }));
        assert_eq!(d.title, "Sales");
        assert_eq!(d.kind, "BAR");
        assert_eq!(d.category_column.as_deref(), Some("region"));
        assert_eq!(d.value_columns, vec!["sales", "cost"]);
        assert_eq!(d.primary_value(), Some("sales"));
    }

    #[test]
    fn test_from_json_legacy_names() {
        let d = ChartDescriptor::from_json(&json!({
            "type": "DONUT",
            "x_axis_column": "month",
            "category_column": "segment",
            "value_column": "share"
        }));
        assert_eq!(d.kind, "DONUT");
        assert_eq!(d.category_column.as_deref(), Some("month"));
        assert_eq!(d.group_column.as_deref(), Some("segment"));
        assert_eq!(d.single_value_column.as_deref(), Some("share"));
        // value list falls back to the single value column
        assert_eq!(d.value_columns, vec!["share"]);
    }

    #[test]
    fn test_from_json_single_string_value_columns() {
        let d = ChartDescriptor::from_json(&json!({"kind": "LINE", "valueColumns": "sales"}));
        assert_eq!(d.value_columns, vec!["sales"]);
    }

    #[test]
    fn test_from_json_wrong_types_are_absent() {
        let d = ChartDescriptor::from_json(&json!({
            "title": 42,
            "kind": ["BAR"],
            "categoryColumn": {"name": "region"},
            "valueColumns": [1, null, "sales", ""]
        }));
        assert_eq!(d.title, "");
        assert_eq!(d.kind, "");
        assert_eq!(d.category_column, None);
        assert_eq!(d.value_columns, vec!["sales"]);
    }

    #[test]
    fn test_from_json_not_an_object() {
        let d = ChartDescriptor::from_json(&json!("BAR"));
        assert_eq!(d, ChartDescriptor::default());
    }

    #[test]
    fn test_empty_references_filtered() {
        let d = ChartDescriptor::from_json(&json!({"kind": "BAR", "categoryColumn": "  "}));
        assert_eq!(d.category_column, None);
        assert!(d.referenced_columns().is_empty());
    }

    #[test]
    fn test_referenced_columns_dedup() {
        let d = ChartDescriptor::new("PIE")
            .with_category("region")
            .with_values(&["sales", "region"])
            .with_single_value("sales");
        assert_eq!(d.referenced_columns(), vec!["region", "sales"]);
        assert_eq!(d.numeric_columns(), vec!["sales", "region"]);
    }

    #[test]
    fn test_deserialize_via_serde() {
        let d: ChartDescriptor =
            serde_json::from_str(r#"{"kind":"pie","x_axis_column":"a","y_axis_columns":["b"]}"#).unwrap();
        assert_eq!(d.kind, "pie");
        assert_eq!(d.category_column.as_deref(), Some("a"));
        assert_eq!(d.value_columns, vec!["b"]);
    }
}
