// Several charts over one dataset.
//
// Each descriptor is prepared on its own; a diagnostic for one chart never
// stops its siblings from rendering.

use crate::config::EngineConfig;
use crate::data::DataRow;
use crate::descriptor::ChartDescriptor;
use crate::diagnostic::Diagnostic;
use crate::engine::{prepare_chart, ChartPlan};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// The charts requested for a dataset, in request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub charts: Vec<ChartDescriptor>,
}

/// Result of preparing one chart of a dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOutcome {
    pub title: String,
    pub result: Result<ChartPlan, Diagnostic>,
}

impl Dashboard {
    pub fn new(charts: Vec<ChartDescriptor>) -> Self {
        Self { charts }
    }

    /// Accepts a single descriptor object, an array of descriptors, or
    /// `{"charts": {...}}` / `{"charts": [...]}`.
    ///
    /// Named charts without a title take their key as the title.
    pub fn from_json(value: &Value) -> Self {
        let charts = match value {
            Value::Array(items) => items.iter().map(ChartDescriptor::from_json).collect(),
            Value::Object(obj) => match obj.get("charts") {
                Some(Value::Object(named)) => named
                    .iter()
                    .map(|(name, chart)| {
                        let descriptor = ChartDescriptor::from_json(chart);
                        if descriptor.title.is_empty() {
                            descriptor.with_title(name.as_str())
                        } else {
                            descriptor
                        }
                    })
                    .collect(),
                Some(Value::Array(items)) => items.iter().map(ChartDescriptor::from_json).collect(),
                _ => vec![ChartDescriptor::from_json(value)],
            },
            other => vec![ChartDescriptor::from_json(other)],
        };
        Self { charts }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor file '{}'", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse descriptor file '{}'", path.display()))?;
        Ok(Self::from_json(&value))
    }

    /// Prepare every chart against `rows`
    pub fn evaluate(&self, rows: &[DataRow], show_all: bool, config: &EngineConfig) -> Vec<ChartOutcome> {
        let outcomes: Vec<ChartOutcome> = self
            .charts
            .iter()
            .map(|descriptor| ChartOutcome {
                title: descriptor.title.clone(),
                result: prepare_chart(rows, descriptor, show_all, config),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(charts = outcomes.len(), failed, "evaluated dashboard");
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;
    use crate::kind::ChartKind;
    use serde_json::json;

    fn make_rows() -> Vec<DataRow> {
        vec![
            [
                ("region".to_string(), CellValue::from("North")),
                ("sales".to_string(), CellValue::from("1200")),
            ]
            .into_iter()
            .collect(),
            [
                ("region".to_string(), CellValue::from("South")),
                ("sales".to_string(), CellValue::from(800.0)),
            ]
            .into_iter()
            .collect(),
        ]
    }

    #[test]
    fn test_single_object() {
        let d = Dashboard::from_json(&json!({"kind": "BAR", "categoryColumn": "region"}));
        assert_eq!(d.charts.len(), 1);
        assert_eq!(d.charts[0].kind, "BAR");
    }

    #[test]
    fn test_array() {
        let d = Dashboard::from_json(&json!([{"kind": "BAR"}, {"kind": "PIE"}]));
        let kinds: Vec<&str> = d.charts.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["BAR", "PIE"]);
    }

    #[test]
    fn test_named_charts_take_key_as_title() {
        let d = Dashboard::from_json(&json!({
            "charts": {
                "salesByRegion": {"type": "bar", "x_axis_column": "region", "y_axis_columns": ["sales"]},
                "share": {"title": "Share", "type": "pie"}
            }
        }));
        assert_eq!(d.charts.len(), 2);
        let titles: Vec<&str> = d.charts.iter().map(|c| c.title.as_str()).collect();
        assert!(titles.contains(&"salesByRegion"));
        assert!(titles.contains(&"Share"));
    }

    #[test]
    fn test_sibling_diagnostic_does_not_block() {
        let d = Dashboard::from_json(&json!([
            {"title": "Good", "kind": "BAR", "categoryColumn": "region", "valueColumns": ["sales"]},
            {"title": "Bad", "kind": "BAR", "categoryColumn": "region", "valueColumns": ["revenue"]},
            {"title": "Odd", "kind": "GAUGE", "categoryColumn": "region", "valueColumns": ["sales"]}
        ]));
        let outcomes = d.evaluate(&make_rows(), false, &EngineConfig::default());
        assert_eq!(outcomes.len(), 3);

        let plan = outcomes[0].result.as_ref().unwrap();
        assert_eq!(plan.kind, ChartKind::Bar);

        assert_eq!(outcomes[1].title, "Bad");
        assert!(matches!(
            outcomes[1].result,
            Err(Diagnostic::MissingColumns { .. })
        ));

        assert!(matches!(
            outcomes[2].result,
            Err(Diagnostic::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.json");
        std::fs::write(&path, r#"[{"kind": "LINE"}]"#).unwrap();
        let d = Dashboard::from_path(&path).unwrap();
        assert_eq!(d.charts[0].kind, "LINE");

        let err = Dashboard::from_path(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read descriptor file"));
    }
}
