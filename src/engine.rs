//! Chart preparation pipeline.
//!
//! ```text
//! rows + descriptor
//!   -> column validation  (MissingColumns)
//!   -> kind dispatch      (UnsupportedKind)
//!   -> value coercion
//!   -> field contract     (MissingRequiredField)
//!   -> numeric content    (UnparseableSeries)
//!   -> cardinality reduction
//!   -> ChartPlan
//! ```
//!
//! Every stage allocates new rows; the caller's dataset is never modified.

use crate::coerce::{coerce_rows, has_numeric_content};
use crate::config::EngineConfig;
use crate::data::DataRow;
use crate::descriptor::ChartDescriptor;
use crate::diagnostic::Diagnostic;
use crate::kind::{ChartKind, FieldMapping, Layout};
use crate::reduce::{reduce_rows, RenderableDataset};
use crate::validate::validate_columns;
use serde::Serialize;
use tracing::{debug, warn};

/// Everything a rendering strategy needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPlan {
    pub title: String,
    pub kind: ChartKind,
    #[serde(rename = "fieldMapping")]
    pub fields: FieldMapping,
    pub layout: Layout,
    #[serde(flatten)]
    pub data: RenderableDataset,
}

/// Validate, coerce and reduce `rows` for `descriptor`.
///
/// The result is a plan ready for a renderer or the diagnostic explaining why
/// no chart can be drawn. Identical inputs always give identical output.
pub fn prepare_chart(
    rows: &[DataRow],
    descriptor: &ChartDescriptor,
    show_all: bool,
    config: &EngineConfig,
) -> Result<ChartPlan, Diagnostic> {
    let outcome = build_plan(rows, descriptor, show_all, config);
    if let Err(diagnostic) = &outcome {
        warn!(title = %descriptor.title, kind = %descriptor.kind, "chart not rendered: {}", diagnostic);
    }
    outcome
}

fn build_plan(
    rows: &[DataRow],
    descriptor: &ChartDescriptor,
    show_all: bool,
    config: &EngineConfig,
) -> Result<ChartPlan, Diagnostic> {
    if rows.is_empty() {
        return Err(Diagnostic::EmptyDataset);
    }

    let check = validate_columns(rows, descriptor, config.available_columns_cap);
    if !check.is_valid() {
        return Err(Diagnostic::MissingColumns {
            missing: check.missing,
            available: check.available,
        });
    }
    debug!(columns = ?descriptor.referenced_columns(), "descriptor columns present");

    let kind = ChartKind::from_tag(&descriptor.kind).ok_or_else(|| Diagnostic::UnsupportedKind {
        kind: descriptor.kind.clone(),
    })?;

    let numeric_columns = descriptor.numeric_columns();
    let coerced = coerce_rows(rows, &numeric_columns);
    debug!(rows = coerced.len(), columns = ?numeric_columns, "coerced numeric columns");

    let fields = kind
        .resolve_fields(descriptor)
        .map_err(|field| Diagnostic::MissingRequiredField { kind, field })?;

    let plotted: Vec<String> = std::iter::once(fields.value.clone())
        .chain(fields.secondary.iter().cloned())
        .collect();
    if !has_numeric_content(rows, &plotted) {
        return Err(Diagnostic::UnparseableSeries { columns: plotted });
    }

    let data = reduce_rows(&coerced, kind, &fields.value, show_all);
    debug!(
        kind = %kind,
        shown = data.rows.len(),
        truncated = data.is_truncated,
        "prepared chart data"
    );

    Ok(ChartPlan {
        title: descriptor.title.clone(),
        kind,
        fields,
        layout: kind.layout(),
        data,
    })
}

/// Component-local view state: whether the full category set is shown.
///
/// A parent control flips it with [`ChartView::toggle`] and re-prepares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartView {
    pub show_all: bool,
}

impl ChartView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) {
        self.show_all = !self.show_all;
    }

    pub fn prepare(
        &self,
        rows: &[DataRow],
        descriptor: &ChartDescriptor,
        config: &EngineConfig,
    ) -> Result<ChartPlan, Diagnostic> {
        prepare_chart(rows, descriptor, self.show_all, config)
    }

    /// Caption for the show-all / top-N control, or `None` when nothing was truncated
    pub fn toggle_label(&self, data: &RenderableDataset) -> Option<String> {
        if !data.is_truncated {
            return None;
        }
        let limit = data.display_limit?;
        if self.show_all {
            Some(format!("View top {}", limit))
        } else {
            Some(format!("View all ({})", data.total_rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;
    use crate::kind::FieldRole;

    fn make_row(pairs: &[(&str, CellValue)]) -> DataRow {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn sales_rows() -> Vec<DataRow> {
        vec![
            make_row(&[("region", "North".into()), ("sales", "1,200.50".into())]),
            make_row(&[("region", "South".into()), ("sales", "R$800".into())]),
        ]
    }

    fn region_rows(n: usize) -> Vec<DataRow> {
        (0..n)
            .map(|i| {
                make_row(&[
                    ("region", CellValue::Text(format!("Region {}", i))),
                    ("sales", CellValue::Text(format!("{}", (i * 37) % 101))),
                ])
            })
            .collect()
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_bar_chart_plan() {
        let d = ChartDescriptor::new("BAR").with_category("region").with_values(&["sales"]);
        let plan = prepare_chart(&sales_rows(), &d, false, &config()).unwrap();
        assert_eq!(plan.kind, ChartKind::Bar);
        assert!(!plan.data.is_truncated);
        let sales: Vec<f64> = plan.data.rows.iter().map(|r| r["sales"].as_number().unwrap()).collect();
        assert_eq!(sales, vec![1200.5, 800.0]);
        assert_eq!(plan.fields.category, "region");
    }

    #[test]
    fn test_empty_dataset() {
        let d = ChartDescriptor::new("BAR").with_category("region").with_values(&["sales"]);
        assert_eq!(prepare_chart(&[], &d, false, &config()), Err(Diagnostic::EmptyDataset));
    }

    #[test]
    fn test_missing_columns() {
        let d = ChartDescriptor::new("BAR").with_category("region").with_values(&["revenue"]);
        let err = prepare_chart(&sales_rows(), &d, false, &config()).unwrap_err();
        assert_eq!(
            err,
            Diagnostic::MissingColumns {
                missing: vec!["revenue".to_string()],
                available: vec!["region".to_string(), "sales".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_columns_before_unsupported_kind() {
        let d = ChartDescriptor::new("SCATTER3D").with_values(&["revenue"]);
        let err = prepare_chart(&sales_rows(), &d, false, &config()).unwrap_err();
        assert!(matches!(err, Diagnostic::MissingColumns { .. }));
    }

    #[test]
    fn test_unsupported_kind() {
        let d = ChartDescriptor::new("SCATTER3D").with_category("region").with_values(&["sales"]);
        let err = prepare_chart(&sales_rows(), &d, false, &config()).unwrap_err();
        assert_eq!(
            err,
            Diagnostic::UnsupportedKind {
                kind: "SCATTER3D".to_string()
            }
        );
    }

    #[test]
    fn test_donut_missing_required_field() {
        let d = ChartDescriptor::new("DONUT").with_category("region");
        let err = prepare_chart(&sales_rows(), &d, false, &config()).unwrap_err();
        assert_eq!(
            err,
            Diagnostic::MissingRequiredField {
                kind: ChartKind::Donut,
                field: FieldRole::GroupColumn,
            }
        );
    }

    #[test]
    fn test_unparseable_series() {
        let rows = vec![
            make_row(&[("region", "North".into()), ("sales", "n/a".into())]),
            make_row(&[("region", "South".into()), ("sales", "-".into())]),
        ];
        let d = ChartDescriptor::new("LINE").with_category("region").with_values(&["sales"]);
        let err = prepare_chart(&rows, &d, false, &config()).unwrap_err();
        assert_eq!(
            err,
            Diagnostic::UnparseableSeries {
                columns: vec!["sales".to_string()]
            }
        );
    }

    #[test]
    fn test_pie_truncation_and_show_all() {
        let rows = region_rows(15);
        let d = ChartDescriptor::new("PIE").with_category("region").with_values(&["sales"]);

        let top = prepare_chart(&rows, &d, false, &config()).unwrap();
        assert_eq!(top.data.rows.len(), 5);
        assert!(top.data.is_truncated);
        let v: Vec<f64> = top.data.rows.iter().map(|r| r["sales"].as_number().unwrap()).collect();
        assert!(v.windows(2).all(|w| w[0] >= w[1]));

        let all = prepare_chart(&rows, &d, true, &config()).unwrap();
        assert_eq!(all.data.rows.len(), 15);
        assert!(all.data.is_truncated);
    }

    #[test]
    fn test_input_rows_untouched() {
        let rows = sales_rows();
        let before = rows.clone();
        let d = ChartDescriptor::new("BAR").with_category("region").with_values(&["sales"]);
        let _ = prepare_chart(&rows, &d, false, &config());
        assert_eq!(rows, before);
    }

    #[test]
    fn test_chart_view_toggle() {
        let rows = region_rows(12);
        let d = ChartDescriptor::new("RADAR").with_category("region").with_values(&["sales"]);
        let mut view = ChartView::new();

        let plan = view.prepare(&rows, &d, &config()).unwrap();
        assert_eq!(plan.data.rows.len(), 5);
        assert_eq!(view.toggle_label(&plan.data).as_deref(), Some("View all (12)"));

        view.toggle();
        let plan = view.prepare(&rows, &d, &config()).unwrap();
        assert_eq!(plan.data.rows.len(), 12);
        assert_eq!(view.toggle_label(&plan.data).as_deref(), Some("View top 5"));
    }

    #[test]
    fn test_toggle_label_absent_when_not_truncated() {
        let d = ChartDescriptor::new("BAR").with_category("region").with_values(&["sales"]);
        let view = ChartView::new();
        let plan = view.prepare(&sales_rows(), &d, &config()).unwrap();
        assert_eq!(view.toggle_label(&plan.data), None);
    }

    #[test]
    fn test_plan_serializes_field_mapping() {
        let d = ChartDescriptor::new("BAR").with_category("region").with_values(&["sales"]);
        let plan = prepare_chart(&sales_rows(), &d, false, &config()).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["kind"], "BAR");
        assert_eq!(json["fieldMapping"]["category"], "region");
        assert_eq!(json["processedRows"][0]["sales"], 1200.5);
        assert_eq!(json["isTruncated"], false);
        assert_eq!(json["displayLimit"], 10);
    }
}
