use crate::coerce::coerce_value;
use crate::data::DataRow;
use crate::kind::ChartKind;
use serde::Serialize;
use std::cmp::Ordering;

/// Rows handed to a rendering strategy plus the truncation bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableDataset {
    #[serde(rename = "processedRows")]
    pub rows: Vec<DataRow>,
    /// Row count before any reduction
    pub total_rows: usize,
    /// More rows exist than the kind displays by default
    pub is_truncated: bool,
    /// Default number of categories shown; `None` when the kind is never truncated
    pub display_limit: Option<usize>,
}

/// Apply the kind's top-N category limit.
///
/// When the row count exceeds the limit and `show_all` is false, rows are
/// stably sorted by `value_column` descending and cut to the limit. With
/// `show_all` every row passes through in original order but the dataset is
/// still flagged as truncated so the caller can offer to collapse it again.
pub fn reduce_rows(
    rows: &[DataRow],
    kind: ChartKind,
    value_column: &str,
    show_all: bool,
) -> RenderableDataset {
    let display_limit = kind.display_limit();

    let Some(limit) = display_limit.filter(|limit| rows.len() > *limit) else {
        return RenderableDataset {
            rows: rows.to_vec(),
            total_rows: rows.len(),
            is_truncated: false,
            display_limit,
        };
    };

    if show_all {
        return RenderableDataset {
            rows: rows.to_vec(),
            total_rows: rows.len(),
            is_truncated: true,
            display_limit,
        };
    }

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        primary(b, value_column)
            .partial_cmp(&primary(a, value_column))
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(limit);

    RenderableDataset {
        rows: sorted,
        total_rows: rows.len(),
        is_truncated: true,
        display_limit,
    }
}

fn primary(row: &DataRow, column: &str) -> f64 {
    row.get(column).map(coerce_value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn make_rows(n: usize) -> Vec<DataRow> {
        (0..n)
            .map(|i| {
                let mut row = DataRow::new();
                row.insert("region".to_string(), CellValue::Text(format!("R{}", i)));
                row.insert("sales".to_string(), CellValue::Number(((i * 7) % 11) as f64));
                row
            })
            .collect()
    }

    fn values(data: &RenderableDataset) -> Vec<f64> {
        data.rows.iter().map(|r| r["sales"].as_number().unwrap()).collect()
    }

    #[test]
    fn test_within_limit_passthrough() {
        let rows = make_rows(5);
        for show_all in [false, true] {
            let out = reduce_rows(&rows, ChartKind::Pie, "sales", show_all);
            assert!(!out.is_truncated);
            assert_eq!(out.rows, rows);
            assert_eq!(out.display_limit, Some(5));
        }
    }

    #[test]
    fn test_pie_truncates_to_five_sorted() {
        let rows = make_rows(15);
        let out = reduce_rows(&rows, ChartKind::Pie, "sales", false);
        assert!(out.is_truncated);
        assert_eq!(out.rows.len(), 5);
        assert_eq!(out.total_rows, 15);
        let v = values(&out);
        assert!(v.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(v[0], 10.0);
    }

    #[test]
    fn test_show_all_keeps_everything_flagged() {
        let rows = make_rows(15);
        let out = reduce_rows(&rows, ChartKind::Pie, "sales", true);
        assert!(out.is_truncated);
        assert_eq!(out.rows, rows);
    }

    #[test]
    fn test_bar_limit_ten() {
        let rows = make_rows(11);
        let out = reduce_rows(&rows, ChartKind::Bar, "sales", false);
        assert_eq!(out.rows.len(), 10);
        assert_eq!(out.display_limit, Some(10));
    }

    #[test]
    fn test_line_never_truncated() {
        let rows = make_rows(40);
        let out = reduce_rows(&rows, ChartKind::Line, "sales", false);
        assert!(!out.is_truncated);
        assert_eq!(out.rows, rows);
        assert_eq!(out.display_limit, None);
    }

    #[test]
    fn test_stable_ties() {
        let rows: Vec<DataRow> = (0..8)
            .map(|i| {
                let mut row = DataRow::new();
                row.insert("region".to_string(), CellValue::Text(format!("R{}", i)));
                row.insert("sales".to_string(), CellValue::Number(1.0));
                row
            })
            .collect();
        let out = reduce_rows(&rows, ChartKind::Radar, "sales", false);
        let names: Vec<String> = out.rows.iter().map(|r| r["region"].to_string()).collect();
        assert_eq!(names, vec!["R0", "R1", "R2", "R3", "R4"]);
    }

    #[test]
    fn test_missing_value_sorts_as_zero() {
        let mut rows = make_rows(6);
        rows[0].shift_remove("sales");
        let out = reduce_rows(&rows, ChartKind::Donut, "sales", false);
        assert_eq!(out.rows.len(), 5);
        assert!(out.rows.iter().all(|r| r.contains_key("sales")));
    }
}
