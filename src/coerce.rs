// Numeric coercion of heterogeneous spreadsheet cells.
//
// Cells such as "R$ 1.200,50", "12%", "1,200.50" or plain numbers are turned
// into finite floats. Anything that yields no number becomes 0 so the row is
// still plotted.

use crate::data::{CellValue, DataRow};

/// Parse a cell the way the coercer reads it. `None` when no number can be read.
///
/// A comma with no period is read as a decimal separator. Every character
/// other than digits, '.' and '-' is then dropped and the longest leading
/// `-?digits[.digits]` prefix is parsed.
pub fn parse_numeric(value: &CellValue) -> Option<f64> {
    let text = match value {
        CellValue::Number(n) => return n.is_finite().then_some(*n),
        CellValue::Text(s) => s,
    };

    let normalized = if text.contains(',') && !text.contains('.') {
        text.replace(',', ".")
    } else {
        text.clone()
    };

    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let number = leading_number(&cleaned)?.parse::<f64>().ok()?;
    number.is_finite().then_some(number)
}

/// Coerced number for a cell; unreadable cells become 0
pub fn coerce_value(value: &CellValue) -> f64 {
    parse_numeric(value).unwrap_or(0.0)
}

/// Replace every present numeric-role cell with a coerced number.
///
/// Returns new rows; the input is left untouched. Keys absent from a row stay absent.
pub fn coerce_rows(rows: &[DataRow], numeric_columns: &[String]) -> Vec<DataRow> {
    rows.iter()
        .map(|row| {
            let mut coerced = row.clone();
            for column in numeric_columns {
                if let Some(cell) = coerced.get_mut(column.as_str()) {
                    *cell = CellValue::Number(coerce_value(cell));
                }
            }
            coerced
        })
        .collect()
}

/// Whether any cell of the given columns holds a readable number
pub fn has_numeric_content(rows: &[DataRow], numeric_columns: &[String]) -> bool {
    rows.iter().any(|row| {
        numeric_columns
            .iter()
            .filter_map(|column| row.get(column.as_str()))
            .any(|cell| parse_numeric(cell).is_some())
    })
}

/// Longest prefix of the form `-?digits[.digits]` (digits may be empty on one side of the point)
fn leading_number(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if frac_digits > 0 || digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }

    (digits > 0).then(|| &s[..end])
}
