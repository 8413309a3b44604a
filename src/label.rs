use crate::data::CellValue;

pub const DEFAULT_LABEL_LENGTH: usize = 10;

const ELLIPSIS: &str = "..";

/// Tick / legend text for a category value.
///
/// Text longer than `max_length` characters is cut and suffixed with `..`.
/// Numbers are rendered as-is. Only ever applied to display text, never to
/// the values used for sorting.
pub fn format_label(value: &CellValue, max_length: usize) -> String {
    match value {
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(s) => truncate_text(s, max_length),
    }
}

pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_length).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(format_label(&CellValue::from("North"), 10), "North");
        assert_eq!(format_label(&CellValue::from("0123456789"), 10), "0123456789");
    }

    #[test]
    fn test_long_text_truncated() {
        assert_eq!(
            format_label(&CellValue::from("Northern Territories"), DEFAULT_LABEL_LENGTH),
            "Northern T.."
        );
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(format_label(&CellValue::Number(123456789012.0), 3), "123456789012");
    }

    #[test]
    fn test_multibyte_counts_chars() {
        assert_eq!(truncate_text("São Paulo Capital", 5), "São P..");
    }
}
