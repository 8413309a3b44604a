use crate::data::DataRow;
use crate::descriptor::ChartDescriptor;
use serde::Serialize;

/// Outcome of checking descriptor references against the data schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCheck {
    /// Referenced names absent from the schema
    pub missing: Vec<String>,
    /// Schema column names, capped for display
    pub available: Vec<String>,
}

impl ColumnCheck {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare every column the descriptor references against the keys of the first
/// row. The caller handles the empty case before calling this.
pub fn validate_columns(
    rows: &[DataRow],
    descriptor: &ChartDescriptor,
    available_cap: usize,
) -> ColumnCheck {
    let Some(schema) = rows.first() else {
        return ColumnCheck {
            missing: descriptor.referenced_columns(),
            available: Vec::new(),
        };
    };

    let missing = descriptor
        .referenced_columns()
        .into_iter()
        .filter(|name| !schema.contains_key(name.as_str()))
        .collect();

    let available = schema.keys().take(available_cap).cloned().collect();

    ColumnCheck { missing, available }
}
