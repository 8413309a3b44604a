use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// A single spreadsheet cell. Spreadsheet-to-JSON conversion yields either text or numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One row: column name -> cell. Column order follows the source file.
pub type DataRow = IndexMap<String, CellValue>;

/// Rows loaded from an uploaded spreadsheet export
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<DataRow>,
}

impl Dataset {
    pub fn new(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    /// Column names of the first row, which stands in for the dataset schema
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Load rows from a `.json` or `.csv` file, chosen by extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open data file '{}'", path.display()))?;

        if is_json {
            let value: Value = serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse JSON data in '{}'", path.display()))?;
            Self::from_json(&value)
        } else {
            Self::from_csv_reader(file)
                .with_context(|| format!("Failed to read CSV data in '{}'", path.display()))
        }
    }

    /// Create a Dataset from a JSON Array of Objects.
    ///
    /// Null cells are left out of the row so the result is sparse in the same
    /// way a spreadsheet export skips empty cells. An empty array is accepted;
    /// rendering reports it as an empty dataset.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = DataRow::with_capacity(obj.len());
            for (key, val) in obj {
                let cell = match val {
                    Value::String(s) => CellValue::Text(s.clone()),
                    Value::Number(n) => match n.as_f64() {
                        Some(f) => CellValue::Number(f),
                        None => CellValue::Text(n.to_string()),
                    },
                    Value::Bool(b) => CellValue::Text(b.to_string()),
                    Value::Null => continue,
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", key)),
                };
                row.insert(key.clone(), cell);
            }
            rows.push(row);
        }

        Ok(Self { rows })
    }

    /// Create a Dataset from CSV with a header line. Empty cells are omitted.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV record {}", idx + 1))?;
            let mut row = DataRow::with_capacity(headers.len());
            for (header, field) in headers.iter().zip(record.iter()) {
                if field.is_empty() {
                    continue;
                }
                row.insert(header.clone(), CellValue::Text(field.to_string()));
            }
            rows.push(row);
        }

        Ok(Self { rows })
    }
}
