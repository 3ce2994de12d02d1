use crate::error::{Result, Vap3Error};
use std::fmt;

/// A single cell of a sheet
///
/// CSV carries no types, so cells are coerced when a sheet is read back:
/// numbers come back as `Int`/`Float`, `True`/`False` as `Bool`, blanks as
/// `Empty`, anything else as `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Coerce a raw CSV field
    pub fn parse(field: &str) -> Self {
        if field.is_empty() {
            return Self::Empty;
        }
        if field.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if field.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(value) = field.parse::<i64>() {
            return Self::Int(value);
        }
        if looks_numeric(field) {
            if let Ok(value) = field.parse::<f64>() {
                if value.is_nan() {
                    return Self::Empty;
                }
                return Self::Float(value);
            }
        }
        Self::Text(field.to_string())
    }

    /// Render as a CSV field
    ///
    /// Floats always keep a fractional part or exponent so they read back
    /// as floats; NaN is written as an empty field.
    pub fn to_field(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) if value.is_nan() => String::new(),
            Self::Float(value) => format!("{:?}", value),
            Self::Text(text) => text.clone(),
        }
    }

    /// Numeric value, if the cell holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Accepts decimal floats, exponents and the spellings `inf`/`nan`
fn looks_numeric(field: &str) -> bool {
    let body = field.trim_start_matches(['+', '-']);
    let lower = body.to_ascii_lowercase();
    matches!(lower.as_str(), "inf" | "infinity" | "nan")
        || body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// A named-column table: one worksheet's worth of data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    /// Create a table with the given columns and no rows
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and rows, checking every row's width
    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Vap3Error::RowWidthMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, column)`
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Index of the first column with this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// Numeric view of one column; non-numeric cells become `None`
    pub fn numeric_column(&self, column: usize) -> Vec<Option<f64>> {
        self.column_values(column).map(CellValue::as_f64).collect()
    }

    /// Number of columns whose non-empty cells are all numeric (and that
    /// have at least one such cell)
    pub fn numeric_column_count(&self) -> usize {
        (0..self.columns.len())
            .filter(|&column| {
                let mut seen = false;
                for cell in self.column_values(column) {
                    if cell.is_empty() {
                        continue;
                    }
                    if !cell.is_numeric() {
                        return false;
                    }
                    seen = true;
                }
                seen
            })
            .count()
    }

    /// Encode as CSV: header row of column names, then one record per row
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(CellValue::to_field))?;
        }
        writer
            .into_inner()
            .map_err(|e| Vap3Error::Io(e.into_error()))
    }

    /// Decode CSV written by [`SheetTable::to_csv`] (or by any tool that
    /// writes a header row)
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = columns.len();
        let mut table = Self::new(columns);

        for record in reader.records() {
            let record = record?;
            if record.len() > width {
                return Err(Vap3Error::RowWidthMismatch {
                    expected: width,
                    actual: record.len(),
                });
            }
            let mut row: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
            row.resize(width, CellValue::Empty);
            table.rows.push(row);
        }

        Ok(table)
    }
}
