//! Plotting-sheet classification
//!
//! Decides whether a sheet holds chartable test data from its name and the
//! shape of its table.

use crate::sheet::table::SheetTable;

/// Sheet-name fragments that identify a test type
pub const TEST_TYPE_KEYWORDS: &[&str] = &[
    "test",
    "puff",
    "draw",
    "pressure",
    "resistance",
    "power",
    "flow",
    "temperature",
    "battery",
    "activation",
    "simulation",
    "life",
    "extended",
    "rapid",
    "intense",
    "horizontal",
    "vacuum",
    "viscosity",
    "compatibility",
    "upside",
    "headspace",
    "cycling",
];

/// Sheet-name fragments that rule out a name-based match
pub const EXCLUSION_KEYWORDS: &[&str] = &[
    "plan",
    "inspection",
    "summary",
    "overview",
    "notes",
    "instructions",
    "config",
    "setup",
    "metadata",
    "sensory",
    "leaching",
    "odor",
    "consistency",
];

/// Column-name fragments that mark measurement data
pub const MEASUREMENT_COLUMN_KEYWORDS: &[&str] = &[
    "puff",
    "tpm",
    "draw",
    "pressure",
    "resistance",
    "power",
    "efficiency",
    "temp",
    "voltage",
    "current",
];

/// Rows scanned for an embedded `puffs`/`tpm` header row
const HEADER_SCAN_ROWS: usize = 5;

/// Minimum count of all-numeric columns for a shape-based match
const MIN_NUMERIC_COLUMNS: usize = 3;

/// Whether a sheet is eligible for chart rendering
pub fn is_plotting_sheet(name: &str, data: &SheetTable) -> bool {
    let name = name.to_lowercase();

    if name.contains("legacy") {
        return true;
    }

    let name_matches = TEST_TYPE_KEYWORDS.iter().any(|k| name.contains(k))
        && !EXCLUSION_KEYWORDS.iter().any(|k| name.contains(k));

    name_matches
        || has_measurement_columns(data)
        || has_embedded_header_row(data)
        || data.numeric_column_count() >= MIN_NUMERIC_COLUMNS
}

fn has_measurement_columns(data: &SheetTable) -> bool {
    data.columns().iter().any(|column| {
        let column = column.to_lowercase();
        MEASUREMENT_COLUMN_KEYWORDS.iter().any(|k| column.contains(k))
    })
}

/// Raw Excel exports keep their headers in the first data rows
fn has_embedded_header_row(data: &SheetTable) -> bool {
    if data.row_count() < 3 || data.column_count() < 2 {
        return false;
    }

    data.rows().iter().take(HEADER_SCAN_ROWS).any(|row| {
        let cells: Vec<String> = row.iter().map(|c| c.to_field().to_lowercase()).collect();
        cells.iter().any(|c| c.contains("puffs")) && cells.iter().any(|c| c.contains("tpm"))
    })
}
