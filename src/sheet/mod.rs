mod classify;
mod record;
mod table;

pub use classify::{
    is_plotting_sheet, EXCLUSION_KEYWORDS, MEASUREMENT_COLUMN_KEYWORDS, TEST_TYPE_KEYWORDS,
};
pub use record::Sheet;
pub use table::{CellValue, SheetTable};
