use crate::sheet::classify::is_plotting_sheet;
use crate::sheet::table::SheetTable;

/// One named sheet of a session
///
/// `is_plotting` is derived from the name and data when the record is built
/// and whenever the data is replaced, so it is always consistent with the
/// table it describes. The archive stores it as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: SheetTable,
    is_empty: bool,
    is_plotting: bool,
    header_data: Option<serde_json::Value>,
}

impl Sheet {
    /// Build a sheet record, classifying it
    pub fn new(name: impl Into<String>, data: SheetTable, is_empty: bool) -> Self {
        let name = name.into();
        let is_plotting = is_plotting_sheet(&name, &data);
        Self {
            name,
            data,
            is_empty,
            is_plotting,
            header_data: None,
        }
    }

    /// Rebuild a record exactly as persisted, without reclassifying
    pub(crate) fn from_stored(
        name: String,
        data: SheetTable,
        is_empty: bool,
        is_plotting: bool,
        header_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            name,
            data,
            is_empty,
            is_plotting,
            header_data,
        }
    }

    /// Attach sample header data
    pub fn with_header_data(mut self, header_data: serde_json::Value) -> Self {
        self.header_data = Some(header_data);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &SheetTable {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_plotting(&self) -> bool {
        self.is_plotting
    }

    pub fn header_data(&self) -> Option<&serde_json::Value> {
        self.header_data.as_ref()
    }

    /// Replace the table and reclassify
    pub fn set_data(&mut self, data: SheetTable, is_empty: bool) {
        self.is_plotting = is_plotting_sheet(&self.name, &data);
        self.data = data;
        self.is_empty = is_empty;
    }

    pub fn set_header_data(&mut self, header_data: Option<serde_json::Value>) {
        self.header_data = header_data;
    }
}
