mod format;
mod loaded;
mod reader;
mod writer;

pub use format::{
    dotted_extension, legacy_sheet_metadata_entry, parse_image_entry, sample_image_entry,
    sheet_data_entry, sheet_header_data_entry, sheet_image_entry, sheet_metadata_entry,
    validate_sample_id, validate_sheet_name, with_vap3_extension, ImageEntry,
    IMAGE_CROP_STATES_ENTRY, IMAGES_DIR, LEGACY_METADATA_ENTRY, METADATA_ENTRY,
    PLOT_OPTIONS_ENTRY, PLOT_SETTINGS_ENTRY, SAMPLE_CROP_STATES_ENTRY, SAMPLE_IMAGES_DIR,
    SAMPLE_IMAGES_METADATA_ENTRY, SHEETS_DIR, SHEET_DATA_FILE, SHEET_HEADER_DATA_FILE,
    VAP3_EXTENSION,
};
pub use loaded::LoadedArchive;
pub use reader::Vap3Reader;
pub use writer::Vap3Writer;
