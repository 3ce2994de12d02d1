#![no_main]

use libfuzzer_sys::fuzz_target;
use vap3_rs::SheetTable;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = SheetTable::from_csv(data) else {
        return;
    };

    // Anything that decodes must encode and decode to the same shape
    let encoded = match table.to_csv() {
        Ok(bytes) => bytes,
        Err(_) => return,
    };
    if let Ok(again) = SheetTable::from_csv(&encoded) {
        assert_eq!(again.column_count(), table.column_count());
        if table.column_count() > 0 {
            assert_eq!(again.row_count(), table.row_count());
        }
    }
});
