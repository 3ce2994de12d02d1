#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use vap3_rs::{Vap3Config, Vap3Reader};

fuzz_target!(|data: &[u8]| {
    // Smaller than an end-of-central-directory record
    if data.len() < 22 {
        return;
    }

    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };
    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }

    let extract_dir = match TempDir::new() {
        Ok(d) => d,
        Err(_) => return,
    };
    let config = Vap3Config {
        temp_dir: Some(extract_dir.path().to_path_buf()),
        ..Vap3Config::default()
    };

    // Open, list and load must never panic
    let mut reader = match Vap3Reader::open(temp_file.path()) {
        Ok(r) => r.with_config(config),
        Err(_) => return,
    };

    let files: Vec<String> = reader.list_files().to_vec();
    for file in &files {
        let _ = reader.read_file(file);
    }
    let _ = reader.contains("../../../etc/passwd");

    match reader.load() {
        Ok(loaded) => drop(loaded),
        Err(_) => {
            // A failed load must not leave extracted files behind
            let leftover = std::fs::read_dir(extract_dir.path())
                .map(|entries| entries.count())
                .unwrap_or(0);
            assert_eq!(leftover, 0);
        }
    }
});
