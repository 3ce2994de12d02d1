//! Generate seed corpus for fuzzing

use std::fs;
use std::path::Path;
use vap3_rs::{CellValue, Session, Sheet, SheetTable, Vap3Config, Vap3Writer};

fn write_seed(path: &str, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = Vap3Writer::create(path, &Vap3Config::default())?;
    writer.write_session(session)?;
    writer.finalize()?;
    println!("✓ Generated: {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_vap3_load";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: Empty session
    write_seed(&format!("{}/seed_empty.vap3", corpus_dir), &Session::new())?;

    // Seed 2: Summary and empty sheet
    {
        let mut session = Session::new();
        let table = SheetTable::with_rows(
            ["Sample", "Value"],
            vec![
                vec!["A".into(), CellValue::Int(1)],
                vec!["B".into(), CellValue::Float(2.5)],
            ],
        )?;
        session
            .add_sheet(Sheet::new("Summary", table, false))
            .add_sheet(Sheet::new("Empty", SheetTable::new(["A"]), true));
        session.plot_options = vec!["TPM".to_string()];
        write_seed(&format!("{}/seed_sheets.vap3", corpus_dir), &session)?;
    }

    // Seed 3: Sheet and sample images
    {
        let image_path = Path::new(corpus_dir).join("seed_image.png");
        fs::write(&image_path, b"\x89PNG\r\n\x1a\nnot really")?;

        let mut session = Session::new();
        session
            .add_sheet(Sheet::new("Intense Test", SheetTable::new(["Puffs", "TPM"]), true))
            .add_image("run.xlsx", "Intense Test", &image_path)
            .add_sample_image("S1", &image_path);
        write_seed(&format!("{}/seed_images.vap3", corpus_dir), &session)?;

        fs::remove_file(&image_path)?;
    }

    println!("\nSeed corpus generated in {}", corpus_dir);
    Ok(())
}
