// src/output.rs
// =============================================================================
// Writes harvested entities to CSV.
//
// The header is written explicitly, so column order never depends on the
// first row and an empty slice still produces a valid file.
//
// Rust concepts:
// - &Path vs PathBuf: we only read the path, so we borrow it
// - &[Entity]: a slice, so callers can pass a Vec or part of one
// - with_context: attaches the file name to any I/O or CSV error
// =============================================================================

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::Path;

use crate::api::Entity;

/// Column order of every CSV this tool writes.
pub const CSV_HEADER: [&str; 11] = [
    "id",
    "code",
    "title",
    "definition",
    "parent",
    "browserUrl",
    "codingNote",
    "synonyms",
    "exclusions",
    "inclusions",
    "isLeaf",
];

/// Writes `entities` to `path` as UTF-8 CSV, replacing any existing file.
pub fn write_entities(path: &Path, entities: &[Entity]) -> Result<()> {
    // Make sure the output directory exists. parent() of "out.csv" is "",
    // which is the current directory and needs no creating.
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    // has_headers(false): serialize() would otherwise emit its own header
    // from the struct field names on the first row
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record(CSV_HEADER)?;

    // Each Entity becomes one row; serde decides the order of the values
    // from the struct's field order, which matches CSV_HEADER
    for entity in entities {
        writer
            .serialize(entity)
            .with_context(|| format!("Failed to write row for {}", entity.id))?;
    }
    // The writer buffers internally; flush so errors surface here
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, parent: &str, is_leaf: bool) -> Entity {
        Entity {
            id: id.to_string(),
            code: "1A00".to_string(),
            title: "Cholera, \"classic\"".to_string(),
            definition: String::new(),
            parent: parent.to_string(),
            browser_url: "https://icd.who.int/browse11".to_string(),
            coding_note: String::new(),
            synonyms: "a; b".to_string(),
            exclusions: String::new(),
            inclusions: String::new(),
            is_leaf,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_entities(&path, &[entity("A", "", true), entity("B", "A", false)]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "A");
        assert_eq!(&rows[0][2], "Cholera, \"classic\"");
        assert_eq!(&rows[0][4], "");
        assert_eq!(&rows[0][7], "a; b");
        assert_eq!(&rows[0][10], "True");
        assert_eq!(&rows[1][4], "A");
        assert_eq!(&rows[1][10], "False");
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_entities(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), CSV_HEADER.join(","));
    }
}
