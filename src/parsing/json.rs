//! Normalized datasets as JSON.
//!
//! A dataset is written as a two-space indented array of records, each with
//! all five canonical fields. Absent fields are written as `null`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::core::{Dataset, NormalizedRecord};
use crate::parsing::ParseError;

/// Write records as pretty-printed JSON to any writer
///
/// # Errors
///
/// Returns `ParseError::Json` if serialization fails, or `ParseError::Io` if
/// the writer fails.
pub fn write_records<W: Write>(writer: W, records: &[NormalizedRecord]) -> Result<(), ParseError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write a dataset to `path`, replacing any existing file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be created or written.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), ParseError> {
    let file = File::create(path)?;
    write_records(file, &dataset.records)
}

/// Read records from any reader
///
/// # Errors
///
/// Returns `ParseError::Json` if the content is not an array of records.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<NormalizedRecord>, ParseError> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

/// Read a dataset written by [`write_dataset`]
///
/// # Errors
///
/// Returns `ParseError::ResourceNotFound` if the file cannot be opened, or
/// `ParseError::Json` if it is not a valid dataset.
pub fn read_dataset(path: &Path, label: &str) -> Result<Dataset, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Dataset::new(label, read_records(file)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample() -> Vec<NormalizedRecord> {
        vec![
            NormalizedRecord {
                accession_or_id: Some("HMDB0000001".to_string()),
                name: Some("1-Methylhistidine".to_string()),
                formula: Some("C7H11N3O2".to_string()),
                identity_key: Some("BRMWTNUJHUMWMS-LURJTMIESA-N".to_string()),
                smiles: None,
            },
            NormalizedRecord {
                accession_or_id: Some("HMDB0000002".to_string()),
                name: Some("  spaced \"quoted\" ü ".to_string()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_output_layout() {
        let mut out = Vec::new();
        write_records(&mut out, &sample()[..1]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("[\n  {\n    \"accession_or_id\": \"HMDB0000001\","));
        assert!(text.contains("\"smiles\": null"));
    }

    #[test]
    fn test_reparse_preserves_values() {
        let records = sample();
        let temp = NamedTempFile::with_suffix(".json").unwrap();
        write_dataset(temp.path(), &Dataset::new("metabolite", records.clone())).unwrap();

        let dataset = read_dataset(temp.path(), "metabolite").unwrap();
        assert_eq!(dataset.label, "metabolite");
        assert_eq!(dataset.records, records);
    }

    #[test]
    fn test_empty_dataset_is_empty_array() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
        assert!(read_records("[]".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_array() {
        let result = read_records("{\"accession_or_id\": 1}".as_bytes());
        assert!(matches!(result, Err(ParseError::Json(_))));
    }
}
