//! Streaming extraction of catalog entries from source files.
//!
//! This module provides readers for:
//!
//! - **HMDB XML** ([`xml`]): `<metabolite>` entries pulled from an event stream
//! - **LIPID MAPS SDF** ([`sdf`]): `$$$$`-delimited structure-data records
//! - **Normalized JSON** ([`json`]): datasets previously written by `convert`
//!
//! Source files can be several gigabytes, so readers never hold more than one
//! entry in memory. [`extract`] opens a file and returns a lazy
//! [`RecordStream`]; the file handle lives inside the stream and is closed as
//! soon as the stream ends, fails, or is dropped.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lipid_quantifier::core::SourceFormat;
//! use lipid_quantifier::parsing;
//! use std::path::Path;
//!
//! let mut stream = parsing::extract(Path::new("hmdb_metabolites.xml"), SourceFormat::HmdbXml).unwrap();
//! for record in &mut stream {
//!     let record = record.unwrap();
//!     // ...
//! }
//! println!("skipped {} malformed entries", stream.skipped());
//! ```
//!
//! ## Error policy
//!
//! | Failure | Handling |
//! |---------|----------|
//! | Missing or unreadable file | [`ParseError::ResourceNotFound`], fatal |
//! | Malformed single entry | [`MalformedRecord`], logged, counted and skipped |
//! | XML syntax or I/O error mid-stream | yielded once as `Err`, stream ends |

pub mod json;
pub mod sdf;
pub mod xml;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{Dataset, InputKind, NormalizedRecord, RawRecord, SourceFormat};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot open '{}': {source}", path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported input file: {0}")]
    UnsupportedFormat(String),
}

/// A single entry that could not be turned into a [`RawRecord`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("entry {index}: {reason}")]
pub struct MalformedRecord {
    /// 1-based position of the entry in the source file
    pub index: usize,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

/// Outcome of reading one entry off a source
pub type EntryResult = Result<RawRecord, MalformedRecord>;

/// A format-specific reader that produces one entry per call.
///
/// `Ok(None)` marks the end of input. A malformed entry is returned as
/// `Ok(Some(Err(..)))` so the caller can skip it and keep reading; `Err` is
/// reserved for failures the reader cannot recover from.
pub trait EntryReader {
    fn read_entry(&mut self) -> Result<Option<EntryResult>, ParseError>;
}

/// Lazy sequence of raw records read from one source.
///
/// Not restartable: calling [`extract`] again re-opens the file.
pub struct RecordStream {
    reader: Option<Box<dyn EntryReader>>,
    source: String,
    yielded: usize,
    skipped: usize,
}

impl RecordStream {
    pub fn new(reader: Box<dyn EntryReader>, source: impl Into<String>) -> Self {
        Self {
            reader: Some(reader),
            source: source.into(),
            yielded: 0,
            skipped: 0,
        }
    }

    /// Stream entries of `format` out of an already-open reader
    pub fn from_reader<R: BufRead + 'static>(
        reader: R,
        format: SourceFormat,
        source: impl Into<String>,
    ) -> Self {
        let entries: Box<dyn EntryReader> = match format {
            SourceFormat::HmdbXml => Box::new(xml::XmlEntryReader::new(reader, format)),
            SourceFormat::LipidMapsSdf => Box::new(sdf::SdfReader::new(reader, format)),
        };
        Self::new(entries, source)
    }

    /// Number of records yielded so far
    #[must_use]
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Number of malformed entries skipped so far
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether the underlying reader has been released
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.reader.is_none()
    }
}

impl Iterator for RecordStream {
    type Item = Result<RawRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;
            match reader.read_entry() {
                Ok(Some(Ok(record))) => {
                    self.yielded += 1;
                    return Some(Ok(record));
                }
                Ok(Some(Err(malformed))) => {
                    self.skipped += 1;
                    warn!(source = %self.source, "Skipping malformed {malformed}");
                }
                Ok(None) => {
                    // Dropping the reader closes the file
                    self.reader = None;
                    debug!(
                        source = %self.source,
                        records = self.yielded,
                        skipped = self.skipped,
                        "Reached end of input"
                    );
                    return None;
                }
                Err(e) => {
                    self.reader = None;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

/// Open a source file for buffered reading, decompressing `.gz` on the fly
///
/// # Errors
///
/// Returns `ParseError::ResourceNotFound` if the file cannot be opened.
pub fn open_source(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Open `path` and stream its entries as raw records
///
/// # Errors
///
/// Returns `ParseError::ResourceNotFound` if the file cannot be opened.
pub fn extract(path: &Path, format: SourceFormat) -> Result<RecordStream, ParseError> {
    let reader = open_source(path)?;
    debug!(path = %path.display(), %format, "Opened source file");
    Ok(RecordStream::from_reader(
        reader,
        format,
        path.display().to_string(),
    ))
}

/// A normalized dataset together with extraction bookkeeping
#[derive(Debug, Clone)]
pub struct Extraction {
    pub dataset: Dataset,
    /// Malformed entries skipped while streaming
    pub skipped: usize,
}

/// Drain a record stream into a normalized dataset
///
/// # Errors
///
/// Returns the first fatal error the stream yields.
pub fn collect_dataset(
    stream: &mut RecordStream,
    format: SourceFormat,
) -> Result<Dataset, ParseError> {
    let mut records = Vec::new();
    for raw in stream.by_ref() {
        records.push(NormalizedRecord::normalize(&raw?, format));
    }
    Ok(Dataset::new(format.label(), records))
}

/// Stream a source file into a normalized dataset
///
/// # Errors
///
/// Returns `ParseError::ResourceNotFound` if the file cannot be opened, or
/// the first fatal error raised while streaming.
pub fn extract_dataset(path: &Path, format: SourceFormat) -> Result<Extraction, ParseError> {
    let mut stream = extract(path, format)?;
    let dataset = collect_dataset(&mut stream, format)?;

    info!(
        path = %path.display(),
        records = dataset.len(),
        skipped = stream.skipped(),
        "Extracted {} dataset",
        format.label()
    );

    Ok(Extraction {
        dataset,
        skipped: stream.skipped(),
    })
}

/// Load a pipeline input: either a raw catalog file or normalized JSON.
///
/// `format` supplies the dataset label and, for raw files, the parser.
///
/// # Errors
///
/// Returns `ParseError::UnsupportedFormat` if a raw file's extension does not
/// match `format`, plus any error from extraction or JSON decoding.
pub fn load_input(path: &Path, format: SourceFormat) -> Result<Extraction, ParseError> {
    match InputKind::detect(path) {
        Some(InputKind::Normalized) => Ok(Extraction {
            dataset: json::read_dataset(path, format.label())?,
            skipped: 0,
        }),
        Some(InputKind::Source(detected)) if detected != format => {
            Err(ParseError::UnsupportedFormat(format!(
                "'{}' looks like {detected}, expected {format}",
                path.display()
            )))
        }
        // Unknown extensions are read with the requested parser
        _ => extract_dataset(path, format),
    }
}
