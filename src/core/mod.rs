//! Core data types shared by the extraction, reconciliation and layout stages.
//!
//! - [`RawRecord`]: an entry as read off a source file, keyed by source field names
//! - [`PropertySource`]: the `has_property` / `get_property` capability over a parsed entry
//! - [`NormalizedRecord`]: an entry projected onto the canonical schema
//! - [`Dataset`]: the normalized records of one catalog plus its label
//! - [`SourceFormat`], [`KeyField`]: format descriptors and canonical field selectors
//!
//! ## Canonical schema
//!
//! | Field | HMDB XML | LIPID MAPS SDF |
//! |-------|----------|----------------|
//! | `accession_or_id` | `accession` | `LM_ID` |
//! | `name` | `name` | `NAME` |
//! | `formula` | `chemical_formula` | `FORMULA` |
//! | `identity_key` | `inchikey` | `INCHI_KEY` |
//! | `smiles` | `smiles` | `SMILES` |

pub mod dataset;
pub mod record;
pub mod types;

pub use dataset::Dataset;
pub use record::{NormalizedRecord, PropertySource, RawRecord};
pub use types::{InputKind, KeyField, SourceFormat};
