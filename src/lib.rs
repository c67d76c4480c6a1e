//! # lipid-quantifier
//!
//! A library for reconciling the HMDB metabolite catalog with the LIPID MAPS
//! lipid catalog and summarising the overlap as an area-proportional diagram.
//!
//! The two catalogs ship in different formats (a multi-gigabyte XML dump and
//! a structure-data file) and use different field names for the same
//! information. `lipid-quantifier` streams both into one canonical schema,
//! counts the entries they share by InChIKey, SMILES or formula, and lays out
//! two circles whose areas and overlap match those counts.
//!
//! ## Features
//!
//! - **Streaming extraction**: constant memory over arbitrarily large inputs,
//!   with malformed entries skipped and counted rather than aborting the run
//! - **Canonical schema**: one record type for every source format
//! - **Exact reconciliation**: byte-for-byte set intersection per key space
//! - **Proportional layout**: numeric solve for the center distance whose
//!   lens area equals the shared count
//!
//! ## Example
//!
//! ```rust,no_run
//! use lipid_quantifier::core::{KeyField, SourceFormat};
//! use lipid_quantifier::layout::{solve, Areas, SolverConfig, DEFAULT_REFERENCE_AREA};
//! use lipid_quantifier::matching::reconcile;
//! use lipid_quantifier::parsing::extract_dataset;
//! use std::path::Path;
//!
//! let metabolites = extract_dataset(Path::new("hmdb_metabolites.xml"), SourceFormat::HmdbXml).unwrap();
//! let lipids = extract_dataset(Path::new("structures.sdf"), SourceFormat::LipidMapsSdf).unwrap();
//!
//! let result = reconcile(
//!     &metabolites.dataset,
//!     &lipids.dataset,
//!     KeyField::IdentityKey,
//!     KeyField::IdentityKey,
//! ).unwrap();
//! println!("{} shared InChIKeys ({}%)", result.intersection_size, result.percentage);
//!
//! let areas = Areas::from_counts(
//!     result.dataset_a_size,
//!     result.dataset_b_size,
//!     result.intersection_size,
//!     DEFAULT_REFERENCE_AREA,
//! ).unwrap();
//! let geometry = solve(&areas, &SolverConfig::default());
//! println!("centers {} apart", geometry.distance());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Record, dataset and format descriptor types
//! - [`parsing`]: Streaming XML and SDF extraction, JSON datasets
//! - [`matching`]: Key sets and reconciliation
//! - [`layout`]: Lens area, layout solver, diagram and SVG output
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod layout;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::{Dataset, KeyField, NormalizedRecord, PropertySource, RawRecord, SourceFormat};
pub use crate::layout::{solve, Areas, CircleGeometry, Diagram, LayoutError, SolverConfig};
pub use crate::matching::{reconcile, ReconcileError, ReconciliationResult};
pub use crate::parsing::{extract, ParseError, RecordStream};
