//! Exact-match reconciliation of two normalized datasets.
//!
//! - [`KeySet`]: unique present values of one canonical field
//! - [`reconcile`]: sizes, intersection and shared percentage for one key space
//! - [`ReconciliationReport`]: the same two datasets reconciled per key space
//!
//! The reconciler is field-agnostic: InChIKeys, SMILES strings and chemical
//! formulas are all just byte strings compared for equality.
//!
//! ## Example
//!
//! ```rust
//! use lipid_quantifier::core::{Dataset, KeyField, NormalizedRecord};
//! use lipid_quantifier::matching::reconcile;
//!
//! let record = |key: &str| NormalizedRecord {
//!     identity_key: Some(key.to_string()),
//!     ..Default::default()
//! };
//! let metabolites = Dataset::new("metabolite", vec![record("X1"), record("X2"), record("X3")]);
//! let lipids = Dataset::new("lipid", vec![record("X2"), record("X3"), record("X4")]);
//!
//! let result = reconcile(&metabolites, &lipids, KeyField::IdentityKey, KeyField::IdentityKey).unwrap();
//! assert_eq!(result.intersection_size, 2);
//! assert_eq!(result.percentage, 66.67);
//! ```

pub mod keyset;
pub mod reconcile;

pub use keyset::{extract_values, intersect, KeySet};
pub use reconcile::{reconcile, ReconcileError, ReconciliationReport, ReconciliationResult};
