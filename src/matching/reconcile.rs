use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{Dataset, KeyField};
use crate::matching::keyset::{extract_values, intersect, KeySet};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error(
        "Dataset '{label}' has no values for '{field}'; the shared percentage is undefined"
    )]
    EmptyDataset { label: String, field: KeyField },
}

/// `100 * part / whole`, rounded half-up to two decimal places.
///
/// Worked in integer hundredths: exact halves such as 201 / 20000 (1.005%)
/// have no exact binary float and would otherwise round down.
fn percent_of(part: usize, whole: usize) -> f64 {
    let (part, whole) = (part as u128, whole as u128);
    let hundredths = (20_000 * part + whole) / (2 * whole);
    #[allow(clippy::cast_precision_loss)]
    {
        hundredths as f64 / 100.0
    }
}

/// Shared values between two datasets in one key space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub field_a: KeyField,
    pub field_b: KeyField,

    /// Unique values in dataset A
    pub dataset_a_size: usize,

    /// Unique values in dataset B
    pub dataset_b_size: usize,

    pub intersection_size: usize,

    #[serde(skip)]
    pub intersection_set: KeySet,

    /// `100 * intersection / dataset_a_size`, rounded to two decimals
    pub percentage: f64,
}

impl ReconciliationResult {
    /// Shared values relative to dataset B, `None` when B has no values
    #[must_use]
    pub fn dataset_b_percentage(&self) -> Option<f64> {
        (self.dataset_b_size > 0).then(|| {
            percent_of(self.intersection_size, self.dataset_b_size)
        })
    }
}

/// Compare two datasets on one field each
///
/// # Errors
///
/// Returns `ReconcileError::EmptyDataset` if dataset A has no values for
/// `field_a`.
pub fn reconcile(
    a: &Dataset,
    b: &Dataset,
    field_a: KeyField,
    field_b: KeyField,
) -> Result<ReconciliationResult, ReconcileError> {
    let keys_a = extract_values(a, field_a);
    if keys_a.is_empty() {
        return Err(ReconcileError::EmptyDataset {
            label: a.label.clone(),
            field: field_a,
        });
    }
    let keys_b = extract_values(b, field_b);
    let common = intersect(&keys_a, &keys_b);

    let percentage = percent_of(common.len(), keys_a.len());

    debug!(
        field = %field_a,
        a = keys_a.len(),
        b = keys_b.len(),
        common = common.len(),
        "Reconciled {} against {}",
        a.label,
        b.label
    );

    Ok(ReconciliationResult {
        field_a,
        field_b,
        dataset_a_size: keys_a.len(),
        dataset_b_size: keys_b.len(),
        intersection_size: common.len(),
        intersection_set: common,
        percentage,
    })
}

/// Reconciliation of the same two datasets across several key spaces
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub dataset_a: String,
    pub dataset_b: String,
    pub results: Vec<ReconciliationResult>,

    /// Key spaces dataset A has no values for; their percentage is undefined
    pub undefined: Vec<KeyField>,
}

impl ReconciliationReport {
    /// Reconcile `a` against `b` once per field, using the same canonical
    /// field on both sides.
    ///
    /// The first field is the one the caller depends on and must be
    /// defined. Each later key space stands on its own: if dataset A has no
    /// values for it, it is listed in `undefined` instead of failing the
    /// report.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::EmptyDataset` if dataset A has no values for
    /// the first field.
    pub fn build(a: &Dataset, b: &Dataset, fields: &[KeyField]) -> Result<Self, ReconcileError> {
        let mut results = Vec::with_capacity(fields.len());
        let mut undefined = Vec::new();

        if let Some((&first, rest)) = fields.split_first() {
            results.push(reconcile(a, b, first, first)?);
            for &field in rest {
                match reconcile(a, b, field, field) {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        warn!("{e}");
                        undefined.push(field);
                    }
                }
            }
        }

        Ok(Self {
            dataset_a: a.label.clone(),
            dataset_b: b.label.clone(),
            results,
            undefined,
        })
    }

    /// Result for one key space, if it was reconciled
    #[must_use]
    pub fn get(&self, field: KeyField) -> Option<&ReconciliationResult> {
        self.results.iter().find(|r| r.field_a == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NormalizedRecord;

    fn record(key: Option<&str>, smiles: Option<&str>, formula: Option<&str>) -> NormalizedRecord {
        NormalizedRecord {
            identity_key: key.map(str::to_string),
            smiles: smiles.map(str::to_string),
            formula: formula.map(str::to_string),
            ..Default::default()
        }
    }

    fn keys(label: &str, keys: &[&str]) -> Dataset {
        Dataset::new(
            label,
            keys.iter().map(|k| record(Some(*k), None, None)).collect(),
        )
    }

    #[test]
    fn test_reconcile_shared_keys() {
        let a = keys("metabolite", &["X1", "X2", "X3"]);
        let b = keys("lipid", &["X2", "X3", "X4"]);

        let result = reconcile(&a, &b, KeyField::IdentityKey, KeyField::IdentityKey).unwrap();
        assert_eq!(result.dataset_a_size, 3);
        assert_eq!(result.dataset_b_size, 3);
        assert_eq!(result.intersection_size, 2);
        assert_eq!(result.intersection_set.sorted(), vec!["X2", "X3"]);
        assert!((result.percentage - 66.67).abs() < 1e-9);
        assert_eq!(result.dataset_b_percentage(), Some(66.67));
    }

    #[test]
    fn test_reconcile_empty_dataset_a_fails() {
        let a = Dataset::new("metabolite", Vec::new());
        let b = keys("lipid", &["X1"]);

        let err = reconcile(&a, &b, KeyField::IdentityKey, KeyField::IdentityKey).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::EmptyDataset {
                label: "metabolite".to_string(),
                field: KeyField::IdentityKey,
            }
        );
        assert!(err.to_string().contains("metabolite"));
    }

    #[test]
    fn test_reconcile_all_absent_counts_as_empty() {
        let a = Dataset::new("metabolite", vec![record(None, Some("C"), None)]);
        let b = keys("lipid", &["X1"]);
        assert!(reconcile(&a, &b, KeyField::IdentityKey, KeyField::IdentityKey).is_err());
    }

    #[test]
    fn test_reconcile_empty_dataset_b_is_zero_percent() {
        let a = keys("metabolite", &["X1"]);
        let b = Dataset::new("lipid", Vec::new());

        let result = reconcile(&a, &b, KeyField::IdentityKey, KeyField::IdentityKey).unwrap();
        assert_eq!(result.intersection_size, 0);
        assert!(result.percentage.abs() < f64::EPSILON);
        assert_eq!(result.dataset_b_percentage(), None);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percent_of(1, 8), 12.5);
        assert_eq!(percent_of(1, 16), 6.25);
        assert_eq!(percent_of(1, 6), 16.67);
        assert_eq!(percent_of(2, 3), 66.67);
        // Exact halves of a hundredth
        assert_eq!(percent_of(1, 800), 0.13);
        assert_eq!(percent_of(201, 20_000), 1.01);
        assert_eq!(percent_of(0, 5), 0.0);
        assert_eq!(percent_of(5, 5), 100.0);
    }

    #[test]
    fn test_reconcile_rounds_exact_half_up() {
        let a_keys: Vec<String> = (0..20_000).map(|i| format!("K{i}")).collect();
        let b_keys: Vec<String> = (0..201).map(|i| format!("K{i}")).collect();
        let a = Dataset::new(
            "metabolite",
            a_keys.iter().map(|k| record(Some(k.as_str()), None, None)).collect(),
        );
        let b = Dataset::new(
            "lipid",
            b_keys.iter().map(|k| record(Some(k.as_str()), None, None)).collect(),
        );

        let result = reconcile(&a, &b, KeyField::IdentityKey, KeyField::IdentityKey).unwrap();
        assert_eq!(result.intersection_size, 201);
        assert_eq!(result.percentage, 1.01);
        assert_eq!(result.dataset_b_percentage(), Some(100.0));
    }

    #[test]
    fn test_report_covers_each_key_space() {
        let a = Dataset::new(
            "metabolite",
            vec![
                record(Some("K1"), Some("CCO"), Some("C2H6O")),
                record(Some("K2"), Some("CC"), Some("C2H6")),
            ],
        );
        let b = Dataset::new(
            "lipid",
            vec![
                record(Some("K2"), Some("CCO"), Some("C2H6O")),
                record(Some("K3"), None, Some("C2H6")),
            ],
        );

        let report = ReconciliationReport::build(&a, &b, &KeyField::REPORTED).unwrap();
        assert_eq!(report.results.len(), 3);
        assert_eq!(
            report.get(KeyField::IdentityKey).unwrap().intersection_size,
            1
        );
        assert_eq!(report.get(KeyField::Smiles).unwrap().intersection_size, 1);
        assert_eq!(report.get(KeyField::Formula).unwrap().intersection_size, 2);
        assert!(report.get(KeyField::Name).is_none());
        assert!(report.undefined.is_empty());
    }

    #[test]
    fn test_report_lists_undefined_secondary_key_spaces() {
        let a = Dataset::new(
            "metabolite",
            vec![record(Some("K1"), None, Some("C2H6"))],
        );
        let b = Dataset::new("lipid", vec![record(Some("K1"), Some("CC"), None)]);

        let report = ReconciliationReport::build(&a, &b, &KeyField::REPORTED).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.undefined, vec![KeyField::Smiles]);
        assert_eq!(
            report.get(KeyField::IdentityKey).unwrap().intersection_size,
            1
        );
        assert_eq!(report.get(KeyField::Formula).unwrap().intersection_size, 0);
        assert!(report.get(KeyField::Smiles).is_none());
    }

    #[test]
    fn test_report_fails_when_first_key_space_is_empty() {
        let a = Dataset::new("metabolite", vec![record(Some("K1"), None, None)]);
        let b = keys("lipid", &["K1"]);

        let err = ReconciliationReport::build(&a, &b, &[KeyField::Smiles, KeyField::IdentityKey])
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::EmptyDataset {
                field: KeyField::Smiles,
                ..
            }
        ));
    }

    #[test]
    fn test_cross_field_reconcile() {
        let a = keys("metabolite", &["C2H6O"]);
        let b = Dataset::new("lipid", vec![record(None, None, Some("C2H6O"))]);
        let result = reconcile(&a, &b, KeyField::IdentityKey, KeyField::Formula).unwrap();
        assert_eq!(result.intersection_size, 1);
    }
}
