use std::collections::HashSet;

use crate::core::{Dataset, KeyField};

/// Unique, present values of one canonical field across a dataset.
///
/// Values are compared byte-for-byte; absent fields never enter the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    values: HashSet<String>,
}

impl KeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Values in byte order, for reproducible output
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self.iter().collect();
        values.sort_unstable();
        values
    }
}

impl<S: Into<String>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Collect every present value of `field` in `dataset`, deduplicated
#[must_use]
pub fn extract_values(dataset: &Dataset, field: KeyField) -> KeySet {
    dataset.iter().filter_map(|record| field.value(record)).collect()
}

/// Set intersection; the result does not depend on argument order
#[must_use]
pub fn intersect(a: &KeySet, b: &KeySet) -> KeySet {
    // Probe the larger set with the smaller one
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .values
        .iter()
        .filter(|value| large.values.contains(*value))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NormalizedRecord;

    fn with_keys(keys: &[Option<&str>]) -> Dataset {
        let records = keys
            .iter()
            .map(|key| NormalizedRecord {
                identity_key: key.map(str::to_string),
                ..Default::default()
            })
            .collect();
        Dataset::new("test", records)
    }

    #[test]
    fn test_extract_values_skips_absent_and_dedups() {
        let dataset = with_keys(&[Some("X1"), None, Some("X2"), Some("X1"), None]);
        let keys = extract_values(&dataset, KeyField::IdentityKey);

        assert_eq!(keys.len(), 2);
        assert_eq!(keys.sorted(), vec!["X1", "X2"]);
        assert!(extract_values(&dataset, KeyField::Smiles).is_empty());
    }

    #[test]
    fn test_values_compared_exactly() {
        let dataset = with_keys(&[Some("abc"), Some("ABC"), Some("abc ")]);
        assert_eq!(extract_values(&dataset, KeyField::IdentityKey).len(), 3);
    }

    #[test]
    fn test_intersect_is_commutative() {
        let a: KeySet = ["X1", "X2", "X3"].into_iter().collect();
        let b: KeySet = ["X2", "X3", "X4", "X5"].into_iter().collect();

        let ab = intersect(&a, &b);
        let ba = intersect(&b, &a);
        assert_eq!(ab, ba);
        assert_eq!(ab.sorted(), vec!["X2", "X3"]);

        let empty = KeySet::new();
        assert!(intersect(&a, &empty).is_empty());
        assert_eq!(intersect(&empty, &a), intersect(&a, &empty));
    }
}
