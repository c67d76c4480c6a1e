use serde::Serialize;

use crate::core::record::NormalizedRecord;

/// An ordered collection of normalized records from one catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Source label, e.g. `"metabolite"` or `"lipid"`
    pub label: String,

    /// Records in source order
    pub records: Vec<NormalizedRecord>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, records: Vec<NormalizedRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter()
    }
}
