use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::SourceFormat;

/// Named-property lookup over a parsed entry.
///
/// Implemented by parsed molecules coming out of a structure-data file and by
/// [`RawRecord`] itself, so the normalizer never needs to know which parser
/// produced an entry.
pub trait PropertySource {
    /// Whether the entry carries a value for `name`
    fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Value of `name`, `None` when the entry does not carry it
    fn get_property(&self, name: &str) -> Option<&str>;
}

/// One entry as read off a source file, keyed by source-specific field names.
///
/// Only fields that were present (and non-empty) in the source are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a field value; the first value seen for a name wins
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Copy the declared properties of a parsed entry into a raw record
    pub fn from_properties<P: PropertySource + ?Sized>(source: &P, names: &[&str]) -> Self {
        let mut record = Self::new();
        for name in names {
            if let Some(value) = source.get_property(name) {
                record.insert(*name, value);
            }
        }
        record
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PropertySource for RawRecord {
    fn get_property(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A record projected onto the canonical schema shared by all source formats.
///
/// Absent fields are `None` and serialize as `null`; they are never replaced
/// by an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub accession_or_id: Option<String>,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub identity_key: Option<String>,
    pub smiles: Option<String>,
}

impl NormalizedRecord {
    /// Remap a raw entry's fields onto the canonical schema.
    ///
    /// Pure field renaming: values are copied verbatim and missing fields
    /// become `None`.
    pub fn normalize<P: PropertySource + ?Sized>(raw: &P, format: SourceFormat) -> Self {
        let mapping = format.mapping();
        let take = |name: &str| raw.get_property(name).map(str::to_string);

        Self {
            accession_or_id: take(mapping.accession_or_id),
            name: take(mapping.name),
            formula: take(mapping.formula),
            identity_key: take(mapping.identity_key),
            smiles: take(mapping.smiles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hmdb_record() {
        let raw: RawRecord = [
            ("accession", "HMDB0000001"),
            ("name", "1-Methylhistidine"),
            ("iupac_name", "(2S)-2-amino-3-(1-methyl-1H-imidazol-4-yl)propanoic acid"),
            ("chemical_formula", "C7H11N3O2"),
            ("inchikey", "BRMWTNUJHUMWMS-LURJTMIESA-N"),
        ]
        .into_iter()
        .collect();

        let record = NormalizedRecord::normalize(&raw, SourceFormat::HmdbXml);
        assert_eq!(record.accession_or_id.as_deref(), Some("HMDB0000001"));
        assert_eq!(record.name.as_deref(), Some("1-Methylhistidine"));
        assert_eq!(record.formula.as_deref(), Some("C7H11N3O2"));
        assert_eq!(
            record.identity_key.as_deref(),
            Some("BRMWTNUJHUMWMS-LURJTMIESA-N")
        );
        // Missing in the source, so absent rather than ""
        assert_eq!(record.smiles, None);
    }

    #[test]
    fn test_normalize_lipid_maps_record() {
        let raw: RawRecord = [
            ("LM_ID", "LMFA01010001"),
            ("NAME", "Palmitic acid"),
            ("FORMULA", "C16H32O2"),
            ("INCHI_KEY", "IPCSVZSSVZVIGE-UHFFFAOYSA-N"),
            ("SMILES", "CCCCCCCCCCCCCCCC(O)=O"),
        ]
        .into_iter()
        .collect();

        let record = NormalizedRecord::normalize(&raw, SourceFormat::LipidMapsSdf);
        assert_eq!(record.accession_or_id.as_deref(), Some("LMFA01010001"));
        assert_eq!(record.smiles.as_deref(), Some("CCCCCCCCCCCCCCCC(O)=O"));
    }

    #[test]
    fn test_normalize_is_pure_renaming() {
        // Whitespace and case are carried through untouched
        let raw: RawRecord = [("inchikey", " abc-DEF ")].into_iter().collect();
        let first = NormalizedRecord::normalize(&raw, SourceFormat::HmdbXml);
        let second = NormalizedRecord::normalize(&raw, SourceFormat::HmdbXml);
        assert_eq!(first, second);
        assert_eq!(first.identity_key.as_deref(), Some(" abc-DEF "));
        assert_eq!(first.accession_or_id, None);
    }

    #[test]
    fn test_raw_record_first_value_wins() {
        let mut raw = RawRecord::new();
        raw.insert("accession", "HMDB0000001");
        raw.insert("accession", "HMDB00001");
        assert_eq!(raw.get_property("accession"), Some("HMDB0000001"));
        assert!(raw.has_property("accession"));
        assert!(!raw.has_property("smiles"));
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let record = NormalizedRecord {
            accession_or_id: Some("LMFA01010001".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["accession_or_id"], "LMFA01010001");
        assert!(json["smiles"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
