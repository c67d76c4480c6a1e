use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::record::NormalizedRecord;

/// Source format of a reference catalog file.
///
/// Each variant doubles as the format descriptor handed to the extractor and
/// the normalizer: it names the entry element or the declared property list,
/// the fields an entry must carry, and how source field names map onto the
/// canonical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// HMDB "All Metabolites" XML dump
    #[value(name = "hmdb")]
    HmdbXml,
    /// LIPID MAPS LMSD structure-data file
    #[value(name = "lipidmaps")]
    LipidMapsSdf,
}

/// Source field names for each canonical field of one format
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub accession_or_id: &'static str,
    pub name: &'static str,
    pub formula: &'static str,
    pub identity_key: &'static str,
    pub smiles: &'static str,
}

const HMDB_FIELDS: &[&str] = &[
    "accession",
    "name",
    "iupac_name",
    "chemical_formula",
    "inchikey",
    "smiles",
];

const LIPID_MAPS_PROPERTIES: &[&str] = &[
    "LM_ID",
    "NAME",
    "SYSTEMATIC_NAME",
    "CATEGORY",
    "FORMULA",
    "INCHI_KEY",
    "SMILES",
];

impl SourceFormat {
    /// Dataset label used in reports and diagrams
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::HmdbXml => "metabolite",
            Self::LipidMapsSdf => "lipid",
        }
    }

    /// Human-readable name of the catalog the format comes from
    #[must_use]
    pub fn catalog_name(self) -> &'static str {
        match self {
            Self::HmdbXml => "HMDB",
            Self::LipidMapsSdf => "LIPID MAPS",
        }
    }

    /// Local tag name of the entry element (markup formats only)
    #[must_use]
    pub fn entry_tag(self) -> Option<&'static str> {
        match self {
            Self::HmdbXml => Some("metabolite"),
            Self::LipidMapsSdf => None,
        }
    }

    /// Field or property names the extractor reads from each entry
    #[must_use]
    pub fn declared_fields(self) -> &'static [&'static str] {
        match self {
            Self::HmdbXml => HMDB_FIELDS,
            Self::LipidMapsSdf => LIPID_MAPS_PROPERTIES,
        }
    }

    /// Fields whose absence makes an entry malformed
    #[must_use]
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::HmdbXml => &["accession"],
            Self::LipidMapsSdf => &[],
        }
    }

    #[must_use]
    pub fn mapping(self) -> FieldMapping {
        match self {
            Self::HmdbXml => FieldMapping {
                accession_or_id: "accession",
                name: "name",
                formula: "chemical_formula",
                identity_key: "inchikey",
                smiles: "smiles",
            },
            Self::LipidMapsSdf => FieldMapping {
                accession_or_id: "LM_ID",
                name: "NAME",
                formula: "FORMULA",
                identity_key: "INCHI_KEY",
                smiles: "SMILES",
            },
        }
    }

    /// Guess the format from a file name, looking through a `.gz` suffix
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        match InputKind::detect(path) {
            Some(InputKind::Source(format)) => Some(format),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HmdbXml => write!(f, "HMDB XML"),
            Self::LipidMapsSdf => write!(f, "LIPID MAPS SDF"),
        }
    }
}

/// What a pipeline input file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A raw catalog download that must be streamed and normalized
    Source(SourceFormat),
    /// A dataset previously written by `convert`
    Normalized,
}

impl InputKind {
    #[must_use]
    #[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy().to_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);

        if name.ends_with(".xml") {
            Some(Self::Source(SourceFormat::HmdbXml))
        } else if name.ends_with(".sdf") {
            Some(Self::Source(SourceFormat::LipidMapsSdf))
        } else if name.ends_with(".json") {
            Some(Self::Normalized)
        } else {
            None
        }
    }
}

/// Canonical field used as the identity for reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    #[value(name = "accession")]
    AccessionOrId,
    Name,
    Formula,
    IdentityKey,
    Smiles,
}

impl KeyField {
    /// Key spaces reconciled by a full report, in reporting order
    pub const REPORTED: [KeyField; 3] = [Self::IdentityKey, Self::Smiles, Self::Formula];

    /// Value of this field on a record, `None` when absent
    #[must_use]
    pub fn value(self, record: &NormalizedRecord) -> Option<&str> {
        let value = match self {
            Self::AccessionOrId => &record.accession_or_id,
            Self::Name => &record.name,
            Self::Formula => &record.formula,
            Self::IdentityKey => &record.identity_key,
            Self::Smiles => &record.smiles,
        };
        value.as_deref()
    }

    /// Canonical schema name of the field
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessionOrId => "accession_or_id",
            Self::Name => "name",
            Self::Formula => "formula",
            Self::IdentityKey => "identity_key",
            Self::Smiles => "smiles",
        }
    }

    /// Display name for reports
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::AccessionOrId => "Accessions",
            Self::Name => "Names",
            Self::Formula => "Chemical formulas",
            Self::IdentityKey => "InChIKeys",
            Self::Smiles => "SMILES",
        }
    }
}

impl std::fmt::Display for KeyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for KeyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accession_or_id" => Ok(Self::AccessionOrId),
            "name" => Ok(Self::Name),
            "formula" => Ok(Self::Formula),
            "identity_key" => Ok(Self::IdentityKey),
            "smiles" => Ok(Self::Smiles),
            other => Err(format!("unknown canonical field '{other}'")),
        }
    }
}
