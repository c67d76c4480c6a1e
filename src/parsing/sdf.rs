//! Reader for MDL structure-data files (SDF), as shipped by LIPID MAPS.
//!
//! An SDF file is a sequence of records terminated by `$$$$` lines. Each
//! record holds a molfile (three header lines, a counts line, the connection
//! table and an `M  END` terminator) followed by data items:
//!
//! ```text
//! > <LM_ID>
//! LMFA01010001
//!
//! > <NAME>
//! Palmitic acid
//!
//! $$$$
//! ```
//!
//! Records are read one at a time into a [`SdfMolecule`]; the connection table
//! is checked for structure but not interpreted.

use std::io::BufRead;

use crate::core::{PropertySource, RawRecord, SourceFormat};
use crate::parsing::{EntryReader, EntryResult, MalformedRecord, ParseError};

/// Record delimiter line
const RECORD_END: &str = "$$$$";

/// Connection table terminator
const MOLFILE_END: &str = "M  END";

/// One parsed SDF record: the molecule title and its data items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdfMolecule {
    pub title: String,
    properties: Vec<(String, String)>,
}

impl SdfMolecule {
    /// Parse the lines of one record (without the `$$$$` delimiter)
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the molfile block has no
    /// parseable counts line or no `M  END` terminator.
    pub fn parse(lines: &[String]) -> Result<Self, String> {
        let counts = lines
            .get(3)
            .ok_or_else(|| "record ends before the counts line".to_string())?;
        let atoms = counts.get(..3).map(str::trim).unwrap_or_default();
        if atoms.parse::<usize>().is_err() {
            return Err(format!("invalid counts line '{counts}'"));
        }

        let end = lines
            .iter()
            .skip(3)
            .position(|line| line.trim_end() == MOLFILE_END)
            .map(|i| i + 3)
            .ok_or_else(|| format!("missing '{MOLFILE_END}'"))?;

        Ok(Self {
            title: lines[0].trim().to_string(),
            properties: parse_data_items(&lines[end + 1..]),
        })
    }

    /// Names of all data items, in file order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }
}

impl PropertySource for SdfMolecule {
    fn get_property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Data item name from a `> <NAME>` header line
fn data_header_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    let start = rest.find('<')? + 1;
    let len = rest[start..].find('>')?;
    Some(&rest[start..start + len])
}

/// Parse the data items that follow `M  END`.
///
/// Values run until the next blank line; multi-line values are joined with
/// `\n`. Items with an empty value are dropped.
fn parse_data_items(lines: &[String]) -> Vec<(String, String)> {
    let mut items = Vec::new();
    let mut iter = lines.iter().peekable();

    while let Some(line) = iter.next() {
        let Some(name) = data_header_name(line) else {
            continue;
        };

        let mut value_lines: Vec<&str> = Vec::new();
        while let Some(next) = iter.peek() {
            if next.trim().is_empty() || data_header_name(next).is_some() {
                break;
            }
            value_lines.push(next.as_str());
            iter.next();
        }

        let value = value_lines.join("\n");
        if !value.is_empty() {
            items.push((name.to_string(), value));
        }
    }

    items
}

/// Reads one SDF record at a time from a buffered source
pub struct SdfReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    properties: &'static [&'static str],
    required: &'static [&'static str],
    records_seen: usize,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(reader: R, format: SourceFormat) -> Self {
        Self {
            reader,
            line: Vec::new(),
            properties: format.declared_fields(),
            required: format.required_fields(),
            records_seen: 0,
        }
    }

    /// Read the next record's lines, `None` at end of input.
    ///
    /// The flag is set when any line was not valid UTF-8.
    fn read_record_lines(&mut self) -> Result<Option<(Vec<String>, bool)>, ParseError> {
        let mut lines = Vec::new();
        let mut invalid_utf8 = false;

        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                break;
            }

            let text = match std::str::from_utf8(&self.line) {
                Ok(text) => text.trim_end_matches(['\r', '\n']).to_string(),
                Err(_) => {
                    invalid_utf8 = true;
                    String::new()
                }
            };

            if text.trim_end() == RECORD_END {
                return Ok(Some((lines, invalid_utf8)));
            }
            lines.push(text);
        }

        // Trailing record without a delimiter, unless only whitespace is left
        if lines.iter().all(|l| l.trim().is_empty()) && !invalid_utf8 {
            Ok(None)
        } else {
            Ok(Some((lines, invalid_utf8)))
        }
    }
}

impl<R: BufRead> EntryReader for SdfReader<R> {
    fn read_entry(&mut self) -> Result<Option<EntryResult>, ParseError> {
        let Some((lines, invalid_utf8)) = self.read_record_lines()? else {
            return Ok(None);
        };
        self.records_seen += 1;
        let index = self.records_seen;

        if invalid_utf8 {
            return Ok(Some(Err(MalformedRecord::new(
                index,
                "record contains invalid UTF-8",
            ))));
        }

        let molecule = match SdfMolecule::parse(&lines) {
            Ok(molecule) => molecule,
            Err(reason) => return Ok(Some(Err(MalformedRecord::new(index, reason)))),
        };

        if let Some(missing) = self.required.iter().find(|p| !molecule.has_property(p)) {
            return Ok(Some(Err(MalformedRecord::new(
                index,
                format!("missing required property <{missing}>"),
            ))));
        }

        Ok(Some(Ok(RawRecord::from_properties(
            &molecule,
            self.properties,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PALMITIC_ACID: &str = "\
Palmitic acid
  LIPDMAPS12062300002D

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.0000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  2  0
M  END
> <LM_ID>
LMFA01010001

> <NAME>
Palmitic acid

> <SYSTEMATIC_NAME>
hexadecanoic acid

> <CATEGORY>
Fatty Acyls [FA]

> <FORMULA>
C16H32O2

> <INCHI_KEY>
IPCSVZSSVZVIGE-UHFFFAOYSA-N

> <SMILES>
CCCCCCCCCCCCCCCC(O)=O

> <SYNONYMS>
n-hexadecanoic acid;
palmitate

$$$$
";

    fn read_all(sdf: &str) -> Vec<EntryResult> {
        let mut reader = SdfReader::new(
            Cursor::new(sdf.as_bytes().to_vec()),
            SourceFormat::LipidMapsSdf,
        );
        let mut out = Vec::new();
        while let Some(entry) = reader.read_entry().unwrap() {
            out.push(entry);
        }
        out
    }

    #[test]
    fn test_reads_declared_properties() {
        let entries = read_all(PALMITIC_ACID);
        assert_eq!(entries.len(), 1);

        let record = entries[0].as_ref().unwrap();
        assert_eq!(record.get_property("LM_ID"), Some("LMFA01010001"));
        assert_eq!(record.get_property("CATEGORY"), Some("Fatty Acyls [FA]"));
        assert_eq!(
            record.get_property("INCHI_KEY"),
            Some("IPCSVZSSVZVIGE-UHFFFAOYSA-N")
        );
        assert_eq!(record.get_property("SMILES"), Some("CCCCCCCCCCCCCCCC(O)=O"));
        // Not in the declared list
        assert!(!record.has_property("SYNONYMS"));
    }

    #[test]
    fn test_molecule_keeps_multiline_values() {
        let lines: Vec<String> = PALMITIC_ACID
            .lines()
            .take_while(|l| *l != "$$$$")
            .map(str::to_string)
            .collect();
        let molecule = SdfMolecule::parse(&lines).unwrap();

        assert_eq!(molecule.title, "Palmitic acid");
        assert_eq!(
            molecule.get_property("SYNONYMS"),
            Some("n-hexadecanoic acid;\npalmitate")
        );
        assert_eq!(molecule.property_names().count(), 8);
    }

    #[test]
    fn test_missing_properties_are_tolerated() {
        let sdf = "\n  test\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n> <NAME>\nUnnamed lipid\n\n$$$$\n";
        let entries = read_all(sdf);
        let record = entries[0].as_ref().unwrap();
        assert_eq!(record.get_property("NAME"), Some("Unnamed lipid"));
        assert!(!record.has_property("LM_ID"));
        assert!(!record.has_property("INCHI_KEY"));
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let broken = "broken\n\n\nnot a counts line\n$$$$\n";
        let sdf = format!("{PALMITIC_ACID}{broken}{PALMITIC_ACID}");
        let entries = read_all(&sdf);

        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_ok());
        let malformed = entries[1].as_ref().unwrap_err();
        assert_eq!(malformed.index, 2);
        assert!(malformed.reason.contains("counts line"));
        assert!(entries[2].is_ok());
    }

    #[test]
    fn test_missing_molfile_terminator() {
        let sdf = "t\n\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\n> <LM_ID>\nLMFA1\n\n$$$$\n";
        let entries = read_all(sdf);
        assert!(entries[0].as_ref().unwrap_err().reason.contains("M  END"));
    }

    #[test]
    fn test_trailing_record_without_delimiter() {
        let sdf = PALMITIC_ACID.trim_end().trim_end_matches("$$$$");
        let entries = read_all(sdf);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_ok());
    }

    #[test]
    fn test_crlf_line_endings() {
        let sdf = PALMITIC_ACID.replace('\n', "\r\n");
        let entries = read_all(&sdf);
        let record = entries[0].as_ref().unwrap();
        assert_eq!(record.get_property("LM_ID"), Some("LMFA01010001"));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut bytes = b"bad \xff title\n".to_vec();
        bytes.extend_from_slice(b"\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n$$$$\n");
        let mut reader = SdfReader::new(Cursor::new(bytes), SourceFormat::LipidMapsSdf);
        let entry = reader.read_entry().unwrap().unwrap();
        assert!(entry.is_err());
        assert!(reader.read_entry().unwrap().is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(read_all("").is_empty());
        assert!(read_all("\n\n").is_empty());
    }

    #[test]
    fn test_data_header_name() {
        assert_eq!(data_header_name("> <LM_ID>"), Some("LM_ID"));
        assert_eq!(data_header_name(">  <NAME>  (1)"), Some("NAME"));
        assert_eq!(data_header_name("M  END"), None);
    }
}
