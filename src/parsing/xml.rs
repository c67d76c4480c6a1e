//! Streaming reader for HMDB-style XML catalogs.
//!
//! The file is consumed as a flat sequence of start/text/end events through a
//! single reused buffer. Only the declared fields of the entry currently open
//! are kept; nothing else of the entry's subtree is ever materialized, so
//! memory stays bounded by one entry regardless of file size.
//!
//! Tags are matched by local name, so `<metabolite>`, `<hmdb:metabolite>` and
//! a default-namespaced `<metabolite xmlns="http://www.hmdb.ca">` are all the
//! same entry element. Within an entry, the first element (at any depth) with
//! a declared field's name supplies that field.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::{PropertySource, RawRecord, SourceFormat};
use crate::parsing::{EntryReader, EntryResult, MalformedRecord, ParseError};

/// Field currently collecting text
#[derive(Debug)]
struct Capture {
    field: &'static str,
    depth: usize,
    text: String,
}

/// Entry element currently open
#[derive(Debug)]
struct OpenEntry {
    depth: usize,
    record: RawRecord,
    capture: Option<Capture>,
    error: Option<String>,
}

impl OpenEntry {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            record: RawRecord::new(),
            capture: None,
            error: None,
        }
    }

    fn push_text(&mut self, depth: usize, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            if capture.depth == depth {
                capture.text.push_str(text);
            }
        }
    }
}

/// Pulls one entry at a time out of an XML event stream
pub struct XmlEntryReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    entry_tag: &'static str,
    fields: &'static [&'static str],
    required: &'static [&'static str],
    depth: usize,
    entry: Option<OpenEntry>,
    entries_seen: usize,
}

impl<R: BufRead> XmlEntryReader<R> {
    pub fn new(reader: R, format: SourceFormat) -> Self {
        // No per-event trimming; captured text is trimmed once per field
        let reader = Reader::from_reader(reader);

        Self {
            reader,
            buf: Vec::new(),
            entry_tag: format.entry_tag().unwrap_or("metabolite"),
            fields: format.declared_fields(),
            required: format.required_fields(),
            depth: 0,
            entry: None,
            entries_seen: 0,
        }
    }

    fn declared_field(&self, local_name: &[u8]) -> Option<&'static str> {
        self.fields
            .iter()
            .copied()
            .find(|field| field.as_bytes() == local_name)
    }

    fn open_element(&mut self, local_name: &[u8]) {
        self.depth += 1;
        let depth = self.depth;

        if self.entry.is_none() {
            if local_name == self.entry_tag.as_bytes() {
                self.entries_seen += 1;
                self.entry = Some(OpenEntry::new(depth));
            }
            return;
        }

        let field = self.declared_field(local_name);
        if let (Some(entry), Some(field)) = (self.entry.as_mut(), field) {
            if entry.capture.is_none() && !entry.record.has_property(field) {
                entry.capture = Some(Capture {
                    field,
                    depth,
                    text: String::new(),
                });
            }
        }
    }

    /// Close the current element, returning the entry if it just ended
    fn close_element(&mut self) -> Option<EntryResult> {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);

        let entry = self.entry.as_mut()?;
        if entry.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = entry.capture.take() {
                let text = capture.text.trim();
                if !text.is_empty() {
                    entry.record.insert(capture.field, text);
                }
            }
        }

        if entry.depth == depth {
            let entry = self.entry.take()?;
            Some(self.finish(entry))
        } else {
            None
        }
    }

    fn finish(&self, entry: OpenEntry) -> EntryResult {
        if let Some(reason) = entry.error {
            return Err(MalformedRecord::new(self.entries_seen, reason));
        }

        let missing: Vec<&str> = self
            .required
            .iter()
            .copied()
            .filter(|field| !entry.record.has_property(field))
            .collect();
        if !missing.is_empty() {
            return Err(MalformedRecord::new(
                self.entries_seen,
                format!("missing required <{}>", missing.join(">, <")),
            ));
        }

        Ok(entry.record)
    }
}

impl<R: BufRead> EntryReader for XmlEntryReader<R> {
    fn read_entry(&mut self) -> Result<Option<EntryResult>, ParseError> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event.into_owned(),
                Err(e) => {
                    return Err(ParseError::Xml {
                        position: self.reader.buffer_position(),
                        message: e.to_string(),
                    })
                }
            };

            match event {
                Event::Start(e) => self.open_element(e.local_name().as_ref()),
                Event::End(_) => {
                    if let Some(result) = self.close_element() {
                        return Ok(Some(result));
                    }
                }
                Event::Empty(e) => {
                    // A self-closing field is absent; a self-closing entry has no fields
                    self.open_element(e.local_name().as_ref());
                    if let Some(result) = self.close_element() {
                        return Ok(Some(result));
                    }
                }
                Event::Text(e) => {
                    let depth = self.depth;
                    if let Some(entry) = self.entry.as_mut() {
                        match e.unescape() {
                            Ok(text) => entry.push_text(depth, &text),
                            Err(err) => {
                                entry.error.get_or_insert(format!("undecodable text: {err}"));
                            }
                        }
                    }
                }
                Event::CData(e) => {
                    let depth = self.depth;
                    if let Some(entry) = self.entry.as_mut() {
                        match std::str::from_utf8(&e) {
                            Ok(text) => entry.push_text(depth, text),
                            Err(err) => {
                                entry.error.get_or_insert(format!("undecodable CDATA: {err}"));
                            }
                        }
                    }
                }
                Event::Eof => {
                    return Ok(self.entry.take().map(|_| {
                        Err(MalformedRecord::new(
                            self.entries_seen,
                            "truncated at end of file",
                        ))
                    }));
                }
                _ => {}
            }
        }
    }
}
