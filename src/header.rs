// Copyright (C) 2024 The nrrd crate authors
//
// This file is part of nrrd.
//
// nrrd is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// nrrd is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with nrrd.  If not, see <http://www.gnu.org/licenses/>.
//! The header codec: magic/version line, `name: value` and `name:=value`
//! lines, the blank-line terminator, and the duplicate-field policy.
//!
//! ```text
//! NRRD0004
//! type: float
//! dimension: 3
//! sizes: 64 64 64
//! encoding: raw
//! my custom field:=anything goes here
//!                       <- blank line terminates the header
//! <payload bytes follow>
//! ```

use crate::config::Config;
use crate::error::{Cause, NrrdError, Result};
use crate::field::{self, FieldShape, FieldValue};

/// The parsed, in-order header: standard fields and custom (`:=`) fields, each keyed by its
/// canonical name, in the order they were first seen.
#[derive(Debug, Clone)]
pub struct Header {
    pub version: u32,
    fields: Vec<(String, FieldValue)>,
    custom: Vec<(String, FieldValue)>,
}

impl Header {
    pub fn new(version: u32) -> Header {
        Header {
            version,
            fields: Vec::new(),
            custom: Vec::new(),
        }
    }

    pub fn get(&self, canonical_name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == canonical_name)
            .map(|(_, v)| v)
    }

    pub fn get_custom(&self, name: &str) -> Option<&FieldValue> {
        self.custom.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn custom_fields(&self) -> &[(String, FieldValue)] {
        &self.custom
    }

    /// Insert a standard field, applying the duplicate policy. Returns `Ok(false)` when a
    /// duplicate was discarded under `allow_duplicate_field`.
    fn insert_standard(&mut self, name: String, value: FieldValue, config: &Config) -> Result<bool> {
        if self.fields.iter().any(|(n, _)| *n == name) {
            if config.allow_duplicate_field {
                log::warn!("duplicate field '{}' ignored (keeping first occurrence)", name);
                return Ok(false);
            }
            return Err(NrrdError::new(Cause::DuplicateField(name)));
        }
        self.fields.push((name, value));
        Ok(true)
    }

    /// Insert a custom field. Custom fields are always unique regardless of
    /// `allow_duplicate_field` (the toggle only covers standard fields).
    fn insert_custom(&mut self, name: String, value: FieldValue) -> Result<()> {
        if self.custom.iter().any(|(n, _)| *n == name) {
            return Err(NrrdError::new(Cause::DuplicateField(name)));
        }
        self.custom.push((name, value));
        Ok(())
    }

    pub fn set_standard(&mut self, canonical_name: &str, value: FieldValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == canonical_name) {
            slot.1 = value;
        } else {
            self.fields.push((canonical_name.to_string(), value));
        }
    }

    pub fn set_custom(&mut self, name: &str, value: FieldValue) {
        if let Some(slot) = self.custom.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.custom.push((name.to_string(), value));
        }
    }
}

const MAGIC_PREFIX: &str = "NRRD";

fn parse_magic(line: &str) -> Result<u32> {
    let line = line.trim();
    let digits = line
        .strip_prefix(MAGIC_PREFIX)
        .ok_or_else(|| NrrdError::new(Cause::MalformedHeader(format!("missing 'NRRD' magic, got '{}'", line))))?;
    digits
        .parse::<u32>()
        .map_err(|_| NrrdError::new(Cause::MalformedHeader(format!("bad version in magic line '{}'", line))))
}

/// One parsed header line.
enum Line {
    Comment,
    Blank,
    Standard { name: String, value: String },
    Custom { name: String, value: String },
}

fn classify(raw: &str) -> Line {
    let trimmed = raw.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return Line::Blank;
    }
    if trimmed.starts_with('#') {
        return Line::Comment;
    }
    // Custom fields use ":=" with no surrounding space; standard fields use ": ".
    if let Some(idx) = trimmed.find(":=") {
        let name = trimmed[..idx].to_string();
        let value = trimmed[idx + 2..].to_string();
        return Line::Custom { name, value };
    }
    if let Some(idx) = trimmed.find(':') {
        let name = trimmed[..idx].to_string();
        let value = trimmed[idx + 1..].trim_start().to_string();
        return Line::Standard { name, value };
    }
    Line::Standard {
        name: trimmed.to_string(),
        value: String::new(),
    }
}

/// Parse a header from an iterator of raw lines (without trailing newline requirements), up to
/// and including the blank-line terminator. Returns the parsed [`Header`]; locating where the
/// payload begins in the underlying byte source is the caller's job.
pub fn parse<'a, I>(mut lines: I, config: &Config) -> Result<Header>
where
    I: Iterator<Item = &'a str>,
{
    let magic_line = lines
        .next()
        .ok_or_else(|| NrrdError::new(Cause::MalformedHeader("empty input, expected NRRD magic".into())))?;
    let version = parse_magic(magic_line)?;
    let mut header = Header::new(version);

    for raw in lines {
        match classify(raw) {
            Line::Comment => continue,
            Line::Blank => break,
            Line::Standard { name, value } => {
                let canonical = field::canonical_name(&name);
                let shape = field::shape_for(&canonical, config.space_directions_shape)
                    .or_else(|| config.custom_field_map.get(&canonical).copied())
                    .ok_or_else(|| NrrdError::new(Cause::UnknownField(canonical.clone())))?;
                let parsed = field::parse(&canonical, shape, &value)?;
                header.insert_standard(canonical, parsed, config)?;
            }
            Line::Custom { name, value } => {
                // Custom field values are opaque strings unless the caller's map claims the name.
                let shape = config
                    .custom_field_map
                    .get(&name)
                    .copied()
                    .unwrap_or(FieldShape::Str);
                let parsed = field::parse(&name, shape, &value)?;
                header.insert_custom(name, parsed)?;
            }
        }
    }

    Ok(header)
}

/// Render `header` back to header-line text, ending in a blank line, in canonical field order.
/// Callers that need to synthesize fields not already on `header` (the orchestrator's always-
/// computed `type`/`dimension`/`sizes`/`endian`) should set them on a cloned `Header` first.
pub fn format(header: &Header) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}{:04}\n", MAGIC_PREFIX, header.version));

    for name in field::CANONICAL_ORDER {
        if let Some(value) = header.get(name) {
            out.push_str(&format!("{}: {}\n", name, field::format(value)));
        }
    }
    for (name, value) in header.custom_fields() {
        out.push_str(&format!("{}:={}\n", name, field::format(value)));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod header_tests {
    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn parses_minimal_header() {
        let text = "NRRD0004\ntype: float\ndimension: 1\nsizes: 4\nencoding: raw\n\n";
        let h = parse(text.lines(), &cfg()).unwrap();
        assert_eq!(h.version, 4);
        assert_eq!(h.get("type").unwrap().as_str(), Some("float"));
        assert_eq!(h.get("dimension").unwrap().as_int(), Some(1));
    }

    #[test]
    fn comments_are_discarded() {
        let text = "NRRD0004\n# a comment\ntype: float\ndimension: 1\nsizes: 4\nencoding: raw\n\n";
        let h = parse(text.lines(), &cfg()).unwrap();
        assert_eq!(h.fields().len(), 4);
    }

    #[test]
    fn custom_field_round_trips() {
        let text = "NRRD0004\ntype: float\ndimension: 1\nsizes: 4\nencoding: raw\nmy field:=hello\n\n";
        let h = parse(text.lines(), &cfg()).unwrap();
        assert_eq!(h.get_custom("my field").unwrap().as_str(), Some("hello"));
        let rendered = format(&h);
        assert!(rendered.contains("my field:=hello"));
    }

    #[test]
    fn duplicate_standard_field_is_fatal_by_default() {
        let text = "NRRD0004\ntype: float\ntype: double\ndimension: 1\nsizes: 4\nencoding: raw\n\n";
        assert!(parse(text.lines(), &cfg()).is_err());
    }

    #[test]
    fn duplicate_standard_field_is_tolerated_when_allowed() {
        let mut c = cfg();
        c.allow_duplicate_field = true;
        let text = "NRRD0004\ntype: float\ntype: double\ndimension: 1\nsizes: 4\nencoding: raw\n\n";
        let h = parse(text.lines(), &c).unwrap();
        assert_eq!(h.get("type").unwrap().as_str(), Some("float"));
    }

    #[test]
    fn duplicate_custom_field_is_always_fatal() {
        let mut c = cfg();
        c.allow_duplicate_field = true;
        let text = "NRRD0004\ntype: float\ndimension: 1\nsizes: 4\nencoding: raw\nx:=1\nx:=2\n\n";
        assert!(parse(text.lines(), &c).is_err());
    }

    #[test]
    fn unknown_field_without_custom_map_is_error() {
        let text = "NRRD0004\nfrobnicate: 1\n\n";
        assert!(parse(text.lines(), &cfg()).is_err());
    }

    #[test]
    fn unknown_field_resolved_via_custom_map() {
        let mut c = cfg();
        c.custom_field_map.insert("frobnicate".to_string(), FieldShape::Int);
        let text = "NRRD0004\nfrobnicate: 1\n\n";
        let h = parse(text.lines(), &c).unwrap();
        assert_eq!(h.get("frobnicate").unwrap().as_int(), Some(1));
    }

    #[test]
    fn canonical_write_order() {
        let mut h = Header::new(4);
        h.set_standard("encoding", FieldValue::Str("raw".into()));
        h.set_standard("type", FieldValue::Str("float".into()));
        h.set_standard("dimension", FieldValue::Int(1));
        h.set_standard("sizes", FieldValue::IntSeq(vec![4]));
        let rendered = format(&h);
        let type_pos = rendered.find("type:").unwrap();
        let dim_pos = rendered.find("dimension:").unwrap();
        let enc_pos = rendered.find("encoding:").unwrap();
        assert!(type_pos < dim_pos);
        assert!(dim_pos < enc_pos);
    }

    #[test]
    fn bad_magic_is_malformed_header() {
        assert!(parse("hello".lines(), &cfg()).is_err());
    }
}
