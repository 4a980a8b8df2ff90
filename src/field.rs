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
//! The field-type registry: a closed set of value shapes used by header
//! fields, the canonical field-name table, and their per-shape parse/format rules.
//!
//! [`FieldShape`] is the tag identifying *which* shape a field takes; [`FieldValue`] carries the
//! actual parsed data. The registry (`canonical_name`, `shape_for`) maps a field name to the
//! shape the parser should apply.

use parse_display::Display;

use crate::error::{Cause, NrrdError, Result};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          field values                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A parsed header field value, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Double(f64),
    Str(String),
    IntSeq(Vec<i64>),
    DoubleSeq(Vec<f64>),
    StrSeq(Vec<String>),
    QuotedStrSeq(Vec<String>),
    IntVector(Vec<i64>),
    DoubleVector(Vec<f64>),
    IntMatrix(Vec<Vec<i64>>),
    /// Rows are all-same-width; a `none` row is represented as an all-NaN row.
    DoubleMatrix(Vec<Vec<f64>>),
    IntVectorList(Vec<Option<Vec<i64>>>),
    DoubleVectorList(Vec<Option<Vec<f64>>>),
}

/// The tag identifying a [`FieldValue`]'s shape, independent of its contents. Used by the
/// registry to decide how to parse/format a given field, and inside [`Cause::TypeMismatch`] to
/// report what was expected.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    #[display("int")]
    Int,
    #[display("double")]
    Double,
    #[display("string")]
    Str,
    #[display("int sequence")]
    IntSeq,
    #[display("double sequence")]
    DoubleSeq,
    #[display("string sequence")]
    StrSeq,
    #[display("quoted string sequence")]
    QuotedStrSeq,
    #[display("int vector")]
    IntVector,
    #[display("double vector")]
    DoubleVector,
    #[display("int matrix")]
    IntMatrix,
    #[display("double matrix")]
    DoubleMatrix,
    #[display("int vector list")]
    IntVectorList,
    #[display("double vector list")]
    DoubleVectorList,
}

impl FieldValue {
    pub fn shape(&self) -> FieldShape {
        match self {
            FieldValue::Int(_) => FieldShape::Int,
            FieldValue::Double(_) => FieldShape::Double,
            FieldValue::Str(_) => FieldShape::Str,
            FieldValue::IntSeq(_) => FieldShape::IntSeq,
            FieldValue::DoubleSeq(_) => FieldShape::DoubleSeq,
            FieldValue::StrSeq(_) => FieldShape::StrSeq,
            FieldValue::QuotedStrSeq(_) => FieldShape::QuotedStrSeq,
            FieldValue::IntVector(_) => FieldShape::IntVector,
            FieldValue::DoubleVector(_) => FieldShape::DoubleVector,
            FieldValue::IntMatrix(_) => FieldShape::IntMatrix,
            FieldValue::DoubleMatrix(_) => FieldShape::DoubleMatrix,
            FieldValue::IntVectorList(_) => FieldShape::IntVectorList,
            FieldValue::DoubleVectorList(_) => FieldShape::DoubleVectorList,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_int_seq(&self) -> Option<&[i64]> {
        match self {
            FieldValue::IntSeq(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_double_seq(&self) -> Option<&[f64]> {
        match self {
            FieldValue::DoubleSeq(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_str_seq(&self) -> Option<&[String]> {
        match self {
            FieldValue::StrSeq(v) | FieldValue::QuotedStrSeq(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_double_vector(&self) -> Option<&[f64]> {
        match self {
            FieldValue::DoubleVector(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      parse / format rules                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

fn parse_err(shape: FieldShape, field: &str, detail: impl Into<String>) -> NrrdError {
    NrrdError::new(Cause::TypeMismatch {
        field: field.to_string(),
        shape,
        detail: detail.into(),
    })
}

/// Split `(a, b, c)` into its comma-separated interior tokens, tolerating spaces after commas
/// ("Parser tolerates spaces after commas; formatter omits them").
fn split_vector_interior(token: &str, field: &str, shape: FieldShape) -> Result<Vec<String>> {
    let token = token.trim();
    let inner = token
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| parse_err(shape, field, format!("expected '(...)', got '{}'", token)))?;
    Ok(inner
        .split(',')
        .map(|s| s.trim().to_string())
        .collect::<Vec<_>>())
}

fn format_vector<T: std::fmt::Display>(values: &[T]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(","))
}

fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    // Round-trips through `f64::from_str`; `{}` is already shortest-round-trip in Rust.
    format!("{}", v)
}

pub fn parse_int(field: &str, token: &str) -> Result<FieldValue> {
    let v: i64 = token
        .trim()
        .parse()
        .map_err(|e| parse_err(FieldShape::Int, field, format!("{}", e)))?;
    Ok(FieldValue::Int(v))
}

pub fn format_int(v: i64) -> String {
    v.to_string()
}

pub fn parse_double(field: &str, token: &str) -> Result<FieldValue> {
    let t = token.trim();
    let v: f64 = t
        .parse()
        .map_err(|e| parse_err(FieldShape::Double, field, format!("{}", e)))?;
    Ok(FieldValue::Double(v))
}

pub fn parse_str(_field: &str, rest_of_line: &str) -> Result<FieldValue> {
    Ok(FieldValue::Str(rest_of_line.trim().to_string()))
}

pub fn format_str(v: &str) -> String {
    v.to_string()
}

pub fn parse_int_seq(field: &str, token: &str) -> Result<FieldValue> {
    let vals = token
        .split_whitespace()
        .map(|t| {
            t.parse::<i64>()
                .map_err(|e| parse_err(FieldShape::IntSeq, field, format!("{}", e)))
        })
        .collect::<Result<Vec<i64>>>()?;
    Ok(FieldValue::IntSeq(vals))
}

pub fn format_int_seq(v: &[i64]) -> String {
    v.iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_double_seq(field: &str, token: &str) -> Result<FieldValue> {
    let vals = token
        .split_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|e| parse_err(FieldShape::DoubleSeq, field, format!("{}", e)))
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(FieldValue::DoubleSeq(vals))
}

pub fn format_double_seq(v: &[f64]) -> String {
    v.iter()
        .map(|x| format_double(*x))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_str_seq(_field: &str, token: &str) -> Result<FieldValue> {
    // No quote handling-- this is known-lossy for embedded spaces.
    Ok(FieldValue::StrSeq(
        token.split_whitespace().map(|s| s.to_string()).collect(),
    ))
}

pub fn format_str_seq(v: &[String]) -> String {
    v.join(" ")
}

/// Quoted-string-sequence tokenizer: `"a b" "c"` -> `["a b", "c"]`. Quotes are required on
/// format.
pub fn parse_quoted_str_seq(field: &str, token: &str) -> Result<FieldValue> {
    let mut out = Vec::new();
    let mut chars = token.trim().chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c != '"' {
            return Err(parse_err(
                FieldShape::QuotedStrSeq,
                field,
                format!("expected '\"', found '{}'", c),
            ));
        }
        chars.next(); // consume opening quote
        let mut s = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '"' {
                closed = true;
                break;
            }
            s.push(c);
        }
        if !closed {
            return Err(parse_err(
                FieldShape::QuotedStrSeq,
                field,
                "unterminated quoted string",
            ));
        }
        out.push(s);
    }
    Ok(FieldValue::QuotedStrSeq(out))
}

pub fn format_quoted_str_seq(v: &[String]) -> String {
    v.iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_int_vector(field: &str, token: &str) -> Result<FieldValue> {
    let parts = split_vector_interior(token, field, FieldShape::IntVector)?;
    let vals = parts
        .iter()
        .map(|p| {
            p.parse::<i64>()
                .map_err(|e| parse_err(FieldShape::IntVector, field, format!("{}", e)))
        })
        .collect::<Result<Vec<i64>>>()?;
    Ok(FieldValue::IntVector(vals))
}

pub fn format_int_vector(v: &[i64]) -> String {
    format_vector(v)
}

pub fn parse_double_vector(field: &str, token: &str) -> Result<FieldValue> {
    let parts = split_vector_interior(token, field, FieldShape::DoubleVector)?;
    let vals = parts
        .iter()
        .map(|p| {
            p.parse::<f64>()
                .map_err(|e| parse_err(FieldShape::DoubleVector, field, format!("{}", e)))
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(FieldValue::DoubleVector(vals))
}

pub fn format_double_vector(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format_double(*x)).collect();
    format!("({})", parts.join(","))
}

/// Parse space-separated vectors (and bare `none` tokens for the double form) into rows of
/// string tokens; a bare `none` row is only legal for doubles and is caught by the caller.
fn parse_rows(field: &str, line: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut depth = 0usize;
    let mut cur = String::new();
    let mut tokens: Vec<String> = Vec::new();
    for c in line.trim().chars() {
        match c {
            '(' => {
                depth += 1;
                cur.push(c);
            }
            ')' => {
                if depth == 0 {
                    return Err(parse_err(FieldShape::DoubleMatrix, field, "unbalanced ')'"));
                }
                depth -= 1;
                cur.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !cur.is_empty() {
                    tokens.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    if depth != 0 {
        return Err(parse_err(FieldShape::DoubleMatrix, field, "unbalanced '('"));
    }
    for tok in tokens {
        if tok == "none" {
            rows.push(vec!["none".to_string()]);
        } else {
            rows.push(split_vector_interior(&tok, field, FieldShape::DoubleMatrix)?);
        }
    }
    Ok(rows)
}

pub fn parse_int_matrix(field: &str, token: &str) -> Result<FieldValue> {
    let rows = parse_rows(field, token)?;
    let mut width = None;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() == 1 && row[0] == "none" {
            return Err(parse_err(
                FieldShape::IntMatrix,
                field,
                "'none' is only legal in a double matrix",
            ));
        }
        let w = row.len();
        match width {
            None => width = Some(w),
            Some(expected) if expected != w => {
                return Err(parse_err(
                    FieldShape::IntMatrix,
                    field,
                    format!("ragged row width {} (expected {})", w, expected),
                ));
            }
            _ => {}
        }
        let vals = row
            .iter()
            .map(|p| {
                p.parse::<i64>()
                    .map_err(|e| parse_err(FieldShape::IntMatrix, field, format!("{}", e)))
            })
            .collect::<Result<Vec<i64>>>()?;
        out.push(vals);
    }
    Ok(FieldValue::IntMatrix(out))
}

pub fn format_int_matrix(v: &[Vec<i64>]) -> String {
    v.iter()
        .map(|row| format_vector(row))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_double_matrix(field: &str, token: &str) -> Result<FieldValue> {
    let rows = parse_rows(field, token)?;
    let mut width = None;
    let mut out: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
    for row in &rows {
        if row.len() == 1 && row[0] == "none" {
            // width is resolved after the loop if every row were `none`; filled in below.
            out.push(Vec::new());
            continue;
        }
        let w = row.len();
        match width {
            None => width = Some(w),
            Some(expected) if expected != w => {
                return Err(parse_err(
                    FieldShape::DoubleMatrix,
                    field,
                    format!("ragged row width {} (expected {})", w, expected),
                ));
            }
            _ => {}
        }
        let vals = row
            .iter()
            .map(|p| {
                p.parse::<f64>()
                    .map_err(|e| parse_err(FieldShape::DoubleMatrix, field, format!("{}", e)))
            })
            .collect::<Result<Vec<f64>>>()?;
        out.push(vals);
    }
    let width = width.ok_or_else(|| {
        parse_err(
            FieldShape::DoubleMatrix,
            field,
            "matrix has no non-'none' row to establish width",
        )
    })?;
    for row in out.iter_mut() {
        if row.is_empty() {
            *row = vec![f64::NAN; width];
        }
    }
    Ok(FieldValue::DoubleMatrix(out))
}

pub fn format_double_matrix(v: &[Vec<f64>]) -> String {
    v.iter()
        .map(|row| {
            if row.iter().all(|x| x.is_nan()) {
                "none".to_string()
            } else {
                format_double_vector(row)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_int_vector_list(field: &str, token: &str) -> Result<FieldValue> {
    let rows = parse_rows(field, token)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() == 1 && row[0] == "none" {
            out.push(None);
            continue;
        }
        let vals = row
            .iter()
            .map(|p| {
                p.parse::<i64>()
                    .map_err(|e| parse_err(FieldShape::IntVectorList, field, format!("{}", e)))
            })
            .collect::<Result<Vec<i64>>>()?;
        out.push(Some(vals));
    }
    Ok(FieldValue::IntVectorList(out))
}

pub fn format_int_vector_list(v: &[Option<Vec<i64>>]) -> String {
    v.iter()
        .map(|row| match row {
            None => "none".to_string(),
            Some(vals) => format_vector(vals),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_double_vector_list(field: &str, token: &str) -> Result<FieldValue> {
    let rows = parse_rows(field, token)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() == 1 && row[0] == "none" {
            out.push(None);
            continue;
        }
        let vals = row
            .iter()
            .map(|p| {
                p.parse::<f64>()
                    .map_err(|e| parse_err(FieldShape::DoubleVectorList, field, format!("{}", e)))
            })
            .collect::<Result<Vec<f64>>>()?;
        out.push(Some(vals));
    }
    Ok(FieldValue::DoubleVectorList(out))
}

pub fn format_double_vector_list(v: &[Option<Vec<f64>>]) -> String {
    v.iter()
        .map(|row| match row {
            None => "none".to_string(),
            Some(vals) => format_double_vector(vals),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `field`'s raw text according to `shape`.
pub fn parse(field: &str, shape: FieldShape, token: &str) -> Result<FieldValue> {
    match shape {
        FieldShape::Int => parse_int(field, token),
        FieldShape::Double => parse_double(field, token),
        FieldShape::Str => parse_str(field, token),
        FieldShape::IntSeq => parse_int_seq(field, token),
        FieldShape::DoubleSeq => parse_double_seq(field, token),
        FieldShape::StrSeq => parse_str_seq(field, token),
        FieldShape::QuotedStrSeq => parse_quoted_str_seq(field, token),
        FieldShape::IntVector => parse_int_vector(field, token),
        FieldShape::DoubleVector => parse_double_vector(field, token),
        FieldShape::IntMatrix => parse_int_matrix(field, token),
        FieldShape::DoubleMatrix => parse_double_matrix(field, token),
        FieldShape::IntVectorList => parse_int_vector_list(field, token),
        FieldShape::DoubleVectorList => parse_double_vector_list(field, token),
    }
}

/// Format `value` back to its on-disk text representation.
pub fn format(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(v) => format_int(*v),
        FieldValue::Double(v) => format_double(*v),
        FieldValue::Str(v) => format_str(v),
        FieldValue::IntSeq(v) => format_int_seq(v),
        FieldValue::DoubleSeq(v) => format_double_seq(v),
        FieldValue::StrSeq(v) => format_str_seq(v),
        FieldValue::QuotedStrSeq(v) => format_quoted_str_seq(v),
        FieldValue::IntVector(v) => format_int_vector(v),
        FieldValue::DoubleVector(v) => format_double_vector(v),
        FieldValue::IntMatrix(v) => format_int_matrix(v),
        FieldValue::DoubleMatrix(v) => format_double_matrix(v),
        FieldValue::IntVectorList(v) => format_int_vector_list(v),
        FieldValue::DoubleVectorList(v) => format_double_vector_list(v),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       field name registry                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Whether `space directions` is read/written as a matrix (with NaN-rows for `none`) or as a
/// vector list (with explicit null entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceDirectionsShape {
    Matrix,
    VectorList,
}

/// Resolve an alternate spelling to its canonical field name.
pub fn canonical_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "datafile" => "data file".to_string(),
        "lineskip" => "line skip".to_string(),
        "byteskip" => "byte skip".to_string(),
        "oldmin" => "old min".to_string(),
        "oldmax" => "old max".to_string(),
        "axismins" => "axis mins".to_string(),
        "axismaxs" => "axis maxs".to_string(),
        other => other.to_string(),
    }
}

/// Resolve a canonical standard field name to its shape, honoring the configurable
/// `space directions` representation. Returns `None` for a name that isn't a standard field
/// (the caller then consults the custom-field map).
pub fn shape_for(canonical: &str, space_directions_shape: SpaceDirectionsShape) -> Option<FieldShape> {
    Some(match canonical {
        "type" => FieldShape::Str,
        "dimension" => FieldShape::Int,
        "sizes" => FieldShape::IntSeq,
        "space" => FieldShape::Str,
        "space dimension" => FieldShape::Int,
        "space directions" => match space_directions_shape {
            SpaceDirectionsShape::Matrix => FieldShape::DoubleMatrix,
            SpaceDirectionsShape::VectorList => FieldShape::DoubleVectorList,
        },
        "kinds" => FieldShape::StrSeq,
        "labels" => FieldShape::QuotedStrSeq,
        "units" => FieldShape::QuotedStrSeq,
        "endian" => FieldShape::Str,
        "encoding" => FieldShape::Str,
        "min" => FieldShape::Double,
        "max" => FieldShape::Double,
        "old min" => FieldShape::Double,
        "old max" => FieldShape::Double,
        "spacings" => FieldShape::DoubleSeq,
        "thicknesses" => FieldShape::DoubleSeq,
        "axis mins" => FieldShape::DoubleSeq,
        "axis maxs" => FieldShape::DoubleSeq,
        "centerings" => FieldShape::StrSeq,
        "sample units" => FieldShape::QuotedStrSeq,
        "space units" => FieldShape::QuotedStrSeq,
        "space origin" => FieldShape::DoubleVector,
        "measurement frame" => FieldShape::DoubleMatrix,
        "data file" => FieldShape::Str,
        "content" => FieldShape::Str,
        "line skip" => FieldShape::Int,
        "byte skip" => FieldShape::Int,
        "block size" => FieldShape::Int,
        _ => return None,
    })
}

/// The canonical write order. Fields absent from the header are skipped;
/// the four geometry fields (`type`, `dimension`, `sizes`, `endian`) are always synthesized by
/// the writer rather than taken from the caller-supplied header.
pub const CANONICAL_ORDER: &[&str] = &[
    "type",
    "dimension",
    "space",
    "space dimension",
    "sizes",
    "space directions",
    "kinds",
    "labels",
    "units",
    "endian",
    "encoding",
    "min",
    "max",
    "old min",
    "old max",
    "spacings",
    "thicknesses",
    "axis mins",
    "axis maxs",
    "centerings",
    "sample units",
    "space units",
    "space origin",
    "measurement frame",
    "data file",
    "content",
    "line skip",
    "byte skip",
    "block size",
];

#[cfg(test)]
mod vector_tests {
    use super::*;

    #[test]
    fn int_vector_round_trips() {
        let v = parse_int_vector("test", "(1,2,3)").unwrap();
        assert_eq!(v, FieldValue::IntVector(vec![1, 2, 3]));
        assert_eq!(format(&v), "(1,2,3)");
    }

    #[test]
    fn int_vector_tolerates_spaces_after_commas() {
        let v = parse_int_vector("test", "(1, 2, 3)").unwrap();
        assert_eq!(v, FieldValue::IntVector(vec![1, 2, 3]));
    }

    #[test]
    fn double_matrix_with_none_row() {
        let v =
            parse_double_matrix("space directions", "(1,0,0) (0,1,0) none (0,0,1)").unwrap();
        match &v {
            FieldValue::DoubleMatrix(rows) => {
                assert_eq!(rows.len(), 4);
                assert!(rows[2].iter().all(|x| x.is_nan()));
                assert_eq!(rows[0], vec![1.0, 0.0, 0.0]);
            }
            _ => panic!("wrong shape"),
        }
        assert_eq!(
            format(&v),
            "(1,0,0) (0,1,0) none (0,0,1)"
        );
    }

    #[test]
    fn double_vector_list_with_explicit_null() {
        let v = parse_double_vector_list("space directions", "(1,0,0) none (0,0,1)").unwrap();
        match &v {
            FieldValue::DoubleVectorList(rows) => {
                assert_eq!(rows.len(), 3);
                assert!(rows[1].is_none());
                assert_eq!(rows[0], Some(vec![1.0, 0.0, 0.0]));
            }
            _ => panic!("wrong shape"),
        }
    }

    #[test]
    fn ragged_matrix_is_type_mismatch() {
        assert!(parse_int_matrix("test", "(1,2) (1,2,3)").is_err());
    }

    #[test]
    fn quoted_string_sequence_requires_quotes() {
        let v = parse_quoted_str_seq("labels", "\"x\" \"y\" \"z\"").unwrap();
        assert_eq!(
            v,
            FieldValue::QuotedStrSeq(vec!["x".into(), "y".into(), "z".into()])
        );
        assert_eq!(format(&v), "\"x\" \"y\" \"z\"");
    }

    #[test]
    fn unterminated_quote_is_error() {
        assert!(parse_quoted_str_seq("labels", "\"x").is_err());
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_name() {
        assert_eq!(canonical_name("datafile"), "data file");
        assert_eq!(canonical_name("LineSkip"), "line skip");
        assert_eq!(canonical_name("byteskip"), "byte skip");
        assert_eq!(canonical_name("oldmin"), "old min");
        assert_eq!(canonical_name("axismaxs"), "axis maxs");
    }

    #[test]
    fn space_directions_shape_toggle() {
        assert_eq!(
            shape_for("space directions", SpaceDirectionsShape::Matrix),
            Some(FieldShape::DoubleMatrix)
        );
        assert_eq!(
            shape_for("space directions", SpaceDirectionsShape::VectorList),
            Some(FieldShape::DoubleVectorList)
        );
    }

    #[test]
    fn unknown_field_is_not_in_registry() {
        assert_eq!(shape_for("frobnicate", SpaceDirectionsShape::Matrix), None);
    }
}
