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
//! The geometry adapter: the header's axes are always fastest-varying-first,
//! but a caller's in-memory buffer may be laid out either way. This module reconciles the two
//! and derives the scalar-type/sizes/dimension geometry out of a parsed [`crate::header::Header`].

use parse_display::Display;

use crate::error::{Cause, NrrdError, Result};
use crate::field::FieldValue;
use crate::header::Header;
use crate::types::{Endian, ScalarType};

/// How a caller's buffer orders its axes relative to the header's fastest-first convention.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrder {
    #[display("F")]
    FastestFirst,
    #[display("C")]
    SlowestFirst,
}

impl IndexOrder {
    pub fn parse(token: &str) -> Result<IndexOrder> {
        match token.trim() {
            "F" => Ok(IndexOrder::FastestFirst),
            "C" => Ok(IndexOrder::SlowestFirst),
            other => Err(NrrdError::new(Cause::MalformedHeader(format!(
                "invalid index_order '{}', expected 'F' or 'C'",
                other
            )))),
        }
    }
}

/// Reverse `shape` if it's in slowest-first order, producing fastest-first (the header's order).
pub fn to_fastest_first(shape: &[usize], order: IndexOrder) -> Vec<usize> {
    match order {
        IndexOrder::FastestFirst => shape.to_vec(),
        IndexOrder::SlowestFirst => shape.iter().rev().copied().collect(),
    }
}

/// Inverse of [`to_fastest_first`]: given the header's fastest-first `sizes`, produce the shape
/// a buffer declaring `order` should have.
pub fn from_fastest_first(sizes: &[usize], order: IndexOrder) -> Vec<usize> {
    match order {
        IndexOrder::FastestFirst => sizes.to_vec(),
        IndexOrder::SlowestFirst => sizes.iter().rev().copied().collect(),
    }
}

/// Confirm a buffer's declared shape is what `order` predicts from the header's fastest-first
/// `sizes` ("mismatch... is a write-time error").
pub fn validate_buffer_shape(
    order: IndexOrder,
    buffer_shape: &[usize],
    sizes_fastest_first: &[usize],
) -> Result<()> {
    let expected = from_fastest_first(sizes_fastest_first, order);
    if expected != buffer_shape {
        return Err(NrrdError::new(Cause::IndexOrderMismatch {
            shape: buffer_shape.to_vec(),
            index_order: order.to_string(),
        }));
    }
    Ok(())
}

/// The geometry fields derived from a header ("Geometry (derived)"):
/// `type`, `dimension`, `sizes` (always fastest-first), and `endian` when required.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub element_type: ScalarType,
    pub endian: Option<Endian>,
    /// Always fastest-varying-first, matching the header's own convention.
    pub sizes: Vec<usize>,
}

impl Geometry {
    pub fn element_count(&self) -> usize {
        self.sizes.iter().product()
    }

    /// Total payload size in bytes for non-`block` types. `None` for `block`, whose element
    /// size comes from `block size` rather than the type itself.
    pub fn payload_bytes(&self) -> Option<usize> {
        self.element_type.size().map(|sz| sz * self.element_count())
    }
}

/// Derive [`Geometry`] from a parsed header, enforcing its invariants:
/// `dimension == len(sizes)`, every size `>= 1`, and `endian` present whenever the scalar type
/// is multi-byte.
pub fn derive(header: &Header) -> Result<Geometry> {
    let type_str = header
        .get("type")
        .and_then(FieldValue::as_str)
        .ok_or_else(|| NrrdError::new(Cause::UnknownField("type".to_string())))?;
    let element_type = ScalarType::parse(type_str)?;

    let dimension = header
        .get("dimension")
        .and_then(FieldValue::as_int)
        .ok_or_else(|| NrrdError::new(Cause::UnknownField("dimension".to_string())))?;

    let sizes_field = header
        .get("sizes")
        .and_then(FieldValue::as_int_seq)
        .ok_or_else(|| NrrdError::new(Cause::UnknownField("sizes".to_string())))?;

    if dimension < 0 || dimension as usize != sizes_field.len() {
        return Err(NrrdError::new(Cause::DimensionSizeMismatch {
            dimension,
            sizes_len: sizes_field.len(),
        }));
    }

    let mut sizes = Vec::with_capacity(sizes_field.len());
    for (axis, &v) in sizes_field.iter().enumerate() {
        if v < 1 {
            return Err(NrrdError::new(Cause::NonPositiveSize { axis, value: v }));
        }
        sizes.push(v as usize);
    }

    let endian = match header.get("endian").and_then(FieldValue::as_str) {
        Some(s) => Some(Endian::parse(s)?),
        None => None,
    };
    if endian.is_none() && element_type.is_multi_byte() {
        return Err(NrrdError::new(Cause::MissingEndian(element_type)));
    }

    Ok(Geometry {
        element_type,
        endian,
        sizes,
    })
}

/// A typed view over an in-memory array the caller reads into or writes from, with an explicit
/// axis order. The crate works in raw bytes: callers own how their element
/// type maps to bytes, and pass/receive a flat byte buffer plus shape/order metadata.
pub trait Buffer {
    /// Shape in the caller's own axis order (see `index_order`).
    fn shape(&self) -> &[usize];
    fn index_order(&self) -> IndexOrder;
    fn element_type(&self) -> ScalarType;
    fn bytes(&self) -> &[u8];
    fn bytes_mut(&mut self) -> &mut [u8];
}

/// The simplest [`Buffer`]: an owned byte vector plus shape/order/type metadata.
#[derive(Debug, Clone)]
pub struct RawBuffer {
    shape: Vec<usize>,
    index_order: IndexOrder,
    element_type: ScalarType,
    data: Vec<u8>,
}

impl RawBuffer {
    pub fn new(shape: Vec<usize>, index_order: IndexOrder, element_type: ScalarType, data: Vec<u8>) -> RawBuffer {
        RawBuffer {
            shape,
            index_order,
            element_type,
            data,
        }
    }

    /// Allocate a zeroed buffer sized for `shape` under `element_type` (non-`block` types
    /// only; `block` has no intrinsic element size).
    pub fn zeroed(shape: Vec<usize>, index_order: IndexOrder, element_type: ScalarType) -> Result<RawBuffer> {
        let elems: usize = shape.iter().product();
        let elem_size = element_type
            .size()
            .ok_or_else(|| NrrdError::new(Cause::UnsupportedType(element_type.to_string())))?;
        Ok(RawBuffer {
            shape,
            index_order,
            element_type,
            data: vec![0u8; elems * elem_size],
        })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Buffer for RawBuffer {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn index_order(&self) -> IndexOrder {
        self.index_order
    }

    fn element_type(&self) -> ScalarType {
        self.element_type
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod geometry_tests {
    use super::*;
    use crate::config::Config;
    use crate::header;

    #[test]
    fn fastest_first_roundtrip() {
        let sizes = vec![2, 3, 4];
        let shape = from_fastest_first(&sizes, IndexOrder::SlowestFirst);
        assert_eq!(shape, vec![4, 3, 2]);
        assert_eq!(to_fastest_first(&shape, IndexOrder::SlowestFirst), sizes);
    }

    #[test]
    fn validate_buffer_shape_detects_mismatch() {
        let sizes = vec![2, 3];
        assert!(validate_buffer_shape(IndexOrder::FastestFirst, &[2, 3], &sizes).is_ok());
        assert!(validate_buffer_shape(IndexOrder::FastestFirst, &[3, 2], &sizes).is_err());
        assert!(validate_buffer_shape(IndexOrder::SlowestFirst, &[3, 2], &sizes).is_ok());
    }

    #[test]
    fn derive_rejects_dimension_mismatch() {
        let text = "NRRD0004\ntype: uint8\ndimension: 2\nsizes: 4\nencoding: raw\n\n";
        let h = header::parse(text.lines(), &Config::default()).unwrap();
        assert!(derive(&h).is_err());
    }

    #[test]
    fn derive_requires_endian_for_multi_byte_types() {
        let text = "NRRD0004\ntype: int32\ndimension: 1\nsizes: 4\nencoding: raw\n\n";
        let h = header::parse(text.lines(), &Config::default()).unwrap();
        assert!(derive(&h).is_err());
    }

    #[test]
    fn derive_succeeds_for_single_byte_type_without_endian() {
        let text = "NRRD0004\ntype: uint8\ndimension: 1\nsizes: 4\nencoding: raw\n\n";
        let h = header::parse(text.lines(), &Config::default()).unwrap();
        let g = derive(&h).unwrap();
        assert_eq!(g.sizes, vec![4]);
        assert_eq!(g.element_count(), 4);
    }

    #[test]
    fn derive_rejects_non_positive_size() {
        let text = "NRRD0004\ntype: uint8\ndimension: 1\nsizes: 0\nencoding: raw\n\n";
        let h = header::parse(text.lines(), &Config::default()).unwrap();
        assert!(derive(&h).is_err());
    }
}
