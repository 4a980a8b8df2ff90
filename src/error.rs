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
//! Crate-wide error type.
//!
//! One discriminated [`Cause`] per taxonomy entry, wrapped in [`NrrdError`]
//! so that a chained `source` and an optional backtrace travel with every
//! failure. All fallible crate entry points return [`Result`].

use parse_display::Display;

use crate::field::FieldShape;
use crate::types::ScalarType;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          error taxonomy                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Display, PartialEq, Clone)]
pub enum Cause {
    /// An error in another crate or module took place during this operation-- cf. source.
    #[display("an error occurred in an upstream crate or module; see source")]
    Other,

    /// Header grammar violation: missing magic, bad version, unterminated header, or a line
    /// that matches none of {comment, standard field, custom field, blank}.
    #[display("malformed header: {0}")]
    MalformedHeader(String),

    /// A field name that is neither a standard field nor covered by the caller's custom field
    /// map.
    #[display("unknown field '{0}'")]
    UnknownField(String),

    /// The same field name appeared twice in a header and `allow_duplicate_field` was not set.
    #[display("duplicate field '{0}'")]
    DuplicateField(String),

    /// A value failed to parse under its declared [`FieldShape`].
    #[display("field '{field}' of shape {shape}: {detail}")]
    TypeMismatch {
        field: String,
        shape: FieldShape,
        detail: String,
    },

    /// `dimension` didn't match `len(sizes)`.
    #[display("dimension {dimension} does not match {sizes_len} sizes entries")]
    DimensionSizeMismatch { dimension: i64, sizes_len: usize },

    /// A `sizes` entry was not strictly positive.
    #[display("size at axis {axis} must be >= 1, got {value}")]
    NonPositiveSize { axis: usize, value: i64 },

    /// `endian` is required for a multi-byte scalar type but was absent.
    #[display("type {0} requires an 'endian' field")]
    MissingEndian(ScalarType),

    /// `byte skip = -1` combined with a non-raw encoding.
    #[display("byte skip -1 (seek-from-end) is only valid with raw encoding")]
    ByteSkipMinusOneNotRaw,

    /// The header declared the unsupported `LIST` data-file manifest form.
    #[display("the LIST data-file form is not supported")]
    UnsupportedDataFileList,

    /// The caller's buffer shape disagrees with its declared index order.
    #[display("buffer shape {shape:?} is inconsistent with index_order {index_order}")]
    IndexOrderMismatch {
        shape: Vec<usize>,
        index_order: String,
    },

    /// Decompression, token-count, or endian-field failure during payload transcoding.
    #[display("encoding error: {0}")]
    EncodingError(String),

    /// ascii payload token count did not equal the expected element count.
    #[display("ascii payload has {found} tokens, expected {expected}")]
    AsciiTokenCountMismatch { expected: usize, found: usize },

    /// Underlying I/O failure (also reachable via `From<std::io::Error>`).
    #[display("I/O error: {0}")]
    IoError(String),

    /// A scalar type the implementation does not carry (e.g. `block` on decode).
    #[display("unsupported scalar type: {0}")]
    UnsupportedType(String),
}

#[derive(Debug, Display)]
#[display("{cause}")]
pub struct NrrdError {
    cause: Cause,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    trace: Option<backtrace::Backtrace>,
}

impl NrrdError {
    pub fn new(cause: Cause) -> NrrdError {
        NrrdError {
            cause,
            source: None,
            trace: Some(backtrace::Backtrace::new()),
        }
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }
}

impl std::error::Error for NrrdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(bx) => Some(bx.as_ref()),
            None => None,
        }
    }
}

impl std::convert::From<std::io::Error> for NrrdError {
    fn from(err: std::io::Error) -> Self {
        NrrdError {
            cause: Cause::IoError(err.to_string()),
            source: Some(Box::new(err)),
            trace: Some(backtrace::Backtrace::new()),
        }
    }
}

impl std::convert::From<std::string::FromUtf8Error> for NrrdError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        NrrdError {
            cause: Cause::MalformedHeader(err.to_string()),
            source: Some(Box::new(err)),
            trace: Some(backtrace::Backtrace::new()),
        }
    }
}

impl std::convert::From<std::num::ParseIntError> for NrrdError {
    fn from(err: std::num::ParseIntError) -> Self {
        NrrdError {
            cause: Cause::TypeMismatch {
                field: String::new(),
                shape: FieldShape::Int,
                detail: err.to_string(),
            },
            source: Some(Box::new(err)),
            trace: Some(backtrace::Backtrace::new()),
        }
    }
}

impl std::convert::From<std::num::ParseFloatError> for NrrdError {
    fn from(err: std::num::ParseFloatError) -> Self {
        NrrdError {
            cause: Cause::TypeMismatch {
                field: String::new(),
                shape: FieldShape::Double,
                detail: err.to_string(),
            },
            source: Some(Box::new(err)),
            trace: Some(backtrace::Backtrace::new()),
        }
    }
}

pub type Result<T> = std::result::Result<T, NrrdError>;
