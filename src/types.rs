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
//! Geometry-adjacent closed enumerations: scalar element types, byte order, and payload
//! encoding. These back the header's derived geometry fields (`type`, `endian`, `encoding`).

use parse_display::Display;

use crate::error::{Cause, NrrdError, Result};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          scalar type                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The closed set of NRRD scalar type names, plus `Block` which is accepted
/// structurally but rejected at decode time (`UnsupportedType`).
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ScalarType {
    #[display("int8")]
    I8,
    #[display("uint8")]
    U8,
    #[display("int16")]
    I16,
    #[display("uint16")]
    U16,
    #[display("int32")]
    I32,
    #[display("uint32")]
    U32,
    #[display("int64")]
    I64,
    #[display("uint64")]
    U64,
    #[display("float")]
    F32,
    #[display("double")]
    F64,
    #[display("block")]
    Block,
}

impl ScalarType {
    /// Resolve any of the accepted spellings to a canonical [`ScalarType`].
    pub fn parse(token: &str) -> Result<ScalarType> {
        let t = token.trim().to_ascii_lowercase();
        Ok(match t.as_str() {
            "signed char" | "int8" | "int8_t" => ScalarType::I8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => ScalarType::U8,
            "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
                ScalarType::I16
            }
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
                ScalarType::U16
            }
            "int" | "signed int" | "int32" | "int32_t" => ScalarType::I32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => ScalarType::U32,
            "longlong" | "long long" | "signed long long" | "signed long long int" | "int64"
            | "int64_t" => ScalarType::I64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => ScalarType::U64,
            "float" => ScalarType::F32,
            "double" => ScalarType::F64,
            "block" => ScalarType::Block,
            _ => return Err(NrrdError::new(Cause::UnsupportedType(token.to_string()))),
        })
    }

    /// Size in bytes of one element, or `None` for `block` (whose size is given by the
    /// `block size` header field instead).
    pub fn size(self) -> Option<usize> {
        match self {
            ScalarType::I8 | ScalarType::U8 => Some(1),
            ScalarType::I16 | ScalarType::U16 => Some(2),
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => Some(4),
            ScalarType::I64 | ScalarType::U64 | ScalarType::F64 => Some(8),
            ScalarType::Block => None,
        }
    }

    /// Whether this type's on-disk representation is more than one byte wide, and hence needs
    /// an `endian` field.
    pub fn is_multi_byte(self) -> bool {
        matches!(self.size(), Some(n) if n > 1)
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ScalarType::F32 | ScalarType::F64 | ScalarType::Block)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                             endian                                              //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum Endian {
    #[display("little")]
    Little,
    #[display("big")]
    Big,
}

impl Endian {
    pub fn parse(token: &str) -> Result<Endian> {
        match token.trim().to_ascii_lowercase().as_str() {
            "little" => Ok(Endian::Little),
            "big" => Ok(Endian::Big),
            _ => Err(NrrdError::new(Cause::EncodingError(format!(
                "invalid endian field value '{}'",
                token
            )))),
        }
    }

    /// The endianness of the host this process is running on.
    #[cfg(target_endian = "little")]
    pub fn native() -> Endian {
        Endian::Little
    }

    #[cfg(target_endian = "big")]
    pub fn native() -> Endian {
        Endian::Big
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                            encoding                                             //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum Encoding {
    #[display("raw")]
    Raw,
    #[display("ascii")]
    Ascii,
    #[display("hex")]
    Hex,
    #[display("gzip")]
    Gzip,
    #[display("bzip2")]
    Bzip2,
}

impl Encoding {
    /// Resolve a token, including the legacy spellings (`txt`/`text`, `gz`, `bz2`).
    pub fn parse(token: &str) -> Result<Encoding> {
        match token.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Encoding::Raw),
            "ascii" | "txt" | "text" => Ok(Encoding::Ascii),
            "hex" => Ok(Encoding::Hex),
            "gzip" | "gz" => Ok(Encoding::Gzip),
            "bzip2" | "bz2" => Ok(Encoding::Bzip2),
            _ => Err(NrrdError::new(Cause::EncodingError(format!(
                "unrecognized encoding '{}'",
                token
            )))),
        }
    }
}

#[cfg(test)]
mod scalar_type_tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical() {
        assert_eq!(ScalarType::parse("uchar").unwrap(), ScalarType::U8);
        assert_eq!(ScalarType::parse("UINT8_T").unwrap(), ScalarType::U8);
        assert_eq!(ScalarType::parse("longlong").unwrap(), ScalarType::I64);
        assert_eq!(ScalarType::parse("double").unwrap(), ScalarType::F64);
    }

    #[test]
    fn unknown_scalar_type_is_error() {
        assert!(ScalarType::parse("complex128").is_err());
    }

    #[test]
    fn sizes_match_spec() {
        assert_eq!(ScalarType::I32.size(), Some(4));
        assert_eq!(ScalarType::F64.size(), Some(8));
        assert_eq!(ScalarType::Block.size(), None);
    }

    #[test]
    fn canonical_display_spellings() {
        assert_eq!(ScalarType::I8.to_string(), "int8");
        assert_eq!(ScalarType::F32.to_string(), "float");
    }
}

#[cfg(test)]
mod encoding_tests {
    use super::*;

    #[test]
    fn legacy_spellings_resolve() {
        assert_eq!(Encoding::parse("txt").unwrap(), Encoding::Ascii);
        assert_eq!(Encoding::parse("gz").unwrap(), Encoding::Gzip);
        assert_eq!(Encoding::parse("bz2").unwrap(), Encoding::Bzip2);
    }
}
