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
//! The payload codec: encodings, pre-skip semantics, and the detached data
//! file reference (single sibling file, or a templated sequence of files). The `LIST` manifest
//! form is explicitly unsupported.

use std::io::Read;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;

use crate::error::{Cause, NrrdError, Result};
use crate::types::{Encoding, Endian, ScalarType};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        data file reference                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Where the payload bytes live, resolved from the `data file`/`datafile` header field.
/// `Attached` means the bytes follow the header's blank-line terminator in the same stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DataFile {
    Attached,
    Single(PathBuf),
    /// `<format> <min> <max> <step> [<subdim>]`, e.g. `slice%03d.raw 0 99 1`.
    MultiFile {
        format: String,
        min: i64,
        max: i64,
        step: i64,
        sub_dim: Option<usize>,
    },
}

impl DataFile {
    /// Resolve to the ordered list of files to read/write, relative to `base_dir` (the
    /// directory the header file lives in).
    pub fn file_paths(&self, base_dir: &Path) -> Result<Vec<PathBuf>> {
        match self {
            DataFile::Attached => Ok(Vec::new()),
            DataFile::Single(p) => Ok(vec![base_dir.join(p)]),
            DataFile::MultiFile { format, min, max, step, .. } => {
                if *step == 0 {
                    return Err(NrrdError::new(Cause::MalformedHeader(
                        "data file template step must not be 0".to_string(),
                    )));
                }
                let mut out = Vec::new();
                let mut n = *min;
                loop {
                    if *step > 0 && n > *max {
                        break;
                    }
                    if *step < 0 && n < *max {
                        break;
                    }
                    let name = sprintf::vsprintf(format, &[&n])
                        .map_err(|e| NrrdError::new(Cause::MalformedHeader(format!("bad data file template '{}': {}", format, e))))?;
                    out.push(base_dir.join(name));
                    n += step;
                }
                Ok(out)
            }
        }
    }
}

/// Parse the raw value of a `data file`/`datafile` field. Rejects the `LIST`
/// manifest form explicitly.
pub fn parse_data_file(raw: &str) -> Result<DataFile> {
    let raw = raw.trim();
    if raw.to_ascii_uppercase().starts_with("LIST") {
        return Err(NrrdError::new(Cause::UnsupportedDataFileList));
    }
    let parts: Vec<&str> = raw.split_whitespace().collect();
    match parts.len() {
        1 => Ok(DataFile::Single(PathBuf::from(parts[0]))),
        4 | 5 => {
            let format = parts[0].to_string();
            let min = parts[1]
                .parse::<i64>()
                .map_err(|e| NrrdError::new(Cause::MalformedHeader(format!("bad data file min: {}", e))))?;
            let max = parts[2]
                .parse::<i64>()
                .map_err(|e| NrrdError::new(Cause::MalformedHeader(format!("bad data file max: {}", e))))?;
            let step = parts[3]
                .parse::<i64>()
                .map_err(|e| NrrdError::new(Cause::MalformedHeader(format!("bad data file step: {}", e))))?;
            let sub_dim = if parts.len() == 5 {
                Some(
                    parts[4]
                        .parse::<usize>()
                        .map_err(|e| NrrdError::new(Cause::MalformedHeader(format!("bad data file subdim: {}", e))))?,
                )
            } else {
                None
            };
            Ok(DataFile::MultiFile { format, min, max, step, sub_dim })
        }
        _ => Err(NrrdError::new(Cause::MalformedHeader(format!(
            "unrecognized data file form '{}'",
            raw
        )))),
    }
}

pub fn format_data_file(df: &DataFile) -> Option<String> {
    match df {
        DataFile::Attached => None,
        DataFile::Single(p) => Some(p.display().to_string()),
        DataFile::MultiFile { format, min, max, step, sub_dim } => {
            let mut s = format!("{} {} {} {}", format, min, max, step);
            if let Some(sd) = sub_dim {
                s.push(' ');
                s.push_str(&sd.to_string());
            }
            Some(s)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        skip + decode/encode                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Discard `count` text lines from `reader` (the `line skip` field).
fn skip_lines(reader: &mut impl Read, count: i64) -> Result<()> {
    let mut remaining = count;
    let mut byte = [0u8; 1];
    while remaining > 0 {
        loop {
            let n = reader.read(&mut byte)?;
            if n == 0 {
                break;
            }
            if byte[0] == b'\n' {
                break;
            }
        }
        remaining -= 1;
    }
    Ok(())
}

/// Decode a payload byte stream according to `encoding`, after applying `line_skip` and
/// `byte_skip`. `expected_bytes` is the raw, decompressed/decoded element
/// payload size computed from geometry; it is required to resolve `byte_skip == -1`
/// ("seek-from-EOF", legal only with raw encoding) and to validate ascii token counts.
pub fn decode(
    mut reader: impl Read,
    encoding: Encoding,
    line_skip: i64,
    byte_skip: i64,
    element_type: ScalarType,
    endian: Option<Endian>,
    expected_bytes: usize,
) -> Result<Vec<u8>> {
    if line_skip > 0 {
        skip_lines(&mut reader, line_skip)?;
    }

    if byte_skip == -1 {
        if encoding != Encoding::Raw {
            return Err(NrrdError::new(Cause::ByteSkipMinusOneNotRaw));
        }
        let mut all = Vec::new();
        reader.read_to_end(&mut all)?;
        if all.len() < expected_bytes {
            return Err(NrrdError::new(Cause::EncodingError(format!(
                "byte skip -1: only {} bytes available, need {}",
                all.len(),
                expected_bytes
            ))));
        }
        let start = all.len() - expected_bytes;
        return Ok(all[start..].to_vec());
    }

    if byte_skip > 0 {
        let mut discard = vec![0u8; byte_skip as usize];
        reader.read_exact(&mut discard)?;
    }

    match encoding {
        Encoding::Raw => {
            let mut buf = vec![0u8; expected_bytes];
            reader.read_exact(&mut buf)?;
            swap_to_host_endian(&mut buf, element_type, endian);
            Ok(buf)
        }
        Encoding::Gzip => {
            let mut dec = GzDecoder::new(reader);
            let mut buf = Vec::with_capacity(expected_bytes);
            dec.read_to_end(&mut buf)?;
            swap_to_host_endian(&mut buf, element_type, endian);
            Ok(buf)
        }
        Encoding::Bzip2 => {
            let mut dec = BzDecoder::new(reader);
            let mut buf = Vec::with_capacity(expected_bytes);
            dec.read_to_end(&mut buf)?;
            swap_to_host_endian(&mut buf, element_type, endian);
            Ok(buf)
        }
        Encoding::Ascii => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            decode_ascii(&text, element_type, expected_bytes)
        }
        Encoding::Hex => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            let mut buf = decode_hex(&text)?;
            swap_to_host_endian(&mut buf, element_type, endian);
            Ok(buf)
        }
    }
}

/// Byte-swap `buf` element-by-element in place if the declared `endian` disagrees with the
/// host's native byte order. A `None` declared endian (legal for single-byte types) is treated
/// as already-native-- no declared value to disagree with.
fn swap_to_host_endian(buf: &mut [u8], element_type: ScalarType, declared: Option<Endian>) {
    let sz = match element_type.size() {
        Some(sz) if sz > 1 => sz,
        _ => return,
    };
    let declared = match declared {
        Some(e) => e,
        None => return,
    };
    if declared == Endian::native() {
        return;
    }
    for chunk in buf.chunks_mut(sz) {
        chunk.reverse();
    }
}

fn elem_size(element_type: ScalarType) -> Result<usize> {
    element_type
        .size()
        .ok_or_else(|| NrrdError::new(Cause::UnsupportedType(element_type.to_string())))
}

/// Decode whitespace-delimited ascii tokens into host-native element bytes. The `endian` field
/// is irrelevant to ascii; the decoded buffer is always host-native, matching
/// what the raw path produces after its own endian swap.
fn decode_ascii(text: &str, element_type: ScalarType, expected_bytes: usize) -> Result<Vec<u8>> {
    let sz = elem_size(element_type)?;
    let expected = expected_bytes / sz;
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(NrrdError::new(Cause::AsciiTokenCountMismatch {
            expected,
            found: tokens.len(),
        }));
    }
    let mut out = Vec::with_capacity(expected_bytes);
    for tok in tokens {
        write_scalar_text(&mut out, tok, element_type, Endian::native())?;
    }
    Ok(out)
}

fn write_scalar_text(out: &mut Vec<u8>, token: &str, element_type: ScalarType, endian: Endian) -> Result<()> {
    macro_rules! push_int {
        ($ty:ty, $write:ident) => {{
            let v: $ty = token
                .parse()
                .map_err(|e| NrrdError::new(Cause::EncodingError(format!("ascii token '{}': {}", token, e))))?;
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            match endian {
                Endian::Little => LittleEndian::$write(&mut buf, v),
                Endian::Big => BigEndian::$write(&mut buf, v),
            }
            out.extend_from_slice(&buf);
        }};
    }
    match element_type {
        ScalarType::I8 => out.push(token.parse::<i8>().map_err(|e| NrrdError::new(Cause::EncodingError(e.to_string())))? as u8),
        ScalarType::U8 => out.push(token.parse::<u8>().map_err(|e| NrrdError::new(Cause::EncodingError(e.to_string())))?),
        ScalarType::I16 => push_int!(i16, write_i16),
        ScalarType::U16 => push_int!(u16, write_u16),
        ScalarType::I32 => push_int!(i32, write_i32),
        ScalarType::U32 => push_int!(u32, write_u32),
        ScalarType::I64 => push_int!(i64, write_i64),
        ScalarType::U64 => push_int!(u64, write_u64),
        ScalarType::F32 => push_int!(f32, write_f32),
        ScalarType::F64 => push_int!(f64, write_f64),
        ScalarType::Block => return Err(NrrdError::new(Cause::UnsupportedType(element_type.to_string()))),
    }
    Ok(())
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(NrrdError::new(Cause::EncodingError(
            "hex payload has an odd number of digits".to_string(),
        )));
    }
    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks(2) {
        let hi = (pair[0] as char).to_digit(16).ok_or_else(|| {
            NrrdError::new(Cause::EncodingError(format!("invalid hex digit '{}'", pair[0] as char)))
        })?;
        let lo = (pair[1] as char).to_digit(16).ok_or_else(|| {
            NrrdError::new(Cause::EncodingError(format!("invalid hex digit '{}'", pair[1] as char)))
        })?;
        out.push(((hi << 4) | lo) as u8);
    }
    Ok(out)
}

/// Encode raw element bytes for writing, per `encoding`. The inverse of
/// [`decode`], minus skip handling-- the writer never emits skipped bytes. The input `bytes` are
/// always host-native (the writer always declares `endian` as native), so unlike [`decode`]
/// there's no endian-swap case to handle here.
pub fn encode(bytes: &[u8], encoding: Encoding, element_type: ScalarType) -> Result<Vec<u8>> {
    match encoding {
        Encoding::Raw => Ok(bytes.to_vec()),
        Encoding::Gzip => {
            use flate2::write::GzEncoder;
            use flate2::Compression;
            use std::io::Write;
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(bytes)?;
            Ok(enc.finish()?)
        }
        Encoding::Bzip2 => {
            use bzip2::write::BzEncoder;
            use bzip2::Compression;
            use std::io::Write;
            let mut enc = BzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(bytes)?;
            Ok(enc.finish()?)
        }
        Encoding::Ascii => encode_ascii(bytes, element_type),
        Encoding::Hex => Ok(encode_hex(bytes)),
    }
}

/// Encode host-native element bytes (the convention every [`Buffer`](crate::geometry::Buffer)
/// holds its bytes in) as whitespace-delimited ascii tokens. The `endian` field is irrelevant to
/// ascii, so this always reads the input chunks in host-native order.
fn encode_ascii(bytes: &[u8], element_type: ScalarType) -> Result<Vec<u8>> {
    let sz = elem_size(element_type)?;
    let mut tokens = Vec::with_capacity(bytes.len() / sz.max(1));
    for chunk in bytes.chunks(sz) {
        tokens.push(read_scalar_text(chunk, element_type, Endian::native())?);
    }
    Ok(tokens.join("\n").into_bytes())
}

fn read_scalar_text(chunk: &[u8], element_type: ScalarType, endian: Endian) -> Result<String> {
    macro_rules! read_int {
        ($read:ident) => {
            match endian {
                Endian::Little => LittleEndian::$read(chunk).to_string(),
                Endian::Big => BigEndian::$read(chunk).to_string(),
            }
        };
    }
    Ok(match element_type {
        ScalarType::I8 => (chunk[0] as i8).to_string(),
        ScalarType::U8 => chunk[0].to_string(),
        ScalarType::I16 => read_int!(read_i16),
        ScalarType::U16 => read_int!(read_u16),
        ScalarType::I32 => read_int!(read_i32),
        ScalarType::U32 => read_int!(read_u32),
        ScalarType::I64 => read_int!(read_i64),
        ScalarType::U64 => read_int!(read_u64),
        ScalarType::F32 => read_int!(read_f32),
        ScalarType::F64 => read_int!(read_f64),
        ScalarType::Block => return Err(NrrdError::new(Cause::UnsupportedType(element_type.to_string()))),
    })
}

fn encode_hex(bytes: &[u8]) -> Vec<u8> {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize]);
        out.push(HEX[(b & 0xf) as usize]);
    }
    out
}
