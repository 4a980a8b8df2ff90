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
//! nrrd
//!
//! # Introduction
//!
//! Read and write [NRRD](http://teem.sourceforge.net/nrrd/format.html) (Nearly Raw Raster Data)
//! files: the container format teem/Slicer/ITK-adjacent tools use for N-dimensional scientific
//! raster data-- a plain-text header describing the array's type, shape and encoding, followed
//! by the raw (or compressed, or hex, or ascii-rendered) element bytes, either inline or in one
//! or more sibling files.
//!
//! This crate does not interpret the scientific-imaging semantics of the spatial-metadata
//! fields (`space directions`, `space origin`, `measurement frame`, ...); it parses, stores and
//! round-trips them faithfully, and leaves interpretation to the caller. It doesn't provide a
//! command-line tool-- that's for an embedding application to build on top of [`read`]/[`write`].
//!
//! # Layout
//!
//! - [`field`]: the closed set of header value shapes (ints, doubles, sequences, vectors,
//!   matrices, vector lists) and their parse/format rules.
//! - [`header`]: the header grammar-- magic/version line, `name: value` and `name:=value`
//!   lines, the blank-line terminator, and the duplicate-field policy.
//! - [`geometry`]: reconciling the header's always-fastest-first axis order against a caller's
//!   buffer, which may be laid out either way.
//! - [`payload`]: encodings (raw/ascii/hex/gzip/bzip2), pre-skip semantics, and the detached
//!   data file reference (single sibling file, or a templated multi-file sequence).
//! - [`config`]: the process-level toggles (`allow_duplicate_field`, `space_directions_shape`,
//!   `custom_field_map`), threaded explicitly through every call.
//! - [`error`]: the crate's error taxonomy.

pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod header;
pub mod payload;
pub mod types;

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

pub use config::Config;
pub use error::{Cause, NrrdError, Result};
pub use field::{FieldShape, FieldValue, SpaceDirectionsShape};
pub use geometry::{Buffer, Geometry, IndexOrder, RawBuffer};
pub use header::Header;
pub use payload::DataFile;
pub use types::{Encoding, Endian, ScalarType};

/// Options governing [`read`]/[`read_header`]/[`read_data`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub config: Config,
}

/// Options governing [`write`]. `encoding` defaults to `gzip`, matching the
/// format's own recommended default for attached data.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub config: Config,
    pub encoding: Encoding,
    pub index_order: IndexOrder,
    /// Write a detached header plus sibling data file even when `path` ends in `.nrrd`. A
    /// `.nhdr` destination is always written detached regardless of this flag.
    pub detached_header: bool,
}

impl Default for WriteOptions {
    fn default() -> WriteOptions {
        WriteOptions {
            config: Config::default(),
            encoding: Encoding::Gzip,
            index_order: IndexOrder::FastestFirst,
            detached_header: false,
        }
    }
}

/// Read just the header (and the geometry/data-reference derived from it), without touching the
/// payload. Detached headers (`.nhdr`) are expected to name a `data file`; attached ones
/// (`.nrrd`) may still name one, in which case they behave like a detached header.
pub fn read_header(path: impl AsRef<Path>, options: &ReadOptions) -> Result<(Header, Geometry, DataFile)> {
    let path = path.as_ref();
    log::debug!("opening '{}'", path.display());
    let raw = std::fs::read(path)?;
    // An attached payload may contain arbitrary bytes (gzip, raw binary, ...), so only the
    // header region-- up to and including the blank-line terminator-- is decoded as text.
    let header_end = attached_payload_offset(&raw)?;
    let text = String::from_utf8(raw[..header_end].to_vec())?;
    let header = header::parse(text.lines(), &options.config)?;
    let geometry = geometry::derive(&header)?;
    let data_file = match header.get("data file") {
        Some(v) => payload::parse_data_file(v.as_str().unwrap_or(""))?,
        None => DataFile::Attached,
    };
    log::debug!("closing '{}'", path.display());
    Ok((header, geometry, data_file))
}

/// Locate the byte offset immediately after the header's blank-line terminator, by re-scanning
/// the raw bytes of `path` (used only for attached-data reads).
fn attached_payload_offset(raw: &[u8]) -> Result<usize> {
    let mut line_start = 0usize;
    while line_start < raw.len() {
        let nl = raw[line_start..].iter().position(|&b| b == b'\n');
        let line_end = match nl {
            Some(i) => line_start + i,
            None => raw.len(),
        };
        let line = &raw[line_start..line_end];
        let consumed_to = if nl.is_some() { line_end + 1 } else { line_end };
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(consumed_to);
        }
        line_start = consumed_to;
    }
    Err(NrrdError::new(Cause::MalformedHeader(
        "header is missing its blank-line terminator".to_string(),
    )))
}

/// Read the full payload for an already-parsed header, into a buffer with the requested
/// `index_order`.
pub fn read_data(
    path: impl AsRef<Path>,
    header: &Header,
    geometry: &Geometry,
    data_file: &DataFile,
    index_order: IndexOrder,
    _options: &ReadOptions,
) -> Result<RawBuffer> {
    let path = path.as_ref();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let encoding = header
        .get("encoding")
        .and_then(FieldValue::as_str)
        .map(Encoding::parse)
        .transpose()?
        .unwrap_or(Encoding::Raw);
    let line_skip = header.get("line skip").and_then(FieldValue::as_int).unwrap_or(0);
    let byte_skip = header.get("byte skip").and_then(FieldValue::as_int).unwrap_or(0);

    let total_elements = geometry.element_count();
    let elem_size = geometry
        .element_type
        .size()
        .ok_or_else(|| NrrdError::new(Cause::UnsupportedType(geometry.element_type.to_string())))?;

    let decoded = match data_file {
        DataFile::Attached => {
            let raw = std::fs::read(path)?;
            let offset = attached_payload_offset(&raw)?;
            let cursor = Cursor::new(raw[offset..].to_vec());
            payload::decode(
                cursor,
                encoding,
                line_skip,
                byte_skip,
                geometry.element_type,
                geometry.endian,
                total_elements * elem_size,
            )?
        }
        DataFile::Single(_) => {
            let files = data_file.file_paths(base_dir)?;
            log::debug!("reading single data file '{}'", files[0].display());
            let f = File::open(&files[0])?;
            payload::decode(
                f,
                encoding,
                line_skip,
                byte_skip,
                geometry.element_type,
                geometry.endian,
                total_elements * elem_size,
            )?
        }
        DataFile::MultiFile { .. } => {
            let files = data_file.file_paths(base_dir)?;
            if files.is_empty() {
                return Err(NrrdError::new(Cause::MalformedHeader(
                    "data file template produced no files".to_string(),
                )));
            }
            if total_elements % files.len() != 0 {
                return Err(NrrdError::new(Cause::MalformedHeader(format!(
                    "{} elements do not divide evenly across {} data files",
                    total_elements,
                    files.len()
                ))));
            }
            let elements_per_file = total_elements / files.len();
            let mut out = Vec::with_capacity(total_elements * elem_size);
            for (i, fpath) in files.iter().enumerate() {
                log::debug!("reading data file {}/{} '{}'", i + 1, files.len(), fpath.display());
                let f = File::open(fpath)?;
                let part = payload::decode(
                    f,
                    encoding,
                    line_skip,
                    byte_skip,
                    geometry.element_type,
                    geometry.endian,
                    elements_per_file * elem_size,
                )?;
                out.extend_from_slice(&part);
            }
            out
        }
    };

    let shape = geometry::from_fastest_first(&geometry.sizes, index_order);
    Ok(RawBuffer::new(shape, index_order, geometry.element_type, decoded))
}

/// Read a complete NRRD/NHDR file: header plus payload. `index_order` selects the axis order of
/// the returned buffer.
pub fn read(path: impl AsRef<Path>, index_order: IndexOrder, options: &ReadOptions) -> Result<(Header, RawBuffer)> {
    let path = path.as_ref();
    log::info!("reading '{}'", path.display());
    let (header, geometry, data_file) = read_header(path, options)?;
    let buffer = read_data(path, &header, &geometry, &data_file, index_order, options)?;
    log::info!(
        "read '{}': {} elements of {}",
        path.display(),
        geometry.element_count(),
        geometry.element_type
    );
    Ok((header, buffer))
}

/// Write `header`'s non-geometry fields plus `buffer`'s contents to `path`. The geometry fields
/// (`type`, `dimension`, `sizes`, `endian`) are always synthesized from `buffer`, overriding
/// anything the caller set on `header`. `.nhdr` paths always write a detached payload (sibling
/// `<stem>.<ext>`). `.nrrd` paths write the payload attached, unless `options.detached_header`
/// is set, in which case the header goes to sibling `<stem>.nhdr` and `path` itself becomes the
/// data file.
pub fn write(path: impl AsRef<Path>, header: &Header, buffer: &impl Buffer, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let sizes_fastest_first = geometry::to_fastest_first(buffer.shape(), buffer.index_order());
    geometry::validate_buffer_shape(buffer.index_order(), buffer.shape(), &sizes_fastest_first)?;

    let element_type = buffer.element_type();
    let needs_endian = element_type.is_multi_byte();

    let mut out_header = header.clone();
    out_header.set_standard("type", FieldValue::Str(element_type.to_string()));
    out_header.set_standard("dimension", FieldValue::Int(sizes_fastest_first.len() as i64));
    out_header.set_standard(
        "sizes",
        FieldValue::IntSeq(sizes_fastest_first.iter().map(|&s| s as i64).collect()),
    );
    if needs_endian {
        out_header.set_standard("endian", FieldValue::Str(Endian::native().to_string()));
    }
    out_header.set_standard("encoding", FieldValue::Str(options.encoding.to_string()));

    let is_nhdr = path.extension().map(|e| e.eq_ignore_ascii_case("nhdr")).unwrap_or(false);
    let is_detached = is_nhdr || options.detached_header;

    let encoded = payload::encode(buffer.bytes(), options.encoding, element_type)?;

    if is_detached {
        // `.nhdr` names its own sibling data file by stem+encoding; a `.nrrd` destination
        // asked to go detached keeps the given path as the data file and writes the header
        // alongside it under the same stem with a `.nhdr` extension.
        let (header_path, data_path) = if is_nhdr {
            (path.to_path_buf(), detached_data_path(path, options.encoding))
        } else {
            (path.with_extension("nhdr"), path.to_path_buf())
        };
        out_header.set_standard(
            "data file",
            FieldValue::Str(
                data_path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
        );
        log::debug!("writing detached header '{}'", header_path.display());
        std::fs::write(&header_path, header::format(&out_header))?;
        log::debug!("writing data file '{}'", data_path.display());
        std::fs::write(&data_path, &encoded)?;
    } else {
        log::debug!("writing attached file '{}'", path.display());
        let mut f = File::create(path)?;
        f.write_all(header::format(&out_header).as_bytes())?;
        f.write_all(&encoded)?;
    }

    log::info!(
        "wrote '{}': {} elements of {}",
        path.display(),
        sizes_fastest_first.iter().product::<usize>(),
        element_type
    );
    Ok(())
}

fn detached_data_path(header_path: &Path, encoding: Encoding) -> PathBuf {
    let stem = header_path.file_stem().and_then(|s| s.to_str()).unwrap_or("data");
    let ext = match encoding {
        Encoding::Raw => "raw",
        Encoding::Ascii => "txt",
        Encoding::Hex => "hex",
        Encoding::Gzip => "raw.gz",
        Encoding::Bzip2 => "raw.bz2",
    };
    header_path.with_file_name(format!("{}.{}", stem, ext))
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    fn tempdir(tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("nrrd-test-{}-{}", std::process::id(), tag));
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn attached_payload_offset_finds_blank_line() {
        let raw = b"NRRD0004\ntype: uint8\ndimension: 1\nsizes: 2\nencoding: raw\n\n\x01\x02";
        let offset = attached_payload_offset(raw).unwrap();
        assert_eq!(&raw[offset..], &[1u8, 2u8]);
    }

    #[test]
    fn write_then_read_attached_raw_round_trips() {
        let dir = tempdir("attached-raw");
        let path = dir.join("sample.nrrd");

        let buffer = RawBuffer::new(vec![2, 2], IndexOrder::FastestFirst, ScalarType::U8, vec![1, 2, 3, 4]);
        let header = Header::new(4);
        let options = WriteOptions {
            encoding: Encoding::Raw,
            ..WriteOptions::default()
        };
        write(&path, &header, &buffer, &options).unwrap();

        let (read_header, read_buffer) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
        assert_eq!(read_header.get("type").unwrap().as_str(), Some("uint8"));
        assert_eq!(read_buffer.bytes(), &[1, 2, 3, 4]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn write_then_read_detached_gzip_round_trips() {
        let dir = tempdir("detached-gzip");
        let path = dir.join("sample.nhdr");

        let buffer = RawBuffer::new(vec![3, 2], IndexOrder::FastestFirst, ScalarType::U8, vec![1, 2, 3, 4, 5, 6]);
        let header = Header::new(4);
        write(&path, &header, &buffer, &WriteOptions::default()).unwrap();

        let (read_header, read_buffer) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
        assert_eq!(read_header.get("encoding").unwrap().as_str(), Some("gzip"));
        assert_eq!(read_buffer.bytes(), &[1, 2, 3, 4, 5, 6]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn attached_high_byte_payload_round_trips() {
        // The default gzip encoding starts with 0x1f 0x8b; a naive `read_to_string` over the
        // whole file would reject bytes like these as invalid UTF-8.
        let dir = tempdir("attached-high-byte");
        let path = dir.join("sample.nrrd");

        let data: Vec<u8> = (0..=255).collect();
        let buffer = RawBuffer::new(vec![data.len()], IndexOrder::FastestFirst, ScalarType::U8, data.clone());
        let header = Header::new(4);
        write(&path, &header, &buffer, &WriteOptions::default()).unwrap();

        let (_, read_buffer) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
        assert_eq!(read_buffer.bytes(), data.as_slice());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn detached_header_requested_for_nrrd_destination() {
        let dir = tempdir("detached-nrrd");
        let path = dir.join("sample.nrrd");

        let buffer = RawBuffer::new(vec![2, 2], IndexOrder::FastestFirst, ScalarType::U8, vec![1, 2, 3, 4]);
        let header = Header::new(4);
        let options = WriteOptions {
            encoding: Encoding::Raw,
            detached_header: true,
            ..WriteOptions::default()
        };
        write(&path, &header, &buffer, &options).unwrap();

        let nhdr_path = dir.join("sample.nhdr");
        assert!(nhdr_path.is_file());
        assert!(path.is_file());

        let (read_header, read_buffer) = read(&nhdr_path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
        assert_eq!(read_header.get("data file").unwrap().as_str(), Some("sample.nrrd"));
        assert_eq!(read_buffer.bytes(), &[1, 2, 3, 4]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn write_accepts_slowest_first_buffer_consistently() {
        let dir = tempdir("slowest-first");
        let path = dir.join("sample.nrrd");

        // A 3x2 buffer in slowest-first order corresponds to fastest-first sizes [2, 3].
        let buffer = RawBuffer::new(vec![3, 2], IndexOrder::SlowestFirst, ScalarType::U8, vec![0u8; 6]);
        let header = Header::new(4);
        let options = WriteOptions {
            encoding: Encoding::Raw,
            ..WriteOptions::default()
        };
        write(&path, &header, &buffer, &options).unwrap();

        let (read_header, _) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
        assert_eq!(read_header.get("sizes").unwrap().as_int_seq(), Some(&[2i64, 3i64][..]));

        let _ = std::fs::remove_dir_all(dir);
    }
}
