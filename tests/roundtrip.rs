use nrrd::{
    read, read_header, write, Config, DataFile, Encoding, FieldValue, Header, IndexOrder,
    RawBuffer, ReadOptions, ScalarType, WriteOptions,
};

fn tempdir(tag: &str) -> std::path::PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("nrrd-roundtrip-{}-{}", std::process::id(), tag));
    std::fs::create_dir_all(&p).unwrap();
    p
}

/// A small attached raw volume round-trips byte-for-byte through write then read.
#[test]
fn attached_raw_round_trip() {
    let dir = tempdir("s1");
    let path = dir.join("volume.nrrd");

    let data: Vec<u8> = (0..24).collect();
    let buffer = RawBuffer::new(vec![2, 3, 4], IndexOrder::FastestFirst, ScalarType::U8, data.clone());
    let header = Header::new(4);
    let options = WriteOptions {
        encoding: Encoding::Raw,
        ..WriteOptions::default()
    };
    write(&path, &header, &buffer, &options).unwrap();

    let (read_back, buf) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
    assert_eq!(read_back.get("type").unwrap().as_str(), Some("uint8"));
    assert_eq!(read_back.get("sizes").unwrap().as_int_seq(), Some(&[2i64, 3, 4][..]));
    assert_eq!(buf.bytes(), data.as_slice());

    let _ = std::fs::remove_dir_all(dir);
}

/// A detached `.nhdr`/gzip-sibling pair round-trips to the same bytes.
#[test]
fn detached_gzip_round_trip() {
    let dir = tempdir("s2");
    let path = dir.join("volume.nhdr");

    let data: Vec<u8> = (0..100).map(|i| (i % 251) as u8).collect();
    let buffer = RawBuffer::new(vec![10, 10], IndexOrder::FastestFirst, ScalarType::U8, data.clone());
    let header = Header::new(4);
    write(&path, &header, &buffer, &WriteOptions::default()).unwrap();

    let (read_back, _, data_file) = read_header(&path, &ReadOptions::default()).unwrap();
    assert!(matches!(data_file, DataFile::Single(_)));
    assert_eq!(read_back.get("encoding").unwrap().as_str(), Some("gzip"));

    let (_, buf) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
    assert_eq!(buf.bytes(), data.as_slice());

    let _ = std::fs::remove_dir_all(dir);
}

/// A duplicate standard field is fatal by default, tolerated when configured.
#[test]
fn duplicate_field_policy() {
    let dir = tempdir("s3");
    let path = dir.join("dup.nrrd");
    std::fs::write(
        &path,
        "NRRD0004\ntype: uint8\ntype: uint8\ndimension: 1\nsizes: 2\nencoding: raw\n\n\x01\x02",
    )
    .unwrap();

    let default_opts = ReadOptions::default();
    assert!(read_header(&path, &default_opts).is_err());

    let mut permissive = Config::default();
    permissive.allow_duplicate_field = true;
    let permissive_opts = ReadOptions { config: permissive };
    assert!(read_header(&path, &permissive_opts).is_ok());

    let _ = std::fs::remove_dir_all(dir);
}

/// `byte skip = -1` seeks from EOF, and is rejected for non-raw encodings.
#[test]
fn byte_skip_minus_one_seeks_from_eof() {
    let dir = tempdir("s4");
    let path = dir.join("skip.nrrd");
    let mut contents = b"NRRD0004\ntype: uint8\ndimension: 1\nsizes: 4\nencoding: raw\nbyte skip: -1\n\n".to_vec();
    contents.extend_from_slice(b"junkjunk"); // 8 bytes of garbage preceding the real payload
    contents.extend_from_slice(&[1, 2, 3, 4]);
    std::fs::write(&path, &contents).unwrap();

    let (_, buf) = read(&path, IndexOrder::FastestFirst, &ReadOptions::default()).unwrap();
    assert_eq!(buf.bytes(), &[1, 2, 3, 4]);

    let _ = std::fs::remove_dir_all(dir);
}

/// A `space directions` matrix with a `none` row decodes to an all-NaN row, and formats
/// back to `none`.
#[test]
fn space_directions_matrix_with_none_row() {
    use nrrd::field;

    let value = field::parse_double_matrix("space directions", "(1,0,0) none (0,0,1)").unwrap();
    match &value {
        FieldValue::DoubleMatrix(rows) => {
            assert_eq!(rows.len(), 3);
            assert!(rows[1].iter().all(|x| x.is_nan()));
        }
        _ => panic!("expected a double matrix"),
    }
    assert_eq!(field::format(&value), "(1,0,0) none (0,0,1)");
}

/// Writing a buffer whose shape disagrees with its declared index order is a write-time error.
#[test]
fn write_rejects_index_order_mismatch() {
    use nrrd::geometry;

    // sizes [2, 3] fastest-first means a slowest-first buffer must have shape [3, 2]; [2, 3] is
    // inconsistent with that declaration.
    let result = geometry::validate_buffer_shape(IndexOrder::SlowestFirst, &[2, 3], &[2, 3]);
    assert!(result.is_err());
}
