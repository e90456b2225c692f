//! Integration tests for write-then-read fidelity.
//!
//! These tests build documents in memory, write them through the public
//! writer API and read them back, checking keywords, parameters and events.

use std::io::Cursor;

use fcs_io::{
    ByteOrder, Document, DocumentOptions, FcsReader, FcsVersion, FcsWriter, FcsWriterOptions,
    parse_fcs, read_fcs, stage_document, write_fcs,
};
use proptest::prelude::*;

/// Helper to write a document and read the bytes back.
fn roundtrip(document: &Document, options: FcsWriterOptions) -> (Document, Document) {
    let mut buffer = Vec::new();
    let snapshot = {
        let writer = FcsWriter::with_options(Cursor::new(&mut buffer), options);
        writer.write_document(document).unwrap()
    };

    let reader = FcsReader::new(Cursor::new(&buffer));
    (snapshot, reader.read_document().unwrap())
}

fn scatter_document(options: DocumentOptions) -> Document {
    let mut doc = Document::new(options);
    doc.add_parameter("FSC-A", 0).unwrap();
    doc.add_parameter("SSC-A", 1).unwrap();
    doc.add_parameter("CD4", 2).unwrap();
    doc.replace_matrix(vec![
        vec![1024.5, 88.0, -3.25],
        vec![0.0, 262_143.0, 17.0],
        vec![f32::MAX, f32::MIN_POSITIVE, 1.0e-7],
    ])
    .unwrap();
    doc.set_keyword("$CYT", "FACSymphony").unwrap();
    doc.set_keyword("$P3S", "CD4 BV421").unwrap();
    doc.set_keyword("$P1V", "410").unwrap();
    doc.set_keyword("PLATE NAME", "plate/1").unwrap();
    doc
}

#[test]
fn test_basic_roundtrip() {
    let doc = scatter_document(DocumentOptions::default());
    let (snapshot, read_back) = roundtrip(&doc, FcsWriterOptions::default());

    assert_eq!(read_back, snapshot);
    assert_eq!(read_back.version(), "FCS3.1");
    assert_eq!(read_back.par(), 3);
    assert_eq!(read_back.tot(), 3);
    assert_eq!(read_back.matrix(), doc.matrix());
    assert_eq!(read_back.parameters(), doc.parameters());
    assert_eq!(read_back.keyword("$CYT").as_deref(), Some("FACSymphony"));
    assert_eq!(read_back.keyword("$P3S").as_deref(), Some("CD4 BV421"));
    assert_eq!(read_back.keyword("PLATE NAME").as_deref(), Some("plate/1"));
}

#[test]
fn test_writer_leaves_input_unchanged() {
    let doc = scatter_document(DocumentOptions::default());
    let before = doc.clone();
    let (snapshot, _) = roundtrip(&doc, FcsWriterOptions::default());

    assert_eq!(doc, before);
    assert_eq!(doc.keyword("$BEGINDATA").as_deref(), Some("0"));
    assert_ne!(snapshot.keyword("$BEGINDATA").as_deref(), Some("0"));
}

#[test]
fn test_big_endian_roundtrip() {
    let options = DocumentOptions::default().with_byte_order(ByteOrder::BigEndian);
    let doc = scatter_document(options);
    let (snapshot, read_back) = roundtrip(&doc, FcsWriterOptions::default());

    assert_eq!(read_back.keyword("$BYTEORD").as_deref(), Some("4,3,2,1"));
    assert_eq!(read_back.matrix(), doc.matrix());
    assert_eq!(read_back, snapshot);
}

#[test]
fn test_version_and_delimiter_preserved() {
    let options = DocumentOptions::default()
        .with_version(FcsVersion::V3_0)
        .with_delimiter(b'|');
    let doc = scatter_document(options);
    let (_, read_back) = roundtrip(&doc, FcsWriterOptions::default());

    assert_eq!(read_back.version(), "FCS3.0");
    assert_eq!(read_back.delimiter(), b'|');
}

#[test]
fn test_other_segments_roundtrip() {
    let mut doc = scatter_document(DocumentOptions::default());
    doc.push_other(b"<Vendor>1</Vendor>".to_vec());
    doc.push_other(vec![0u8, 1, 2, 255]);

    let (_, read_back) = roundtrip(&doc, FcsWriterOptions::default());
    assert_eq!(read_back.other().len(), 2);
    assert_eq!(&*read_back.other()[0], b"<Vendor>1</Vendor>");
    assert_eq!(&*read_back.other()[1], &[0u8, 1, 2, 255]);
}

#[test]
fn test_empty_document_roundtrip() {
    let doc = Document::default();
    let (snapshot, read_back) = roundtrip(&doc, FcsWriterOptions::default());

    assert_eq!(snapshot.keyword("$BEGINDATA").as_deref(), Some("0"));
    assert_eq!(snapshot.keyword("$ENDDATA").as_deref(), Some("0"));
    assert_eq!(read_back.par(), 0);
    assert_eq!(read_back.tot(), 0);
}

#[test]
fn test_parameters_without_events() {
    let mut doc = Document::default();
    doc.add_parameter("FSC", 0).unwrap();
    let (_, read_back) = roundtrip(&doc, FcsWriterOptions::default());
    assert_eq!(read_back.par(), 1);
    assert_eq!(read_back.tot(), 0);
}

#[test]
fn test_essential_output() {
    let mut doc = scatter_document(DocumentOptions::default());
    doc.push_other(b"vendor".to_vec());
    let (snapshot, read_back) = roundtrip(&doc, FcsWriterOptions::new().essential());

    assert_eq!(read_back, snapshot);
    assert!(read_back.other().is_empty());
    assert_eq!(read_back.keyword("$CYT"), None);
    assert_eq!(read_back.keyword("PLATE NAME"), None);
    assert_eq!(read_back.keyword("$P3S"), None);
    assert_eq!(read_back.keyword("$P1N").as_deref(), Some("FSC-A"));
    assert!(read_back.unset_required_keywords().is_empty());
    assert_eq!(read_back.matrix(), doc.matrix());
}

#[test]
fn test_adjust_range() {
    let doc = scatter_document(DocumentOptions::default());
    let (_, read_back) = roundtrip(&doc, FcsWriterOptions::new().adjust_range());

    assert_eq!(read_back.keyword("$P2R").as_deref(), Some("262143"));
    assert_eq!(read_back.keyword("$P3R").as_deref(), Some("17"));
    assert_eq!(doc.keyword("$P3R").as_deref(), Some("262144"));
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.fcs");
    let doc = scatter_document(DocumentOptions::default());

    let snapshot = write_fcs(&path, &doc, FcsWriterOptions::default()).unwrap();
    let read_back = read_fcs(&path).unwrap();
    assert_eq!(read_back, snapshot);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_fcs(&dir.path().join("absent.fcs")).unwrap_err();
    assert_eq!(err.kind(), fcs_io::ErrorKind::Io);
}

#[test]
fn test_rewrite_is_stable() {
    let doc = scatter_document(DocumentOptions::default());
    let options = FcsWriterOptions::default();
    let first = stage_document(&doc, &options).unwrap();
    let reparsed = parse_fcs(&first.to_bytes()).unwrap();
    let second = stage_document(&reparsed, &options).unwrap();
    assert_eq!(first.to_bytes(), second.to_bytes());
}

fn delimiters() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![b'/', b'|', b'\\', b'*', b',', b';', b'!', b'~', b'\x0c'])
}

/// Printable text that never starts with the delimiter: a leading delimiter
/// would read as an escaped one.
fn field(delimiter: u8) -> impl Strategy<Value = String> {
    "[A-Za-z0-9 /|\\\\*,;!~.=-]{0,12}".prop_map(move |tail| {
        let mut value = String::from("v");
        value.push_str(&tail);
        if tail.is_empty() {
            value.push(char::from(delimiter));
        }
        value
    })
}

fn custom_keywords() -> impl Strategy<Value = (u8, Vec<String>)> {
    delimiters().prop_flat_map(|delimiter| {
        (
            Just(delimiter),
            prop::collection::vec(field(delimiter), 1..8),
        )
    })
}

proptest! {
    #[test]
    fn prop_keywords_survive_any_delimiter((delimiter, values) in custom_keywords()) {
        let mut doc = Document::new(DocumentOptions::default().with_delimiter(delimiter));
        doc.add_parameter("FSC", 0).unwrap();
        doc.set_keyword("$P1S", &values[0]).unwrap();
        for (i, value) in values.iter().enumerate() {
            let key = format!("K{i}{}", char::from(delimiter));
            doc.set_keyword(&key, value).unwrap();
        }

        let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
        let read_back = parse_fcs(&staged.to_bytes()).unwrap();

        prop_assert_eq!(read_back.delimiter(), delimiter);
        prop_assert_eq!(read_back.keyword("$P1S"), Some(values[0].clone()));
        for (i, value) in values.iter().enumerate() {
            let key = format!("K{i}{}", char::from(delimiter));
            prop_assert_eq!(read_back.keyword(&key), Some(value.clone()));
        }
    }

    #[test]
    fn prop_document_roundtrip(
        columns in 1usize..6,
        values in prop::collection::vec(-1.0e6f32..1.0e6, 0..60),
        big_endian in any::<bool>(),
        other in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 0..3),
    ) {
        let order = if big_endian { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };
        let mut doc = Document::new(DocumentOptions::default().with_byte_order(order));
        for column in 0..columns {
            doc.add_parameter(&format!("P{column}"), column).unwrap();
        }
        let rows: Vec<Vec<f32>> = values
            .chunks_exact(columns)
            .map(<[f32]>::to_vec)
            .collect();
        doc.replace_matrix(rows).unwrap();
        for segment in other {
            doc.push_other(segment);
        }

        let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
        let read_back = parse_fcs(&staged.to_bytes()).unwrap();

        prop_assert_eq!(&read_back, staged.document());
        prop_assert_eq!(read_back.matrix(), doc.matrix());
        prop_assert_eq!(read_back.parameters(), doc.parameters());
    }
}
