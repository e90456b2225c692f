//! Integration tests for document transforms.
//!
//! Each transform is copy-on-write, so every test also checks that the
//! source document is unchanged afterwards.

use fcs_io::filter::{self, EnumerateFill};
use fcs_io::text::standard::REQUIRED_KEYWORDS;
use fcs_io::{Document, ErrorKind, FcsWriterOptions, parse_fcs, stage_document};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn column_document(name: &str, values: &[f32]) -> Document {
    let mut doc = Document::default();
    doc.add_parameter(name, 0).unwrap();
    doc.replace_matrix(values.iter().map(|v| vec![*v]).collect())
        .unwrap();
    doc
}

fn two_column_document() -> Document {
    let mut doc = Document::default();
    doc.add_parameter("A", 0).unwrap();
    doc.add_parameter("B", 1).unwrap();
    doc.replace_matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
        .unwrap();
    doc
}

/// Write and re-read a document.
fn reparse(document: &Document) -> Document {
    let staged = stage_document(document, &FcsWriterOptions::default()).unwrap();
    parse_fcs(&staged.to_bytes()).unwrap()
}

#[test]
fn test_events_selects_rows_in_order() {
    let doc = column_document("X", &[1.0, 2.0, 3.0]);
    let out = filter::events(&doc, &[2, 0]).unwrap();

    assert_eq!(out.matrix().to_rows(), vec![vec![3.0], vec![1.0]]);
    assert_eq!(out.tot(), 2);
    assert_eq!(reparse(&out).matrix().to_rows(), vec![vec![3.0], vec![1.0]]);
    assert_eq!(doc.matrix().to_rows(), vec![vec![1.0], vec![2.0], vec![3.0]]);
}

#[test]
fn test_events_out_of_range_is_validation() {
    let doc = column_document("X", &[1.0, 2.0, 3.0]);
    let err = filter::events(&doc, &[0, 3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(doc.tot(), 3);
}

#[test]
fn test_gate_keeps_inclusive_window() {
    let doc = column_document("X", &[5.0, 10.0, 15.0, 20.0, 25.0]);
    let out = filter::gate(&doc, "X", Some(10.0), Some(20.0)).unwrap();

    assert_eq!(out.matrix().column(0), Some(vec![10.0, 15.0, 20.0]));
    assert_eq!(doc.tot(), 5);
}

#[test]
fn test_gate_errors() {
    let doc = column_document("X", &[1.0]);
    assert_eq!(
        filter::gate(&doc, "X", None, None).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        filter::gate(&doc, "Missing", Some(0.0), None)
            .unwrap_err()
            .kind(),
        ErrorKind::Validation
    );
}

#[test]
fn test_add_parameter_in_the_middle() {
    let mut doc = two_column_document();
    doc.add_parameter("NEW", 1).unwrap();

    assert_eq!(doc.par(), 3);
    assert_eq!(doc.keyword("$PAR").as_deref(), Some("3"));
    assert_eq!(doc.matrix().columns(), 3);
    assert_eq!(doc.matrix().column(1), Some(vec![0.0, 0.0, 0.0]));
    assert_eq!(doc.matrix().column(2), Some(vec![2.0, 4.0, 6.0]));
    assert_eq!(doc.parameters().short_names(), vec!["A", "NEW", "B"]);

    let read_back = reparse(&doc);
    assert_eq!(read_back.keyword("$P2N").as_deref(), Some("NEW"));
    assert_eq!(read_back.keyword("$P2B").as_deref(), Some("32"));
    assert_eq!(read_back.keyword("$P2E").as_deref(), Some("0,0"));
    assert_eq!(read_back.keyword("$P2R").as_deref(), Some("262144"));
    assert_eq!(read_back.keyword("$P3N").as_deref(), Some("B"));
}

#[test]
fn test_add_duplicate_parameter_is_rejected() {
    let mut doc = two_column_document();
    let err = doc.add_parameter("A", 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(doc.par(), 2);
}

#[test]
fn test_minimize_keeps_required_keywords() {
    let mut doc = two_column_document();
    doc.set_keyword("$CYT", "Aria").unwrap();
    doc.set_keyword("$P1S", "Alpha").unwrap();
    doc.push_other(b"first".to_vec());
    doc.push_other(b"second".to_vec());

    let minimal = filter::minimize(&doc);
    assert!(minimal.other().is_empty());
    assert_eq!(minimal.keyword("$CYT"), None);
    assert_eq!(minimal.keyword("$P1S"), None);
    for (key, _) in REQUIRED_KEYWORDS {
        if key.contains('n') {
            for position in 1..=minimal.par() {
                let concrete = key.replacen('n', &position.to_string(), 1);
                assert!(minimal.keyword(&concrete).is_some(), "{concrete} missing");
            }
        } else {
            assert!(minimal.keyword(key).is_some(), "{key} missing");
        }
    }

    assert_eq!(doc.other().len(), 2);
    assert_eq!(doc.keyword("$CYT").as_deref(), Some("Aria"));
}

#[test]
fn test_concatenate_then_write() {
    let a = two_column_document();
    let mut b = Document::default();
    b.add_parameter("B", 0).unwrap();
    b.add_parameter("C", 1).unwrap();
    b.add_parameter("A", 2).unwrap();
    b.replace_matrix(vec![vec![20.0, 0.0, 10.0]]).unwrap();

    let out = filter::concatenate(&a, &[b.clone()]).unwrap();
    assert_eq!(out.parameters().short_names(), vec!["A", "B"]);
    assert_eq!(out.tot(), 4);
    assert_eq!(out.matrix().row(3), Some(&[10.0, 20.0][..]));
    assert_eq!(reparse(&out).matrix(), out.matrix());
    assert_eq!(b.par(), 3);
}

#[test]
fn test_downsample_is_seeded() {
    let values: Vec<f32> = (1..=1000).map(|i| i as f32).collect();
    let doc = column_document("Time", &values);

    let a = filter::downsample(&doc, 50, &mut StdRng::seed_from_u64(11)).unwrap();
    let b = filter::downsample(&doc, 50, &mut StdRng::seed_from_u64(11)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.tot(), 50);
    let times = a.matrix().column(0).unwrap();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_event_range_is_one_based() {
    let doc = column_document("X", &[10.0, 20.0, 30.0, 40.0]);
    let out = filter::event_range(&doc, 1, 2).unwrap();
    assert_eq!(out.matrix().column(0), Some(vec![10.0, 20.0]));
    let out = filter::event_range(&doc, 4, 4).unwrap();
    assert_eq!(out.matrix().column(0), Some(vec![40.0]));
}

#[test]
fn test_enumerate_label_roundtrip() {
    let doc = two_column_document();
    let out = filter::enumerate(&doc, "Tube", 2, EnumerateFill::Label(3.0)).unwrap();
    let read_back = reparse(&out);
    assert_eq!(read_back.parameters().short_names(), vec!["A", "B", "Tube"]);
    assert_eq!(read_back.matrix().column(2), Some(vec![3.0, 3.0, 3.0]));
}

#[test]
fn test_parameter_selection() {
    let mut doc = two_column_document();
    doc.add_parameter("C", 2).unwrap();

    let kept = filter::select_parameters(&doc, &["C", "A"]).unwrap();
    assert_eq!(kept.parameters().short_names(), vec!["A", "C"]);

    let dropped = filter::drop_parameters(&doc, &["A"]).unwrap();
    assert_eq!(dropped.parameters().short_names(), vec!["B", "C"]);
    assert_eq!(dropped.matrix().column(0), Some(vec![2.0, 4.0, 6.0]));

    let reordered = filter::reorder_parameters(&doc, &[2, 0, 1]).unwrap();
    assert_eq!(reordered.parameters().short_names(), vec!["C", "A", "B"]);
    assert_eq!(reordered.matrix().row(0), Some(&[0.0, 1.0, 2.0][..]));

    assert!(filter::reorder_parameters(&doc, &[0, 0]).is_err());
    assert!(filter::drop_parameters(&doc, &["Z"]).is_err());
    assert_eq!(doc.par(), 3);
}

#[test]
fn test_strip_other_keeps_keywords() {
    let mut doc = two_column_document();
    doc.set_keyword("$CYT", "Aria").unwrap();
    doc.push_other(b"x".to_vec());
    let out = filter::strip_other(&doc);
    let read_back = reparse(&out);
    assert!(read_back.other().is_empty());
    assert_eq!(read_back.keyword("$CYT").as_deref(), Some("Aria"));
}
