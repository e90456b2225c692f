//! Integration tests for the CyTOF OTHER view.

use fcs_io::{
    CytofDocument, Document, ErrorKind, FcsWriterOptions, filter, parse_fcs, stage_document,
};

const SCHEMA: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
    "<FCSHeaderSchema xmlns=\"http://tempuri.org/FCSHeaderSchema.xsd\">\n",
    "  <Acquisition>\n",
    "    <AcqDate>2019-03-01</AcqDate>\n",
    "    <Operator>Lab &lt;B&gt;</Operator>\n",
    "  </Acquisition>\n",
    "  <MassChannel><Name>Ir191Di</Name><Description><![CDATA[DNA-1]]></Description></MassChannel>\n",
    "  <MassChannel><Name>Ir193Di</Name><Description>DNA-2</Description></MassChannel>\n",
    "</FCSHeaderSchema>"
);

fn cytof_file() -> Vec<u8> {
    let mut doc = Document::default();
    doc.add_parameter("Ir191Di", 0).unwrap();
    doc.add_parameter("Ir193Di", 1).unwrap();
    doc.replace_matrix(vec![vec![12.0, 40.0], vec![0.5, 3.0]])
        .unwrap();
    let mut other = SCHEMA.as_bytes().to_vec();
    other.extend_from_slice(&[0, 0, 7, 9]);
    doc.push_other(other);
    stage_document(&doc, &FcsWriterOptions::default())
        .unwrap()
        .to_bytes()
}

#[test]
fn test_schema_from_written_file() {
    let doc = parse_fcs(&cytof_file()).unwrap();
    let cytof = CytofDocument::new(doc);
    let other = cytof.other().unwrap();

    assert!(other.xml().starts_with("<?xml"));
    assert!(other.xml().ends_with("</FCSHeaderSchema>"));
    assert_eq!(other.raw(), &[0, 0, 7, 9]);

    let schema = other.header_schema().unwrap();
    assert_eq!(
        schema.category_names().collect::<Vec<_>>(),
        vec!["Acquisition", "MassChannel"]
    );
    let acquisition = &schema.category("Acquisition").unwrap().records[0];
    assert_eq!(acquisition.get("AcqDate"), Some("2019-03-01"));
    assert_eq!(acquisition.get("Operator"), Some("Lab <B>"));

    let channels = &schema.category("MassChannel").unwrap().records;
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].get("Description"), Some("DNA-1"));
    assert_eq!(channels[1].get("Name"), Some("Ir193Di"));
}

#[test]
fn test_view_survives_unrelated_transforms() {
    let doc = parse_fcs(&cytof_file()).unwrap();
    let gated = filter::gate(&doc, "Ir191Di", Some(1.0), None).unwrap();
    let cytof = CytofDocument::new(gated);
    assert!(cytof.other().is_ok());
    assert_eq!(cytof.document().tot(), 1);
    assert_eq!(cytof.into_document().other().len(), 1);
}

#[test]
fn test_stripped_file_is_not_cytof() {
    let doc = filter::strip_other(&parse_fcs(&cytof_file()).unwrap());
    let err = CytofDocument::new(doc).other().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Vendor);
}
