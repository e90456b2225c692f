//! Tables for the `describe` command.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use fcs_io::Summary;
use fcs_io::text::{KeywordClass, classify_documented};

/// Render a summary as the three sections printed by `describe`.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str("*** FCS Header Information ***\n");
    out.push_str(&header_table(summary).to_string());
    out.push_str("\n\n*** FCS TEXT Information ***\n");
    out.push_str(&format!(
        "{} standard non-parameter keywords\n",
        summary.standard_keywords.len()
    ));
    out.push_str(&keyword_table(&summary.standard_keywords).to_string());
    out.push('\n');
    out.push_str(&format!(
        "{} non-standard keywords\n",
        summary.custom_keywords.len()
    ));
    if !summary.custom_keywords.is_empty() {
        out.push_str(&keyword_table(&summary.custom_keywords).to_string());
        out.push('\n');
    }
    out.push_str(&format!(
        "{} parameters ordered as they appear in the file\n",
        summary.parameters.len()
    ));
    out.push_str(&parameter_table(summary).to_string());
    out.push_str("\n\n*** FCS DATA Information ***\n");
    out.push_str(&format!("Events: {}\n", summary.events));
    out
}

fn header_table(summary: &Summary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Segment"), header_cell("Contents")]);
    apply_table_style(&mut table);

    let analysis = match summary.analysis_bytes {
        Some(bytes) => format!("True, {bytes} bytes"),
        None => "False".to_string(),
    };
    let other = match summary.other_segments {
        0 => "False".to_string(),
        1 => format!("True, 1 segment, {} bytes", summary.other_bytes),
        n => format!("True, {n} segments, {} bytes", summary.other_bytes),
    };
    table.add_row(vec![Cell::new("Version"), Cell::new(&summary.version)]);
    table.add_row(vec![
        Cell::new("TEXT"),
        Cell::new(format!("{} bytes", summary.text_bytes)),
    ]);
    table.add_row(vec![
        Cell::new("DATA"),
        Cell::new(format!("{} bytes", summary.data_bytes)),
    ]);
    table.add_row(vec![Cell::new("ANALYSIS"), Cell::new(analysis)]);
    table.add_row(vec![Cell::new("OTHER"), Cell::new(other)]);
    table
}

fn keyword_table(keywords: &[(String, String)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Keyword"),
        header_cell("Value"),
        header_cell("Class"),
    ]);
    apply_table_style(&mut table);
    for (key, value) in keywords {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(value),
            Cell::new(class_label(classify_documented(key))),
        ]);
    }
    table
}

fn parameter_table(summary: &Summary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Short name"),
        header_cell("Keyword"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for (position, parameter) in summary.parameters.iter().enumerate() {
        let number = (position + 1).to_string();
        for (i, (generic, value)) in parameter.keywords.iter().enumerate() {
            let (label, name) = if i == 0 {
                (number.as_str(), parameter.short_name.as_str())
            } else {
                ("", "")
            };
            table.add_row(vec![
                Cell::new(label),
                Cell::new(name),
                Cell::new(generic.replacen('n', &number, 1)),
                Cell::new(value),
            ]);
        }
    }
    table
}

fn class_label(class: KeywordClass) -> &'static str {
    match class {
        KeywordClass::Required => "required",
        KeywordClass::Optional => "optional",
        KeywordClass::Custom => "custom",
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcs_io::Document;

    #[test]
    fn test_render_mentions_every_section() {
        let mut doc = Document::default();
        doc.add_parameter("FSC-A", 0).unwrap();
        doc.replace_matrix(vec![vec![1.0], vec![2.0]]).unwrap();
        doc.set_keyword("$CYT", "Aria").unwrap();
        doc.set_keyword("GUID", "abc-123").unwrap();
        doc.push_other(b"xyz".to_vec());

        let rendered = render_summary(&Summary::from_document(&doc));
        assert!(rendered.contains("*** FCS Header Information ***"));
        assert!(rendered.contains("True, 1 segment, 3 bytes"));
        assert!(rendered.contains("1 non-standard keywords"));
        assert!(rendered.contains("GUID"));
        assert!(rendered.contains("$P1N"));
        assert!(rendered.contains("FSC-A"));
        assert!(rendered.contains("Events: 2"));
    }
}
