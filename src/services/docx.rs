//! In-memory serialization of a [`LessonDocument`] into the zipped-XML
//! wordprocessing container. Headings use the `Heading{n}` paragraph
//! styles declared in `word/styles.xml`, which is also the convention the
//! template extractor reads back.

use std::io::{self, Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AppError;
use crate::models::{DocBlock, LessonDocument};

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:pPr><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style></w:styles>"#;

/// Serialize the document to `.docx` bytes. An empty document is a valid
/// container with an empty body.
pub fn write_docx(document: &LessonDocument) -> Result<Vec<u8>, AppError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/styles.xml", STYLES.to_string()),
        ("word/document.xml", document_xml(document)),
    ] {
        writer.start_file(name, options).map_err(zip_err)?;
        writer.write_all(content.as_bytes())?;
    }

    let cursor = writer.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

fn zip_err(e: zip::result::ZipError) -> AppError {
    AppError::Io(io::Error::new(io::ErrorKind::Other, e))
}

fn document_xml(document: &LessonDocument) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    for block in &document.blocks {
        match block {
            DocBlock::Heading { text, level } => xml.push_str(&heading_xml(text, *level)),
            DocBlock::Paragraph { text } => xml.push_str(&paragraph_xml(text)),
            DocBlock::Table { rows } => xml.push_str(&table_xml(rows)),
        }
    }

    xml.push_str("</w:body></w:document>");
    xml
}

fn heading_xml(text: &str, level: u8) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>{}</w:p>"#,
        run_xml(text)
    )
}

fn paragraph_xml(text: &str) -> String {
    format!("<w:p>{}</w:p>", run_xml(text))
}

// Newlines inside a block become soft breaks within one run.
fn run_xml(text: &str) -> String {
    let mut run = String::from("<w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run.push_str("<w:br/>");
        }
        run.push_str(r#"<w:t xml:space="preserve">"#);
        run.push_str(&html_escape::encode_text(line));
        run.push_str("</w:t>");
    }
    run.push_str("</w:r>");
    run
}

fn table_xml(rows: &[Vec<String>]) -> String {
    let mut xml = String::from(
        r#"<w:tbl><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4"/><w:bottom w:val="single" w:sz="4"/><w:left w:val="single" w:sz="4"/><w:right w:val="single" w:sz="4"/><w:insideH w:val="single" w:sz="4"/><w:insideV w:val="single" w:sz="4"/></w:tblBorders></w:tblPr>"#,
    );
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row {
            xml.push_str("<w:tc>");
            xml.push_str(&paragraph_xml(cell));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn empty_document_is_a_valid_container() {
        let bytes = write_docx(&LessonDocument::default()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/document.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {name}");
        }
        assert!(read_part(&bytes, "word/document.xml").contains("<w:body></w:body>"));
    }

    #[test]
    fn headings_carry_their_style() {
        let document = LessonDocument::new(vec![
            DocBlock::Heading { text: "Plan".to_string(), level: 1 },
            DocBlock::Heading { text: "Warm-up".to_string(), level: 2 },
        ]);
        let xml = read_part(&write_docx(&document).unwrap(), "word/document.xml");
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="Heading2"/>"#));
    }

    #[test]
    fn text_is_xml_escaped() {
        let document = LessonDocument::new(vec![DocBlock::Paragraph {
            text: "Q & A <review>".to_string(),
        }]);
        let xml = read_part(&write_docx(&document).unwrap(), "word/document.xml");
        assert!(xml.contains("Q &amp; A &lt;review&gt;"));
        assert!(!xml.contains("<review>"));
    }

    #[test]
    fn newlines_become_soft_breaks() {
        let document = LessonDocument::new(vec![DocBlock::Paragraph {
            text: "line one\nline two".to_string(),
        }]);
        let xml = read_part(&write_docx(&document).unwrap(), "word/document.xml");
        assert!(xml.contains("line one</w:t><w:br/>"));
        assert!(xml.contains("line two"));
    }

    #[test]
    fn tables_emit_one_cell_per_entry() {
        let document = LessonDocument::new(vec![DocBlock::Table {
            rows: vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ],
        }]);
        let xml = read_part(&write_docx(&document).unwrap(), "word/document.xml");
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
    }
}
