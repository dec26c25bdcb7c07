//! Extraction of typed blocks from an uploaded `.docx` template.
//!
//! The container is a zip holding `word/document.xml`; the body is walked
//! in document order and each top-level element is classified as a table
//! or a paragraph. Paragraphs whose style name starts with `Heading`
//! become headings. Table content is flattened to cell text; nested tables
//! are not supported.

use std::io::{Cursor, Read};

use regex::Regex;
use zip::ZipArchive;

use crate::error::AppError;
use crate::models::TemplateBlock;

/// Parse uploaded `.docx` bytes into an ordered block list.
pub fn extract_blocks(bytes: &[u8]) -> Result<Vec<TemplateBlock>, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Parse(format!("upload is not a .docx container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Parse(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Parse(format!("unreadable document part: {e}")))?;

    parse_document_xml(&xml)
}

fn parse_document_xml(xml: &str) -> Result<Vec<TemplateBlock>, AppError> {
    let body_start = xml
        .find("<w:body")
        .ok_or_else(|| AppError::Parse("document has no <w:body> element".into()))?;
    let body_end = xml[body_start..]
        .find("</w:body>")
        .map(|i| body_start + i)
        .ok_or_else(|| AppError::Parse("document body is not terminated".into()))?;
    let body = &xml[body_start..body_end];

    let element_re = re(r"<w:(tbl|p)[ >/]")?;
    let style_re = re(r#"<w:pStyle [^>]*w:val="([^"]*)""#)?;
    let text_re = re(r"<w:t(?: [^>]*)?>([^<]*)</w:t>")?;
    let row_re = re(r"(?s)<w:tr[^>]*>(.*?)</w:tr>")?;
    let cell_re = re(r"(?s)<w:tc[^>]*>(.*?)</w:tc>")?;

    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(m) = element_re.find(&body[cursor..]) {
        let start = cursor + m.start();
        let tag = &m.as_str()[..m.as_str().len() - 1];

        if tag == "<w:tbl" {
            let end = body[start..]
                .find("</w:tbl>")
                .map(|i| start + i + "</w:tbl>".len())
                .ok_or_else(|| AppError::Parse("unterminated <w:tbl> element".into()))?;
            let fragment = &body[start..end];

            let rows = row_re
                .captures_iter(fragment)
                .map(|row| {
                    cell_re
                        .captures_iter(&row[1])
                        .map(|cell| collect_text(&text_re, &cell[1]))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();

            blocks.push(TemplateBlock::Table { rows });
            cursor = end;
            continue;
        }

        // Paragraph. A self-closing <w:p/> carries no content.
        let open_end = body[start..]
            .find('>')
            .map(|i| start + i)
            .ok_or_else(|| AppError::Parse("unterminated <w:p> tag".into()))?;
        if body[..open_end].ends_with('/') {
            cursor = open_end + 1;
            continue;
        }

        let end = body[start..]
            .find("</w:p>")
            .map(|i| start + i + "</w:p>".len())
            .ok_or_else(|| AppError::Parse("unterminated <w:p> element".into()))?;
        let fragment = &body[start..end];

        let text = collect_text(&text_re, fragment);
        let style = style_re.captures(fragment).map(|c| c[1].to_string());

        match style {
            Some(style) if style.starts_with("Heading") => {
                let level = style["Heading".len()..].parse().unwrap_or(1);
                blocks.push(TemplateBlock::Heading { text, level });
            }
            _ => {
                if !text.trim().is_empty() {
                    blocks.push(TemplateBlock::Paragraph { text });
                }
            }
        }
        cursor = end;
    }

    Ok(blocks)
}

fn collect_text(text_re: &Regex, fragment: &str) -> String {
    text_re
        .captures_iter(fragment)
        .map(|c| html_escape::decode_html_entities(&c[1]).into_owned())
        .collect::<Vec<_>>()
        .concat()
}

fn re(pattern: &str) -> Result<Regex, AppError> {
    Regex::new(pattern).map_err(|e| AppError::Parse(format!("bad scan pattern: {e}")))
}
