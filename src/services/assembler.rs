//! Turns ordered completion sections into a structured document.
//!
//! Freeform mode applies the title/heading/paragraph conventions to the
//! raw sections; template mode re-emits the uploaded blocks with generated
//! text paired by index.

use crate::models::{DocBlock, LessonDocument, TemplateBlock};

pub const DEFAULT_DOCUMENT_NAME: &str = "generated_lesson_plan";

/// Freeform assembly: section 0 becomes the level-1 title; every later
/// section splits on its first newline into a level-2 heading plus a
/// trimmed body paragraph. A section with no internal newline becomes a
/// bare paragraph, or nothing if it is blank.
pub fn assemble_freeform(sections: &[String]) -> LessonDocument {
    let mut blocks = Vec::new();

    for (i, section) in sections.iter().enumerate() {
        if i == 0 {
            blocks.push(DocBlock::Heading { text: section.clone(), level: 1 });
            continue;
        }

        match section.split_once('\n') {
            Some((heading, body)) => {
                blocks.push(DocBlock::Heading { text: heading.to_string(), level: 2 });
                blocks.push(DocBlock::Paragraph { text: body.trim().to_string() });
            }
            None => {
                let text = section.trim();
                if !text.is_empty() {
                    blocks.push(DocBlock::Paragraph { text: text.to_string() });
                }
            }
        }
    }

    LessonDocument::new(blocks)
}

/// Template assembly: pair `template[i]` with `sections[i]`, stopping at
/// the shorter of the two, so the pairing is total for any combination of
/// lengths. Headings keep their original level; tables are re-emitted with
/// their original rows, since distributing generated text into a table's
/// cells has no defined shape.
pub fn assemble_from_template(template: &[TemplateBlock], sections: &[String]) -> LessonDocument {
    let blocks = template
        .iter()
        .zip(sections)
        .map(|(block, section)| match block {
            TemplateBlock::Heading { level, .. } => {
                DocBlock::Heading { text: section.clone(), level: *level }
            }
            TemplateBlock::Paragraph { .. } => DocBlock::Paragraph { text: section.clone() },
            TemplateBlock::Table { rows } => {
                tracing::warn!("table regeneration is unsupported; keeping original table content");
                DocBlock::Table { rows: rows.clone() }
            }
        })
        .collect();

    LessonDocument::new(blocks)
}

/// First `Title:` line across the sections, or the fixed default name.
pub fn detect_title(sections: &[String]) -> String {
    for section in sections {
        for line in section.lines() {
            if let Some(rest) = line.strip_prefix("Title:") {
                let title = rest.trim();
                if !title.is_empty() {
                    return title.to_string();
                }
            }
        }
    }
    DEFAULT_DOCUMENT_NAME.to_string()
}

/// Restrict a detected title to a filename-safe character set.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == ' ' || c == '.').to_string();

    if cleaned.is_empty() { DEFAULT_DOCUMENT_NAME.to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn freeform_title_and_heading_body_pairs() {
        let document = assemble_freeform(&sections(&[
            "Title",
            "Heading1\nBody1",
            "Heading2\nBody2",
        ]));
        assert_eq!(
            document.blocks,
            vec![
                DocBlock::Heading { text: "Title".to_string(), level: 1 },
                DocBlock::Heading { text: "Heading1".to_string(), level: 2 },
                DocBlock::Paragraph { text: "Body1".to_string() },
                DocBlock::Heading { text: "Heading2".to_string(), level: 2 },
                DocBlock::Paragraph { text: "Body2".to_string() },
            ]
        );
    }

    #[test]
    fn freeform_single_line_section_becomes_a_paragraph() {
        let document = assemble_freeform(&sections(&["Title", "Just one line"]));
        assert_eq!(document.blocks[1], DocBlock::Paragraph { text: "Just one line".to_string() });
    }

    #[test]
    fn freeform_blank_section_emits_nothing() {
        let document = assemble_freeform(&sections(&["Title", "   "]));
        assert_eq!(document.blocks.len(), 1);
    }

    #[test]
    fn freeform_empty_input_yields_an_empty_document() {
        assert!(assemble_freeform(&[]).is_empty());
    }

    #[test]
    fn freeform_body_is_trimmed() {
        let document = assemble_freeform(&sections(&["Title", "Head\n  body text \n"]));
        assert_eq!(document.blocks[2], DocBlock::Paragraph { text: "body text".to_string() });
    }

    #[test]
    fn template_pairing_keeps_heading_levels() {
        let template = vec![
            TemplateBlock::Heading { text: "Old title".to_string(), level: 1 },
            TemplateBlock::Paragraph { text: "Old body".to_string() },
        ];
        let document =
            assemble_from_template(&template, &sections(&["New title", "New body"]));
        assert_eq!(
            document.blocks,
            vec![
                DocBlock::Heading { text: "New title".to_string(), level: 1 },
                DocBlock::Paragraph { text: "New body".to_string() },
            ]
        );
    }

    #[test]
    fn template_pairing_is_total_for_every_length_combination() {
        let template = vec![
            TemplateBlock::Heading { text: "A".to_string(), level: 1 },
            TemplateBlock::Paragraph { text: "B".to_string() },
            TemplateBlock::Paragraph { text: "C".to_string() },
        ];
        let generated = sections(&["1", "2", "3"]);

        for template_len in 0..=template.len() {
            for generated_len in 0..=generated.len() {
                let document = assemble_from_template(
                    &template[..template_len],
                    &generated[..generated_len],
                );
                assert_eq!(document.blocks.len(), template_len.min(generated_len));
            }
        }
    }

    #[test]
    fn template_tables_are_reemitted_unchanged() {
        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        let template = vec![TemplateBlock::Table { rows: rows.clone() }];
        let document = assemble_from_template(&template, &sections(&["ignored"]));
        assert_eq!(document.blocks, vec![DocBlock::Table { rows }]);
    }

    #[test]
    fn detects_the_first_title_line() {
        let found = detect_title(&sections(&[
            "Class Name: English 2B",
            "Title: Irregular Verbs\nClass Level: B1",
        ]));
        assert_eq!(found, "Irregular Verbs");
    }

    #[test]
    fn missing_title_falls_back_to_the_default_name() {
        assert_eq!(detect_title(&sections(&["no title here"])), DEFAULT_DOCUMENT_NAME);
        assert_eq!(detect_title(&[]), DEFAULT_DOCUMENT_NAME);
    }

    #[test]
    fn filenames_are_restricted_to_safe_characters() {
        assert_eq!(sanitize_filename("Irregular Verbs: B1/B2"), "Irregular Verbs_ B1_B2");
        assert_eq!(sanitize_filename("   "), DEFAULT_DOCUMENT_NAME);

        let traversal = sanitize_filename("../../etc/passwd");
        assert!(!traversal.contains('/'));
        assert!(!traversal.starts_with('.'));
    }
}
