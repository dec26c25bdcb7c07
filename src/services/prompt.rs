//! Prompt construction: a fixed instructional header merged with either the
//! built-in skeleton template or a rendering of an uploaded template, plus
//! the user's free text. User text is passed through untouched; prompt
//! injection is a documented open risk of the product, not mitigated here.

use crate::models::TemplateBlock;

pub const SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that can generate lesson plans based on a template and user prompt.";

/// Section abbreviations and their full names, in template order. Also the
/// substitution table applied to generated text by the segmenter.
pub const ABBREVIATIONS: [(&str, &str); 7] = [
    ("Intro", "Introduction"),
    ("Vocab/Grammar", "Vocabulary/Grammar"),
    ("Practice", "Practice Activities"),
    ("Review", "Review"),
    ("Reflection", "Reflection"),
    ("Homework", "Homework"),
    ("Closing", "Closing"),
];

/// Placeholder tokens the model may echo back, and the explanatory phrases
/// they expand to.
pub const PLACEHOLDERS: [(&str, &str); 6] = [
    (
        "<TIME>",
        "The time for activities may vary depending on the level of the class and the complexity of the concepts being taught.",
    ),
    (
        "<MATERIALS>",
        "The lesson plan may include specific materials needed for each activity, such as textbooks, audio or video resources, and worksheets.",
    ),
    ("<TITLE>", "Title:"),
    ("<CLASS_NAME>", "Class Name:"),
    ("<CLASS_LEVEL>", "Class Level:"),
    ("<GOALS>", "Lesson Goals:"),
];

const VARIABLE_TIME_NOTE: &str = "Note: The time for activities may vary depending on the level of the class and the complexity of the concepts being taught.";

/// The built-in skeleton used when no template document was uploaded.
pub fn fixed_skeleton() -> String {
    let numbered = ABBREVIATIONS
        .iter()
        .enumerate()
        .map(|(i, (abbr, full))| format!("{}. {} (est. time: <TIME_{}>)", i + 1, full, abbr))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<TITLE> (est. time: <TIME>)\n<CLASS_NAME>\n<CLASS_LEVEL>\n<MATERIALS>\n<GOALS>\n\n{numbered}\n\n{VARIABLE_TIME_NOTE}"
    )
}

/// Render uploaded template blocks into the textual form embedded in the
/// prompt: headings annotated with their style, tables flattened to a
/// tab-separated grid under a `[Table]` marker.
pub fn render_template_blocks(blocks: &[TemplateBlock]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            TemplateBlock::Heading { text, level } => format!("{text} (Heading {level})"),
            TemplateBlock::Paragraph { text } => text.clone(),
            TemplateBlock::Table { rows } => {
                let grid = rows
                    .iter()
                    .map(|row| row.join("\t"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("[Table]\n{grid}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Merge the instructional header, the template text, and the user's
/// request into the single prompt string sent to the completion service.
pub fn build_prompt(user_text: &str, template: &str) -> String {
    format!(
        "Generate a lesson plan based on the template. Modify it per the user prompt: {user_text}\n\nTemplate:\n\n{template}"
    )
}
