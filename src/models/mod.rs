use serde::{Deserialize, Serialize};

/// One structural element recovered from an uploaded template document,
/// in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateBlock {
    Heading { text: String, level: u8 },
    Paragraph { text: String },
    Table { rows: Vec<Vec<String>> },
}

/// One styled element of the assembled output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocBlock {
    Heading { text: String, level: u8 },
    Paragraph { text: String },
    Table { rows: Vec<Vec<String>> },
}

/// The assembled document, ready for serialization into the
/// wordprocessing container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDocument {
    pub blocks: Vec<DocBlock>,
}

impl LessonDocument {
    pub fn new(blocks: Vec<DocBlock>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One activity-log row. Written once, never read back by the service.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub prompt: String,
    pub content: String,
}
