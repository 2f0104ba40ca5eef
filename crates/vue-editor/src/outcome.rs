//! Results handed back to the caller of an operation.

use serde::Serialize;
use source_span::SourceRange;

/// What a mutating operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Outcome {
    /// The full new document text.
    Text(String),
    /// A range of the document the user should edit next.
    Focus(SourceRange),
    /// Nothing changed.
    Unchanged,
}

impl Outcome {
    /// The new text, if the document changed.
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether the operation changed the document.
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Text(_))
    }
}
