//! Error types for script handling.

use source_span::EditConflict;
use thiserror::Error;

/// Result type for script operations.
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Errors raised while parsing or editing a component script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script is not valid for its language.
    #[error("script syntax error: {message}")]
    Syntax { message: String },

    /// No `export default` object literal was found.
    #[error("no component definition: expected `export default {{ ... }}`")]
    MissingDefinition,

    /// A source fragment is not a single expression.
    #[error("invalid expression `{text}`: {message}")]
    InvalidExpression { text: String, message: String },

    /// Two edits touched the same text.
    #[error(transparent)]
    Edit(#[from] EditConflict),
}
