//! Markup parse errors.

use source_span::Span;
use std::fmt;

/// Result type for markup operations.
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Why a document could not be read as markup, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupError {
    pub message: String,
    /// Offending bytes of the source text.
    pub span: Span,
    pub code: ErrorCode,
}

impl MarkupError {
    pub fn new(message: impl Into<String>, span: Span, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            span,
            code,
        }
    }

    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::new(
            format!("expected {}, found {}", expected, found),
            span,
            ErrorCode::UnexpectedToken,
        )
    }

    /// An element whose end tag is missing.
    pub fn unclosed_tag(tag: &str, span: Span) -> Self {
        Self::new(format!("<{}> is never closed", tag), span, ErrorCode::UnclosedTag)
    }

    /// An end tag closing nothing that is open.
    pub fn stray_end_tag(tag: &str, span: Span) -> Self {
        Self::new(
            format!("</{}> has no matching start tag", tag),
            span,
            ErrorCode::StrayEndTag,
        )
    }
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{} [{}]",
            self.message, self.span.start, self.span.end, self.code
        )
    }
}

impl std::error::Error for MarkupError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnexpectedToken,
    UnclosedTag,
    StrayEndTag,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedToken => "unexpected-token",
            ErrorCode::UnclosedTag => "unclosed-tag",
            ErrorCode::StrayEndTag => "stray-end-tag",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
