//! Text splicing and indentation helpers.

use crate::Span;
use std::fmt;

/// A replacement of one span of a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// The span being replaced. An empty span is an insertion.
    pub span: Span,
    /// The new text.
    pub replacement: String,
}

impl TextEdit {
    /// Replace `span` with `replacement`.
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Insert `text` at `offset`.
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::replace(Span::empty(offset), text)
    }

    /// Delete `span`.
    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// Two edits touched the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditConflict {
    /// The first conflicting span.
    pub first: Span,
    /// The second conflicting span.
    pub second: Span,
}

impl fmt::Display for EditConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overlapping edits at {}..{} and {}..{}",
            self.first.start, self.first.end, self.second.start, self.second.end
        )
    }
}

impl std::error::Error for EditConflict {}

/// Apply a set of edits to `source`.
///
/// Edits may come in any order but must not overlap. Insertions at the same
/// offset keep their relative order.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, EditConflict> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.span.start, edit.span.end));

    for pair in ordered.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.span.overlaps(b.span) || (a.span.end > b.span.start && !b.span.is_empty()) {
            return Err(EditConflict {
                first: a.span,
                second: b.span,
            });
        }
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in ordered {
        let range = edit.span.to_range();
        out.push_str(&source[cursor..range.start]);
        out.push_str(&edit.replacement);
        cursor = range.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

/// The leading whitespace of the line containing `offset`.
pub fn line_indent(source: &str, offset: u32) -> &str {
    let offset = (offset as usize).min(source.len());
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

/// Move a multi-line snippet from one indentation level to another.
///
/// The first line is left alone (the caller places it). Every following line
/// that starts with `from` has that prefix swapped for `to`; lines indented
/// less than `from` are left untouched.
pub fn reindent(text: &str, from: &str, to: &str) -> String {
    if from == to || !text.contains('\n') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if let Some(rest) = line.strip_prefix(from) {
                if !line.trim().is_empty() {
                    out.push_str(to);
                }
                out.push_str(rest);
                continue;
            }
        }
        out.push_str(line);
    }
    out
}
