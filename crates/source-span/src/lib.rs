//! Source positions for vue-refactor.
//!
//! Byte spans into a document, the line index that turns them into the
//! line/column ranges an editor selects, and the text splicing primitives
//! shared by the markup and script printers.

mod edit;

pub use edit::{apply_edits, line_indent, reindent, EditConflict, TextEdit};

use std::fmt;
use std::ops::Range;

/// A half-open byte range `[start, end)` of a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// The empty span at `offset`, used for insertions.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside this span.
    #[inline]
    pub const fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the spans share at least one byte.
    #[inline]
    pub const fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The span moved `delta` bytes forward, e.g. from block to file
    /// coordinates.
    #[inline]
    pub const fn shift(self, delta: u32) -> Span {
        Span::new(self.start + delta, self.end + delta)
    }

    /// The covered text.
    #[inline]
    pub fn slice(self, text: &str) -> &str {
        &text[self.to_range()]
    }

    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// The line terminator a text is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The terminator of the first line of `text`, `Lf` for a single line.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(at) if text[..at].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// `text` with every line terminated by this ending.
    pub fn normalize(self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.replace("\r\n", "\n"),
            LineEnding::CrLf => text.replace("\r\n", "\n").replace('\n', "\r\n"),
        }
    }
}

/// Start offsets of the lines of a text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// The 0-based line and byte column of `offset`.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        LineCol::new(line as u32, offset - self.line_starts[line])
    }

    /// The offset of a 0-based position, `None` past the end of the text.
    pub fn offset(&self, position: LineCol) -> Option<u32> {
        let start = self.line_starts.get(position.line as usize)?;
        Some(start + position.col).filter(|offset| *offset <= self.len)
    }

    pub fn range(&self, span: Span) -> SourceRange {
        SourceRange {
            start: self.line_col(span.start),
            end: self.line_col(span.end),
        }
    }
}

/// A 0-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A start/end pair of positions: what an editor turns into a selection.
///
/// Displayed 1-based as `line:col-line:col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRange {
    pub start: LineCol,
    /// Exclusive.
    pub end: LineCol,
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line + 1,
            self.start.col + 1,
            self.end.line + 1,
            self.end.col + 1
        )
    }
}
