//! Error types for document editing.

use thiserror::Error;
use vue_markup::MarkupError;
use vue_script::{OptionKind, ScriptError};

/// Result type for editing operations.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors raised by document operations.
///
/// An operation that fails leaves its document as it was before the call.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The document markup does not parse.
    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    /// The script block does not parse or an edit produced invalid script.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The document has no `<script>` block.
    #[error("the document has no <script> block")]
    MissingScript,

    /// The document has no `<template>` block.
    #[error("the document has no <template> block")]
    MissingTemplate,

    /// The named entry does not exist.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: OptionKind, name: String },

    /// The target document already has an entry with this name.
    #[error("{kind} `{name}` already exists")]
    Duplicate { kind: OptionKind, name: String },

    /// The entry exists but is written in a shape the operation cannot edit.
    #[error("{kind} `{name}` cannot be edited: {reason}")]
    UnsupportedShape {
        kind: OptionKind,
        name: String,
        reason: &'static str,
    },

    /// A markup node handle that is not an attached element of the document.
    #[error("the node is not an element of this document")]
    UnknownNode,

    /// The host component has no default `<slot>`.
    #[error("the host component has no default <slot>")]
    MissingSlot,

    /// The node is not inside a component element.
    #[error("the node is not inside a component element")]
    NoParentComponent,

    /// The background parse task failed.
    #[error("parse task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl EditorError {
    pub(crate) fn not_found(kind: OptionKind, name: &str) -> Self {
        EditorError::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: OptionKind, name: &str) -> Self {
        EditorError::Duplicate {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn unsupported(kind: OptionKind, name: &str, reason: &'static str) -> Self {
        EditorError::UnsupportedShape {
            kind,
            name: name.to_string(),
            reason,
        }
    }
}
