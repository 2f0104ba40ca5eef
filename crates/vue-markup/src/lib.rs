//! Span-preserving markup trees for Vue single file components.
//!
//! The whole `.vue` file is parsed as one markup document. `<script>`,
//! `<style>` and `<textarea>` keep their content as a single raw text child.
//! Every element parsed from source remembers its verbatim start and end tag,
//! so rendering an unedited tree reproduces the input byte for byte. Edits
//! only re-render the tags they invalidate.

mod ast;
mod error;
mod lexer;
mod parser;
mod render;
mod tree;

pub use ast::{is_raw_text_tag, is_void_tag, Attribute, Element, Node, NodeId, NodeKind};
pub use error::{ErrorCode, MarkupError, MarkupResult};
pub use lexer::MarkupLexer;
pub use parser::parse_markup;
pub use tree::{MarkupTree, DEFAULT_INDENT_UNIT};

impl MarkupTree {
    /// Parse a whole document.
    pub fn parse(source: &str) -> MarkupResult<Self> {
        parse_markup(source)
    }

    /// The first top-level `<script>` element that is not `<script setup>`.
    pub fn script_element(&self) -> Option<NodeId> {
        self.roots().iter().copied().find(|id| {
            self.element(*id)
                .is_some_and(|el| el.tag == "script" && !el.has_attr("setup"))
        })
    }

    /// The top-level `<template>` element.
    pub fn template_element(&self) -> Option<NodeId> {
        self.first_root_element("template")
    }

    /// The content of the top-level `<script>` element.
    pub fn script_content(&self) -> Option<String> {
        self.script_element().map(|id| self.text_content(id))
    }
}
