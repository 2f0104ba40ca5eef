//! The document facade: one `.vue` file as a markup tree plus a script tree.

use crate::alias::AliasMap;
use crate::error::{EditorError, Result};
use crate::outcome::Outcome;
use source_span::{LineEnding, LineIndex, SourceRange, Span};
use std::fmt;
use vue_markup::{MarkupTree, NodeId};
use vue_script::{FormatOptions, NodeId as ScriptNodeId, OptionKind, ScriptLang, ScriptTree};

/// Settings shared by every operation on a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Layout of generated script and markup.
    pub format: FormatOptions,
    /// Module aliases applied to imported component paths.
    pub aliases: AliasMap,
}

/// A parsed single file component.
///
/// The markup tree owns the whole file; the `<script>` block is additionally
/// held as a [`ScriptTree`]. Every operation either completes and writes the
/// script back into the markup, or fails and leaves the document unchanged.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) markup: MarkupTree,
    pub(crate) script: Option<ScriptTree>,
    pub(crate) options: DocumentOptions,
}

struct Snapshot {
    markup: MarkupTree,
    script: Option<ScriptTree>,
}

impl Document {
    /// Parse a document with default options.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, DocumentOptions::default())
    }

    /// Parse a document.
    ///
    /// Generated lines end the way the first line of `text` does.
    ///
    /// Fails when the markup is malformed, or when the `<script>` block does
    /// not parse or has no `export default` object.
    pub fn parse_with(text: &str, mut options: DocumentOptions) -> Result<Self> {
        options.format.line_ending = LineEnding::detect(text);
        let mut markup = MarkupTree::parse(text)?;
        markup.set_indent_unit(options.format.indent.clone());
        let script = match markup.script_element() {
            Some(element) => {
                let lang = ScriptLang::from_attr(markup.attr(element, "lang").flatten());
                let content = markup.text_content(element);
                Some(ScriptTree::parse(&content, lang, options.format.clone())?)
            }
            None => None,
        };
        tracing::debug!(
            nodes = markup.node_count(),
            has_script = script.is_some(),
            "parsed document"
        );
        Ok(Self {
            markup,
            script,
            options,
        })
    }

    /// Parse a document on the blocking thread pool.
    pub async fn parse_async(text: String, options: DocumentOptions) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::parse_with(&text, options)).await?
    }

    /// The markup tree.
    pub fn markup(&self) -> &MarkupTree {
        &self.markup
    }

    /// The script tree, when the document has a `<script>` block.
    pub fn script(&self) -> Option<&ScriptTree> {
        self.script.as_ref()
    }

    /// The document options.
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// The innermost element at a byte offset of the parsed text.
    pub fn node_at(&self, offset: u32) -> Option<NodeId> {
        self.markup.element_at(offset)
    }

    pub(crate) fn script_ref(&self) -> Result<&ScriptTree> {
        self.script.as_ref().ok_or(EditorError::MissingScript)
    }

    pub(crate) fn script_mut(&mut self) -> Result<&mut ScriptTree> {
        self.script.as_mut().ok_or(EditorError::MissingScript)
    }

    /// Check that a handle names an attached element.
    pub(crate) fn check_element(&self, node: NodeId) -> Result<()> {
        let known = node.index() < self.markup.node_count()
            && self.markup.element(node).is_some()
            && self.markup.is_attached(node);
        if known {
            Ok(())
        } else {
            Err(EditorError::UnknownNode)
        }
    }

    /// Commit the script and write it into the `<script>` element.
    fn sync(&mut self) -> Result<()> {
        let Some(script) = self.script.as_mut() else {
            return Ok(());
        };
        let text = script.commit()?;
        let element = self
            .markup
            .script_element()
            .ok_or(EditorError::MissingScript)?;
        if self.markup.text_content(element) != text {
            self.markup.set_raw_text(element, text);
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            markup: self.markup.clone(),
            script: self.script.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.markup = snapshot.markup;
        self.script = snapshot.script;
    }

    /// Run an operation, rolling the document back when it fails.
    pub(crate) fn transact<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.snapshot();
        match f(self).and_then(|value| self.sync().map(|()| value)) {
            Ok(value) => {
                tracing::debug!(operation, "applied");
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(operation, error = %err, "rolled back");
                self.restore(snapshot);
                Err(err)
            }
        }
    }

    /// Run an operation and report the new text.
    pub(crate) fn edit(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<Outcome> {
        let before = self.to_string();
        self.transact(operation, f)?;
        Ok(self.outcome(&before))
    }

    /// Run an operation spanning this document and a host document. Both are
    /// rolled back when it fails. The outcome describes this document.
    pub(crate) fn edit_with(
        &mut self,
        host: &mut Document,
        operation: &'static str,
        f: impl FnOnce(&mut Self, &mut Document) -> Result<()>,
    ) -> Result<Outcome> {
        let before = self.to_string();
        let own = self.snapshot();
        let other = host.snapshot();
        let result = f(self, host)
            .and_then(|()| self.sync())
            .and_then(|()| host.sync());
        match result {
            Ok(()) => {
                tracing::debug!(operation, "applied to both documents");
                Ok(self.outcome(&before))
            }
            Err(err) => {
                tracing::debug!(operation, error = %err, "rolled back both documents");
                self.restore(own);
                host.restore(other);
                Err(err)
            }
        }
    }

    fn outcome(&self, before: &str) -> Outcome {
        let after = self.to_string();
        if after == before {
            Outcome::Unchanged
        } else {
            Outcome::Text(after)
        }
    }

    /// Map a span of the committed script to document lines and columns.
    pub(crate) fn script_range(&self, span: Span) -> Result<SourceRange> {
        let text = self.to_string();
        let markup = MarkupTree::parse(&text)?;
        let element = markup.script_element().ok_or(EditorError::MissingScript)?;
        let content_start = markup
            .children(element)
            .first()
            .and_then(|child| markup.span_of(*child))
            .map(|child| child.start)
            .or_else(|| {
                markup
                    .element(element)
                    .and_then(|el| el.start_tag_span())
                    .map(|tag| tag.end)
            })
            .ok_or(EditorError::MissingScript)?;
        Ok(LineIndex::new(&text).range(span.shift(content_start)))
    }

    /// The range of a script node in the document.
    pub(crate) fn node_range(&self, kind: OptionKind, name: &str, node: ScriptNodeId) -> Result<SourceRange> {
        let span = self
            .script_ref()?
            .node(node)
            .span()
            .ok_or_else(|| EditorError::not_found(kind, name))?;
        self.script_range(span)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup.render())
    }
}

/// The property holding the entry `name` of an option.
pub(crate) fn find_entry(script: &ScriptTree, kind: OptionKind, name: &str) -> Result<ScriptNodeId> {
    script
        .find_option_entries(kind)
        .and_then(|entries| script.find_property(entries, name))
        .ok_or_else(|| EditorError::not_found(kind, name))
}

/// Remove the entry `name` of an option, and the option once it is empty.
pub(crate) fn remove_entry(script: &mut ScriptTree, kind: OptionKind, name: &str) -> Result<()> {
    let entries = script
        .find_option_entries(kind)
        .ok_or_else(|| EditorError::not_found(kind, name))?;
    script
        .remove_property(entries, name)
        .ok_or_else(|| EditorError::not_found(kind, name))?;
    script.prune_option(kind);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "<script>\nexport default {\n    name: 'x'\n}\n</script>\n\n<template>\n<div></div>\n</template>\n";

    #[test]
    fn test_round_trip() {
        let doc = Document::parse(SOURCE).unwrap();
        assert_eq!(doc.to_string(), SOURCE);
    }

    #[test]
    fn test_template_only_document() {
        let doc = Document::parse("<template><p>hi</p></template>").unwrap();
        assert!(doc.script().is_none());
        assert!(doc.props().is_empty());
    }

    #[test]
    fn test_missing_definition_is_fatal() {
        let err = Document::parse("<script>\nconst a = 1;\n</script>").unwrap_err();
        assert!(matches!(
            err,
            EditorError::Script(vue_script::ScriptError::MissingDefinition)
        ));
    }

    #[test]
    fn test_failed_operation_rolls_back() {
        let mut doc = Document::parse(SOURCE).unwrap();
        let err = doc.add_data("foo", "1 +").unwrap_err();
        assert!(matches!(err, EditorError::Script(_)));
        assert_eq!(doc.to_string(), SOURCE);
    }

    #[test]
    fn test_crlf_document_stays_crlf() {
        let source = "<script>\r\nexport default {\r\n    name: 'x'\r\n}\r\n</script>";
        let mut doc = Document::parse(source).unwrap();
        assert_eq!(doc.options().format.line_ending, LineEnding::CrLf);
        doc.add_prop("foo").unwrap();
        doc.add_method("save").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\r\nexport default {\r\n    name: 'x',\r\n    props: ['foo'],\r\n    methods: {\r\n        save() {}\r\n    }\r\n};\r\n</script>"
        );
    }

    #[test]
    fn test_script_range() {
        let mut doc = Document::parse(SOURCE).unwrap();
        doc.add_data("foo", "null").unwrap();
        let range = doc.locate_data("foo").unwrap();
        assert_eq!(range.to_string(), "6:18-6:22");
    }

    #[tokio::test]
    async fn test_parse_async() {
        let doc = Document::parse_async(SOURCE.to_string(), DocumentOptions::default())
            .await
            .unwrap();
        assert_eq!(doc.to_string(), SOURCE);
    }
}
