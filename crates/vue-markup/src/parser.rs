//! Parser producing a span-preserving markup tree.

use crate::ast::{is_raw_text_tag, is_void_tag, Attribute, Element, Node, NodeId, NodeKind};
use crate::error::{MarkupError, MarkupResult};
use crate::lexer::MarkupLexer;
use crate::tree::MarkupTree;
use smol_str::SmolStr;
use source_span::Span;

/// Parse a document into a markup tree.
pub fn parse_markup(source: &str) -> MarkupResult<MarkupTree> {
    let mut parser = MarkupParser::new(source);
    let (roots, _) = parser.parse_until_close(None)?;
    let mut tree = MarkupTree::from_parts(source.to_string(), parser.nodes);
    for root in roots {
        tree.push_root(root);
    }
    tracing::trace!(nodes = tree.node_count(), "parsed markup");
    Ok(tree)
}

/// Outcome of parsing a run of children.
enum Close {
    /// The expected end tag was reached (not consumed).
    Own,
    /// An end tag of an ancestor was reached (not consumed).
    Ancestor,
    /// End of input.
    Eof,
}

struct MarkupParser<'a> {
    source: &'a str,
    lexer: MarkupLexer<'a>,
    nodes: Vec<Node>,
    open: Vec<SmolStr>,
}

impl<'a> MarkupParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: MarkupLexer::new(source),
            nodes: Vec::new(),
            open: Vec::new(),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn parse_until_close(&mut self, end_tag: Option<&str>) -> MarkupResult<(Vec<NodeId>, Close)> {
        let mut children = Vec::new();
        loop {
            if self.lexer.is_eof() {
                return Ok((children, Close::Eof));
            }

            if self.lexer.starts_with("</") {
                let name = self.peek_end_tag_name().unwrap_or_default();
                if end_tag.is_some_and(|t| t.eq_ignore_ascii_case(&name)) {
                    return Ok((children, Close::Own));
                }
                if self.open.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                    return Ok((children, Close::Ancestor));
                }
                let start = self.lexer.pos();
                self.lexer.consume_until(">");
                self.lexer.consume(">");
                return Err(MarkupError::stray_end_tag(&name, self.lexer.span_from(start)));
            }

            let id = if self.lexer.starts_with("<!--") {
                self.parse_comment()
            } else if self.lexer.starts_with("<!") {
                self.parse_doctype()
            } else if self.starts_element() {
                self.parse_element()?
            } else {
                self.parse_text()
            };
            children.push(id);
        }
    }

    fn starts_element(&self) -> bool {
        let rest = self.lexer.remaining();
        rest.starts_with('<')
            && rest[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    }

    fn peek_end_tag_name(&self) -> Option<String> {
        let rest = self.lexer.remaining().strip_prefix("</")?;
        let name: String = rest
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '>')
            .collect();
        Some(name)
    }

    fn parse_comment(&mut self) -> NodeId {
        let start = self.lexer.pos();
        self.lexer.consume("<!--");
        self.lexer.consume_until("-->");
        self.lexer.consume("-->");
        let span = self.lexer.span_from(start);
        let raw = span.slice(self.source).to_string();
        self.alloc(Node::new(NodeKind::Comment(raw), Some(span)))
    }

    fn parse_doctype(&mut self) -> NodeId {
        let start = self.lexer.pos();
        self.lexer.consume_until(">");
        self.lexer.consume(">");
        let span = self.lexer.span_from(start);
        let raw = span.slice(self.source).to_string();
        self.alloc(Node::new(NodeKind::Doctype(raw), Some(span)))
    }

    /// Text runs until the next tag. Interpolations may contain `<`.
    fn parse_text(&mut self) -> NodeId {
        let start = self.lexer.pos();
        // A lone `<` that does not open a tag is text.
        if self.lexer.starts_with("<") {
            self.lexer.next_char();
        }
        while !self.lexer.is_eof() {
            if self.lexer.starts_with("{{") {
                self.lexer.consume("{{");
                self.lexer.consume_until("}}");
                self.lexer.consume("}}");
                continue;
            }
            if self.lexer.starts_with("</")
                || self.lexer.starts_with("<!")
                || self.starts_element()
            {
                break;
            }
            self.lexer.next_char();
        }
        let span = self.lexer.span_from(start);
        let text = span.slice(self.source).to_string();
        self.alloc(Node::new(NodeKind::Text(text), Some(span)))
    }

    fn parse_element(&mut self) -> MarkupResult<NodeId> {
        let start = self.lexer.pos();
        self.lexer.consume("<");
        let tag: SmolStr = match self.lexer.read_tag_name() {
            Some(tag) => tag.into(),
            None => {
                return Err(MarkupError::unexpected_token(
                    "tag name",
                    "invalid character",
                    self.lexer.span_from(start),
                ))
            }
        };

        let attrs = self.parse_attributes(start)?;

        let self_closing = self.lexer.consume("/>");
        if !self_closing && !self.lexer.consume(">") {
            return Err(MarkupError::unclosed_tag(&tag, self.lexer.span_from(start)));
        }
        let start_tag = self.lexer.span_from(start);

        let mut element = Element::new(tag.clone());
        element.attrs = attrs;
        element.self_closing = self_closing;
        element.start_tag = Some(start_tag);
        element.start_text = Some(start_tag.slice(self.source).to_string());

        let id = self.alloc(Node::new(NodeKind::Element(element), None));

        let mut children = Vec::new();
        let mut end_tag = None;
        if !self_closing && !is_void_tag(&tag) {
            if is_raw_text_tag(&tag) {
                let text_start = self.lexer.pos();
                let content = self.lexer.read_raw_content(&tag);
                if !content.is_empty() {
                    let span = self.lexer.span_from(text_start);
                    children.push(self.alloc(Node::new(
                        NodeKind::Text(content.to_string()),
                        Some(span),
                    )));
                }
                if self.lexer.is_eof() {
                    return Err(MarkupError::unclosed_tag(&tag, start_tag));
                }
            } else {
                self.open.push(tag.clone());
                let (parsed, close) = self.parse_until_close(Some(&tag))?;
                self.open.pop();
                children = parsed;
                if !matches!(close, Close::Own) {
                    return Err(MarkupError::unclosed_tag(&tag, start_tag));
                }
            }

            let end_start = self.lexer.pos();
            self.lexer.consume_until(">");
            self.lexer.consume(">");
            end_tag = Some(self.lexer.span_from(end_start));
        }

        for child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        let end = self.lexer.pos();
        let node = &mut self.nodes[id.index()];
        node.span = Some(Span::new(start as u32, end as u32));
        if let NodeKind::Element(el) = &mut node.kind {
            el.children = children;
            el.end_tag = end_tag;
            el.end_text = end_tag.map(|span| span.slice(self.source).to_string());
        }
        Ok(id)
    }

    fn parse_attributes(&mut self, tag_start: usize) -> MarkupResult<Vec<Attribute>> {
        let mut attrs = Vec::new();
        loop {
            self.lexer.skip_whitespace();
            if self.lexer.is_eof() {
                return Err(MarkupError::unexpected_token(
                    "'>'",
                    "end of input",
                    self.lexer.span_from(tag_start),
                ));
            }
            if self.lexer.starts_with(">") || self.lexer.starts_with("/>") {
                return Ok(attrs);
            }

            let Some(name) = self.lexer.read_attr_name() else {
                // Skip a stray character such as a lone `/`.
                self.lexer.next_char();
                continue;
            };

            self.lexer.skip_whitespace();
            let mut attr = Attribute::new(name, None);
            if self.lexer.consume("=") {
                self.lexer.skip_whitespace();
                if matches!(self.lexer.peek_char(), Some('"') | Some('\'')) {
                    let value_start = self.lexer.pos();
                    match self.lexer.read_quoted_string() {
                        Some((value, quote)) => {
                            attr.value = Some(value.to_string());
                            attr.quote = quote;
                        }
                        None => {
                            return Err(MarkupError::unexpected_token(
                                "closing quote",
                                "end of input",
                                self.lexer.span_from(value_start),
                            ))
                        }
                    }
                } else {
                    attr.value = Some(self.lexer.read_unquoted_value().to_string());
                }
            }
            attrs.push(attr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_sfc_blocks() {
        let source = "<script>\nexport default {}\n</script>\n\n<template>\n    <div></div>\n</template>\n";
        let tree = parse_markup(source).unwrap();
        let script = tree.first_root_element("script").unwrap();
        let template = tree.first_root_element("template").unwrap();
        assert_eq!(tree.text_content(script), "\nexport default {}\n");
        assert_eq!(tree.element(template).unwrap().children.len(), 3);
    }

    #[test]
    fn test_parse_attributes() {
        let tree = parse_markup("<div attr=\"foo\" :class='bar' disabled v-on:click=go></div>").unwrap();
        let div = tree.first_root_element("div").unwrap();
        let el = tree.element(div).unwrap();
        assert_eq!(el.attrs.len(), 4);
        assert_eq!(el.attr(":class").unwrap().quote, '\'');
        assert_eq!(el.attr("disabled").unwrap().value, None);
        assert_eq!(el.attr("v-on:click").unwrap().value.as_deref(), Some("go"));
    }

    #[test]
    fn test_interpolation_with_angle_bracket() {
        let tree = parse_markup("<p>{{ a < b }}</p>").unwrap();
        let p = tree.first_root_element("p").unwrap();
        assert_eq!(tree.text_content(p), "{{ a < b }}");
    }

    #[test]
    fn test_void_and_self_closing() {
        let tree = parse_markup("<div><br><input type=\"text\"><Foo /></div>").unwrap();
        let div = tree.first_root_element("div").unwrap();
        let el = tree.element(div).unwrap();
        assert_eq!(el.children.len(), 3);
        assert!(tree.element(el.children[2]).unwrap().self_closing);
    }

    #[test]
    fn test_unclosed_tag() {
        let err = parse_markup("<div><span></div>").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnclosedTag);
    }

    #[test]
    fn test_stray_end_tag() {
        let err = parse_markup("<div></div></span>").unwrap_err();
        assert_eq!(err.code, ErrorCode::StrayEndTag);
    }

    #[test]
    fn test_comment_and_doctype() {
        let tree = parse_markup("<!DOCTYPE html><!-- hi --><p></p>").unwrap();
        assert_eq!(tree.roots().len(), 3);
    }
}
