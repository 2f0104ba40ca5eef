//! Serialization of the markup tree.

use crate::ast::{Element, NodeId, NodeKind};
use crate::tree::MarkupTree;
use std::fmt;

impl MarkupTree {
    /// Render the whole document.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source().len());
        for root in self.roots() {
            self.render_into(*root, &mut out);
        }
        out
    }

    /// Render a single node and its subtree.
    pub fn render_node(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(text) | NodeKind::Comment(text) | NodeKind::Doctype(text) => {
                out.push_str(text)
            }
            NodeKind::Element(el) => {
                match &el.start_text {
                    Some(text) => out.push_str(text),
                    None => out.push_str(&self.render_start_tag(id, el)),
                }
                if el.self_closing || (el.is_void() && el.end_text.is_none()) {
                    return;
                }
                for child in &el.children {
                    self.render_into(*child, out);
                }
                match &el.end_text {
                    Some(text) => out.push_str(text),
                    None => {
                        out.push_str("</");
                        out.push_str(&el.tag);
                        out.push('>');
                    }
                }
            }
        }
    }

    /// A start tag with more than one attribute puts each attribute on its
    /// own line, one unit deeper than the element, and closes on a new line.
    fn render_start_tag(&self, id: NodeId, el: &Element) -> String {
        let close = if el.self_closing { "/>" } else { ">" };
        let mut out = format!("<{}", el.tag);
        match el.attrs.len() {
            0 => {
                if el.self_closing {
                    out.push(' ');
                }
            }
            1 => {
                out.push(' ');
                out.push_str(&el.attrs[0].render());
                if el.self_closing {
                    out.push(' ');
                }
            }
            _ => {
                let indent = self.indent_of(id);
                let newline = self.line_ending().as_str();
                for attr in &el.attrs {
                    out.push_str(newline);
                    out.push_str(&indent);
                    out.push_str(self.indent_unit());
                    out.push_str(&attr.render());
                }
                out.push_str(newline);
                out.push_str(&indent);
            }
        }
        out.push_str(close);
        out
    }
}

impl fmt::Display for MarkupTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Attribute;
    use crate::parse_markup;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_untouched_round_trip() {
        let source = "<!DOCTYPE html>\n<script>\nconst a = 1 < 2;\n</script>\n\n<template>\n<div\n  a=\"1\"   b='2'>\n    <br>\n    <Foo/>\n    {{ a < b }}<!-- c -->\n</div>\n</template>\n<style scoped>\n.a > .b {}\n</style>\n";
        let tree = parse_markup(source).unwrap();
        assert_eq!(tree.render(), source);
    }

    #[test]
    fn test_rerender_multiple_attributes() {
        let mut tree = parse_markup("<template>\n<div @click=\"foo\" attr=\"foo\">{{ foo() }}</div>\n</template>").unwrap();
        let div = tree.find_by_tag("div")[0];
        tree.set_attr(div, "@click", Some("bar".into()));
        assert_eq!(
            tree.render(),
            "<template>\n<div\n    @click=\"bar\"\n    attr=\"foo\"\n>{{ foo() }}</div>\n</template>"
        );
    }

    #[test]
    fn test_rerender_single_attribute_inline() {
        let mut tree = parse_markup("<div\n    a=\"1\"\n    b=\"2\"\n></div>").unwrap();
        let div = tree.find_by_tag("div")[0];
        tree.remove_attr(div, "b");
        assert_eq!(tree.render(), "<div a=\"1\"></div>");
    }

    #[test]
    fn test_created_elements() {
        let mut tree = parse_markup("<template>\n<div>\n    <span>x</span>\n</div>\n</template>").unwrap();
        let div = tree.find_by_tag("div")[0];
        let wrapper = tree.create_element("MyDiv");
        tree.replace(div, wrapper);
        let children = tree.take_children(div);
        tree.replace_children(wrapper, children);
        assert_eq!(
            tree.render(),
            "<template>\n<MyDiv>\n    <span>x</span>\n</MyDiv>\n</template>"
        );
        let slot = tree.create_element_with("slot", vec![Attribute::new("name", Some("x".into()))]);
        tree.append_child(wrapper, slot);
        assert!(tree.render().contains("<slot name=\"x\"></slot></MyDiv>"));
    }

    #[test]
    fn test_reindent_subtree() {
        let mut tree = parse_markup("<a>\n    <div>\n        <b></b>\n    </div>\n</a>").unwrap();
        let div = tree.find_by_tag("div")[0];
        tree.reindent_subtree(div, "    ", "");
        assert_eq!(tree.render_node(div), "<div>\n    <b></b>\n</div>");
    }
}
