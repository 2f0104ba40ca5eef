//! Node types of the markup tree.

use smol_str::SmolStr;
use source_span::Span;

/// Handle to a node stored in a [`MarkupTree`](crate::MarkupTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node is.
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    /// Where the node came from, `None` for created nodes.
    pub(crate) span: Option<Span>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, span: Option<Span>) -> Self {
        Self {
            kind,
            parent: None,
            span,
        }
    }

    /// The element payload, if this node is an element.
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The text content, if this node is text.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Check whether this node is an element with the given tag.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|el| el.tag == tag)
    }
}

/// The payload of a markup node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An element with attributes and children.
    Element(Element),
    /// Literal text, interpolations included.
    Text(String),
    /// A comment, stored with its delimiters.
    Comment(String),
    /// A doctype declaration, stored verbatim.
    Doctype(String),
}

/// An element node.
#[derive(Debug, Clone)]
pub struct Element {
    /// The tag name, case preserved.
    pub tag: SmolStr,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
    /// Child nodes.
    pub children: Vec<NodeId>,
    /// Written as `<tag />`.
    pub self_closing: bool,
    pub(crate) start_tag: Option<Span>,
    pub(crate) end_tag: Option<Span>,
    /// Verbatim start tag, cleared once attributes or the tag change.
    pub(crate) start_text: Option<String>,
    /// Verbatim end tag, cleared once the tag changes.
    pub(crate) end_text: Option<String>,
}

impl Element {
    /// Create a detached element with no source position.
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: false,
            start_tag: None,
            end_tag: None,
            start_text: None,
            end_text: None,
        }
    }

    /// Look up an attribute by exact name.
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Check whether the element carries the attribute.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whether this is a void element that never has an end tag.
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    /// Whether the element content is raw text.
    pub fn is_raw_text(&self) -> bool {
        is_raw_text_tag(&self.tag)
    }

    /// Span of the start tag in the original source.
    pub fn start_tag_span(&self) -> Option<Span> {
        self.start_tag
    }

    /// Span of the end tag in the original source.
    pub fn end_tag_span(&self) -> Option<Span> {
        self.end_tag
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written, including any `:`, `@`, `#` or `v-` prefix.
    pub name: SmolStr,
    /// Value without quotes, `None` for bare attributes.
    pub value: Option<String>,
    /// The quote used around the value.
    pub quote: char,
}

impl Attribute {
    /// Create an attribute with a double-quoted value.
    pub fn new(name: impl Into<SmolStr>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            quote: '"',
        }
    }

    /// Whether the attribute value is a script expression.
    pub fn is_dynamic(&self) -> bool {
        self.name.starts_with(':')
            || self.name.starts_with('@')
            || self.name.starts_with('#')
            || self.name.starts_with("v-")
            || self.name.contains(':')
    }

    /// Render the attribute as it appears inside a start tag.
    pub fn render(&self) -> String {
        match &self.value {
            None => self.name.to_string(),
            Some(value) => {
                let quote = if value.contains(self.quote) {
                    if self.quote == '"' {
                        '\''
                    } else {
                        '"'
                    }
                } else {
                    self.quote
                };
                format!("{}={}{}{}", self.name, quote, value, quote)
            }
        }
    }
}

/// Elements that never have content or an end tag.
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is not parsed as markup.
pub fn is_raw_text_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "script" | "style" | "textarea"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_render() {
        assert_eq!(Attribute::new("disabled", None).render(), "disabled");
        assert_eq!(
            Attribute::new(":class", Some("bar".into())).render(),
            ":class=\"bar\""
        );
        assert_eq!(
            Attribute::new("@click", Some("log(\"a\")".into())).render(),
            "@click='log(\"a\")'"
        );
    }

    #[test]
    fn test_dynamic_attributes() {
        assert!(Attribute::new(":foo", None).is_dynamic());
        assert!(Attribute::new("@click", None).is_dynamic());
        assert!(Attribute::new("v-if", None).is_dynamic());
        assert!(Attribute::new("xlink:href", None).is_dynamic());
        assert!(!Attribute::new("class", None).is_dynamic());
    }

    #[test]
    fn test_void_and_raw_tags() {
        assert!(is_void_tag("br"));
        assert!(is_void_tag("IMG"));
        assert!(!is_void_tag("div"));
        assert!(is_raw_text_tag("script"));
        assert!(!is_raw_text_tag("template"));
    }
}
