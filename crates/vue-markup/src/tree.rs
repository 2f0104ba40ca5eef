//! The mutable markup tree: arena storage, queries and edits.

use crate::ast::{Attribute, Element, Node, NodeId, NodeKind};
use smol_str::SmolStr;
use source_span::{line_indent, LineEnding, Span};

/// Default indentation unit used when re-rendering start tags.
pub const DEFAULT_INDENT_UNIT: &str = "    ";

/// A parsed markup document.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Detached nodes stay
/// in the arena but are not rendered. Nodes parsed from source keep their
/// verbatim start and end tags until an edit invalidates them, so an
/// untouched tree renders back to the exact input.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    source: String,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    indent_unit: String,
    line_ending: LineEnding,
}

impl MarkupTree {
    pub(crate) fn from_parts(source: String, nodes: Vec<Node>) -> Self {
        Self {
            line_ending: LineEnding::detect(&source),
            source,
            nodes,
            roots: Vec::new(),
            indent_unit: DEFAULT_INDENT_UNIT.to_string(),
        }
    }

    /// An empty document.
    pub fn empty() -> Self {
        Self::from_parts(String::new(), Vec::new())
    }

    pub(crate) fn push_root(&mut self, id: NodeId) {
        self.nodes[id.index()].parent = None;
        self.roots.push(id);
    }

    /// The text this tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The indentation unit used for re-rendered start tags.
    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    /// Change the indentation unit.
    pub fn set_indent_unit(&mut self, unit: impl Into<String>) {
        self.indent_unit = unit.into();
    }

    /// The line terminator of the source, used for generated text.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Access a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Access an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).as_element()
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The tag of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// The value of an attribute, `Some(None)` for bare attributes.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<Option<&str>> {
        self.element(id)?
            .attr(name)
            .map(|attr| attr.value.as_deref())
    }

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The children of a node, empty for non-elements.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map(|el| el.children.as_slice()).unwrap_or(&[])
    }

    /// Element children only.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    /// Where the node was in the original source.
    pub fn span_of(&self, id: NodeId) -> Option<Span> {
        self.node(id).span
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Whether the node is reachable from a root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let top = self.ancestors(id).last().copied().unwrap_or(id);
        self.roots.contains(&top)
    }

    /// Descendants of a node in document order, the node itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in self.children(id) {
            self.collect(*child, &mut out);
        }
        out
    }

    fn collect(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in self.children(id) {
            self.collect(*child, out);
        }
    }

    /// Every attached node in document order.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for root in &self.roots {
            self.collect(*root, &mut out);
        }
        out
    }

    /// Attached nodes matching a predicate, in document order.
    pub fn find_all<F>(&self, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.all_nodes()
            .into_iter()
            .filter(|id| pred(self.node(*id)))
            .collect()
    }

    /// Attached elements with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find_all(|node| node.is_tag(tag))
    }

    /// The first top-level element with the given tag.
    pub fn first_root_element(&self, tag: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.node(*id).is_tag(tag))
    }

    /// The innermost attached element whose original start tag begins at or
    /// before `offset` and whose original extent contains it.
    pub fn element_at(&self, offset: u32) -> Option<NodeId> {
        self.all_nodes()
            .into_iter()
            .filter(|id| {
                self.element(*id).is_some()
                    && self
                        .span_of(*id)
                        .is_some_and(|span| span.start <= offset && offset < span.end)
            })
            .last()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.node(id).as_text() {
            out.push_str(text);
        }
        for desc in self.descendants(id) {
            if let Some(text) = self.node(desc).as_text() {
                out.push_str(text);
            }
        }
        out
    }

    fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.parent(id) {
            Some(p) => self.children(p),
            None => &self.roots,
        }
    }

    /// The indentation of the line a node starts on.
    ///
    /// Taken from the whitespace text preceding it when there is one, then
    /// from the original source, then one unit deeper than the parent.
    pub fn indent_of(&self, id: NodeId) -> String {
        let siblings = self.siblings(id);
        if let Some(pos) = siblings.iter().position(|s| *s == id) {
            if pos > 0 {
                if let Some(text) = self.node(siblings[pos - 1]).as_text() {
                    if let Some(i) = text.rfind('\n') {
                        let tail = &text[i + 1..];
                        if tail.chars().all(|c| c == ' ' || c == '\t') {
                            return tail.to_string();
                        }
                    }
                }
            }
        }
        if let Some(span) = self.span_of(id) {
            return line_indent(&self.source, span.start).to_string();
        }
        match self.parent(id) {
            Some(parent) => format!("{}{}", self.indent_of(parent), self.indent_unit),
            None => String::new(),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<SmolStr>) -> NodeId {
        self.alloc(Node::new(NodeKind::Element(Element::new(tag)), None))
    }

    /// Create a detached element with attributes.
    pub fn create_element_with(
        &mut self,
        tag: impl Into<SmolStr>,
        attrs: Vec<Attribute>,
    ) -> NodeId {
        let mut element = Element::new(tag);
        element.attrs = attrs;
        self.alloc(Node::new(NodeKind::Element(element), None))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let text = self.line_ending.normalize(&text.into());
        self.alloc(Node::new(NodeKind::Text(text), None))
    }

    /// Set or add an attribute. Existing attributes keep their position.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: Option<String>) {
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) => {
                    if attr.value == value {
                        return;
                    }
                    attr.value = value;
                }
                None => el.attrs.push(Attribute::new(name, value)),
            }
            el.start_text = None;
        }
    }

    /// Replace the whole attribute list.
    pub fn set_attrs(&mut self, id: NodeId, attrs: Vec<Attribute>) {
        if let Some(el) = self.element_mut(id) {
            if el.attrs != attrs {
                el.attrs = attrs;
                el.start_text = None;
            }
        }
    }

    /// Rename an attribute in place, keeping its value.
    pub fn rename_attr(&mut self, id: NodeId, from: &str, to: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        match el.attrs.iter_mut().find(|a| a.name == from) {
            Some(attr) => {
                attr.name = to.into();
                el.start_text = None;
                true
            }
            None => false,
        }
    }

    /// Remove an attribute. Returns whether it existed.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let before = el.attrs.len();
        el.attrs.retain(|a| a.name != name);
        let removed = el.attrs.len() != before;
        if removed {
            el.start_text = None;
        }
        removed
    }

    /// Change an element's tag. Both tags are re-rendered.
    pub fn set_tag(&mut self, id: NodeId, tag: impl Into<SmolStr>) {
        if let Some(el) = self.element_mut(id) {
            el.tag = tag.into();
            el.start_text = None;
            el.end_text = None;
        }
    }

    /// Switch an element between `<tag />` and `<tag></tag>`.
    pub fn set_self_closing(&mut self, id: NodeId, self_closing: bool) {
        if let Some(el) = self.element_mut(id) {
            if el.self_closing != self_closing {
                el.self_closing = self_closing;
                el.start_text = None;
                el.end_text = None;
            }
        }
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeKind::Text(content) = &mut self.nodes[id.index()].kind {
            *content = text.into();
        }
    }

    /// Replace the content of a raw text element such as `<script>`.
    pub fn set_raw_text(&mut self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        let existing = self.children(id).iter().copied().find(|c| self.node(*c).as_text().is_some());
        match existing {
            Some(child) => self.set_text(child, text),
            None => {
                let child = self.create_text(text);
                self.append_child(id, child);
            }
        }
    }

    /// Detach a node from its parent or from the roots.
    pub fn detach(&mut self, id: NodeId) {
        match self.parent(id) {
            Some(parent) => {
                if let Some(el) = self.element_mut(parent) {
                    el.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        self.nodes[id.index()].parent = None;
    }

    fn sibling_list_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(p) => self.element_mut(p).map(|el| &mut el.children),
            None => Some(&mut self.roots),
        }
    }

    /// Append a node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let attached = match self.element_mut(parent) {
            Some(el) => {
                el.children.push(child);
                true
            }
            None => false,
        };
        if attached {
            self.nodes[child.index()].parent = Some(parent);
        }
    }

    /// Append a node at the top level.
    pub fn append_root(&mut self, child: NodeId) {
        self.detach(child);
        self.push_root(child);
    }

    fn insert_relative(&mut self, reference: NodeId, node: NodeId, after: bool) {
        self.detach(node);
        let parent = self.parent(reference);
        let inserted = match self.sibling_list_mut(parent) {
            Some(list) => match list.iter().position(|c| *c == reference) {
                Some(pos) => {
                    list.insert(if after { pos + 1 } else { pos }, node);
                    true
                }
                None => false,
            },
            None => false,
        };
        if inserted {
            self.nodes[node.index()].parent = parent;
        }
    }

    /// Insert `node` immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.insert_relative(reference, node, false);
    }

    /// Insert `node` immediately after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.insert_relative(reference, node, true);
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        self.detach(new);
        let parent = self.parent(old);
        let replaced = match self.sibling_list_mut(parent) {
            Some(list) => match list.iter().position(|c| *c == old) {
                Some(pos) => {
                    list[pos] = new;
                    true
                }
                None => false,
            },
            None => false,
        };
        if replaced {
            self.nodes[new.index()].parent = parent;
            self.nodes[old.index()].parent = None;
        }
    }

    /// Detach and return all children of a node.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = match self.element_mut(id) {
            Some(el) => std::mem::take(&mut el.children),
            None => Vec::new(),
        };
        for child in &children {
            self.nodes[child.index()].parent = None;
        }
        children
    }

    /// Replace all children of a node.
    pub fn replace_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        self.take_children(id);
        for child in children {
            self.append_child(id, child);
        }
    }

    /// Move all children of `parent` into `wrapper`, which becomes the only
    /// child of `parent`.
    pub fn wrap_children(&mut self, parent: NodeId, wrapper: NodeId) {
        let children = self.take_children(parent);
        self.replace_children(wrapper, children);
        self.append_child(parent, wrapper);
    }

    /// Replace a node with its own children.
    pub fn unwrap(&mut self, id: NodeId) {
        let children = self.take_children(id);
        let mut anchor = id;
        for child in children {
            self.insert_after(anchor, child);
            anchor = child;
        }
        self.detach(id);
    }

    /// Copy a subtree of another tree into this one as a detached node.
    ///
    /// Verbatim tags survive the copy; source positions do not.
    pub fn import_subtree(&mut self, other: &MarkupTree, id: NodeId) -> NodeId {
        let mut kind = other.node(id).kind.clone();
        let children = match &mut kind {
            NodeKind::Element(el) => {
                el.start_tag = None;
                el.end_tag = None;
                std::mem::take(&mut el.children)
            }
            _ => Vec::new(),
        };
        let new_id = self.alloc(Node::new(kind, None));
        for child in children {
            let copied = self.import_subtree(other, child);
            self.append_child(new_id, copied);
        }
        new_id
    }

    /// Shift the indentation of everything inside a node from `from` to `to`.
    ///
    /// Verbatim start tags spanning several lines are re-rendered.
    pub fn reindent_subtree(&mut self, id: NodeId, from: &str, to: &str) {
        if from == to {
            return;
        }
        let mut targets = vec![id];
        targets.extend(self.descendants(id));
        for target in targets {
            match &mut self.nodes[target.index()].kind {
                NodeKind::Text(text) | NodeKind::Comment(text) => {
                    *text = shift_lines(text, from, to);
                }
                NodeKind::Element(el) => {
                    if el.start_text.as_deref().is_some_and(|t| t.contains('\n')) {
                        el.start_text = None;
                    }
                }
                NodeKind::Doctype(_) => {}
            }
        }
    }
}

/// Swap the `from` prefix for `to` on every line after the first.
fn shift_lines(text: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if let Some(rest) = line.strip_prefix(from) {
                out.push_str(to);
                out.push_str(rest);
                continue;
            }
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_markup;
    use pretty_assertions::assert_eq;

    const DOC: &str = "<template>\n<div>\n    <span>a</span>\n    <p>b</p>\n</div>\n</template>";

    #[test]
    fn test_queries() {
        let tree = parse_markup(DOC).unwrap();
        let span = tree.find_by_tag("span")[0];
        let div = tree.find_by_tag("div")[0];
        assert_eq!(tree.parent(span), Some(div));
        assert_eq!(tree.ancestors(span).len(), 2);
        assert_eq!(tree.child_elements(div).len(), 2);
        assert_eq!(tree.indent_of(span), "    ");
        assert_eq!(tree.indent_of(div), "");
    }

    #[test]
    fn test_element_at() {
        let tree = parse_markup(DOC).unwrap();
        let offset = DOC.find("<p>").unwrap() as u32 + 1;
        let p = tree.element_at(offset).unwrap();
        assert_eq!(tree.tag(p), Some("p"));
        assert_eq!(tree.tag(tree.element_at(0).unwrap()), Some("template"));
    }

    #[test]
    fn test_detach_and_insert() {
        let mut tree = parse_markup(DOC).unwrap();
        let span = tree.find_by_tag("span")[0];
        let p = tree.find_by_tag("p")[0];
        tree.insert_after(p, span);
        let div = tree.find_by_tag("div")[0];
        let tags: Vec<_> = tree
            .child_elements(div)
            .into_iter()
            .filter_map(|c| tree.tag(c))
            .collect();
        assert_eq!(tags, vec!["p", "span"]);
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let mut tree = parse_markup("<div><a></a><b></b></div>").unwrap();
        let div = tree.find_by_tag("div")[0];
        let wrapper = tree.create_element("section");
        tree.wrap_children(div, wrapper);
        assert_eq!(tree.children(div), &[wrapper]);
        assert_eq!(tree.children(wrapper).len(), 2);
        tree.unwrap(wrapper);
        assert_eq!(tree.children(div).len(), 2);
        assert!(!tree.is_attached(wrapper));
    }

    #[test]
    fn test_set_attr_keeps_untouched_tags() {
        let mut tree = parse_markup("<div a=\"1\"></div>").unwrap();
        let div = tree.find_by_tag("div")[0];
        tree.set_attr(div, "a", Some("1".into()));
        assert!(tree.element(div).unwrap().start_text.is_some());
        tree.set_attr(div, "a", Some("2".into()));
        assert!(tree.element(div).unwrap().start_text.is_none());
    }

    #[test]
    fn test_set_tag() {
        let mut tree = parse_markup("<div class=\"x\"><b></b></div>").unwrap();
        let div = tree.find_by_tag("div")[0];
        tree.set_tag(div, "section");
        let out = tree.render();
        assert!(out.starts_with("<section class=\"x\">"));
        assert!(out.ends_with("<b></b></section>"));
    }

    #[test]
    fn test_shift_lines() {
        assert_eq!(shift_lines("\n        <a>\n    ", "    ", ""), "\n    <a>\n");
    }
}
