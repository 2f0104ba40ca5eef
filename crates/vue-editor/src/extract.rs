//! Moving markup between components.
//!
//! [`Document::refactor_into_component`] turns an element into a new
//! component whose default slot receives the element's children. The `push_*`
//! operations move an element from a donor document into the host component
//! it is used inside, relative to the host's default `<slot>`.

use crate::alias::component_name;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::outcome::Outcome;
use vue_markup::{Attribute, MarkupTree, NodeId};

const SKELETON: &str = "<script>\nexport default {}\n</script>\n\n<template>\n</template>";

/// Tags that look like components but are built into Vue.
const BUILT_INS: &[&str] = &[
    "component",
    "keepalive",
    "slot",
    "suspense",
    "teleport",
    "template",
    "transition",
    "transitiongroup",
];

/// Whether a tag names a component: PascalCase or hyphenated, built-ins
/// excluded.
pub fn is_component_tag(tag: &str) -> bool {
    let custom = tag.starts_with(|c: char| c.is_ascii_uppercase()) || tag.contains('-');
    let normalized = tag.replace('-', "").to_ascii_lowercase();
    custom && !BUILT_INS.contains(&normalized.as_str())
}

fn is_blank(markup: &MarkupTree, id: NodeId) -> bool {
    markup
        .node(id)
        .as_text()
        .is_some_and(|text| text.trim().is_empty())
}

/// The default `<slot>` of a component template.
fn default_slot(markup: &MarkupTree) -> Result<NodeId> {
    let template = markup.template_element().ok_or(EditorError::MissingTemplate)?;
    markup
        .descendants(template)
        .into_iter()
        .find(|id| {
            markup.tag(*id) == Some("slot")
                && matches!(markup.attr(*id, "name"), None | Some(Some("default")))
        })
        .ok_or(EditorError::MissingSlot)
}

/// Detach a node together with the line break and indentation before it.
fn remove_with_indent(markup: &mut MarkupTree, node: NodeId) {
    let previous = match markup.parent(node) {
        Some(parent) => {
            let siblings = markup.children(parent);
            siblings
                .iter()
                .position(|s| *s == node)
                .filter(|pos| *pos > 0)
                .map(|pos| siblings[pos - 1])
        }
        None => None,
    };
    if let Some(previous) = previous {
        if let Some(text) = markup.node(previous).as_text() {
            if let Some(at) = text.rfind('\n') {
                if text[at + 1..].trim().is_empty() {
                    let kept = text[..at].to_string();
                    if kept.is_empty() {
                        markup.detach(previous);
                    } else {
                        markup.set_text(previous, kept);
                    }
                }
            }
        }
    }
    markup.detach(node);
}

/// Copy a donor node into the host, indented for a line at `indent`.
fn import_node(host: &mut MarkupTree, donor: &MarkupTree, node: NodeId, indent: &str) -> NodeId {
    let copy = host.import_subtree(donor, node);
    host.reindent_subtree(copy, &donor.indent_of(node), indent);
    copy
}

impl Document {
    /// The nearest enclosing element that is a component usage.
    pub fn find_parent_component(&self, node: NodeId) -> Result<NodeId> {
        self.check_element(node)?;
        self.markup
            .ancestors(node)
            .into_iter()
            .find(|id| self.markup.tag(*id).is_some_and(is_component_tag))
            .ok_or(EditorError::NoParentComponent)
    }

    /// Extract `node` into a new component stored at `path`.
    ///
    /// In this document the node is replaced by a usage of the new component
    /// holding the node's children, and the component is imported. The new
    /// document has an empty script and the node as its template root, with a
    /// `<slot>` in place of its children.
    pub fn refactor_into_component(&mut self, node: NodeId, path: &str) -> Result<Document> {
        self.check_element(node)?;
        let name = component_name(path);
        let unit = self.options.format.indent.clone();

        let mut markup = MarkupTree::parse(SKELETON)?;
        let root = markup.import_subtree(&self.markup, node);
        markup.take_children(root);
        markup.set_self_closing(root, false);
        markup.reindent_subtree(root, &self.markup.indent_of(node), "");
        let slot = markup.create_element("slot");
        let before = markup.create_text(format!("\n{}", unit));
        let after = markup.create_text("\n");
        markup.replace_children(root, vec![before, slot, after]);
        let template = markup.template_element().ok_or(EditorError::MissingTemplate)?;
        let open = markup.create_text("\n");
        let close = markup.create_text("\n");
        markup.replace_children(template, vec![open, root, close]);
        let text = self.options.format.line_ending.normalize(&markup.render());
        let extracted = Document::parse_with(&text, self.options.clone())?;

        self.transact("refactor_into_component", |doc| {
            let usage = doc.markup.create_element(name.as_str());
            doc.markup.replace(node, usage);
            let children = doc.markup.take_children(node);
            doc.markup.replace_children(usage, children);
            doc.register_component(path)?;
            Ok(())
        })?;
        tracing::info!(component = %name, path, "extracted component");
        Ok(extracted)
    }

    /// Move `node` into the host, right before its default slot.
    pub fn push_above_slot(&mut self, node: NodeId, host: &mut Document) -> Result<Outcome> {
        self.check_element(node)?;
        self.edit_with(host, "push_above_slot", |donor, host| {
            let slot = default_slot(&host.markup)?;
            let indent = host.markup.indent_of(slot);
            let copy = import_node(&mut host.markup, &donor.markup, node, &indent);
            let gap = host.markup.create_text(format!("\n{}", indent));
            host.markup.insert_before(slot, copy);
            host.markup.insert_before(slot, gap);
            remove_with_indent(&mut donor.markup, node);
            Ok(())
        })
    }

    /// Move `node` into the host, right after its default slot.
    pub fn push_below_slot(&mut self, node: NodeId, host: &mut Document) -> Result<Outcome> {
        self.check_element(node)?;
        self.edit_with(host, "push_below_slot", |donor, host| {
            let slot = default_slot(&host.markup)?;
            let indent = host.markup.indent_of(slot);
            let copy = import_node(&mut host.markup, &donor.markup, node, &indent);
            let gap = host.markup.create_text(format!("\n{}", indent));
            host.markup.insert_after(slot, copy);
            host.markup.insert_after(slot, gap);
            remove_with_indent(&mut donor.markup, node);
            Ok(())
        })
    }

    /// Wrap the host's default slot in `node`. The donor keeps the node's
    /// children where the node was.
    pub fn push_around_slot(&mut self, node: NodeId, host: &mut Document) -> Result<Outcome> {
        self.check_element(node)?;
        let unit = self.options.format.indent.clone();
        self.edit_with(host, "push_around_slot", |donor, host| {
            let slot = default_slot(&host.markup)?;
            let indent = host.markup.indent_of(slot);
            let inner = format!("{}{}", indent, unit);
            let wrapper = host.markup.import_subtree(&donor.markup, node);
            host.markup.take_children(wrapper);
            host.markup.set_self_closing(wrapper, false);
            host.markup
                .reindent_subtree(wrapper, &donor.markup.indent_of(node), &indent);
            host.markup.replace(slot, wrapper);
            host.markup.reindent_subtree(slot, &indent, &inner);
            let open = host.markup.create_text(format!("\n{}", inner));
            let close = host.markup.create_text(format!("\n{}", indent));
            host.markup.replace_children(wrapper, vec![open, slot, close]);

            let outer = donor.markup.indent_of(node);
            let nested = format!("{}{}", outer, unit);
            let mut children = donor.markup.take_children(node);
            while children.first().is_some_and(|c| is_blank(&donor.markup, *c)) {
                children.remove(0);
            }
            while children.last().is_some_and(|c| is_blank(&donor.markup, *c)) {
                children.pop();
            }
            let mut anchor = node;
            for child in children {
                donor.markup.reindent_subtree(child, &nested, &outer);
                donor.markup.insert_after(anchor, child);
                anchor = child;
            }
            donor.markup.detach(node);
            Ok(())
        })
    }

    /// Move `node` into the host's default slot as fallback content.
    pub fn push_into_slot(&mut self, node: NodeId, host: &mut Document) -> Result<Outcome> {
        self.check_element(node)?;
        let unit = self.options.format.indent.clone();
        self.edit_with(host, "push_into_slot", |donor, host| {
            let slot = default_slot(&host.markup)?;
            let indent = host.markup.indent_of(slot);
            let inner = format!("{}{}", indent, unit);
            let copy = import_node(&mut host.markup, &donor.markup, node, &inner);
            host.markup.set_self_closing(slot, false);
            let last = host
                .markup
                .children(slot)
                .iter()
                .copied()
                .filter(|c| !is_blank(&host.markup, *c))
                .last();
            match last {
                Some(last) => {
                    let gap = host.markup.create_text(format!("\n{}", inner));
                    host.markup.insert_after(last, copy);
                    host.markup.insert_after(last, gap);
                }
                None => {
                    let open = host.markup.create_text(format!("\n{}", inner));
                    let close = host.markup.create_text(format!("\n{}", indent));
                    host.markup.replace_children(slot, vec![open, copy, close]);
                }
            }
            remove_with_indent(&mut donor.markup, node);
            Ok(())
        })
    }

    /// Give the host a named slot after its default slot, and fill it from
    /// the donor by wrapping `node` in `<template v-slot:name>`.
    pub fn push_into_new_slot(
        &mut self,
        node: NodeId,
        slot_name: &str,
        host: &mut Document,
    ) -> Result<Outcome> {
        self.check_element(node)?;
        let unit = self.options.format.indent.clone();
        self.edit_with(host, "push_into_new_slot", |donor, host| {
            let slot = default_slot(&host.markup)?;
            let indent = host.markup.indent_of(slot);
            let named = host.markup.create_element_with(
                "slot",
                vec![Attribute::new("name", Some(slot_name.to_string()))],
            );
            let gap = host.markup.create_text(format!("\n{}", indent));
            host.markup.insert_after(slot, named);
            host.markup.insert_after(slot, gap);

            let outer = donor.markup.indent_of(node);
            let nested = format!("{}{}", outer, unit);
            let template = donor.markup.create_element_with(
                "template",
                vec![Attribute::new(format!("v-slot:{}", slot_name), None)],
            );
            donor.markup.replace(node, template);
            donor.markup.reindent_subtree(node, &outer, &nested);
            let open = donor.markup.create_text(format!("\n{}", nested));
            let close = donor.markup.create_text(format!("\n{}", outer));
            donor.markup.replace_children(template, vec![open, node, close]);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DONOR: &str = "<script>\nexport default {}\n</script>\n\n<template>\n<Card>\n    <h1>Title</h1>\n    <p>Body</p>\n</Card>\n</template>";
    const HOST: &str = "<script>\nexport default {}\n</script>\n\n<template>\n<div class=\"card\">\n    <slot></slot>\n</div>\n</template>";

    fn template(body: &str) -> String {
        format!("<script>\nexport default {{}}\n</script>\n\n<template>\n{}\n</template>", body)
    }

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.markup().find_by_tag(tag)[0]
    }

    #[test]
    fn test_refactor_into_component() {
        let mut doc = Document::parse(
            "<script>\nexport default {}\n</script>\n\n<template>\n<div>\n    <span>I am the slot contents</span>\n</div>\n</template>",
        )
        .unwrap();
        let div = first(&doc, "div");
        let extracted = doc.refactor_into_component(div, "src/MyDiv.vue").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nimport MyDiv from '@/MyDiv.vue';\nexport default {\n    components: {\n        MyDiv\n    }\n};\n</script>\n\n<template>\n<MyDiv>\n    <span>I am the slot contents</span>\n</MyDiv>\n</template>"
        );
        assert_eq!(extracted.to_string(), template("<div>\n    <slot></slot>\n</div>"));
    }

    #[test]
    fn test_refactor_nested_node_moves_to_column_zero() {
        let mut doc = Document::parse(&template(
            "<main>\n    <section\n        class=\"a\"\n        id=\"b\"\n    >\n        <p>x</p>\n    </section>\n</main>",
        ))
        .unwrap();
        let section = first(&doc, "section");
        let extracted = doc.refactor_into_component(section, "src/Panel.vue").unwrap();
        assert!(doc
            .to_string()
            .ends_with("<main>\n    <Panel>\n        <p>x</p>\n    </Panel>\n</main>\n</template>"));
        assert_eq!(
            extracted.to_string(),
            template("<section\n    class=\"a\"\n    id=\"b\"\n>\n    <slot></slot>\n</section>")
        );
    }

    #[test]
    fn test_refactor_without_script_rolls_back() {
        let source = "<template>\n<div></div>\n</template>";
        let mut doc = Document::parse(source).unwrap();
        let div = first(&doc, "div");
        assert!(matches!(
            doc.refactor_into_component(div, "src/A.vue"),
            Err(EditorError::MissingScript)
        ));
        assert_eq!(doc.to_string(), source);
    }

    #[test]
    fn test_find_parent_component() {
        let doc = Document::parse(&template(
            "<my-layout>\n    <Card>\n        <transition>\n            <p>x</p>\n        </transition>\n    </Card>\n</my-layout>",
        ))
        .unwrap();
        let p = first(&doc, "p");
        let card = doc.find_parent_component(p).unwrap();
        assert_eq!(doc.markup().tag(card), Some("Card"));
        let layout = doc.find_parent_component(card).unwrap();
        assert_eq!(doc.markup().tag(layout), Some("my-layout"));
        assert!(matches!(
            doc.find_parent_component(layout),
            Err(EditorError::NoParentComponent)
        ));
        assert!(!is_component_tag("KeepAlive"));
        assert!(!is_component_tag("transition-group"));
    }

    #[test]
    fn test_push_above_and_below_slot() {
        let mut donor = Document::parse(DONOR).unwrap();
        let mut host = Document::parse(HOST).unwrap();
        let h1 = first(&donor, "h1");
        donor.push_above_slot(h1, &mut host).unwrap();
        assert_eq!(donor.to_string(), template("<Card>\n    <p>Body</p>\n</Card>"));
        assert_eq!(
            host.to_string(),
            template("<div class=\"card\">\n    <h1>Title</h1>\n    <slot></slot>\n</div>")
        );

        let p = first(&donor, "p");
        donor.push_below_slot(p, &mut host).unwrap();
        assert_eq!(donor.to_string(), template("<Card>\n</Card>"));
        assert_eq!(
            host.to_string(),
            template("<div class=\"card\">\n    <h1>Title</h1>\n    <slot></slot>\n    <p>Body</p>\n</div>")
        );
    }

    #[test]
    fn test_push_around_slot() {
        let mut donor = Document::parse(&template(
            "<Card>\n    <section class=\"x\">\n        <p>Body</p>\n    </section>\n</Card>",
        ))
        .unwrap();
        let mut host = Document::parse(HOST).unwrap();
        let section = first(&donor, "section");
        donor.push_around_slot(section, &mut host).unwrap();
        assert_eq!(donor.to_string(), template("<Card>\n    <p>Body</p>\n</Card>"));
        assert_eq!(
            host.to_string(),
            template("<div class=\"card\">\n    <section class=\"x\">\n        <slot></slot>\n    </section>\n</div>")
        );
    }

    #[test]
    fn test_push_into_slot() {
        let mut donor = Document::parse(DONOR).unwrap();
        let mut host = Document::parse(HOST).unwrap();
        let p = first(&donor, "p");
        donor.push_into_slot(p, &mut host).unwrap();
        assert_eq!(donor.to_string(), template("<Card>\n    <h1>Title</h1>\n</Card>"));
        assert_eq!(
            host.to_string(),
            template("<div class=\"card\">\n    <slot>\n        <p>Body</p>\n    </slot>\n</div>")
        );
    }

    #[test]
    fn test_push_into_new_slot() {
        let mut donor = Document::parse(DONOR).unwrap();
        let mut host = Document::parse(HOST).unwrap();
        let p = first(&donor, "p");
        donor.push_into_new_slot(p, "footer", &mut host).unwrap();
        assert_eq!(
            donor.to_string(),
            template("<Card>\n    <h1>Title</h1>\n    <template v-slot:footer>\n        <p>Body</p>\n    </template>\n</Card>")
        );
        assert_eq!(
            host.to_string(),
            template("<div class=\"card\">\n    <slot></slot>\n    <slot name=\"footer\"></slot>\n</div>")
        );
    }

    #[test]
    fn test_missing_slot_rolls_back_both() {
        let mut donor = Document::parse(DONOR).unwrap();
        let mut host = Document::parse(&template("<div></div>")).unwrap();
        let h1 = first(&donor, "h1");
        assert!(matches!(
            donor.push_above_slot(h1, &mut host),
            Err(EditorError::MissingSlot)
        ));
        assert_eq!(donor.to_string(), DONOR);
        assert_eq!(host.to_string(), template("<div></div>"));
    }
}
