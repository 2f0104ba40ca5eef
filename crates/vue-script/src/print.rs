//! Printing of script nodes.
//!
//! Pristine nodes reuse their source text, touched nodes splice their changed
//! parts into it, and rebuilt nodes are laid out canonically: objects one
//! property per line, arrays on one line, functions in method shorthand.

use crate::node::{Function, FunctionBody, FunctionStyle, NodeId, NodeKind, NodeState, PropertyForm};
use crate::tree::ScriptTree;
use source_span::{apply_edits, line_indent, reindent, Span, TextEdit};

impl ScriptTree {
    /// Print a node as it would appear on a line indented by `indent`.
    pub fn print(&self, id: NodeId, indent: &str) -> String {
        let node = self.node(id);
        match (node.state, node.span) {
            (NodeState::Pristine, Some(span)) => self.reuse(span, indent),
            (NodeState::Touched, Some(span)) => {
                let mut edits = Vec::new();
                self.collect_edits(id, &mut edits);
                let relative: Vec<TextEdit> = edits
                    .into_iter()
                    .map(|edit| {
                        TextEdit::replace(
                            Span::new(edit.span.start - span.start, edit.span.end - span.start),
                            edit.replacement,
                        )
                    })
                    .collect();
                match apply_edits(span.slice(self.source()), &relative) {
                    Ok(text) => reindent(&text, line_indent(self.source(), span.start), indent),
                    Err(conflict) => {
                        tracing::debug!(%conflict, "falling back to a full reprint");
                        self.print_fresh(id, indent)
                    }
                }
            }
            _ => self.print_fresh(id, indent),
        }
    }

    /// The current text of a node with its first line at column zero.
    pub fn node_text(&self, id: NodeId) -> String {
        self.print(id, "")
    }

    fn reuse(&self, span: Span, indent: &str) -> String {
        reindent(
            span.slice(self.source()),
            line_indent(self.source(), span.start),
            indent,
        )
    }

    fn slot_changed(&self, child: NodeId, slot: Span) -> bool {
        let node = self.node(child);
        node.span != Some(slot) || node.state == NodeState::Rebuilt
    }

    fn slot_edit(&self, child: NodeId, slot: Option<Span>, edits: &mut Vec<TextEdit>) {
        let Some(slot) = slot else {
            return;
        };
        if self.slot_changed(child, slot) {
            let indent = line_indent(self.source(), slot.start).to_string();
            edits.push(TextEdit::replace(slot, self.print(child, &indent)));
        } else if self.node(child).state == NodeState::Touched {
            self.collect_edits(child, edits);
        }
    }

    fn collect_edits(&self, id: NodeId, edits: &mut Vec<TextEdit>) {
        match &self.node(id).kind {
            NodeKind::Object { properties: children } | NodeKind::Array { items: children } => {
                for child in children {
                    self.slot_edit(*child, self.node(*child).span, edits);
                }
            }
            NodeKind::Property(prop) => {
                if prop.key_dirty {
                    if let Some(key_span) = prop.key_span {
                        edits.push(TextEdit::replace(key_span, prop.key_text.clone()));
                    }
                }
                if let Some(value) = prop.value {
                    self.slot_edit(value, prop.value_span, edits);
                }
            }
            NodeKind::Function(func) => {
                if let Some(returned) = func.returned {
                    self.slot_edit(returned, func.returned_span, edits);
                }
            }
            NodeKind::Expr(_) => {}
        }
    }

    fn print_fresh(&self, id: NodeId, indent: &str) -> String {
        let unit = &self.options().indent;
        match &self.node(id).kind {
            NodeKind::Object { properties } => {
                if properties.is_empty() {
                    return "{}".to_string();
                }
                let inner = format!("{}{}", indent, unit);
                let lines: Vec<String> = properties
                    .iter()
                    .map(|p| format!("{}{}", inner, self.print(*p, &inner)))
                    .collect();
                format!("{{\n{}\n{}}}", lines.join(",\n"), indent)
            }
            NodeKind::Array { items } => {
                let items: Vec<String> = items.iter().map(|i| self.print(*i, indent)).collect();
                format!("[{}]", items.join(", "))
            }
            NodeKind::Property(prop) => match prop.form {
                PropertyForm::Shorthand => prop.key_text.clone(),
                PropertyForm::Verbatim => match (self.node(id).span, &prop.raw) {
                    (Some(span), _) => self.reuse(span, indent),
                    (None, Some(raw)) => reindent(raw, "", indent),
                    (None, None) => prop.key_text.clone(),
                },
                PropertyForm::Init => match prop.value {
                    Some(value) => format!("{}: {}", prop.key_text, self.print(value, indent)),
                    None => prop.key_text.clone(),
                },
                PropertyForm::Method => match prop.value.and_then(|v| self.function(v)) {
                    Some(func) => {
                        let mut out = String::new();
                        if func.is_async {
                            out.push_str("async ");
                        }
                        if func.generator {
                            out.push('*');
                        }
                        out.push_str(&prop.key_text);
                        out.push('(');
                        out.push_str(&func.params);
                        out.push_str(") ");
                        out.push_str(&self.print_body(func, indent, true));
                        out
                    }
                    None => prop.key_text.clone(),
                },
            },
            NodeKind::Function(func) => {
                let mut out = String::new();
                if func.is_async {
                    out.push_str("async ");
                }
                match func.style {
                    FunctionStyle::Arrow => {
                        out.push('(');
                        out.push_str(&func.params);
                        out.push_str(") => ");
                        out.push_str(&self.print_body(func, indent, false));
                    }
                    FunctionStyle::Expression | FunctionStyle::Method => {
                        out.push_str("function");
                        if func.generator {
                            out.push('*');
                        }
                        out.push('(');
                        out.push_str(&func.params);
                        out.push_str(") ");
                        out.push_str(&self.print_body(func, indent, true));
                    }
                }
                out
            }
            NodeKind::Expr(expr) => reindent(&expr.text, "", indent),
        }
    }

    /// Print a function body. Arrow expression bodies become a block with a
    /// `return` when `block` is set.
    fn print_body(&self, func: &Function, indent: &str, block: bool) -> String {
        let inner = format!("{}{}", indent, self.options().indent);
        let spliced = |span: Span| -> String {
            let mut edits = Vec::new();
            if let Some(returned) = func.returned {
                self.slot_edit(returned, func.returned_span, &mut edits);
            }
            let relative: Vec<TextEdit> = edits
                .into_iter()
                .filter(|e| span.contains(e.span))
                .map(|e| {
                    TextEdit::replace(
                        Span::new(e.span.start - span.start, e.span.end - span.start),
                        e.replacement,
                    )
                })
                .collect();
            let text = apply_edits(span.slice(self.source()), &relative)
                .unwrap_or_else(|_| span.slice(self.source()).to_string());
            reindent(&text, line_indent(self.source(), span.start), indent)
        };

        match &func.body {
            FunctionBody::Block(span) => spliced(*span),
            FunctionBody::Expression(span) => {
                let expr = spliced(*span);
                if block {
                    format!("{{\n{}return {};\n{}}}", inner, expr, indent)
                } else {
                    expr
                }
            }
            FunctionBody::Generated(statements) => {
                let mut lines: Vec<String> = statements
                    .iter()
                    .map(|s| format!("{}{}", inner, reindent(s, "", &inner)))
                    .collect();
                if let Some(returned) = func.returned {
                    lines.push(format!("{}return {};", inner, self.print(returned, &inner)));
                }
                if lines.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{\n{}\n{}}}", lines.join("\n"), indent)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{FormatOptions, ScriptLang, ScriptTree};
    use crate::node::Function;
    use pretty_assertions::assert_eq;

    fn tree(source: &str) -> ScriptTree {
        ScriptTree::parse(source, ScriptLang::Js, FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_fresh_layout() {
        let mut script = tree("export default {}");
        let def = script.definition();
        let object = script.new_object();
        let array = script.new_array();
        let a = script.new_string("a");
        let b = script.new_string("b");
        script.push_item(array, a);
        script.push_item(array, b);
        let list = script.new_property("list", array);
        script.push_property(object, list);
        let method = script.new_method("go", "x", vec!["return x;".to_string()]);
        script.push_property(object, method);
        let nested = script.new_property("nested", object);
        script.push_property(def, nested);
        assert_eq!(
            script.print(def, ""),
            "{\n    nested: {\n        list: ['a', 'b'],\n        go(x) {\n            return x;\n        }\n    }\n}"
        );
    }

    #[test]
    fn test_moved_function_keeps_body() {
        let source = "export default {\n    watch: {\n        foo(a, b) {\n            this.x = a;\n        }\n    }\n}";
        let mut script = tree(source);
        let watch = script.property_value(script.find_property(script.definition(), "watch").unwrap()).unwrap();
        let foo = script.find_property(watch, "foo").unwrap();
        let handler = script.property_value(foo).unwrap();
        let wrapper = script.new_object();
        let moved = script.new_property("handler", handler);
        script.push_property(wrapper, moved);
        script.set_property_value(foo, wrapper);
        assert_eq!(
            script.commit().unwrap(),
            "export default {\n    watch: {\n        foo: {\n            handler(a, b) {\n                this.x = a;\n            }\n        }\n    }\n}"
        );
    }

    #[test]
    fn test_generated_function_with_returned_object() {
        let mut script = tree("export default {}");
        let returned = script.new_object();
        let mut function = Function::method("", Vec::new());
        function.returned = Some(returned);
        let data = script.new_function(function);
        let prop = script.new_property("data", data);
        let def = script.definition();
        script.push_property(def, prop);
        assert_eq!(
            script.print(def, ""),
            "{\n    data() {\n        return {};\n    }\n}"
        );
    }

    #[test]
    fn test_touched_returned_object_is_spliced() {
        let source = "export default {\n    data() {\n        const x = 1; // note\n        return {\n            a: x\n        };\n    }\n}";
        let mut script = tree(source);
        let data = script.property_value(script.find_property(script.definition(), "data").unwrap()).unwrap();
        let object = script.returned_object(data).unwrap();
        let value = script.new_expr("2").unwrap();
        let b = script.new_property("b", value);
        script.push_property(object, b);
        assert_eq!(
            script.commit().unwrap(),
            "export default {\n    data() {\n        const x = 1; // note\n        return {\n            a: x,\n            b: 2\n        };\n    }\n}"
        );
    }
}
