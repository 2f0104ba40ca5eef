//! Lowering of the oxc AST into the owned script arena.

use crate::error::{Result, ScriptError};
use crate::node::{
    Expr, Function, FunctionBody, FunctionStyle, NodeId, NodeKind, Property, PropertyForm,
    ScriptNode,
};
use crate::options::ScriptLang;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpression, ArrayExpressionElement, Argument, ArrowFunctionExpression,
    ExportDefaultDeclarationKind, Expression, Function as OxcFunction, FunctionBody as OxcBody,
    ImportDeclarationSpecifier, ObjectExpression, ObjectProperty, ObjectPropertyKind,
    PropertyKind, Statement,
};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::GetSpan;
use smol_str::SmolStr;
use source_span::Span;

/// Where the definition object sits in the program.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExportSite {
    /// The whole `export default ...` statement.
    pub statement: Span,
    /// The definition object.
    pub object: Span,
    /// Whether the object is the exported expression itself.
    pub direct: bool,
}

/// A default import binding found at the top of the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// The local name.
    pub local: SmolStr,
    /// The module specifier.
    pub source: String,
    /// The whole import statement.
    pub span: Span,
}

pub(crate) struct Lowered {
    pub nodes: Vec<ScriptNode>,
    pub definition: NodeId,
    pub export: ExportSite,
    pub imports: Vec<ImportBinding>,
    pub last_import_end: Option<u32>,
    pub first_statement_start: u32,
}

fn convert(span: oxc_span::Span) -> Span {
    Span::new(span.start, span.end)
}

/// Parse `source` and lower it.
pub(crate) fn lower(source: &str, lang: ScriptLang) -> Result<Lowered> {
    let allocator = Allocator::default();
    let ParserReturn {
        program, errors, ..
    } = Parser::new(&allocator, source, lang.source_type()).parse();

    if let Some(error) = errors.first() {
        return Err(ScriptError::Syntax {
            message: error.to_string(),
        });
    }

    let mut lowerer = Lowerer {
        source,
        nodes: Vec::new(),
    };
    let mut imports = Vec::new();
    let mut last_import_end = None;
    let mut definition = None;
    let first_statement_start = program
        .body
        .first()
        .map(|stmt| stmt.span().start)
        .unwrap_or(0);

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                last_import_end = Some(decl.span.end);
                for specifier in decl.specifiers.iter().flatten() {
                    if let ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) = specifier {
                        imports.push(ImportBinding {
                            local: spec.local.name.as_str().into(),
                            source: decl.source.value.to_string(),
                            span: convert(decl.span),
                        });
                    }
                }
            }
            Statement::ExportDefaultDeclaration(decl) if definition.is_none() => {
                let statement = convert(decl.span);
                let found = match &decl.declaration {
                    ExportDefaultDeclarationKind::ObjectExpression(obj) => Some((obj, true)),
                    ExportDefaultDeclarationKind::CallExpression(call) => {
                        call.arguments.iter().find_map(|arg| match arg {
                            Argument::ObjectExpression(obj) => Some((obj, false)),
                            _ => None,
                        })
                    }
                    _ => None,
                };
                if let Some((obj, direct)) = found {
                    let id = lowerer.object(obj);
                    definition = Some((
                        id,
                        ExportSite {
                            statement,
                            object: convert(obj.span),
                            direct,
                        },
                    ));
                }
            }
            _ => {}
        }
    }

    let (definition, export) = definition.ok_or(ScriptError::MissingDefinition)?;
    Ok(Lowered {
        nodes: lowerer.nodes,
        definition,
        export,
        imports,
        last_import_end,
        first_statement_start,
    })
}

struct Lowerer<'s> {
    source: &'s str,
    nodes: Vec<ScriptNode>,
}

impl Lowerer<'_> {
    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ScriptNode::parsed(kind, span));
        id
    }

    fn adopt(&mut self, parent: NodeId, children: &[NodeId]) {
        for child in children {
            self.nodes[child.index()].parent = Some(parent);
        }
    }

    fn text(&self, span: Span) -> String {
        span.slice(self.source).to_string()
    }

    fn object(&mut self, obj: &ObjectExpression<'_>) -> NodeId {
        let properties: Vec<NodeId> = obj
            .properties
            .iter()
            .map(|prop| match prop {
                ObjectPropertyKind::ObjectProperty(p) => self.property(p),
                ObjectPropertyKind::SpreadProperty(spread) => self.verbatim(convert(spread.span)),
            })
            .collect();
        let id = self.alloc(
            NodeKind::Object {
                properties: properties.clone(),
            },
            convert(obj.span),
        );
        self.adopt(id, &properties);
        id
    }

    fn array(&mut self, arr: &ArrayExpression<'_>) -> NodeId {
        let items: Vec<NodeId> = arr
            .elements
            .iter()
            .filter(|el| !matches!(el, ArrayExpressionElement::Elision(_)))
            .map(|el| match el.as_expression() {
                Some(expr) => self.expression(expr),
                None => self.expr_text(convert(el.span())),
            })
            .collect();
        let id = self.alloc(
            NodeKind::Array {
                items: items.clone(),
            },
            convert(arr.span),
        );
        self.adopt(id, &items);
        id
    }

    fn verbatim(&mut self, span: Span) -> NodeId {
        let text = self.text(span);
        let property = Property::new(&text, text.clone(), PropertyForm::Verbatim, None);
        self.alloc(NodeKind::Property(property), span)
    }

    fn property(&mut self, prop: &ObjectProperty<'_>) -> NodeId {
        let span = convert(prop.span);
        if prop.computed || !matches!(prop.kind, PropertyKind::Init) {
            return self.verbatim(span);
        }
        let Some(key) = prop.key.static_name() else {
            return self.verbatim(span);
        };
        let key_span = convert(prop.key.span());
        let key_text = self.text(key_span);

        let (form, value, value_span) = if prop.shorthand {
            (PropertyForm::Shorthand, None, None)
        } else if prop.method {
            match &prop.value {
                Expression::FunctionExpression(func) => {
                    let id = self.function(func, FunctionStyle::Method);
                    (PropertyForm::Method, Some(id), Some(convert(func.span)))
                }
                _ => return self.verbatim(span),
            }
        } else {
            let id = self.expression(&prop.value);
            (PropertyForm::Init, Some(id), Some(convert(prop.value.span())))
        };

        let mut property = Property::new(&key, key_text, form, value);
        property.key_span = Some(key_span);
        property.value_span = value_span;
        let id = self.alloc(NodeKind::Property(property), span);
        if let Some(value) = value {
            self.adopt(id, &[value]);
        }
        id
    }

    fn expression(&mut self, expr: &Expression<'_>) -> NodeId {
        match expr {
            Expression::ObjectExpression(obj) => self.object(obj),
            Expression::ArrayExpression(arr) => self.array(arr),
            Expression::FunctionExpression(func) => self.function(func, FunctionStyle::Expression),
            Expression::ArrowFunctionExpression(arrow) => self.arrow(arrow),
            Expression::StringLiteral(lit) => {
                let span = convert(lit.span);
                let expr = Expr {
                    text: self.text(span),
                    string_value: Some(lit.value.to_string()),
                };
                self.alloc(NodeKind::Expr(expr), span)
            }
            other => self.expr_text(convert(other.span())),
        }
    }

    fn expr_text(&mut self, span: Span) -> NodeId {
        let expr = Expr {
            text: self.text(span),
            string_value: None,
        };
        self.alloc(NodeKind::Expr(expr), span)
    }

    fn params(&self, span: Span) -> String {
        let text = span.slice(self.source).trim();
        text.strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .unwrap_or(text)
            .to_string()
    }

    /// The object literal returned by the last statement of a block body.
    fn returned_object(&mut self, body: &OxcBody<'_>) -> Option<(NodeId, Span)> {
        match body.statements.last()? {
            Statement::ReturnStatement(ret) => match ret.argument.as_ref()? {
                Expression::ObjectExpression(obj) => Some((self.object(obj), convert(obj.span))),
                _ => None,
            },
            _ => None,
        }
    }

    fn function(&mut self, func: &OxcFunction<'_>, style: FunctionStyle) -> NodeId {
        let params = self.params(convert(func.params.span));
        let (body, returned) = match &func.body {
            Some(body) => (
                FunctionBody::Block(convert(body.span)),
                self.returned_object(body),
            ),
            None => (FunctionBody::Generated(Vec::new()), None),
        };
        let function = Function {
            style,
            is_async: func.r#async,
            generator: func.generator,
            params,
            body,
            returned: returned.map(|(id, _)| id),
            returned_span: returned.map(|(_, span)| span),
        };
        let id = self.alloc(NodeKind::Function(function), convert(func.span));
        if let Some((child, _)) = returned {
            self.adopt(id, &[child]);
        }
        id
    }

    fn arrow(&mut self, arrow: &ArrowFunctionExpression<'_>) -> NodeId {
        let params = self.params(convert(arrow.params.span));
        let (body, returned) = if arrow.expression {
            let expr = arrow.body.statements.first().and_then(|stmt| match stmt {
                Statement::ExpressionStatement(es) => Some(&es.expression),
                _ => None,
            });
            match expr {
                Some(expr) => {
                    let returned = match expr.without_parentheses() {
                        Expression::ObjectExpression(obj) => {
                            Some((self.object(obj), convert(obj.span)))
                        }
                        _ => None,
                    };
                    (FunctionBody::Expression(convert(expr.span())), returned)
                }
                None => (FunctionBody::Block(convert(arrow.body.span)), None),
            }
        } else {
            (
                FunctionBody::Block(convert(arrow.body.span)),
                self.returned_object(&arrow.body),
            )
        };
        let function = Function {
            style: FunctionStyle::Arrow,
            is_async: arrow.r#async,
            generator: false,
            params,
            body,
            returned: returned.map(|(id, _)| id),
            returned_span: returned.map(|(_, span)| span),
        };
        let id = self.alloc(NodeKind::Function(function), convert(arrow.span));
        if let Some((child, _)) = returned {
            self.adopt(id, &[child]);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(lowered: &Lowered, id: NodeId) -> &NodeKind {
        &lowered.nodes[id.index()].kind
    }

    #[test]
    fn test_lowers_definition_and_imports() {
        let source = "import Foo from '@/Foo.vue';\nexport default {\n    props: ['a'],\n    data() {\n        return { b: 1 };\n    }\n}\n";
        let lowered = lower(source, ScriptLang::Js).unwrap();
        assert_eq!(lowered.imports.len(), 1);
        assert_eq!(lowered.imports[0].local, "Foo");
        assert_eq!(lowered.imports[0].source, "@/Foo.vue");
        assert!(lowered.export.direct);

        let NodeKind::Object { properties } = kind_of(&lowered, lowered.definition) else {
            panic!("definition is not an object");
        };
        assert_eq!(properties.len(), 2);
        let NodeKind::Property(data) = kind_of(&lowered, properties[1]) else {
            panic!("expected property");
        };
        assert_eq!(data.key, "data");
        assert_eq!(data.form, PropertyForm::Method);
        let NodeKind::Function(func) = kind_of(&lowered, data.value.unwrap()) else {
            panic!("expected function");
        };
        assert!(func.returned.is_some());
    }

    #[test]
    fn test_define_component_wrapper() {
        let source = "import { defineComponent } from 'vue';\nexport default defineComponent({ name: 'X' });\n";
        let lowered = lower(source, ScriptLang::Ts).unwrap();
        assert!(!lowered.export.direct);
        assert!(lowered.imports.is_empty());
    }

    #[test]
    fn test_missing_definition() {
        let err = lower("const a = 1;", ScriptLang::Js).err().unwrap();
        assert!(matches!(err, ScriptError::MissingDefinition));
    }

    #[test]
    fn test_syntax_error() {
        let err = lower("export default {", ScriptLang::Js).err().unwrap();
        assert!(matches!(err, ScriptError::Syntax { .. }));
    }

    #[test]
    fn test_arrow_data_returns_object() {
        let source = "export default { data: () => ({ a: 1 }) }";
        let lowered = lower(source, ScriptLang::Js).unwrap();
        let NodeKind::Object { properties } = kind_of(&lowered, lowered.definition) else {
            panic!("definition is not an object");
        };
        let NodeKind::Property(data) = kind_of(&lowered, properties[0]) else {
            panic!("expected property");
        };
        let NodeKind::Function(func) = kind_of(&lowered, data.value.unwrap()) else {
            panic!("expected function");
        };
        assert_eq!(func.style, FunctionStyle::Arrow);
        assert!(func.returned.is_some());
    }
}
