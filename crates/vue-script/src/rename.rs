//! Expression validation and reference renaming.
//!
//! Script renames touch only accesses on the component instance: `this.foo`,
//! `this['foo']` and destructuring from `this`. Markup expressions are plain
//! expressions whose free identifiers are the instance members.

use crate::error::{Result, ScriptError};
use crate::options::ScriptLang;
use crate::tree::ScriptTree;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, BindingIdentifier, BindingPatternKind, ComputedMemberExpression,
    Expression, Function, IdentifierReference, ObjectProperty, Statement, StaticMemberExpression,
    VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::GetSpan;
use oxc_syntax::scope::ScopeFlags;
use source_span::{apply_edits, Span, TextEdit};

fn convert(span: oxc_span::Span) -> Span {
    Span::new(span.start, span.end)
}

/// Check that `text` is exactly one expression.
pub fn validate_expression(text: &str, lang: ScriptLang) -> Result<()> {
    let invalid = |message: String| ScriptError::InvalidExpression {
        text: text.to_string(),
        message,
    };
    if text.trim().is_empty() {
        return Err(invalid("empty expression".to_string()));
    }
    let allocator = Allocator::default();
    let wrapped = format!("({})", text);
    let ParserReturn {
        program, errors, ..
    } = Parser::new(&allocator, &wrapped, lang.source_type()).parse();
    if let Some(error) = errors.first() {
        return Err(invalid(error.to_string()));
    }
    match program.body.as_slice() {
        [Statement::ExpressionStatement(_)] => Ok(()),
        _ => Err(invalid("expected a single expression".to_string())),
    }
}

/// Validate a JavaScript expression, returning it trimmed.
pub fn parse_expression_source(text: &str) -> Result<String> {
    validate_expression(text, ScriptLang::Js)?;
    Ok(text.trim().to_string())
}

struct ThisReferences<'s> {
    old: &'s str,
    new: &'s str,
    edits: Vec<TextEdit>,
}

impl<'a> Visit<'a> for ThisReferences<'_> {
    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        if matches!(it.object, Expression::ThisExpression(_)) && it.property.name.as_str() == self.old
        {
            self.edits
                .push(TextEdit::replace(convert(it.property.span), self.new));
        }
        walk::walk_static_member_expression(self, it);
    }

    fn visit_computed_member_expression(&mut self, it: &ComputedMemberExpression<'a>) {
        if matches!(it.object, Expression::ThisExpression(_)) {
            if let Expression::StringLiteral(lit) = &it.expression {
                if lit.value.as_str() == self.old {
                    // Keep the quotes.
                    let inner = Span::new(lit.span.start + 1, lit.span.end - 1);
                    self.edits.push(TextEdit::replace(inner, self.new));
                }
            }
        }
        walk::walk_computed_member_expression(self, it);
    }

    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        if matches!(it.init, Some(Expression::ThisExpression(_))) {
            if let BindingPatternKind::ObjectPattern(pattern) = &it.id.kind {
                for property in &pattern.properties {
                    if property.computed
                        || property.key.static_name().as_deref() != Some(self.old)
                    {
                        continue;
                    }
                    // `{ foo } = this` keeps the local name: `{ bar: foo } = this`.
                    let replacement = if property.shorthand {
                        format!("{}: {}", self.new, self.old)
                    } else {
                        self.new.to_string()
                    };
                    self.edits
                        .push(TextEdit::replace(convert(property.key.span()), replacement));
                }
            }
        }
        walk::walk_variable_declarator(self, it);
    }
}

/// Edits renaming the instance member `old` to `new` in a script.
pub fn this_reference_edits(
    source: &str,
    lang: ScriptLang,
    old: &str,
    new: &str,
) -> Result<Vec<TextEdit>> {
    let allocator = Allocator::default();
    let ParserReturn {
        program, errors, ..
    } = Parser::new(&allocator, source, lang.source_type()).parse();
    if let Some(error) = errors.first() {
        return Err(ScriptError::Syntax {
            message: error.to_string(),
        });
    }
    let mut visitor = ThisReferences {
        old,
        new,
        edits: Vec::new(),
    };
    visitor.visit_program(&program);
    Ok(visitor.edits)
}

impl ScriptTree {
    /// Rename every `this` access of `old` to `new` and re-parse.
    ///
    /// Pending edits are committed first. Returns the number of references
    /// rewritten.
    pub fn rename_this_references(&mut self, old: &str, new: &str) -> Result<usize> {
        self.commit()?;
        let edits = this_reference_edits(self.source(), self.lang(), old, new)?;
        if edits.is_empty() {
            return Ok(0);
        }
        let text = apply_edits(self.source(), &edits)?;
        self.reset_source(&text)?;
        tracing::debug!(old, new, references = edits.len(), "renamed instance references");
        Ok(edits.len())
    }
}

#[derive(Default)]
struct Bindings {
    names: Vec<String>,
}

impl<'a> Visit<'a> for Bindings {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.push(it.name.to_string());
    }
}

struct FreeReferences<'s> {
    old: &'s str,
    new: &'s str,
    offset: u32,
    edits: Vec<TextEdit>,
}

impl FreeReferences<'_> {
    fn span(&self, span: oxc_span::Span) -> Span {
        Span::new(span.start - self.offset, span.end - self.offset)
    }
}

impl<'a> Visit<'a> for FreeReferences<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if it.name.as_str() == self.old {
            let span = self.span(it.span);
            self.edits.push(TextEdit::replace(span, self.new));
        }
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand && it.key.static_name().as_deref() == Some(self.old) {
            let span = self.span(it.span);
            self.edits
                .push(TextEdit::replace(span, format!("{}: {}", self.old, self.new)));
            return;
        }
        walk::walk_object_property(self, it);
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        let mut bindings = Bindings::default();
        bindings.visit_formal_parameters(&it.params);
        if bindings.names.iter().any(|name| name == self.old) {
            return;
        }
        walk::walk_arrow_function_expression(self, it);
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        let mut bindings = Bindings::default();
        bindings.visit_formal_parameters(&it.params);
        if bindings.names.iter().any(|name| name == self.old) {
            return;
        }
        walk::walk_function(self, it, flags);
    }
}

/// Rename free references to `old` in a markup expression.
///
/// `text` is parsed as an expression, or failing that as a statement list
/// (event handlers). Shorthand properties are expanded so their key stays,
/// and functions whose parameters bind `old` are left alone. Returns `None`
/// when the text does not parse.
pub fn rename_identifiers_in_expression(text: &str, old: &str, new: &str) -> Option<String> {
    let source_type = ScriptLang::Ts.source_type();
    let allocator = Allocator::default();
    let wrapped = format!("({})", text);
    let mut ret = Parser::new(&allocator, &wrapped, source_type).parse();
    let mut offset = 1;
    if !ret.errors.is_empty() {
        ret = Parser::new(&allocator, text, source_type).parse();
        offset = 0;
        if !ret.errors.is_empty() {
            return None;
        }
    }
    let mut visitor = FreeReferences {
        old,
        new,
        offset,
        edits: Vec::new(),
    };
    visitor.visit_program(&ret.program);
    apply_edits(text, &visitor.edits).ok()
}

/// Names bound by a parameter-like pattern such as a `v-for` alias or a slot
/// scope: `item`, `(item, index)`, `{ row }`.
pub fn pattern_bindings(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let source = if trimmed.starts_with('(') {
        format!("{} => 0", trimmed)
    } else {
        format!("({}) => 0", trimmed)
    };
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &source, ScriptLang::Ts.source_type()).parse();
    if !ret.errors.is_empty() {
        return Vec::new();
    }
    let mut bindings = Bindings::default();
    bindings.visit_program(&ret.program);
    bindings.names
}
