//! Node types of the script tree.

use smol_str::SmolStr;
use source_span::Span;

/// Handle to a node stored in a [`ScriptTree`](crate::ScriptTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How much of a node differs from the source it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Identical to its source text.
    Pristine,
    /// Some descendant or slot changed; the rest is original text.
    Touched,
    /// Printed from scratch.
    Rebuilt,
}

/// A node of the script tree.
#[derive(Debug, Clone)]
pub struct ScriptNode {
    /// What the node is.
    pub kind: NodeKind,
    pub(crate) span: Option<Span>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) state: NodeState,
}

impl ScriptNode {
    pub(crate) fn parsed(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span: Some(span),
            parent: None,
            state: NodeState::Pristine,
        }
    }

    pub(crate) fn fresh(kind: NodeKind) -> Self {
        Self {
            kind,
            span: None,
            parent: None,
            state: NodeState::Rebuilt,
        }
    }

    /// The span of the node in the committed source.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// The edit state of the node.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// The parent node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// The payload of a script node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An object literal.
    Object { properties: Vec<NodeId> },
    /// An array literal.
    Array { items: Vec<NodeId> },
    /// A property of an object literal.
    Property(Property),
    /// A function or arrow function.
    Function(Function),
    /// Any other expression, kept as text.
    Expr(Expr),
}

/// The surface syntax of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyForm {
    /// `key: value`
    Init,
    /// `key(params) { body }`
    Method,
    /// `key`
    Shorthand,
    /// Spreads, computed keys and accessors, kept as text.
    Verbatim,
}

/// A property of an object literal.
#[derive(Debug, Clone)]
pub struct Property {
    /// The static key name.
    pub key: SmolStr,
    /// The key as written, quotes included.
    pub(crate) key_text: String,
    pub(crate) key_span: Option<Span>,
    pub(crate) key_dirty: bool,
    /// The surface syntax.
    pub form: PropertyForm,
    /// The value, absent for shorthand and verbatim properties.
    pub value: Option<NodeId>,
    pub(crate) value_span: Option<Span>,
    /// Text of a verbatim property that has no source position.
    pub(crate) raw: Option<String>,
}

impl Property {
    pub(crate) fn new(key: &str, key_text: String, form: PropertyForm, value: Option<NodeId>) -> Self {
        Self {
            key: key.into(),
            key_text,
            key_span: None,
            key_dirty: false,
            form,
            value,
            value_span: None,
            raw: None,
        }
    }

    /// The key as written.
    pub fn key_text(&self) -> &str {
        &self.key_text
    }
}

/// The surface syntax of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionStyle {
    /// Method shorthand inside an object literal.
    Method,
    /// `function (...) {...}`
    Expression,
    /// `(...) => ...`
    Arrow,
}

/// Where a function body comes from.
#[derive(Debug, Clone)]
pub enum FunctionBody {
    /// A block in the source, braces included.
    Block(Span),
    /// The expression body of an arrow function.
    Expression(Span),
    /// Generated statements, one per line.
    Generated(Vec<String>),
}

/// A function value.
#[derive(Debug, Clone)]
pub struct Function {
    /// The surface syntax.
    pub style: FunctionStyle,
    /// Declared `async`.
    pub is_async: bool,
    /// Declared as a generator.
    pub generator: bool,
    /// Parameter list without parentheses.
    pub params: String,
    pub(crate) body: FunctionBody,
    /// The object literal the body ends by returning.
    pub returned: Option<NodeId>,
    pub(crate) returned_span: Option<Span>,
}

impl Function {
    /// A new method-style function with generated body statements.
    pub fn method(params: impl Into<String>, statements: Vec<String>) -> Self {
        Self {
            style: FunctionStyle::Method,
            is_async: false,
            generator: false,
            params: params.into(),
            body: FunctionBody::Generated(statements),
            returned: None,
            returned_span: None,
        }
    }

    /// The body source.
    pub fn body(&self) -> &FunctionBody {
        &self.body
    }
}

/// An expression kept as text.
#[derive(Debug, Clone)]
pub struct Expr {
    /// The expression source.
    pub text: String,
    /// The value, when the expression is a string literal.
    pub string_value: Option<String>,
}
