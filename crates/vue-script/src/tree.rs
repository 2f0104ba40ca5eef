//! The script tree: an owned arena over the component definition.

use crate::error::{Result, ScriptError};
use crate::lower::{lower, ExportSite, ImportBinding};
use crate::node::{
    Expr, Function, FunctionBody, FunctionStyle, NodeId, NodeKind, NodeState, Property,
    PropertyForm, ScriptNode,
};
use crate::options::{FormatOptions, QuoteStyle, ScriptLang};
use crate::rename::validate_expression;
use smol_str::SmolStr;
use source_span::{apply_edits, line_indent, Span, TextEdit};

/// An import statement change waiting for the next commit.
#[derive(Debug, Clone)]
enum PendingImport {
    Add { local: SmolStr, path: String },
    Remove { span: Span },
}

/// A parsed component script.
///
/// The component definition object and everything below it is lowered into
/// an arena of owned nodes. Edits go through the arena; [`commit`] prints the
/// changed parts back into the original text and re-parses the result, so
/// after a commit every node is pristine again and spans refer to the
/// committed source.
///
/// [`commit`]: ScriptTree::commit
#[derive(Debug, Clone)]
pub struct ScriptTree {
    source: String,
    lang: ScriptLang,
    options: FormatOptions,
    nodes: Vec<ScriptNode>,
    definition: NodeId,
    export: ExportSite,
    imports: Vec<ImportBinding>,
    last_import_end: Option<u32>,
    first_statement_start: u32,
    pending: Vec<PendingImport>,
}

impl ScriptTree {
    /// Parse a script block.
    pub fn parse(source: &str, lang: ScriptLang, options: FormatOptions) -> Result<Self> {
        let lowered = lower(source, lang)?;
        tracing::trace!(
            nodes = lowered.nodes.len(),
            imports = lowered.imports.len(),
            "parsed script"
        );
        Ok(Self {
            source: source.to_string(),
            lang,
            options,
            nodes: lowered.nodes,
            definition: lowered.definition,
            export: lowered.export,
            imports: lowered.imports,
            last_import_end: lowered.last_import_end,
            first_statement_start: lowered.first_statement_start,
            pending: Vec::new(),
        })
    }

    /// The committed source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The script language.
    pub fn lang(&self) -> ScriptLang {
        self.lang
    }

    /// The formatting options.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// The component definition object.
    pub fn definition(&self) -> NodeId {
        self.definition
    }

    /// Access a node.
    pub fn node(&self, id: NodeId) -> &ScriptNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ScriptNode {
        &mut self.nodes[id.index()]
    }

    /// Default imports of the committed source.
    pub fn imports(&self) -> &[ImportBinding] {
        &self.imports
    }

    /// Whether there are uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        self.node(self.definition).state != NodeState::Pristine || !self.pending.is_empty()
    }

    pub(crate) fn export_site(&self) -> ExportSite {
        self.export
    }

    // Node accessors.

    /// The properties of an object node.
    pub fn properties(&self, object: NodeId) -> &[NodeId] {
        match &self.node(object).kind {
            NodeKind::Object { properties } => properties,
            _ => &[],
        }
    }

    /// The items of an array node.
    pub fn items(&self, array: NodeId) -> &[NodeId] {
        match &self.node(array).kind {
            NodeKind::Array { items } => items,
            _ => &[],
        }
    }

    /// The property payload of a node.
    pub fn property(&self, id: NodeId) -> Option<&Property> {
        match &self.node(id).kind {
            NodeKind::Property(prop) => Some(prop),
            _ => None,
        }
    }

    /// The function payload of a node.
    pub fn function(&self, id: NodeId) -> Option<&Function> {
        match &self.node(id).kind {
            NodeKind::Function(func) => Some(func),
            _ => None,
        }
    }

    /// The expression payload of a node.
    pub fn expr(&self, id: NodeId) -> Option<&Expr> {
        match &self.node(id).kind {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    /// Whether the node is an object literal.
    pub fn is_object(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Object { .. })
    }

    /// Whether the node is an array literal.
    pub fn is_array(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Array { .. })
    }

    /// The key of a property node.
    pub fn property_key(&self, id: NodeId) -> Option<&str> {
        self.property(id).map(|p| p.key.as_str())
    }

    /// The value of a property node.
    pub fn property_value(&self, id: NodeId) -> Option<NodeId> {
        self.property(id).and_then(|p| p.value)
    }

    /// Find a property of an object by key.
    pub fn find_property(&self, object: NodeId, key: &str) -> Option<NodeId> {
        self.properties(object).iter().copied().find(|id| {
            self.property(*id)
                .is_some_and(|p| p.key == key && p.form != PropertyForm::Verbatim)
        })
    }

    /// Keys of an object's properties, verbatim ones excluded.
    pub fn property_keys(&self, object: NodeId) -> Vec<SmolStr> {
        self.properties(object)
            .iter()
            .filter_map(|id| self.property(*id))
            .filter(|p| p.form != PropertyForm::Verbatim)
            .map(|p| p.key.clone())
            .collect()
    }

    /// The object a function returns.
    pub fn returned_object(&self, function: NodeId) -> Option<NodeId> {
        self.function(function).and_then(|f| f.returned)
    }

    /// The string value of an array item or expression.
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        self.expr(id).and_then(|e| e.string_value.as_deref())
    }

    // Node construction.

    fn alloc(&mut self, node: ScriptNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
    }

    /// A new empty object literal.
    pub fn new_object(&mut self) -> NodeId {
        self.alloc(ScriptNode::fresh(NodeKind::Object {
            properties: Vec::new(),
        }))
    }

    /// A new empty array literal.
    pub fn new_array(&mut self) -> NodeId {
        self.alloc(ScriptNode::fresh(NodeKind::Array { items: Vec::new() }))
    }

    /// A new expression from source text, validated as an expression.
    pub fn new_expr(&mut self, text: &str) -> Result<NodeId> {
        validate_expression(text, self.lang)?;
        Ok(self.new_expr_unchecked(text.trim()))
    }

    pub(crate) fn new_expr_unchecked(&mut self, text: &str) -> NodeId {
        self.alloc(ScriptNode::fresh(NodeKind::Expr(Expr {
            text: text.to_string(),
            string_value: None,
        })))
    }

    /// A new string literal quoted per the format options.
    pub fn new_string(&mut self, value: &str) -> NodeId {
        self.alloc(ScriptNode::fresh(NodeKind::Expr(Expr {
            text: self.options.quote.quote(value),
            string_value: Some(value.to_string()),
        })))
    }

    /// A new function node.
    pub fn new_function(&mut self, function: Function) -> NodeId {
        let returned = function.returned;
        let id = self.alloc(ScriptNode::fresh(NodeKind::Function(function)));
        if let Some(child) = returned {
            self.adopt(id, child);
        }
        id
    }

    /// A key as written for a name: bare when it is an identifier.
    pub fn key_text_for(&self, name: &str) -> String {
        if is_identifier(name) {
            name.to_string()
        } else {
            self.options.quote.quote(name)
        }
    }

    /// A new property. The form follows the value: method-style functions
    /// give `key() {}`, anything else `key: value`.
    pub fn new_property(&mut self, key: &str, value: NodeId) -> NodeId {
        self.detach(value);
        let form = self.form_for(value);
        let key_text = self.key_text_for(key);
        let id = self.alloc(ScriptNode::fresh(NodeKind::Property(Property::new(
            key,
            key_text,
            form,
            Some(value),
        ))));
        self.adopt(id, value);
        id
    }

    /// A new shorthand property `key`.
    pub fn new_shorthand(&mut self, key: &str) -> NodeId {
        self.alloc(ScriptNode::fresh(NodeKind::Property(Property::new(
            key,
            key.to_string(),
            PropertyForm::Shorthand,
            None,
        ))))
    }

    /// A new property kept as literal text, e.g. one printed by another tree.
    pub fn new_verbatim_property(&mut self, key: &str, text: &str) -> NodeId {
        let mut property = Property::new(key, key.to_string(), PropertyForm::Verbatim, None);
        property.raw = Some(text.to_string());
        self.alloc(ScriptNode::fresh(NodeKind::Property(property)))
    }

    /// A new method `key(params) { statements }`.
    pub fn new_method(&mut self, key: &str, params: &str, statements: Vec<String>) -> NodeId {
        let function = self.new_function(Function::method(params, statements));
        self.new_property(key, function)
    }

    fn form_for(&self, value: NodeId) -> PropertyForm {
        match self.function(value) {
            Some(f) if f.style == FunctionStyle::Method => PropertyForm::Method,
            _ => PropertyForm::Init,
        }
    }

    // Change tracking.

    fn method_owner(&self, function: NodeId) -> Option<NodeId> {
        let parent = self.node(function).parent?;
        match &self.node(parent).kind {
            NodeKind::Property(prop)
                if prop.form == PropertyForm::Method && prop.value == Some(function) =>
            {
                Some(parent)
            }
            _ => None,
        }
    }

    fn mark_ancestors(&mut self, id: NodeId) {
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            let node = self.node_mut(parent);
            if node.state == NodeState::Pristine {
                node.state = NodeState::Touched;
            }
            current = node.parent;
        }
    }

    pub(crate) fn mark_rebuilt(&mut self, id: NodeId) {
        self.node_mut(id).state = NodeState::Rebuilt;
        // A method's source slot starts at its parameters, so the whole
        // `key(params) {}` is reprinted.
        if let Some(owner) = self.method_owner(id) {
            self.node_mut(owner).state = NodeState::Rebuilt;
        }
        self.mark_ancestors(id);
    }

    pub(crate) fn mark_touched(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.state == NodeState::Pristine {
            node.state = NodeState::Touched;
        }
        self.mark_ancestors(id);
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        match &mut self.node_mut(parent).kind {
            NodeKind::Object { properties } => properties.retain(|p| *p != id),
            NodeKind::Array { items } => items.retain(|i| *i != id),
            NodeKind::Property(prop) => {
                if prop.value == Some(id) {
                    prop.value = None;
                }
            }
            NodeKind::Function(func) => {
                if func.returned == Some(id) {
                    func.returned = None;
                }
            }
            NodeKind::Expr(_) => {}
        }
        self.node_mut(id).parent = None;
        self.mark_rebuilt(parent);
    }

    // Mutation.

    /// Append a property to an object.
    pub fn push_property(&mut self, object: NodeId, property: NodeId) {
        let len = self.properties(object).len();
        self.insert_property(object, len, property);
    }

    /// Insert a property into an object at `index`.
    pub fn insert_property(&mut self, object: NodeId, index: usize, property: NodeId) {
        self.detach(property);
        if let NodeKind::Object { properties } = &mut self.node_mut(object).kind {
            let index = index.min(properties.len());
            properties.insert(index, property);
        }
        self.adopt(object, property);
        self.mark_rebuilt(object);
    }

    /// Remove the property with `key`. Returns the detached property.
    pub fn remove_property(&mut self, object: NodeId, key: &str) -> Option<NodeId> {
        let id = self.find_property(object, key)?;
        self.detach(id);
        Some(id)
    }

    /// Append an item to an array.
    pub fn push_item(&mut self, array: NodeId, item: NodeId) {
        self.detach(item);
        if let NodeKind::Array { items } = &mut self.node_mut(array).kind {
            items.push(item);
        }
        self.adopt(array, item);
        self.mark_rebuilt(array);
    }

    /// Remove an item from an array.
    pub fn remove_item(&mut self, item: NodeId) {
        self.detach(item);
    }

    /// Replace the value of a property.
    pub fn set_property_value(&mut self, property: NodeId, value: NodeId) {
        self.detach(value);
        let form = self.form_for(value);
        let old = self.property_value(property);
        let (same_form, has_slot) = match &mut self.node_mut(property).kind {
            NodeKind::Property(prop) => {
                let same = prop.form == form;
                prop.form = form;
                prop.value = Some(value);
                (same, prop.value_span.is_some())
            }
            _ => return,
        };
        if let Some(old) = old {
            if old != value && self.node(old).parent == Some(property) {
                self.node_mut(old).parent = None;
            }
        }
        self.adopt(property, value);
        if same_form && has_slot && form != PropertyForm::Method {
            // The slot keeps its place in the source; the value is spliced in.
            self.mark_touched(property);
        } else {
            self.mark_rebuilt(property);
        }
    }

    /// Rename a property key, keeping the quote style it was written with.
    pub fn rename_property(&mut self, property: NodeId, new_key: &str) {
        let (key_text, old_key, form, has_slot) = match self.property(property) {
            Some(prop) => {
                let key_text = match prop.key_text.chars().next() {
                    Some(q @ ('\'' | '"')) => format!("{q}{new_key}{q}"),
                    _ => self.key_text_for(new_key),
                };
                (key_text, prop.key.to_string(), prop.form, prop.key_span.is_some())
            }
            None => return,
        };

        // `{ Foo }` becomes `{ Bar: Foo }`.
        let shorthand_value = if form == PropertyForm::Shorthand {
            Some(self.new_expr_unchecked(&old_key))
        } else {
            None
        };

        if let NodeKind::Property(prop) = &mut self.node_mut(property).kind {
            prop.key = new_key.into();
            prop.key_text = key_text;
            prop.key_dirty = true;
            if let Some(value) = shorthand_value {
                prop.form = PropertyForm::Init;
                prop.value = Some(value);
            }
        }

        if let Some(value) = shorthand_value {
            self.adopt(property, value);
            self.mark_rebuilt(property);
        } else if has_slot {
            self.mark_touched(property);
        } else {
            self.mark_rebuilt(property);
        }
    }

    /// Replace the value of a string literal, keeping the quote it was
    /// written with.
    pub fn set_string_value(&mut self, id: NodeId, value: &str) -> bool {
        let quote = match self.expr(id) {
            Some(expr) if expr.string_value.is_some() => match expr.text.chars().next() {
                Some('"') => QuoteStyle::Double,
                Some('\'') => QuoteStyle::Single,
                _ => self.options.quote,
            },
            _ => return false,
        };
        if let NodeKind::Expr(expr) = &mut self.node_mut(id).kind {
            expr.text = quote.quote(value);
            expr.string_value = Some(value.to_string());
        }
        self.mark_rebuilt(id);
        true
    }

    /// Set the object a function returns.
    ///
    /// A function that already returns an object literal has it replaced, and
    /// a generated or empty body gains a `return` statement. Returns `false`,
    /// leaving the tree alone, for any other body.
    pub fn set_returned_object(&mut self, function: NodeId, object: NodeId) -> bool {
        let (has_slot, empty_block) = match self.function(function) {
            Some(func) => match &func.body {
                _ if func.returned_span.is_some() => (true, false),
                FunctionBody::Generated(_) => (false, false),
                FunctionBody::Block(span) => {
                    let inner = span.slice(&self.source);
                    let inner = inner.strip_prefix('{').unwrap_or(inner);
                    let inner = inner.strip_suffix('}').unwrap_or(inner);
                    if !inner.trim().is_empty() {
                        return false;
                    }
                    (false, true)
                }
                FunctionBody::Expression(_) => return false,
            },
            None => return false,
        };
        self.detach(object);
        if let NodeKind::Function(func) = &mut self.node_mut(function).kind {
            if empty_block {
                func.body = FunctionBody::Generated(Vec::new());
            }
            func.returned = Some(object);
        }
        self.adopt(function, object);
        if has_slot {
            self.mark_touched(function);
        } else {
            self.mark_rebuilt(function);
        }
        true
    }

    // Imports.

    /// Queue `import <local> from '<path>';`.
    pub fn add_import(&mut self, local: &str, path: &str) {
        self.pending.push(PendingImport::Add {
            local: local.into(),
            path: path.to_string(),
        });
    }

    /// Queue removal of the default import bound to `local`.
    pub fn remove_import(&mut self, local: &str) -> bool {
        let before = self.pending.len();
        self.pending
            .retain(|p| !matches!(p, PendingImport::Add { local: l, .. } if l == local));
        if self.pending.len() != before {
            return true;
        }
        match self.imports.iter().find(|i| i.local == local) {
            Some(binding) => {
                let mut span = binding.span;
                if self.source[span.end as usize..].starts_with('\n') {
                    span.end += 1;
                }
                self.pending.push(PendingImport::Remove { span });
                true
            }
            None => false,
        }
    }

    /// The module path a default import binds, pending imports included.
    pub fn import_source(&self, local: &str) -> Option<String> {
        self.pending
            .iter()
            .find_map(|p| match p {
                PendingImport::Add { local: l, path } if l == local => Some(path.clone()),
                _ => None,
            })
            .or_else(|| {
                self.imports
                    .iter()
                    .find(|i| i.local == local)
                    .map(|i| i.source.clone())
            })
    }

    fn import_edits(&self) -> Vec<TextEdit> {
        self.pending
            .iter()
            .map(|pending| match pending {
                PendingImport::Add { local, path } => {
                    let statement =
                        format!("import {} from {};", local, self.options.quote.quote(path));
                    match self.last_import_end {
                        Some(end) => TextEdit::insert(end, format!("\n{}", statement)),
                        None => {
                            TextEdit::insert(self.first_statement_start, format!("{}\n", statement))
                        }
                    }
                }
                PendingImport::Remove { span } => TextEdit::delete(*span),
            })
            .collect()
    }

    /// Print all changes into the source and re-parse it.
    ///
    /// Returns the new source. When the definition object of a plain
    /// `export default {...}` is reprinted, the statement ends with `;` unless
    /// the object is empty.
    pub fn commit(&mut self) -> Result<String> {
        if !self.is_dirty() {
            return Ok(self.source.clone());
        }

        let mut edits = self.import_edits();
        let site = self.export_site();
        match self.node(self.definition).state {
            NodeState::Pristine => {}
            NodeState::Rebuilt if site.direct => {
                let indent = line_indent(&self.source, site.statement.start).to_string();
                let object = self.print(self.definition, &indent);
                let semicolon = if object == "{}" { "" } else { ";" };
                edits.push(TextEdit::replace(
                    site.statement,
                    format!("export default {}{}", object, semicolon),
                ));
            }
            _ => {
                let indent = line_indent(&self.source, site.object.start).to_string();
                edits.push(TextEdit::replace(
                    site.object,
                    self.print(self.definition, &indent),
                ));
            }
        }

        let line_ending = self.options.line_ending;
        for edit in &mut edits {
            edit.replacement = line_ending.normalize(&edit.replacement);
        }
        let text = apply_edits(&self.source, &edits)?;
        tracing::debug!(edits = edits.len(), "committed script edits");
        *self = Self::parse(&text, self.lang, self.options.clone()).map_err(|err| match err {
            ScriptError::Syntax { message } => ScriptError::Syntax {
                message: format!("edited script no longer parses: {}", message),
            },
            other => other,
        })?;
        Ok(text)
    }

    /// Replace the committed source with `text` produced by raw edits.
    pub(crate) fn reset_source(&mut self, text: &str) -> Result<()> {
        *self = Self::parse(text, self.lang, self.options.clone())?;
        Ok(())
    }
}

/// Whether `name` can be written as a bare property key.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
