//! Lightweight descriptions of option entries for choice lists.

use serde::Serialize;
use smol_str::SmolStr;

/// How a prop is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropShape {
    /// A name in `props: ['a', 'b']`.
    Listed,
    /// A descriptor object `a: { type: String }`.
    Descriptor,
    /// Any other value, usually a bare type `a: String`.
    Expression,
}

/// A declared prop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropInfo {
    /// The declaration shape.
    pub shape: PropShape,
    /// Descriptor attribute names, in source order.
    pub attributes: Vec<SmolStr>,
    /// The declared value for non-listed props.
    pub value: Option<String>,
}

/// A data entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataInfo {
    /// The initializer source.
    pub initializer: String,
}

/// Whether a watcher or computed property is a bare function or an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryForm {
    /// `foo() {}`
    Short,
    /// `foo: { ... }`
    Long,
}

/// A watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatcherInfo {
    /// The declaration form.
    pub form: EntryForm,
    /// Options set besides the handler, such as `deep`.
    pub options: Vec<SmolStr>,
    /// Parameters of the handler, when it is a function.
    pub params: Option<String>,
}

/// A computed property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedInfo {
    /// The declaration form.
    pub form: EntryForm,
    /// Whether a setter is declared.
    pub has_setter: bool,
}

/// A method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    /// The parameter list.
    pub params: String,
    /// Declared `async`.
    pub is_async: bool,
}

/// A registered component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    /// The module it is imported from, when imported in this script.
    pub source: Option<String>,
}
