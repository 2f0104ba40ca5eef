//! Format-preserving editing of Vue component scripts.
//!
//! A [`ScriptTree`] holds the `export default { ... }` object of a component
//! script as an arena of owned nodes lowered from the oxc AST. Options are
//! reached through [`ScriptTree::option`], edited through the node API, and
//! printed back with [`ScriptTree::commit`], which keeps every untouched part
//! of the script byte for byte.
//!
//! ```ignore
//! let mut script = ScriptTree::parse(source, ScriptLang::Js, FormatOptions::default())?;
//! let methods = script.option(OptionKind::Methods);
//! let method = script.new_method("save", "", Vec::new());
//! script.push_property(methods, method);
//! let text = script.commit()?;
//! ```

mod accessor;
mod error;
mod lower;
mod node;
mod options;
mod print;
mod rename;
mod tree;

pub use error::{Result, ScriptError};
pub use lower::ImportBinding;
pub use node::{
    Expr, Function, FunctionBody, FunctionStyle, NodeId, NodeKind, NodeState, Property,
    PropertyForm, ScriptNode,
};
pub use options::{FormatOptions, OptionKind, QuoteStyle, ScriptLang};
pub use rename::{
    parse_expression_source, pattern_bindings, rename_identifiers_in_expression,
    this_reference_edits, validate_expression,
};
pub use tree::{is_identifier, ScriptTree};
