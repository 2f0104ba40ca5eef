//! Access to the top-level options of the component definition.

use crate::node::{Function, NodeId};
use crate::options::OptionKind;
use crate::tree::ScriptTree;

impl ScriptTree {
    /// The value of an option, created with its default value when absent.
    ///
    /// New options are appended after the existing ones. `props` starts as an
    /// empty array, `data` as a function returning an empty object and every
    /// other kind as an empty object.
    pub fn option(&mut self, kind: OptionKind) -> NodeId {
        if let Some(value) = self.find_option(kind) {
            return value;
        }
        let value = match kind {
            OptionKind::Props => self.new_array(),
            OptionKind::Data => {
                let returned = self.new_object();
                let mut factory = Function::method("", Vec::new());
                factory.returned = Some(returned);
                self.new_function(factory)
            }
            _ => self.new_object(),
        };
        let property = self.new_property(kind.as_str(), value);
        let definition = self.definition();
        self.push_property(definition, property);
        tracing::debug!(option = %kind, "created option");
        value
    }

    /// The value of an option, if present.
    pub fn find_option(&self, kind: OptionKind) -> Option<NodeId> {
        self.option_property(kind)
            .and_then(|property| self.property_value(property))
    }

    /// The property node holding an option.
    pub fn option_property(&self, kind: OptionKind) -> Option<NodeId> {
        self.find_property(self.definition(), kind.as_str())
    }

    /// The object holding the entries of an option: the option object itself,
    /// or the object `data` returns, created when the factory body is empty.
    ///
    /// `None` when `data` is not a function or its body ends in anything but
    /// an object literal.
    pub fn option_entries(&mut self, kind: OptionKind) -> Option<NodeId> {
        let value = self.option(kind);
        if kind != OptionKind::Data {
            return Some(value);
        }
        if let Some(object) = self.returned_object(value) {
            return Some(object);
        }
        self.function(value)?;
        let object = self.new_object();
        if self.set_returned_object(value, object) {
            Some(object)
        } else {
            tracing::debug!("data does not return an object literal");
            None
        }
    }

    /// The object holding the entries of an option, if present.
    pub fn find_option_entries(&self, kind: OptionKind) -> Option<NodeId> {
        let value = self.find_option(kind)?;
        if kind == OptionKind::Data {
            self.returned_object(value)
        } else {
            Some(value)
        }
    }

    /// Remove an option entirely. Returns whether it was present.
    pub fn remove_option(&mut self, kind: OptionKind) -> bool {
        let definition = self.definition();
        let removed = self.remove_property(definition, kind.as_str()).is_some();
        if removed {
            tracing::debug!(option = %kind, "removed option");
        }
        removed
    }

    /// Whether an option holds no entries.
    pub fn is_option_empty(&self, kind: OptionKind) -> bool {
        match self.find_option_entries(kind) {
            Some(entries) if self.is_array(entries) => self.items(entries).is_empty(),
            Some(entries) => self.properties(entries).is_empty(),
            None => true,
        }
    }

    /// Remove an option that no longer holds entries.
    pub fn prune_option(&mut self, kind: OptionKind) -> bool {
        if self.option_property(kind).is_some() && self.is_option_empty(kind) {
            self.remove_option(kind)
        } else {
            false
        }
    }
}
