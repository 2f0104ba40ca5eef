//! Moving option entries from a donor document into a host document.

use crate::data::NO_RETURNED_OBJECT;
use crate::document::{find_entry, remove_entry, Document};
use crate::error::{EditorError, Result};
use crate::outcome::Outcome;
use vue_script::OptionKind;

impl Document {
    /// Move a component import and registration into the host.
    pub fn push_component(&mut self, name: &str, host: &mut Document) -> Result<Outcome> {
        self.edit_with(host, "push_component", |donor, host| {
            let script = donor.script_mut()?;
            let source = script
                .import_source(name)
                .ok_or_else(|| EditorError::not_found(OptionKind::Components, name))?;
            script.remove_import(name);
            if let Some(entries) = script.find_option(OptionKind::Components) {
                script.remove_property(entries, name);
                script.prune_option(OptionKind::Components);
            }
            host.register_import(name, &source)
        })
    }

    /// Move a data entry and its initializer into the host.
    pub fn push_data(&mut self, name: &str, host: &mut Document) -> Result<Outcome> {
        self.edit_with(host, "push_data", |donor, host| {
            let script = donor.script_mut()?;
            let entry = find_entry(script, OptionKind::Data, name)?;
            let initializer = script
                .property_value(entry)
                .map(|value| script.node_text(value))
                .ok_or_else(|| EditorError::unsupported(OptionKind::Data, name, "entry has no value"))?;
            remove_entry(script, OptionKind::Data, name)?;

            let target = host.script_mut()?;
            let entries = target
                .option_entries(OptionKind::Data)
                .ok_or_else(|| EditorError::unsupported(OptionKind::Data, name, NO_RETURNED_OBJECT))?;
            if target.find_property(entries, name).is_some() {
                return Err(EditorError::duplicate(OptionKind::Data, name));
            }
            let value = target.new_expr(&initializer)?;
            let entry = target.new_property(name, value);
            target.push_property(entries, entry);
            Ok(())
        })
    }

    /// Move a computed property into the host.
    pub fn push_computed(&mut self, name: &str, host: &mut Document) -> Result<Outcome> {
        self.push_entry(OptionKind::Computed, name, host)
    }

    /// Move a watcher into the host.
    pub fn push_watcher(&mut self, name: &str, host: &mut Document) -> Result<Outcome> {
        self.push_entry(OptionKind::Watch, name, host)
    }

    /// Move a method into the host.
    pub fn push_method(&mut self, name: &str, host: &mut Document) -> Result<Outcome> {
        self.push_entry(OptionKind::Methods, name, host)
    }

    /// Move a whole property, as written, between the same option of two
    /// documents.
    fn push_entry(&mut self, kind: OptionKind, name: &str, host: &mut Document) -> Result<Outcome> {
        self.edit_with(host, "push_entry", |donor, host| {
            let script = donor.script_mut()?;
            let entry = find_entry(script, kind, name)?;
            let text = script.node_text(entry);
            remove_entry(script, kind, name)?;

            let target = host.script_mut()?;
            let entries = target
                .option_entries(kind)
                .ok_or_else(|| EditorError::unsupported(kind, name, NO_RETURNED_OBJECT))?;
            if target.find_property(entries, name).is_some() {
                return Err(EditorError::duplicate(kind, name));
            }
            let moved = target.new_verbatim_property(name, &text);
            target.push_property(entries, moved);
            tracing::debug!(%kind, name, "pushed entry to host");
            Ok(())
        })
    }
}
