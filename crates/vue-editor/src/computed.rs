//! Computed properties: a getter `foo() {}` or `foo: { get() {}, set(v) {} }`.

use crate::document::{find_entry, remove_entry, Document};
use crate::error::{EditorError, Result};
use crate::info::{ComputedInfo, EntryForm};
use crate::outcome::Outcome;
use indexmap::IndexMap;
use smol_str::SmolStr;
use vue_script::OptionKind;

const KIND: OptionKind = OptionKind::Computed;

impl Document {
    /// Computed properties in source order.
    pub fn computed(&self) -> IndexMap<SmolStr, ComputedInfo> {
        let mut out = IndexMap::new();
        let Some(script) = self.script.as_ref() else {
            return out;
        };
        let Some(entries) = script.find_option(KIND) else {
            return out;
        };
        for entry in script.properties(entries) {
            let (Some(key), Some(value)) = (script.property_key(*entry), script.property_value(*entry)) else {
                continue;
            };
            let info = if script.is_object(value) {
                ComputedInfo {
                    form: EntryForm::Long,
                    has_setter: script.find_property(value, "set").is_some(),
                }
            } else {
                ComputedInfo {
                    form: EntryForm::Short,
                    has_setter: false,
                }
            };
            out.insert(SmolStr::from(key), info);
        }
        out
    }

    /// Add an empty getter `name() {}`. An existing entry is left as it is.
    pub fn add_computed(&mut self, name: &str) -> Result<Outcome> {
        self.edit("add_computed", |doc| {
            let script = doc.script_mut()?;
            let entries = script.option(KIND);
            if script.find_property(entries, name).is_none() {
                let getter = script.new_method(name, "", Vec::new());
                script.push_property(entries, getter);
            }
            Ok(())
        })
    }

    /// Turn a bare getter into `{ get, set(newValue) { this.name = newValue; } }`.
    pub fn add_computed_setter(&mut self, name: &str) -> Result<Outcome> {
        self.edit("add_computed_setter", |doc| {
            let script = doc.script_mut()?;
            let entry = find_entry(script, KIND, name)?;
            let getter = script
                .property_value(entry)
                .ok_or_else(|| EditorError::unsupported(KIND, name, "computed has no value"))?;
            if script.is_object(getter) {
                return Ok(());
            }
            if script.function(getter).is_none() {
                return Err(EditorError::unsupported(KIND, name, "getter is not a function"));
            }

            let object = script.new_object();
            let get = script.new_property("get", getter);
            script.push_property(object, get);
            let set = script.new_method(
                "set",
                "newValue",
                vec![format!("this.{} = newValue;", name)],
            );
            script.push_property(object, set);
            script.set_property_value(entry, object);
            Ok(())
        })
    }

    /// Drop the setter and keep the getter as the bare entry.
    pub fn remove_computed_setter(&mut self, name: &str) -> Result<Outcome> {
        self.edit("remove_computed_setter", |doc| {
            let script = doc.script_mut()?;
            let entry = find_entry(script, KIND, name)?;
            let Some(object) = script.property_value(entry).filter(|v| script.is_object(*v)) else {
                return Ok(());
            };
            let getter = script
                .find_property(object, "get")
                .and_then(|get| script.property_value(get))
                .ok_or_else(|| EditorError::unsupported(KIND, name, "computed has no getter"))?;
            script.set_property_value(entry, getter);
            Ok(())
        })
    }

    /// Remove a computed property, and the `computed` option once it is empty.
    pub fn remove_computed(&mut self, name: &str) -> Result<Outcome> {
        self.edit("remove_computed", |doc| remove_entry(doc.script_mut()?, KIND, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EMPTY: &str = "<script>\nexport default {}\n</script>";

    #[test]
    fn test_add_computed() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_computed("foo").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    computed: {\n        foo() {}\n    }\n};\n</script>"
        );
        assert_eq!(doc.computed()["foo"].form, EntryForm::Short);
    }

    #[test]
    fn test_setter_round_trip() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_computed("foo").unwrap();
        doc.add_computed_setter("foo").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    computed: {\n        foo: {\n            get() {},\n            set(newValue) {\n                this.foo = newValue;\n            }\n        }\n    }\n};\n</script>"
        );
        assert!(doc.computed()["foo"].has_setter);

        doc.remove_computed_setter("foo").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    computed: {\n        foo() {}\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_getter_body_kept() {
        let source = "<script>\nexport default {\n    computed: {\n        total() {\n            return this.a + this.b;\n        }\n    }\n}\n</script>";
        let mut doc = Document::parse(source).unwrap();
        doc.add_computed_setter("total").unwrap();
        assert!(doc
            .to_string()
            .contains("get() {\n                return this.a + this.b;\n            },"));
        doc.remove_computed_setter("total").unwrap();
        assert_eq!(doc.to_string(), source);
    }

    #[test]
    fn test_remove_computed() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_computed("foo").unwrap();
        doc.remove_computed("foo").unwrap();
        assert_eq!(doc.to_string(), EMPTY);

        doc.add_computed("bar").unwrap();
        doc.add_computed_setter("bar").unwrap();
        doc.remove_computed("bar").unwrap();
        assert_eq!(doc.to_string(), EMPTY);
    }

    #[test]
    fn test_setter_on_missing_entry() {
        let mut doc = Document::parse(EMPTY).unwrap();
        assert!(matches!(
            doc.add_computed_setter("nope"),
            Err(EditorError::NotFound { .. })
        ));
    }
}
