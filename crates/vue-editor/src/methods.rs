//! Methods.

use crate::document::{remove_entry, Document};
use crate::error::Result;
use crate::info::MethodInfo;
use crate::outcome::Outcome;
use indexmap::IndexMap;
use smol_str::SmolStr;
use vue_script::OptionKind;

const KIND: OptionKind = OptionKind::Methods;

impl Document {
    /// Methods in source order. Entries that are not functions are skipped.
    pub fn methods(&self) -> IndexMap<SmolStr, MethodInfo> {
        let mut out = IndexMap::new();
        let Some(script) = self.script.as_ref() else {
            return out;
        };
        let Some(entries) = script.find_option(KIND) else {
            return out;
        };
        for entry in script.properties(entries) {
            let Some(key) = script.property_key(*entry) else {
                continue;
            };
            if let Some(function) = script.property_value(*entry).and_then(|v| script.function(v)) {
                out.insert(
                    SmolStr::from(key),
                    MethodInfo {
                        params: function.params.clone(),
                        is_async: function.is_async,
                    },
                );
            }
        }
        out
    }

    /// Add `name() {}`. An existing method is left as it is.
    pub fn add_method(&mut self, name: &str) -> Result<Outcome> {
        self.edit("add_method", |doc| {
            let script = doc.script_mut()?;
            let entries = script.option(KIND);
            if script.find_property(entries, name).is_none() {
                let method = script.new_method(name, "", Vec::new());
                script.push_property(entries, method);
            }
            Ok(())
        })
    }

    /// Remove a method, and the `methods` option once it is empty.
    pub fn remove_method(&mut self, name: &str) -> Result<Outcome> {
        self.edit("remove_method", |doc| remove_entry(doc.script_mut()?, KIND, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use pretty_assertions::assert_eq;

    const EMPTY: &str = "<script>\nexport default {}\n</script>";

    #[test]
    fn test_add_method() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_method("foo").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    methods: {\n        foo() {}\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_remove_method() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_method("foo").unwrap();
        doc.remove_method("foo").unwrap();
        assert_eq!(doc.to_string(), EMPTY);
        assert!(matches!(
            doc.remove_method("foo"),
            Err(EditorError::NotFound { .. })
        ));
    }

    #[test]
    fn test_methods_query() {
        let doc = Document::parse(
            "<script>\nexport default {\n    methods: {\n        async load(id) {},\n        ...helpers,\n        save: function () {}\n    }\n}\n</script>",
        )
        .unwrap();
        let methods = doc.methods();
        assert_eq!(methods.keys().collect::<Vec<_>>(), ["load", "save"]);
        assert!(methods["load"].is_async);
        assert_eq!(methods["load"].params, "id");
    }
}
