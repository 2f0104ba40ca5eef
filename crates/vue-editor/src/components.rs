//! Registered child components and their imports.

use crate::alias::component_name;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::info::ComponentInfo;
use crate::outcome::Outcome;
use indexmap::IndexMap;
use smol_str::SmolStr;
use vue_script::{NodeId, OptionKind, PropertyForm, ScriptTree};

const KIND: OptionKind = OptionKind::Components;

/// The local binding a `components` entry refers to.
fn binding_of(script: &ScriptTree, entry: NodeId) -> Option<String> {
    let property = script.property(entry)?;
    match (property.form, property.value) {
        (PropertyForm::Verbatim, _) => None,
        (_, Some(value)) => script.expr(value).map(|expr| expr.text.clone()),
        (_, None) => Some(property.key.to_string()),
    }
}

/// The `components` object, the key and the local binding of the entry
/// registering `name` as either binding or key.
fn registration(script: &ScriptTree, name: &str) -> Option<(NodeId, String, String)> {
    let entries = script.find_option(KIND)?;
    let entry = script
        .properties(entries)
        .iter()
        .copied()
        .find(|entry| binding_of(script, *entry).as_deref() == Some(name))
        .or_else(|| script.find_property(entries, name))?;
    let key = script.property_key(entry)?.to_string();
    let local = binding_of(script, entry).unwrap_or_else(|| name.to_string());
    Some((entries, key, local))
}

impl Document {
    /// Registered components in source order.
    pub fn components(&self) -> IndexMap<SmolStr, ComponentInfo> {
        let mut out = IndexMap::new();
        let Some(script) = self.script.as_ref() else {
            return out;
        };
        let Some(entries) = script.find_option(KIND) else {
            return out;
        };
        for entry in script.properties(entries) {
            let Some(local) = binding_of(script, *entry) else {
                continue;
            };
            let Some(key) = script.property_key(*entry) else {
                continue;
            };
            out.insert(
                SmolStr::from(key),
                ComponentInfo {
                    source: script.import_source(&local),
                },
            );
        }
        out
    }

    /// Import the component at `path` and register it.
    ///
    /// The local name is the file stem, and the path goes through the
    /// document's alias map.
    pub fn import_component(&mut self, path: &str) -> Result<Outcome> {
        self.edit("import_component", |doc| doc.register_component(path).map(drop))
    }

    /// Remove the import and the registration of a component.
    ///
    /// `name` is the imported binding or the key it is registered under;
    /// `Bar: Foo` is removed together with `import Foo` by either name.
    pub fn deport_component(&mut self, name: &str) -> Result<Outcome> {
        self.edit("deport_component", |doc| {
            let script = doc.script_mut()?;
            let registered = registration(script, name);
            let (imported, registered) = match registered {
                Some((entries, key, local)) => {
                    script.remove_property(entries, &key);
                    (script.remove_import(&local), true)
                }
                None => (script.remove_import(name), false),
            };
            if !imported && !registered {
                return Err(EditorError::not_found(KIND, name));
            }
            script.prune_option(KIND);
            Ok(())
        })
    }

    /// Add the import and the `components` entry for `path`, returning the
    /// component name.
    pub(crate) fn register_component(&mut self, path: &str) -> Result<String> {
        let name = component_name(path);
        let source = self.options.aliases.apply(path);
        self.register_import(&name, &source)?;
        Ok(name)
    }

    /// Import `name` from an already resolved module `source` and register it.
    pub(crate) fn register_import(&mut self, name: &str, source: &str) -> Result<()> {
        let script = self.script_mut()?;
        if script.import_source(name).is_none() {
            script.add_import(name, source);
        }
        let entries = script.option(KIND);
        if script.find_property(entries, name).is_none() {
            let entry = script.new_shorthand(name);
            script.push_property(entries, entry);
        }
        tracing::debug!(component = %name, source = %source, "registered component");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasMap;
    use crate::document::DocumentOptions;
    use pretty_assertions::assert_eq;

    const EMPTY: &str = "<script>\nexport default {}\n</script>";

    #[test]
    fn test_import_component() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.import_component("src/components/FooCmp.vue").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nimport FooCmp from '@/components/FooCmp.vue';\nexport default {\n    components: {\n        FooCmp\n    }\n};\n</script>"
        );
        assert_eq!(
            doc.components()["FooCmp"].source.as_deref(),
            Some("@/components/FooCmp.vue")
        );
    }

    #[test]
    fn test_deport_component() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.import_component("src/components/FooCmp.vue").unwrap();
        doc.deport_component("FooCmp").unwrap();
        assert_eq!(doc.to_string(), EMPTY);
        assert!(matches!(
            doc.deport_component("FooCmp"),
            Err(EditorError::NotFound { .. })
        ));
    }

    #[test]
    fn test_deport_aliased_registration() {
        let source = "<script>\nimport Foo from './Foo.vue';\nexport default {\n    components: {\n        Bar: Foo\n    }\n}\n</script>";
        let expected = "<script>\nexport default {}\n</script>";
        let mut by_binding = Document::parse(source).unwrap();
        by_binding.deport_component("Foo").unwrap();
        assert!(by_binding.components().is_empty());
        assert_eq!(by_binding.to_string(), expected);

        let mut by_key = Document::parse(source).unwrap();
        by_key.deport_component("Bar").unwrap();
        assert_eq!(by_key.to_string(), expected);
    }

    #[test]
    fn test_second_import_goes_after_the_first() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.import_component("src/A.vue").unwrap();
        doc.import_component("src/B.vue").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nimport A from '@/A.vue';\nimport B from '@/B.vue';\nexport default {\n    components: {\n        A,\n        B\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_without_aliases() {
        let options = DocumentOptions {
            aliases: AliasMap::empty(),
            ..DocumentOptions::default()
        };
        let mut doc = Document::parse_with(EMPTY, options).unwrap();
        doc.import_component("./Card.vue").unwrap();
        assert!(doc.to_string().contains("import Card from './Card.vue';"));
    }

    #[test]
    fn test_renamed_registration() {
        let doc = Document::parse(
            "<script>\nimport Foo from './Foo.vue';\nexport default {\n    components: { Bar: Foo }\n}\n</script>",
        )
        .unwrap();
        assert_eq!(doc.components()["Bar"].source.as_deref(), Some("./Foo.vue"));
    }
}
