//! Data: the object returned by the `data()` factory.

use crate::document::{find_entry, remove_entry, Document};
use crate::error::{EditorError, Result};
use crate::info::DataInfo;
use crate::outcome::Outcome;
use indexmap::IndexMap;
use smol_str::SmolStr;
use source_span::SourceRange;
use vue_script::OptionKind;

const KIND: OptionKind = OptionKind::Data;

pub(crate) const NO_RETURNED_OBJECT: &str = "data does not return an object literal";

impl Document {
    /// Data entries in source order.
    pub fn data(&self) -> IndexMap<SmolStr, DataInfo> {
        let mut out = IndexMap::new();
        let Some(script) = self.script.as_ref() else {
            return out;
        };
        let Some(entries) = script.find_option_entries(KIND) else {
            return out;
        };
        for entry in script.properties(entries) {
            if let (Some(key), Some(value)) = (script.property_key(*entry), script.property_value(*entry)) {
                out.insert(
                    SmolStr::from(key),
                    DataInfo {
                        initializer: script.node_text(value),
                    },
                );
            }
        }
        out
    }

    /// Add `name: <source>` to the returned data object. An existing entry is
    /// left as it is.
    pub fn add_data(&mut self, name: &str, source: &str) -> Result<Outcome> {
        self.edit("add_data", |doc| {
            let script = doc.script_mut()?;
            let value = script.new_expr(source)?;
            let entries = script
                .option_entries(KIND)
                .ok_or_else(|| EditorError::unsupported(KIND, name, NO_RETURNED_OBJECT))?;
            if script.find_property(entries, name).is_none() {
                let entry = script.new_property(name, value);
                script.push_property(entries, entry);
            }
            Ok(())
        })
    }

    /// Replace the initializer of an existing entry.
    pub fn set_data(&mut self, name: &str, source: &str) -> Result<Outcome> {
        self.edit("set_data", |doc| {
            let script = doc.script_mut()?;
            let entry = find_entry(script, KIND, name)?;
            let value = script.new_expr(source)?;
            script.set_property_value(entry, value);
            Ok(())
        })
    }

    /// Remove an entry, and the `data` option once it returns nothing.
    pub fn remove_data(&mut self, name: &str) -> Result<Outcome> {
        self.edit("remove_data", |doc| remove_entry(doc.script_mut()?, KIND, name))
    }

    /// Where the initializer of an entry sits in the document.
    pub fn locate_data(&self, name: &str) -> Result<SourceRange> {
        let script = self.script_ref()?;
        let value = script
            .property_value(find_entry(script, KIND, name)?)
            .ok_or_else(|| EditorError::not_found(KIND, name))?;
        self.node_range(KIND, name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EMPTY: &str = "<script>\nexport default {}\n</script>";

    #[test]
    fn test_add_data() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_data("foo", "'bar'").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    data() {\n        return {\n            foo: 'bar'\n        };\n    }\n};\n</script>"
        );
        assert_eq!(doc.data()["foo"].initializer, "'bar'");
    }

    #[test]
    fn test_add_data_to_empty_factory() {
        let mut doc = Document::parse("<script>\nexport default {\n    data() {}\n}\n</script>").unwrap();
        doc.add_data("foo", "1").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    data() {\n        return {\n            foo: 1\n        };\n    }\n}\n</script>"
        );
        assert_eq!(doc.data()["foo"].initializer, "1");
    }

    #[test]
    fn test_add_data_without_returned_object() {
        for source in [
            "<script>\nexport default {\n    data: {}\n}\n</script>",
            "<script>\nexport default {\n    data() {\n        return state;\n    }\n}\n</script>",
        ] {
            let mut doc = Document::parse(source).unwrap();
            assert!(matches!(
                doc.add_data("foo", "1"),
                Err(EditorError::UnsupportedShape { .. })
            ));
            assert_eq!(doc.to_string(), source);
        }
    }

    #[test]
    fn test_set_data() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_data("bar", "'initial-value'").unwrap();
        doc.set_data("bar", "'new-value'").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    data() {\n        return {\n            bar: 'new-value'\n        };\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_set_missing_data() {
        let mut doc = Document::parse(EMPTY).unwrap();
        assert!(matches!(
            doc.set_data("nope", "1"),
            Err(EditorError::NotFound { .. })
        ));
        assert_eq!(doc.to_string(), EMPTY);
    }

    #[test]
    fn test_remove_data_prunes_option() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_data("bar", "'value'").unwrap();
        doc.remove_data("bar").unwrap();
        assert_eq!(doc.to_string(), EMPTY);
    }

    #[test]
    fn test_arrow_factory() {
        let mut doc = Document::parse(
            "<script>\nexport default {\n    data: () => ({\n        a: 1\n    })\n}\n</script>",
        )
        .unwrap();
        doc.add_data("b", "[]").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    data: () => ({\n        a: 1,\n        b: []\n    })\n}\n</script>"
        );
    }
}
