//! Props: `props: ['a', 'b']` or `props: { a: { ... } }`.

use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::info::{PropInfo, PropShape};
use crate::outcome::Outcome;
use indexmap::IndexMap;
use smol_str::SmolStr;
use source_span::SourceRange;
use vue_script::{NodeId, OptionKind, ScriptTree};

const KIND: OptionKind = OptionKind::Props;

/// Changes to a prop descriptor: a new value source, or `None` to remove the
/// attribute.
pub type PropPatch = IndexMap<String, Option<String>>;

/// The listed prop names with their array items.
fn listed(script: &ScriptTree, array: NodeId) -> Vec<(NodeId, Option<String>)> {
    script
        .items(array)
        .iter()
        .map(|item| (*item, script.string_value(*item).map(str::to_string)))
        .collect()
}

fn props_property(script: &ScriptTree) -> Result<NodeId> {
    script
        .option_property(KIND)
        .ok_or_else(|| EditorError::unsupported(KIND, "props", "missing option"))
}

/// Turn `['a', 'b']` into `{ a: {}, b: {} }`.
fn to_object_form(script: &mut ScriptTree, array: NodeId) -> Result<NodeId> {
    let property = props_property(script)?;
    let object = script.new_object();
    for (_, name) in listed(script, array) {
        let name = name.ok_or_else(|| {
            EditorError::unsupported(KIND, "props", "list entries must be string literals")
        })?;
        let descriptor = script.new_object();
        let entry = script.new_property(&name, descriptor);
        script.push_property(object, entry);
    }
    script.set_property_value(property, object);
    Ok(object)
}

/// Turn `{ a: {}, b: {} }` back into `['a', 'b']`.
fn to_array_form(script: &mut ScriptTree, object: NodeId) -> Result<()> {
    let property = props_property(script)?;
    let array = script.new_array();
    for name in script.property_keys(object) {
        let item = script.new_string(&name);
        script.push_item(array, item);
    }
    script.set_property_value(property, array);
    Ok(())
}

/// Whether every prop has an empty descriptor object.
fn all_descriptors_empty(script: &ScriptTree, object: NodeId) -> bool {
    script.properties(object).iter().all(|entry| {
        script
            .property_value(*entry)
            .is_some_and(|value| script.is_object(value) && script.properties(value).is_empty())
    })
}

/// The descriptor object of a prop, expanding `a: String` to
/// `a: { type: String }`.
fn descriptor(script: &mut ScriptTree, entry: NodeId, name: &str) -> Result<NodeId> {
    let value = script
        .property_value(entry)
        .ok_or_else(|| EditorError::unsupported(KIND, name, "prop has no value"))?;
    if script.is_object(value) {
        return Ok(value);
    }
    let object = script.new_object();
    let type_entry = script.new_property("type", value);
    script.push_property(object, type_entry);
    script.set_property_value(entry, object);
    Ok(object)
}

impl Document {
    /// Declared props in source order.
    pub fn props(&self) -> IndexMap<SmolStr, PropInfo> {
        let mut out = IndexMap::new();
        let Some(script) = self.script.as_ref() else {
            return out;
        };
        let Some(props) = script.find_option(KIND) else {
            return out;
        };
        if script.is_array(props) {
            for (_, name) in listed(script, props) {
                if let Some(name) = name {
                    out.insert(
                        SmolStr::from(name),
                        PropInfo {
                            shape: PropShape::Listed,
                            attributes: Vec::new(),
                            value: None,
                        },
                    );
                }
            }
            return out;
        }
        for entry in script.properties(props) {
            let (Some(key), Some(value)) = (script.property_key(*entry), script.property_value(*entry)) else {
                continue;
            };
            let (shape, attributes) = if script.is_object(value) {
                (PropShape::Descriptor, script.property_keys(value))
            } else {
                (PropShape::Expression, Vec::new())
            };
            out.insert(
                SmolStr::from(key),
                PropInfo {
                    shape,
                    attributes,
                    value: Some(script.node_text(value)),
                },
            );
        }
        out
    }

    /// Declare a prop. Declaring an existing prop changes nothing.
    pub fn add_prop(&mut self, name: &str) -> Result<Outcome> {
        self.edit("add_prop", |doc| {
            let script = doc.script_mut()?;
            let props = script.option(KIND);
            if script.is_array(props) {
                let exists = listed(script, props)
                    .iter()
                    .any(|(_, listed)| listed.as_deref() == Some(name));
                if !exists {
                    let item = script.new_string(name);
                    script.push_item(props, item);
                }
            } else if script.is_object(props) {
                if script.find_property(props, name).is_none() {
                    let descriptor = script.new_object();
                    let entry = script.new_property(name, descriptor);
                    script.push_property(props, entry);
                }
            } else {
                return Err(EditorError::unsupported(KIND, name, "props is not a literal"));
            }
            Ok(())
        })
    }

    /// Apply a patch to a prop descriptor.
    ///
    /// A listed prop set becomes an object first. When no prop is left with
    /// descriptor attributes, the set goes back to a list.
    pub fn update_prop(&mut self, name: &str, patch: &PropPatch) -> Result<Outcome> {
        self.edit("update_prop", |doc| {
            let script = doc.script_mut()?;
            let mut props = script
                .find_option(KIND)
                .ok_or_else(|| EditorError::not_found(KIND, name))?;
            if script.is_array(props) {
                props = to_object_form(script, props)?;
            } else if !script.is_object(props) {
                return Err(EditorError::unsupported(KIND, name, "props is not a literal"));
            }
            let entry = script
                .find_property(props, name)
                .ok_or_else(|| EditorError::not_found(KIND, name))?;
            let descriptor = descriptor(script, entry, name)?;

            for (attribute, value) in patch {
                match value {
                    None => {
                        script.remove_property(descriptor, attribute);
                    }
                    Some(source) => {
                        let value = script.new_expr(source)?;
                        match script.find_property(descriptor, attribute) {
                            Some(existing) => script.set_property_value(existing, value),
                            None => {
                                let attr = script.new_property(attribute, value);
                                script.push_property(descriptor, attr);
                            }
                        }
                    }
                }
            }

            if all_descriptors_empty(script, props) {
                to_array_form(script, props)?;
            }
            Ok(())
        })
    }

    /// Remove a prop, and the `props` option once it is empty.
    pub fn remove_prop(&mut self, name: &str) -> Result<Outcome> {
        self.edit("remove_prop", |doc| {
            let script = doc.script_mut()?;
            let props = script
                .find_option(KIND)
                .ok_or_else(|| EditorError::not_found(KIND, name))?;
            if script.is_array(props) {
                let item = listed(script, props)
                    .into_iter()
                    .find(|(_, listed)| listed.as_deref() == Some(name))
                    .map(|(item, _)| item)
                    .ok_or_else(|| EditorError::not_found(KIND, name))?;
                script.remove_item(item);
            } else {
                script
                    .remove_property(props, name)
                    .ok_or_else(|| EditorError::not_found(KIND, name))?;
            }
            script.prune_option(KIND);
            Ok(())
        })
    }

    /// Where the value of a descriptor attribute sits in the document.
    pub fn locate_prop_attribute(&self, name: &str, attribute: &str) -> Result<SourceRange> {
        let script = self.script_ref()?;
        let value = script
            .find_option(KIND)
            .and_then(|props| script.find_property(props, name))
            .and_then(|entry| script.property_value(entry))
            .filter(|descriptor| script.is_object(*descriptor))
            .and_then(|descriptor| script.find_property(descriptor, attribute))
            .and_then(|attr| script.property_value(attr))
            .ok_or_else(|| EditorError::not_found(KIND, &format!("{}.{}", name, attribute)))?;
        self.node_range(KIND, name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::PropShape;
    use pretty_assertions::assert_eq;

    const EMPTY: &str = "<script>\nexport default {}\n</script>";

    fn patch(entries: &[(&str, Option<&str>)]) -> PropPatch {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_add_and_update_props() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_prop("foo").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: ['foo']\n};\n</script>"
        );

        doc.update_prop("foo", &patch(&[("default", Some("true"))])).unwrap();
        doc.add_prop("bar").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: {\n        foo: {\n            default: true\n        },\n        bar: {}\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_descriptor_round_trip() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_prop("foo").unwrap();
        doc.update_prop(
            "foo",
            &patch(&[
                ("required", Some("true")),
                ("default", Some("'irrelevant'")),
                ("type", Some("String")),
                ("validator", Some("(val) => val == 'secret-key'")),
            ]),
        )
        .unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: {\n        foo: {\n            required: true,\n            default: 'irrelevant',\n            type: String,\n            validator: (val) => val == 'secret-key'\n        }\n    }\n};\n</script>"
        );

        doc.update_prop(
            "foo",
            &patch(&[
                ("required", None),
                ("default", None),
                ("type", None),
                ("validator", None),
            ]),
        )
        .unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: ['foo']\n};\n</script>"
        );
    }

    #[test]
    fn test_list_order_survives_conversion() {
        let mut doc =
            Document::parse("<script>\nexport default {\n    props: ['a', 'b', 'c']\n}\n</script>")
                .unwrap();
        doc.update_prop("b", &patch(&[("type", Some("Number"))])).unwrap();
        doc.update_prop("b", &patch(&[("type", None)])).unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: ['a', 'b', 'c']\n}\n</script>"
        );
    }

    #[test]
    fn test_update_replaces_attribute_and_expands_type() {
        let mut doc = Document::parse(
            "<script>\nexport default {\n    props: {\n        foo: String\n    }\n}\n</script>",
        )
        .unwrap();
        doc.update_prop("foo", &patch(&[("required", Some("false"))])).unwrap();
        doc.update_prop("foo", &patch(&[("required", Some("true"))])).unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: {\n        foo: {\n            type: String,\n            required: true\n        }\n    }\n}\n</script>"
        );
        let info = doc.props();
        assert_eq!(info["foo"].shape, PropShape::Descriptor);
        assert_eq!(info["foo"].attributes, vec!["type", "required"]);
    }

    #[test]
    fn test_remove_prop_prunes_option() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_prop("foo").unwrap();
        doc.remove_prop("foo").unwrap();
        assert_eq!(doc.to_string(), EMPTY);
    }

    #[test]
    fn test_missing_prop() {
        let mut doc = Document::parse(EMPTY).unwrap();
        assert!(matches!(
            doc.remove_prop("nope"),
            Err(EditorError::NotFound { .. })
        ));
        assert!(matches!(
            doc.update_prop("nope", &PropPatch::new()),
            Err(EditorError::NotFound { .. })
        ));
        assert_eq!(doc.to_string(), EMPTY);
    }

    #[test]
    fn test_duplicate_add_is_a_no_op() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_prop("foo").unwrap();
        assert_eq!(doc.add_prop("foo").unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_locate_prop_attribute() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_prop("foo").unwrap();
        doc.update_prop("foo", &patch(&[("default", Some("null"))])).unwrap();
        let range = doc.locate_prop_attribute("foo", "default").unwrap();
        assert_eq!(range.to_string(), "5:22-5:26");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const ATTRIBUTES: [(&str, &str); 4] = [
            ("type", "Number"),
            ("required", "true"),
            ("default", "0"),
            ("validator", "(v) => v > 0"),
        ];

        /// Distinct prop names in generation order.
        fn prop_names() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("p[a-z0-9]{0,5}", 1..6).prop_map(|names| {
                let mut distinct: Vec<String> = Vec::new();
                for name in names {
                    if !distinct.contains(&name) {
                        distinct.push(name);
                    }
                }
                distinct
            })
        }

        fn listed_source(names: &[String]) -> String {
            let items: Vec<String> = names.iter().map(|name| format!("'{}'", name)).collect();
            format!(
                "<script>\nexport default {{\n    props: [{}]\n}}\n</script>",
                items.join(", ")
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_descriptors_removed_restore_the_list(
                names in prop_names(),
                updates in prop::collection::vec(
                    (any::<prop::sample::Index>(), 0..ATTRIBUTES.len()),
                    1..8,
                ),
                reverse in any::<bool>(),
            ) {
                let source = listed_source(&names);
                let mut doc = Document::parse(&source).unwrap();

                let mut applied: Vec<(String, &str)> = Vec::new();
                for (index, attribute) in updates {
                    let name = index.get(&names).clone();
                    let (key, value) = ATTRIBUTES[attribute];
                    doc.update_prop(&name, &patch(&[(key, Some(value))])).unwrap();
                    if !applied.iter().any(|(n, k)| *n == name && *k == key) {
                        applied.push((name, key));
                    }
                }
                let keys: Vec<String> = doc.props().keys().map(|key| key.to_string()).collect();
                prop_assert_eq!(&keys, &names);
                let props_open = "props: {";
                prop_assert!(doc.to_string().contains(props_open));

                if reverse {
                    applied.reverse();
                }
                for (name, key) in applied {
                    doc.update_prop(&name, &patch(&[(key, None)])).unwrap();
                }
                prop_assert_eq!(doc.to_string(), source);
            }

            #[test]
            fn prop_added_props_keep_their_order(names in prop_names(), described in any::<prop::sample::Index>()) {
                let mut doc = Document::parse(EMPTY).unwrap();
                for name in &names {
                    doc.add_prop(name).unwrap();
                }
                let target = described.get(&names).clone();
                doc.update_prop(&target, &patch(&[("type", Some("String"))])).unwrap();
                let keys: Vec<String> = doc.props().keys().map(|key| key.to_string()).collect();
                prop_assert_eq!(&keys, &names);
                let info = &doc.props()[target.as_str()];
                prop_assert_eq!(info.shape, PropShape::Descriptor);
            }
        }
    }
}
