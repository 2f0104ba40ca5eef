//! Renaming an entry together with every reference to it.
//!
//! The definition key is renamed in the script, followed by instance accesses
//! in the script (`this.foo`, `this['foo']`, `const { foo } = this`), watcher
//! keys naming the entry, and free identifiers in template bindings and
//! interpolations. Template scopes that rebind the name (`v-for` aliases, slot
//! props) are left alone.

use crate::document::{find_entry, Document};
use crate::error::{EditorError, Result};
use crate::outcome::Outcome;
use vue_markup::{MarkupTree, NodeId, NodeKind};
use vue_script::{pattern_bindings, rename_identifiers_in_expression, OptionKind, ScriptTree};

impl Document {
    /// Rename the entry `old` of an option to `new`.
    ///
    /// A name that is not defined leaves the definition alone, but references
    /// are still rewritten. Watchers are only renamed at the definition.
    pub fn rename(&mut self, kind: OptionKind, old: &str, new: &str) -> Result<Outcome> {
        if kind == OptionKind::Components {
            return Err(EditorError::unsupported(
                kind,
                old,
                "components are renamed by importing them again",
            ));
        }
        self.edit("rename", |doc| {
            let script = doc.script_mut()?;
            let defined = rename_definition(script, kind, old, new)?;
            if !defined {
                tracing::debug!(%kind, old, "renaming references of an undefined entry");
            }
            if kind == OptionKind::Watch {
                return Ok(());
            }
            rename_watch_keys(script, old, new);
            script.rename_this_references(old, new)?;
            if let Some(template) = doc.markup.template_element() {
                let renamed = rename_in_markup(&mut doc.markup, template, old, new);
                tracing::debug!(old, new, bindings = renamed, "renamed template references");
            }
            Ok(())
        })
    }

    /// Rename a prop and its references.
    pub fn rename_prop(&mut self, old: &str, new: &str) -> Result<Outcome> {
        self.rename(OptionKind::Props, old, new)
    }

    /// Rename a data entry and its references.
    pub fn rename_data(&mut self, old: &str, new: &str) -> Result<Outcome> {
        self.rename(OptionKind::Data, old, new)
    }

    /// Rename a computed property and its references.
    pub fn rename_computed(&mut self, old: &str, new: &str) -> Result<Outcome> {
        self.rename(OptionKind::Computed, old, new)
    }

    /// Rename a method and its references.
    pub fn rename_method(&mut self, old: &str, new: &str) -> Result<Outcome> {
        self.rename(OptionKind::Methods, old, new)
    }

    /// Rename a watcher key.
    pub fn rename_watcher(&mut self, old: &str, new: &str) -> Result<Outcome> {
        self.rename(OptionKind::Watch, old, new)
    }
}

/// Rename the defining key or list item. Returns whether `old` was defined.
fn rename_definition(script: &mut ScriptTree, kind: OptionKind, old: &str, new: &str) -> Result<bool> {
    if kind == OptionKind::Props {
        if let Some(list) = script.find_option(kind).filter(|p| script.is_array(*p)) {
            let item = script
                .items(list)
                .iter()
                .copied()
                .find(|item| script.string_value(*item) == Some(old));
            return Ok(match item {
                Some(item) => script.set_string_value(item, new),
                None => false,
            });
        }
    }
    match find_entry(script, kind, old) {
        Ok(entry) => {
            script.rename_property(entry, new);
            Ok(true)
        }
        Err(EditorError::NotFound { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Rename watcher keys that watch `old` or a path below it.
fn rename_watch_keys(script: &mut ScriptTree, old: &str, new: &str) {
    let Some(watch) = script.find_option(OptionKind::Watch) else {
        return;
    };
    let renames: Vec<(vue_script::NodeId, String)> = script
        .properties(watch)
        .iter()
        .filter_map(|entry| {
            let key = script.property_key(*entry)?;
            let renamed = if key == old {
                new.to_string()
            } else {
                let rest = key.strip_prefix(old)?;
                if !rest.starts_with('.') {
                    return None;
                }
                format!("{}{}", new, rest)
            };
            Some((*entry, renamed))
        })
        .collect();
    for (entry, key) in renames {
        script.rename_property(entry, &key);
    }
}

/// Split `alias in source` into its alias, separator and source.
fn split_v_for(value: &str) -> Option<(&str, &str, &str)> {
    let at = [" in ", " of "]
        .iter()
        .filter_map(|sep| value.find(sep).map(|at| (at, sep.len())))
        .min_by_key(|(at, _)| *at)?;
    let (at, len) = at;
    Some((&value[..at], &value[at..at + len], &value[at + len..]))
}

fn is_slot_scope(name: &str) -> bool {
    name == "slot-scope" || name == "scope" || name.starts_with("v-slot") || name.starts_with('#')
}

fn binds(pattern: &str, name: &str) -> bool {
    pattern_bindings(pattern).iter().any(|bound| bound == name)
}

/// Rename `old` in every `{{ }}` interpolation of a text.
fn rename_interpolations(text: &str, old: &str, new: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        let inner = &rest[open + 2..open + 2 + close];
        out.push_str(&rest[..open + 2]);
        match rename_identifiers_in_expression(inner, old, new) {
            Some(renamed) => out.push_str(&renamed),
            None => out.push_str(inner),
        }
        out.push_str("}}");
        rest = &rest[open + 2 + close + 2..];
    }
    out.push_str(rest);
    out
}

/// Rename references in the subtree below `parent`. Returns how many
/// attributes and texts changed.
fn rename_in_markup(markup: &mut MarkupTree, parent: NodeId, old: &str, new: &str) -> usize {
    let mut changed = 0;
    for child in markup.children(parent).to_vec() {
        match &markup.node(child).kind {
            NodeKind::Text(text) => {
                if text.contains("{{") {
                    let renamed = rename_interpolations(text, old, new);
                    if renamed != *text {
                        markup.set_text(child, renamed);
                        changed += 1;
                    }
                }
            }
            NodeKind::Element(el) => {
                if el.is_raw_text() {
                    continue;
                }
                let attrs = el.attrs.clone();
                let shadowed = attrs.iter().any(|attr| {
                    let value = attr.value.as_deref().unwrap_or("");
                    if attr.name == "v-for" {
                        split_v_for(value).is_some_and(|(alias, _, _)| binds(alias, old))
                    } else {
                        is_slot_scope(&attr.name) && binds(value, old)
                    }
                });
                for attr in &attrs {
                    let Some(value) = attr.value.as_deref() else {
                        continue;
                    };
                    let renamed = if attr.name == "v-for" {
                        split_v_for(value).and_then(|(alias, sep, source)| {
                            rename_identifiers_in_expression(source, old, new)
                                .map(|source| format!("{}{}{}", alias, sep, source))
                        })
                    } else if is_slot_scope(&attr.name) || shadowed || !attr.is_dynamic() {
                        None
                    } else {
                        rename_identifiers_in_expression(value, old, new)
                    };
                    if let Some(renamed) = renamed.filter(|r| r != value) {
                        markup.set_attr(child, &attr.name, Some(renamed));
                        changed += 1;
                    }
                }
                if !shadowed {
                    changed += rename_in_markup(markup, child, old, new);
                }
            }
            NodeKind::Comment(_) | NodeKind::Doctype(_) => {}
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const METHODS: &str = "    methods: {\n        usesFoo() {\n            console.log(this.foo);\n            this['foo'] = 1;\n            const { foo } = this;\n        },\n        doesntUseFoo() {\n            const foo = 'foo';\n        }\n    }\n}</script>";

    fn renamed_methods(name: &str) -> String {
        METHODS
            .replace("this.foo", &format!("this.{}", name))
            .replace("this['foo']", &format!("this['{}']", name))
            .replace("const { foo } = this", &format!("const {{ {}: foo }} = this", name))
    }

    const TEMPLATE: &str = "\n\n<template>\n<div attr=\"foo\" :class=\"foo\" @click=\"() => console.log(foo)\"></div>\n</template>";

    fn renamed_template(name: &str) -> String {
        format!(
            "\n\n<template>\n<div\n    attr=\"foo\"\n    :class=\"{0}\"\n    @click=\"() => console.log({0})\"\n></div>\n</template>",
            name
        )
    }

    #[test]
    fn test_rename_prop() {
        let source = format!("<script>\nexport default {{\n    props: ['foo'],\n{}{}", METHODS, TEMPLATE);
        let mut doc = Document::parse(&source).unwrap();
        doc.rename_prop("foo", "bar").unwrap();
        assert_eq!(
            doc.to_string(),
            format!(
                "<script>\nexport default {{\n    props: ['bar'],\n{}{}",
                renamed_methods("bar"),
                renamed_template("bar")
            )
        );

        let mut patch = crate::props::PropPatch::new();
        patch.insert("default".to_string(), Some("true".to_string()));
        doc.update_prop("bar", &patch).unwrap();
        doc.rename_prop("bar", "baz").unwrap();
        assert_eq!(
            doc.to_string(),
            format!(
                "<script>\nexport default {{\n    props: {{\n        baz: {{\n            default: true\n        }}\n    }},\n{}{}",
                renamed_methods("baz"),
                renamed_template("baz")
            )
        );
    }

    #[test]
    fn test_rename_data() {
        let source = format!(
            "<script>\nexport default {{\n    data() {{\n        return {{\n            foo: true\n        }};\n    }},\n{}{}",
            METHODS, TEMPLATE
        );
        let mut doc = Document::parse(&source).unwrap();
        doc.rename_data("foo", "bar").unwrap();
        assert_eq!(
            doc.to_string(),
            format!(
                "<script>\nexport default {{\n    data() {{\n        return {{\n            bar: true\n        }};\n    }},\n{}{}",
                renamed_methods("bar"),
                renamed_template("bar")
            )
        );
    }

    #[test]
    fn test_rename_computed() {
        let mut doc = Document::parse("<script>\nexport default {\n    computed: {\n        foo() {}\n    },\n    methods: {\n        usesFoo() {\n            console.log(this.foo);\n        }\n    }\n};\n</script>\n\n<template>\n<div :class=\"foo\" attr=\"foo\">{{ foo }}</div>\n</template>").unwrap();
        doc.rename_computed("foo", "bar").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    computed: {\n        bar() {}\n    },\n    methods: {\n        usesFoo() {\n            console.log(this.bar);\n        }\n    }\n};\n</script>\n\n<template>\n<div\n    :class=\"bar\"\n    attr=\"foo\"\n>{{ bar }}</div>\n</template>"
        );
    }

    #[test]
    fn test_rename_method() {
        let mut doc = Document::parse("<script>\nexport default {\n    methods: {\n        foo() {},\n        usesFoo() {\n            console.log(this.foo());\n        }\n    }\n};\n</script>\n\n<template>\n<div @click=\"foo\" attr=\"foo\">{{ foo() }}</div>\n</template>").unwrap();
        doc.rename_method("foo", "bar").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    methods: {\n        bar() {},\n        usesFoo() {\n            console.log(this.bar());\n        }\n    }\n};\n</script>\n\n<template>\n<div\n    @click=\"bar\"\n    attr=\"foo\"\n>{{ bar() }}</div>\n</template>"
        );
    }

    #[test]
    fn test_rename_watcher() {
        let mut doc = Document::parse("<script>\nexport default {}\n</script>").unwrap();
        doc.add_watcher("foo").unwrap();
        doc.rename_watcher("foo", "bar").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    watch: {\n        bar(newVal, oldVal) {}\n    }\n};\n</script>"
        );

        let mut patch = crate::watch::WatcherPatch::new();
        patch.insert(crate::watch::WatchOption::Deep, true);
        doc.update_watcher("bar", &patch).unwrap();
        doc.rename_watcher("bar", "baz").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    watch: {\n        baz: {\n            handler(newVal, oldVal) {},\n            deep: true\n        }\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_rename_follows_watchers() {
        let mut doc = Document::parse("<script>\nexport default {\n    data() {\n        return {\n            user: {}\n        };\n    },\n    watch: {\n        user() {},\n        'user.name'() {}\n    }\n}\n</script>").unwrap();
        doc.rename_data("user", "account").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    data() {\n        return {\n            account: {}\n        };\n    },\n    watch: {\n        account() {},\n        'account.name'() {}\n    }\n}\n</script>"
        );
    }

    #[test]
    fn test_template_scopes_shadow() {
        let mut doc = Document::parse("<script>\nexport default {\n    props: ['item']\n}\n</script>\n<template>\n<ul :title=\"item\">\n    <li v-for=\"item in list(item)\" :key=\"item.id\">{{ item.name }}</li>\n    <Row v-slot=\"{ item }\">{{ item }}</Row>\n    <p>{{ item }}</p>\n</ul>\n</template>").unwrap();
        doc.rename_prop("item", "entry").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    props: ['entry']\n}\n</script>\n<template>\n<ul :title=\"entry\">\n    <li\n        v-for=\"item in list(entry)\"\n        :key=\"item.id\"\n    >{{ item.name }}</li>\n    <Row v-slot=\"{ item }\">{{ item }}</Row>\n    <p>{{ entry }}</p>\n</ul>\n</template>"
        );
    }

    #[test]
    fn test_undefined_name_still_rewrites_references() {
        let mut doc = Document::parse("<script>\nexport default {\n    methods: {\n        go() {\n            return this.ghost;\n        }\n    }\n}\n</script>").unwrap();
        doc.rename_data("ghost", "spirit").unwrap();
        assert!(doc.to_string().contains("return this.spirit;"));
    }

    #[test]
    fn test_split_v_for() {
        assert_eq!(split_v_for("(a, i) in items"), Some(("(a, i)", " in ", "items")));
        assert_eq!(split_v_for("a of list"), Some(("a", " of ", "list")));
        assert_eq!(split_v_for("items"), None);
    }

    #[test]
    fn test_rename_interpolations() {
        assert_eq!(
            rename_interpolations("a {{ foo }} b {{foo.x}} {{ bar", "foo", "baz"),
            "a {{ baz }} b {{baz.x}} {{ bar"
        );
    }
}
