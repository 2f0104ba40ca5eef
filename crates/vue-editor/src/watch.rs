//! Watchers: `foo(newVal, oldVal) {}` or `foo: { handler() {}, deep: true }`.

use crate::document::{find_entry, remove_entry, Document};
use crate::error::{EditorError, Result};
use crate::info::{EntryForm, WatcherInfo};
use crate::outcome::Outcome;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;
use vue_script::{NodeId, OptionKind, ScriptTree};

const KIND: OptionKind = OptionKind::Watch;
const HANDLER: &str = "handler";

/// A watcher flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchOption {
    Deep,
    Immediate,
}

impl WatchOption {
    /// The option key.
    pub fn as_str(self) -> &'static str {
        match self {
            WatchOption::Deep => "deep",
            WatchOption::Immediate => "immediate",
        }
    }
}

impl fmt::Display for WatchOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "deep" => Ok(WatchOption::Deep),
            "immediate" => Ok(WatchOption::Immediate),
            other => Err(format!("unknown watcher option: {}", other)),
        }
    }
}

/// Flags to set (`true`) or clear (`false`).
pub type WatcherPatch = IndexMap<WatchOption, bool>;

/// Wrap a bare handler into `{ handler }`.
fn to_long_form(script: &mut ScriptTree, entry: NodeId, handler: NodeId) -> NodeId {
    let object = script.new_object();
    let handler = script.new_property(HANDLER, handler);
    script.push_property(object, handler);
    script.set_property_value(entry, object);
    object
}

impl Document {
    /// Watchers in source order.
    pub fn watchers(&self) -> IndexMap<SmolStr, WatcherInfo> {
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
                let params = script
                    .find_property(value, HANDLER)
                    .and_then(|h| script.property_value(h))
                    .and_then(|h| script.function(h))
                    .map(|f| f.params.clone());
                WatcherInfo {
                    form: EntryForm::Long,
                    options: script
                        .property_keys(value)
                        .into_iter()
                        .filter(|k| k.as_str() != HANDLER)
                        .collect(),
                    params,
                }
            } else {
                WatcherInfo {
                    form: EntryForm::Short,
                    options: Vec::new(),
                    params: script.function(value).map(|f| f.params.clone()),
                }
            };
            out.insert(SmolStr::from(key), info);
        }
        out
    }

    /// Add `name(newVal, oldVal) {}`. An existing watcher is left as it is.
    pub fn add_watcher(&mut self, name: &str) -> Result<Outcome> {
        self.edit("add_watcher", |doc| {
            let script = doc.script_mut()?;
            let entries = script.option(KIND);
            if script.find_property(entries, name).is_none() {
                let watcher = script.new_method(name, "newVal, oldVal", Vec::new());
                script.push_property(entries, watcher);
            }
            Ok(())
        })
    }

    /// Set or clear `deep` and `immediate`.
    ///
    /// A bare handler is wrapped into an object before the first flag is set,
    /// and unwrapped again once only the handler is left. Setting a flag that
    /// is already present keeps its current value.
    pub fn update_watcher(&mut self, name: &str, patch: &WatcherPatch) -> Result<Outcome> {
        self.edit("update_watcher", |doc| {
            let script = doc.script_mut()?;
            let entry = find_entry(script, KIND, name)?;
            let value = script
                .property_value(entry)
                .ok_or_else(|| EditorError::unsupported(KIND, name, "watcher has no value"))?;

            let object = if script.is_object(value) {
                value
            } else if patch.values().any(|set| *set) {
                if script.function(value).is_none() {
                    return Err(EditorError::unsupported(
                        KIND,
                        name,
                        "watcher is neither a function nor an object",
                    ));
                }
                to_long_form(script, entry, value)
            } else {
                return Ok(());
            };

            for (option, set) in patch {
                let key = option.as_str();
                let existing = script.find_property(object, key);
                match (set, existing) {
                    (true, None) => {
                        let value = script.new_expr("true")?;
                        let flag = script.new_property(key, value);
                        script.push_property(object, flag);
                    }
                    (false, Some(_)) => {
                        script.remove_property(object, key);
                    }
                    _ => {}
                }
            }

            let keys = script.property_keys(object);
            if keys.len() == 1 && keys[0].as_str() == HANDLER && script.properties(object).len() == 1 {
                let handler = script
                    .find_property(object, HANDLER)
                    .and_then(|h| script.property_value(h))
                    .ok_or_else(|| EditorError::unsupported(KIND, name, "handler has no value"))?;
                script.set_property_value(entry, handler);
            }
            Ok(())
        })
    }

    /// Remove a watcher, and the `watch` option once it is empty.
    pub fn remove_watcher(&mut self, name: &str) -> Result<Outcome> {
        self.edit("remove_watcher", |doc| remove_entry(doc.script_mut()?, KIND, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EMPTY: &str = "<script>\nexport default {}\n</script>";

    fn patch(entries: &[(WatchOption, bool)]) -> WatcherPatch {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_add_watcher() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_watcher("foo").unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    watch: {\n        foo(newVal, oldVal) {}\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_flags_round_trip() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_watcher("foo").unwrap();
        doc.update_watcher(
            "foo",
            &patch(&[(WatchOption::Deep, true), (WatchOption::Immediate, true)]),
        )
        .unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    watch: {\n        foo: {\n            handler(newVal, oldVal) {},\n            deep: true,\n            immediate: true\n        }\n    }\n};\n</script>"
        );
        let info = &doc.watchers()["foo"];
        assert_eq!(info.form, EntryForm::Long);
        assert_eq!(info.options, vec![SmolStr::new("deep"), SmolStr::new("immediate")]);

        doc.update_watcher(
            "foo",
            &patch(&[(WatchOption::Deep, false), (WatchOption::Immediate, false)]),
        )
        .unwrap();
        assert_eq!(
            doc.to_string(),
            "<script>\nexport default {\n    watch: {\n        foo(newVal, oldVal) {}\n    }\n};\n</script>"
        );
    }

    #[test]
    fn test_handler_body_survives_conversion() {
        let source = "<script>\nexport default {\n    watch: {\n        foo(value) {\n            this.log(value);\n        }\n    }\n}\n</script>";
        let mut doc = Document::parse(source).unwrap();
        doc.update_watcher("foo", &patch(&[(WatchOption::Deep, true)])).unwrap();
        doc.update_watcher("foo", &patch(&[(WatchOption::Deep, false)])).unwrap();
        assert_eq!(doc.to_string(), source);
    }

    #[test]
    fn test_setting_present_flag_keeps_it() {
        let source = "<script>\nexport default {\n    watch: {\n        foo: {\n            handler() {},\n            deep: false\n        }\n    }\n}\n</script>";
        let mut doc = Document::parse(source).unwrap();
        assert_eq!(
            doc.update_watcher("foo", &patch(&[(WatchOption::Deep, true)])).unwrap(),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_remove_watcher() {
        let mut doc = Document::parse(EMPTY).unwrap();
        doc.add_watcher("foo").unwrap();
        doc.remove_watcher("foo").unwrap();
        assert_eq!(doc.to_string(), EMPTY);

        doc.add_watcher("bar").unwrap();
        doc.update_watcher(
            "bar",
            &patch(&[(WatchOption::Deep, true), (WatchOption::Immediate, true)]),
        )
        .unwrap();
        doc.remove_watcher("bar").unwrap();
        assert_eq!(doc.to_string(), EMPTY);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const STATEMENTS: [&str; 3] = [
            "this.log(value);",
            "this.count += 1;",
            "if (value) {\n    this.reset();\n}",
        ];

        /// A short-form watcher `foo` with the given parameters and body.
        fn watcher_source(params: &str, statements: &[&str]) -> String {
            let body = if statements.is_empty() {
                "{}".to_string()
            } else {
                let lines: Vec<String> = statements
                    .iter()
                    .flat_map(|statement| statement.split('\n'))
                    .map(|line| format!("            {}", line))
                    .collect();
                format!("{{\n{}\n        }}", lines.join("\n"))
            };
            format!(
                "<script>\nexport default {{\n    watch: {{\n        foo({}) {}\n    }}\n}}\n</script>",
                params, body
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_cleared_flags_restore_the_handler(
                params in prop::sample::select(vec!["", "value", "newVal, oldVal"]),
                statements in prop::collection::vec(prop::sample::select(STATEMENTS.to_vec()), 0..3),
                flags in prop::sample::subsequence(vec![WatchOption::Deep, WatchOption::Immediate], 1..=2)
                    .prop_shuffle(),
                together in any::<bool>(),
                reverse in any::<bool>(),
            ) {
                let source = watcher_source(params, &statements);
                let mut doc = Document::parse(&source).unwrap();

                if together {
                    let set: Vec<(WatchOption, bool)> = flags.iter().map(|flag| (*flag, true)).collect();
                    doc.update_watcher("foo", &patch(&set)).unwrap();
                } else {
                    for flag in &flags {
                        doc.update_watcher("foo", &patch(&[(*flag, true)])).unwrap();
                    }
                }
                let info = &doc.watchers()["foo"];
                prop_assert_eq!(info.form, EntryForm::Long);
                prop_assert_eq!(info.options.len(), flags.len());

                let mut clear = flags.clone();
                if reverse {
                    clear.reverse();
                }
                if together {
                    let unset: Vec<(WatchOption, bool)> = clear.iter().map(|flag| (*flag, false)).collect();
                    doc.update_watcher("foo", &patch(&unset)).unwrap();
                } else {
                    for flag in &clear {
                        doc.update_watcher("foo", &patch(&[(*flag, false)])).unwrap();
                    }
                }
                prop_assert_eq!(doc.to_string(), source);
            }
        }
    }
}
