//! Output formatting for command results.

use crate::cli::OutputFormat;
use crate::orchestrator::{FileOutcome, Listing, Report};
use vue_editor::{ComponentInfo, ComputedInfo, EntryForm, MethodInfo, Outcome, PropInfo, PropShape, WatcherInfo};

/// Formatter for command results.
pub struct OutputFormatter {
    format: OutputFormat,
    dry_run: bool,
}

impl OutputFormatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, dry_run: bool) -> Self {
        Self { format, dry_run }
    }

    /// Print everything a command reported.
    pub fn print_report(&self, report: &Report) {
        for file in &report.files {
            match self.format {
                OutputFormat::Human => self.print_file_human(file),
                OutputFormat::Json => self.print_file_json(file),
            }
        }
        if let Some(listing) = &report.listing {
            match self.format {
                OutputFormat::Human => print!("{}", render_listing(listing)),
                OutputFormat::Json => self.print_listing_json(listing),
            }
        }
    }

    // Human format

    fn print_file_human(&self, file: &FileOutcome) {
        match &file.outcome {
            Outcome::Text(text) if self.dry_run => {
                println!("\x1b[36m--- {}\x1b[0m", file.path);
                print!("{}", text);
                if !text.ends_with('\n') {
                    println!();
                }
            }
            Outcome::Text(_) => {
                let verb = if file.created { "created" } else { "updated" };
                println!("\x1b[32m✓\x1b[0m {} {}", verb, file.path);
            }
            Outcome::Focus(range) => println!("{}:{}", file.path, range),
            Outcome::Unchanged => println!("  unchanged {}", file.path),
        }
    }

    // JSON format

    fn print_file_json(&self, file: &FileOutcome) {
        let json = serde_json::json!({
            "type": "file",
            "path": file.path,
            "created": file.created,
            "written": file.outcome.is_changed() && !self.dry_run,
            "outcome": file.outcome,
        });
        println!("{}", json);
    }

    fn print_listing_json(&self, listing: &Listing) {
        let json = serde_json::json!({
            "type": "listing",
            "component": listing,
        });
        println!("{}", json);
    }
}

/// The options of a component, one indented section per option.
fn render_listing(listing: &Listing) -> String {
    let mut out = format!("{}\n", listing.path);
    section(&mut out, "props", listing.props.iter().map(|(n, i)| describe_prop(n, i)));
    section(
        &mut out,
        "data",
        listing
            .data
            .iter()
            .map(|(name, info)| format!("{} = {}", name, info.initializer)),
    );
    section(&mut out, "watch", listing.watchers.iter().map(|(n, i)| describe_watcher(n, i)));
    section(&mut out, "computed", listing.computed.iter().map(|(n, i)| describe_computed(n, i)));
    section(&mut out, "methods", listing.methods.iter().map(|(n, i)| describe_method(n, i)));
    section(
        &mut out,
        "components",
        listing.components.iter().map(|(n, i)| describe_component(n, i)),
    );
    out
}

fn section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    let lines: Vec<String> = lines.collect();
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("  {}\n", title));
    for line in lines {
        out.push_str(&format!("    {}\n", line));
    }
}

fn describe_prop(name: &str, info: &PropInfo) -> String {
    match info.shape {
        PropShape::Listed => name.to_string(),
        PropShape::Descriptor if info.attributes.is_empty() => format!("{} {{}}", name),
        PropShape::Descriptor => format!("{} {{ {} }}", name, info.attributes.join(", ")),
        PropShape::Expression => format!("{}: {}", name, info.value.as_deref().unwrap_or("")),
    }
}

fn describe_watcher(name: &str, info: &WatcherInfo) -> String {
    let params = info.params.as_deref().unwrap_or("");
    if info.options.is_empty() {
        format!("{}({})", name, params)
    } else {
        format!("{}({}) [{}]", name, params, info.options.join(", "))
    }
}

fn describe_computed(name: &str, info: &ComputedInfo) -> String {
    match (info.form, info.has_setter) {
        (EntryForm::Long, true) => format!("{} (get, set)", name),
        (EntryForm::Long, false) => format!("{} (get)", name),
        (EntryForm::Short, _) => name.to_string(),
    }
}

fn describe_method(name: &str, info: &MethodInfo) -> String {
    let prefix = if info.is_async { "async " } else { "" };
    format!("{}{}({})", prefix, name, info.params)
}

fn describe_component(name: &str, info: &ComponentInfo) -> String {
    match &info.source {
        Some(source) => format!("{} from {}", name, source),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use smol_str::SmolStr;

    #[test]
    fn test_render_listing() {
        let mut listing = Listing {
            path: "src/Card.vue".into(),
            props: IndexMap::new(),
            data: IndexMap::new(),
            watchers: IndexMap::new(),
            computed: IndexMap::new(),
            methods: IndexMap::new(),
            components: IndexMap::new(),
        };
        listing.props.insert(
            SmolStr::new("title"),
            PropInfo {
                shape: PropShape::Descriptor,
                attributes: vec![SmolStr::new("type"), SmolStr::new("default")],
                value: None,
            },
        );
        listing.methods.insert(
            SmolStr::new("load"),
            MethodInfo {
                params: "id".to_string(),
                is_async: true,
            },
        );
        listing.watchers.insert(
            SmolStr::new("title"),
            WatcherInfo {
                form: EntryForm::Long,
                options: vec![SmolStr::new("deep")],
                params: Some("newVal, oldVal".to_string()),
            },
        );
        assert_eq!(
            render_listing(&listing),
            "src/Card.vue\n  props\n    title { type, default }\n  watch\n    title(newVal, oldVal) [deep]\n  methods\n    async load(id)\n"
        );
    }

    #[test]
    fn test_describe_entries() {
        assert_eq!(
            describe_computed(
                "total",
                &ComputedInfo {
                    form: EntryForm::Long,
                    has_setter: true
                }
            ),
            "total (get, set)"
        );
        assert_eq!(
            describe_component(
                "Foo",
                &ComponentInfo {
                    source: Some("@/Foo.vue".to_string())
                }
            ),
            "Foo from @/Foo.vue"
        );
        assert_eq!(
            describe_prop(
                "size",
                &PropInfo {
                    shape: PropShape::Expression,
                    attributes: Vec::new(),
                    value: Some("Number".to_string()),
                }
            ),
            "size: Number"
        );
    }
}
