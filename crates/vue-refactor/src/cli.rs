//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vue_editor::QuoteStyle;

/// Structural refactorings for Vue single file components.
///
/// Components are named either by a path or by their name, in which case the
/// workspace is searched for `<Name>.vue`.
#[derive(Parser, Debug, Clone)]
#[command(name = "vue-refactor")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Workspace directory
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Spaces per indentation level in generated code
    #[arg(long, default_value_t = 4, global = true)]
    pub indent: usize,

    /// Quote style of generated strings
    #[arg(long, default_value = "single", global = true)]
    pub quote: QuoteStyle,

    /// Output format
    #[arg(long, default_value = "human", global = true)]
    pub output: OutputFormat,

    /// Print the changes instead of writing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// Where a moved template node goes in the host component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PushMode {
    /// Before the default slot
    Above,
    /// After the default slot
    Below,
    /// Wrapped around the default slot
    Around,
    /// Inside the default slot, as fallback content
    Into,
    /// Into a new named slot
    NewSlot,
}

/// Option entries that can move between components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntryKind {
    Component,
    Data,
    Computed,
    Watcher,
    Method,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a prop
    AddProp { component: String, name: String },
    /// Set or remove attributes of a prop descriptor
    UpdateProp {
        component: String,
        name: String,
        /// Attribute to set, as `key=value` with a script expression value
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Attribute to remove
        #[arg(long = "unset")]
        unset: Vec<String>,
    },
    /// Rename a prop in the script and the template
    RenameProp { component: String, old: String, new: String },
    /// Remove a prop
    RemoveProp { component: String, name: String },

    /// Add a data entry
    AddData {
        component: String,
        name: String,
        /// Initializer expression
        #[arg(default_value = "null")]
        value: String,
    },
    /// Replace the initializer of a data entry
    SetData { component: String, name: String, value: String },
    /// Rename a data entry in the script and the template
    RenameData { component: String, old: String, new: String },
    /// Remove a data entry
    RemoveData { component: String, name: String },

    /// Add a watcher
    AddWatcher { component: String, name: String },
    /// Set the `deep` and `immediate` flags of a watcher
    UpdateWatcher {
        component: String,
        name: String,
        #[arg(long)]
        deep: Option<bool>,
        #[arg(long)]
        immediate: Option<bool>,
    },
    /// Rename a watcher
    RenameWatcher { component: String, old: String, new: String },
    /// Remove a watcher
    RemoveWatcher { component: String, name: String },

    /// Add a computed property
    AddComputed { component: String, name: String },
    /// Give a computed property a setter
    AddComputedSetter { component: String, name: String },
    /// Drop the setter of a computed property
    RemoveComputedSetter { component: String, name: String },
    /// Rename a computed property in the script and the template
    RenameComputed { component: String, old: String, new: String },
    /// Remove a computed property
    RemoveComputed { component: String, name: String },

    /// Add a method
    AddMethod { component: String, name: String },
    /// Rename a method in the script and the template
    RenameMethod { component: String, old: String, new: String },
    /// Remove a method
    RemoveMethod { component: String, name: String },

    /// Import and register a child component
    ImportComponent {
        component: String,
        /// Project-relative path of the imported file
        path: String,
    },
    /// Remove the import and registration of a child component
    DeportComponent { component: String, name: String },

    /// Move the element at a position into a new component
    Extract {
        component: String,
        /// Position inside the element, as `line:col`
        #[arg(long, value_parser = parse_position)]
        at: (u32, u32),
        /// Project-relative path of the new component
        #[arg(long)]
        into: String,
    },
    /// Move the element at a position into the enclosing host component
    PushNode {
        component: String,
        /// Position inside the element, as `line:col`
        #[arg(long, value_parser = parse_position)]
        at: (u32, u32),
        #[arg(long, value_enum, default_value = "into")]
        mode: PushMode,
        /// Slot name for `--mode new-slot`
        #[arg(long, required_if_eq("mode", "new-slot"))]
        slot: Option<String>,
    },
    /// Move an option entry into another component
    PushOption {
        component: String,
        #[arg(value_enum)]
        kind: EntryKind,
        name: String,
        /// The component receiving the entry
        #[arg(long)]
        to: String,
    },

    /// List the options of a component
    List { component: String },
}

/// Parse `key=value`.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{}`", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse a 1-based `line:col` position.
fn parse_position(s: &str) -> Result<(u32, u32), String> {
    let (line, col) = s
        .split_once(':')
        .ok_or_else(|| format!("expected line:col, got `{}`", s))?;
    let line: u32 = line.parse().map_err(|_| format!("invalid line in `{}`", s))?;
    let col: u32 = col.parse().map_err(|_| format!("invalid column in `{}`", s))?;
    if line == 0 || col == 0 {
        return Err(format!("positions start at 1:1, got `{}`", s));
    }
    Ok((line, col))
}
