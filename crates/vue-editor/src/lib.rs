//! Structural editing of Vue single file components.
//!
//! A [`Document`] pairs the markup tree of a `.vue` file with the script tree
//! of its `<script>` block. Editing operations work on the options of the
//! component definition (props, data, watchers, computed properties, methods
//! and components), rename entries across script and template, and move
//! markup or entries between components. Every operation returns an
//! [`Outcome`] and leaves the document untouched when it fails.
//!
//! ```ignore
//! let mut doc = Document::parse(source)?;
//! doc.add_prop("title")?;
//! doc.rename_data("count", "total")?;
//! std::fs::write(path, doc.to_string())?;
//! ```

mod alias;
mod components;
mod computed;
mod data;
mod document;
mod error;
mod extract;
mod info;
mod methods;
mod outcome;
mod props;
mod push;
mod rename;
mod watch;

pub use alias::{component_name, AliasMap};
pub use document::{Document, DocumentOptions};
pub use error::{EditorError, Result};
pub use extract::is_component_tag;
pub use info::{
    ComponentInfo, ComputedInfo, DataInfo, EntryForm, MethodInfo, PropInfo, PropShape, WatcherInfo,
};
pub use outcome::Outcome;
pub use props::PropPatch;
pub use watch::{WatchOption, WatcherPatch};

pub use vue_markup::NodeId;
pub use vue_script::{FormatOptions, OptionKind, QuoteStyle};
