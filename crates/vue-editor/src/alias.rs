//! Module path aliases for imported components.

use serde::{Deserialize, Serialize};

/// Maps source-root segments to module aliases, e.g. `src` to `@`.
///
/// Only the leading path segment is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMap {
    entries: Vec<(String, String)>,
}

impl Default for AliasMap {
    fn default() -> Self {
        Self {
            entries: vec![("src".to_string(), "@".to_string())],
        }
    }
}

impl AliasMap {
    /// A map without aliases.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an alias for a directory. Later entries win over earlier ones.
    pub fn insert(&mut self, dir: impl Into<String>, alias: impl Into<String>) {
        let dir = dir.into().trim_end_matches('/').to_string();
        let alias = alias.into().trim_end_matches('/').to_string();
        self.entries.retain(|(d, _)| *d != dir);
        self.entries.push((dir, alias));
    }

    /// The alias entries in insertion order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Rewrite the leading segment of a project-relative path.
    /// Paths that match no alias are returned unchanged.
    pub fn apply(&self, path: &str) -> String {
        let relative = path.strip_prefix("./").unwrap_or(path);
        for (dir, alias) in self.entries.iter().rev() {
            if relative == dir {
                return alias.clone();
            }
            if let Some(rest) = relative.strip_prefix(dir.as_str()) {
                if rest.starts_with('/') {
                    return format!("{}{}", alias, rest);
                }
            }
        }
        path.to_string()
    }
}

/// The component name a file path binds: its base name without extension.
pub fn component_name(path: &str) -> String {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    base.split('.').next().unwrap_or(base).to_string()
}
