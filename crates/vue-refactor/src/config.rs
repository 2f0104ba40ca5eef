//! Configuration loading: format flags plus module aliases from the project's
//! `tsconfig.json` or `jsconfig.json`.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use std::path::Path;
use vue_editor::{AliasMap, DocumentOptions, FormatOptions};

/// Configuration for vue-refactor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace: Utf8PathBuf,
    /// The project config the aliases were read from.
    pub project_config: Option<Utf8PathBuf>,
    /// Options every opened document is parsed with.
    pub document: DocumentOptions,
    /// Report changes without writing them.
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from CLI arguments and workspace.
    pub fn load(workspace: &Path, args: &Args) -> Result<Self> {
        let workspace = Utf8PathBuf::from_path_buf(workspace.to_path_buf())
            .map_err(|path| miette!("workspace path is not UTF-8: {}", path.display()))?;

        let project_config = ProjectConfig::find(&workspace);
        let aliases = match &project_config {
            Some(path) => ProjectConfig::load(path)?.aliases(),
            None => AliasMap::default(),
        };
        tracing::debug!(
            config = ?project_config,
            aliases = ?aliases.entries(),
            "loaded configuration"
        );

        let format = FormatOptions::default()
            .with_indent_width(args.indent)
            .with_quote(args.quote);

        Ok(Self {
            workspace,
            project_config,
            document: DocumentOptions { format, aliases },
            dry_run: args.dry_run,
        })
    }
}

/// The parts of `tsconfig.json` that affect import paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, Vec<String>>,
}

impl ProjectConfig {
    /// Find tsconfig.json or jsconfig.json in a directory or its parents.
    fn find(dir: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = dir;
        loop {
            for name in ["tsconfig.json", "jsconfig.json"] {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
            current = current.parent()?;
        }
    }

    fn load(path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path))?;
        Self::parse(&content).wrap_err_with(|| format!("failed to parse {}", path))
    }

    fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(&remove_json_comments(content)).into_diagnostic()
    }

    /// Directory aliases from `compilerOptions.paths`, e.g. `"@/*": ["src/*"]`
    /// maps `src` to `@`. Without any usable entry the default `src` alias
    /// applies.
    fn aliases(&self) -> AliasMap {
        let options = &self.compiler_options;
        let base = options
            .base_url
            .as_deref()
            .map(normalize_dir)
            .unwrap_or_default();

        let mut aliases = AliasMap::empty();
        for (pattern, targets) in &options.paths {
            let Some(alias) = pattern.strip_suffix("/*") else {
                continue;
            };
            let Some(dir) = targets
                .first()
                .and_then(|target| target.strip_suffix("/*"))
                .map(normalize_dir)
            else {
                continue;
            };
            let dir = match (base.is_empty(), dir.is_empty()) {
                (_, true) => continue,
                (true, false) => dir,
                (false, false) => format!("{}/{}", base, dir),
            };
            aliases.insert(dir, alias);
        }

        if aliases.entries().is_empty() {
            AliasMap::default()
        } else {
            aliases
        }
    }
}

/// `./src/` becomes `src`, `.` becomes the empty string.
fn normalize_dir(dir: &str) -> String {
    let dir = dir.trim_start_matches("./").trim_end_matches('/');
    if dir == "." {
        String::new()
    } else {
        dir.to_string()
    }
}

/// Remove `//` and `/* */` comments outside of strings.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            result.push(c);
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                for nc in chars.by_ref() {
                    if nc == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                while let Some(nc) = chars.next() {
                    if nc == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remove_json_comments() {
        let input = r#"{
            // This is a comment
            "key": "value", /* inline comment */
            "key2": "value with // in string \" and /* this */"
        }"#;
        let result = remove_json_comments(input);
        assert!(!result.contains("// This"));
        assert!(!result.contains("/* inline"));
        assert!(result.contains("// in string"));
        assert!(result.contains("/* this */"));
    }

    #[test]
    fn test_aliases_from_paths() {
        let config = ProjectConfig::parse(
            r#"{
                "compilerOptions": {
                    // aliases
                    "baseUrl": ".",
                    "paths": {
                        "@/*": ["./src/*"],
                        "~lib/*": ["lib/*"],
                        "*": ["types/*"]
                    }
                }
            }"#,
        )
        .unwrap();
        let aliases = config.aliases();
        assert_eq!(
            aliases.entries(),
            &[
                ("src".to_string(), "@".to_string()),
                ("lib".to_string(), "~lib".to_string()),
            ]
        );
        assert_eq!(aliases.apply("src/components/Foo.vue"), "@/components/Foo.vue");
    }

    #[test]
    fn test_base_url_prefixes_targets() {
        let config = ProjectConfig::parse(
            r##"{ "compilerOptions": { "baseUrl": "./app/", "paths": { "#/*": ["src/*"] } } }"##,
        )
        .unwrap();
        assert_eq!(
            config.aliases().entries(),
            &[("app/src".to_string(), "#".to_string())]
        );
    }

    #[test]
    fn test_default_aliases_without_paths() {
        let config = ProjectConfig::parse("{}").unwrap();
        assert_eq!(config.aliases(), AliasMap::default());
    }

    #[test]
    fn test_find_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let nested = root.join("packages/app");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("jsconfig.json"), "{}").unwrap();
        assert_eq!(ProjectConfig::find(&nested), Some(root.join("jsconfig.json")));
    }
}
