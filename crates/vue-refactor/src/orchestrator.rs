//! Orchestrator: resolves components in the workspace, runs an operation on
//! the parsed documents and writes the results back.

use crate::cli::{Args, Command, EntryKind, PushMode};
use crate::config::Config;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use smol_str::SmolStr;
use source_span::{LineCol, LineIndex, SourceRange};
use std::ffi::OsStr;
use std::path::PathBuf;
use vue_editor::{
    ComponentInfo, ComputedInfo, DataInfo, Document, MethodInfo, NodeId, Outcome, PropInfo,
    PropPatch, WatchOption, WatcherInfo, WatcherPatch,
};
use walkdir::WalkDir;

/// What an operation did to one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// The file.
    pub path: Utf8PathBuf,
    /// Whether the file was newly created.
    pub created: bool,
    /// The new text, the range to edit next, or nothing.
    pub outcome: Outcome,
}

/// The options declared by a component.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub path: Utf8PathBuf,
    pub props: IndexMap<SmolStr, PropInfo>,
    pub data: IndexMap<SmolStr, DataInfo>,
    pub watchers: IndexMap<SmolStr, WatcherInfo>,
    pub computed: IndexMap<SmolStr, ComputedInfo>,
    pub methods: IndexMap<SmolStr, MethodInfo>,
    pub components: IndexMap<SmolStr, ComponentInfo>,
}

/// Result of a command.
#[derive(Debug, Default)]
pub struct Report {
    /// Per-file outcomes in the order they happened.
    pub files: Vec<FileOutcome>,
    /// Set by `list`.
    pub listing: Option<Listing>,
}

impl Report {
    fn push(&mut self, path: &Utf8Path, outcome: Outcome) {
        self.files.push(FileOutcome {
            path: path.to_path_buf(),
            created: false,
            outcome,
        });
    }
}

/// Orchestrator for running vue-refactor.
pub struct Orchestrator {
    /// Configuration.
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(workspace: PathBuf, args: &Args) -> Result<Self> {
        let config = Config::load(&workspace, args)?;
        Ok(Self { config })
    }

    /// Run a command.
    pub async fn run(&self, command: Command) -> Result<Report> {
        match command {
            Command::AddProp { component, name } => {
                self.edit(&component, |doc| doc.add_prop(&name)).await
            }
            Command::UpdateProp {
                component,
                name,
                set,
                unset,
            } => {
                let mut patch = PropPatch::new();
                for (key, value) in set {
                    patch.insert(key, Some(value));
                }
                for key in unset {
                    patch.insert(key, None);
                }
                let focus = patch
                    .iter()
                    .rev()
                    .find(|(_, value)| value.is_some())
                    .map(|(key, _)| key.clone());
                self.edit_and_focus(
                    &component,
                    |doc| doc.update_prop(&name, &patch),
                    |doc| focus.and_then(|attr| doc.locate_prop_attribute(&name, &attr).ok()),
                )
                .await
            }
            Command::RenameProp { component, old, new } => {
                self.edit(&component, |doc| doc.rename_prop(&old, &new)).await
            }
            Command::RemoveProp { component, name } => {
                self.edit(&component, |doc| doc.remove_prop(&name)).await
            }

            Command::AddData {
                component,
                name,
                value,
            } => {
                self.edit_and_focus(
                    &component,
                    |doc| doc.add_data(&name, &value),
                    |doc| doc.locate_data(&name).ok(),
                )
                .await
            }
            Command::SetData {
                component,
                name,
                value,
            } => {
                self.edit_and_focus(
                    &component,
                    |doc| doc.set_data(&name, &value),
                    |doc| doc.locate_data(&name).ok(),
                )
                .await
            }
            Command::RenameData { component, old, new } => {
                self.edit(&component, |doc| doc.rename_data(&old, &new)).await
            }
            Command::RemoveData { component, name } => {
                self.edit(&component, |doc| doc.remove_data(&name)).await
            }

            Command::AddWatcher { component, name } => {
                self.edit(&component, |doc| doc.add_watcher(&name)).await
            }
            Command::UpdateWatcher {
                component,
                name,
                deep,
                immediate,
            } => {
                let mut patch = WatcherPatch::new();
                if let Some(deep) = deep {
                    patch.insert(WatchOption::Deep, deep);
                }
                if let Some(immediate) = immediate {
                    patch.insert(WatchOption::Immediate, immediate);
                }
                self.edit(&component, |doc| doc.update_watcher(&name, &patch))
                    .await
            }
            Command::RenameWatcher { component, old, new } => {
                self.edit(&component, |doc| doc.rename_watcher(&old, &new)).await
            }
            Command::RemoveWatcher { component, name } => {
                self.edit(&component, |doc| doc.remove_watcher(&name)).await
            }

            Command::AddComputed { component, name } => {
                self.edit(&component, |doc| doc.add_computed(&name)).await
            }
            Command::AddComputedSetter { component, name } => {
                self.edit(&component, |doc| doc.add_computed_setter(&name))
                    .await
            }
            Command::RemoveComputedSetter { component, name } => {
                self.edit(&component, |doc| doc.remove_computed_setter(&name))
                    .await
            }
            Command::RenameComputed { component, old, new } => {
                self.edit(&component, |doc| doc.rename_computed(&old, &new))
                    .await
            }
            Command::RemoveComputed { component, name } => {
                self.edit(&component, |doc| doc.remove_computed(&name)).await
            }

            Command::AddMethod { component, name } => {
                self.edit(&component, |doc| doc.add_method(&name)).await
            }
            Command::RenameMethod { component, old, new } => {
                self.edit(&component, |doc| doc.rename_method(&old, &new)).await
            }
            Command::RemoveMethod { component, name } => {
                self.edit(&component, |doc| doc.remove_method(&name)).await
            }

            Command::ImportComponent { component, path } => {
                self.edit(&component, |doc| doc.import_component(&path)).await
            }
            Command::DeportComponent { component, name } => {
                self.edit(&component, |doc| doc.deport_component(&name)).await
            }

            Command::Extract {
                component,
                at,
                into,
            } => self.extract(&component, at, &into).await,
            Command::PushNode {
                component,
                at,
                mode,
                slot,
            } => self.push_node(&component, at, mode, slot.as_deref()).await,
            Command::PushOption {
                component,
                kind,
                name,
                to,
            } => self.push_option(&component, kind, &name, &to).await,

            Command::List { component } => self.list(&component).await,
        }
    }

    /// Find a component file by path or by name.
    ///
    /// A name is looked up as `<Name>.vue` anywhere under the workspace,
    /// skipping `node_modules` and dot directories. Kebab-case names also
    /// match the PascalCase file.
    pub fn resolve(&self, component: &str) -> Result<Utf8PathBuf> {
        if component.ends_with(".vue") || component.contains(['/', '\\']) {
            let path = Utf8Path::new(component);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.config.workspace.join(path)
            };
            if !path.is_file() {
                return Err(miette!("{} does not exist", path));
            }
            return Ok(path);
        }

        let mut names = vec![format!("{}.vue", component)];
        let pascal = format!("{}.vue", pascal_case(component));
        if !names.contains(&pascal) {
            names.push(pascal);
        }
        let mut candidates = find_components(&self.config.workspace, &names);
        tracing::debug!(component, candidates = candidates.len(), "resolved component");
        match candidates.len() {
            0 => Err(miette!(
                "no component named `{}` under {}",
                component,
                self.config.workspace
            )),
            1 => Ok(candidates.remove(0)),
            _ => {
                let list = candidates
                    .iter()
                    .map(|path| format!("  {}", path))
                    .collect::<Vec<_>>()
                    .join("\n");
                Err(miette!(
                    help = "pass the path of the file instead of its name",
                    "several components are named `{}`:\n{}",
                    component,
                    list
                ))
            }
        }
    }

    async fn open(&self, path: &Utf8Path) -> Result<Document> {
        let text = tokio::fs::read_to_string(path)
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path))?;
        Document::parse_async(text, self.config.document.clone())
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse {}", path))
    }

    async fn save(&self, path: &Utf8Path, outcome: &Outcome) -> Result<()> {
        let Some(text) = outcome.text() else {
            return Ok(());
        };
        if self.config.dry_run {
            tracing::debug!(%path, "dry run, not writing");
            return Ok(());
        }
        tokio::fs::write(path, text)
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path))?;
        tracing::info!(%path, "wrote");
        Ok(())
    }

    async fn create(&self, path: &Utf8Path, document: &Document) -> Result<FileOutcome> {
        if path.exists() {
            return Err(miette!("{} already exists", path));
        }
        let outcome = Outcome::Text(document.to_string());
        if !self.config.dry_run {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.into_diagnostic()?;
            }
        }
        self.save(path, &outcome).await?;
        Ok(FileOutcome {
            path: path.to_path_buf(),
            created: true,
            outcome,
        })
    }

    async fn edit(
        &self,
        component: &str,
        op: impl FnOnce(&mut Document) -> vue_editor::Result<Outcome>,
    ) -> Result<Report> {
        self.edit_and_focus(component, op, |_| None).await
    }

    /// Edit one component and report where the user should continue.
    async fn edit_and_focus(
        &self,
        component: &str,
        op: impl FnOnce(&mut Document) -> vue_editor::Result<Outcome>,
        focus: impl FnOnce(&Document) -> Option<SourceRange>,
    ) -> Result<Report> {
        let path = self.resolve(component)?;
        let mut document = self.open(&path).await?;
        let outcome = op(&mut document)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot edit {}", path))?;
        let range = focus(&document);
        self.save(&path, &outcome).await?;

        let mut report = Report::default();
        report.push(&path, outcome);
        if let Some(range) = range {
            report.push(&path, Outcome::Focus(range));
        }
        Ok(report)
    }

    async fn extract(&self, component: &str, at: (u32, u32), into: &str) -> Result<Report> {
        let path = self.resolve(component)?;
        let target = self.config.workspace.join(into);
        if target.exists() {
            return Err(miette!("{} already exists", target));
        }
        let mut document = self.open(&path).await?;
        let node = element_at(&document, &path, at)?;
        let extracted = document
            .refactor_into_component(node, into)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot extract from {}", path))?;

        let mut report = Report::default();
        report.files.push(self.create(&target, &extracted).await?);
        let outcome = Outcome::Text(document.to_string());
        self.save(&path, &outcome).await?;
        report.push(&path, outcome);
        Ok(report)
    }

    async fn push_node(
        &self,
        component: &str,
        at: (u32, u32),
        mode: PushMode,
        slot: Option<&str>,
    ) -> Result<Report> {
        let path = self.resolve(component)?;
        let mut donor = self.open(&path).await?;
        let node = element_at(&donor, &path, at)?;
        let parent = donor.find_parent_component(node).into_diagnostic()?;
        let tag = donor
            .markup()
            .tag(parent)
            .ok_or_else(|| miette!("the enclosing component has no tag"))?
            .to_string();
        let host_path = self.resolve(&tag)?;
        let mut host = self.open(&host_path).await?;
        let host_before = host.to_string();

        let result = match mode {
            PushMode::Above => donor.push_above_slot(node, &mut host),
            PushMode::Below => donor.push_below_slot(node, &mut host),
            PushMode::Around => donor.push_around_slot(node, &mut host),
            PushMode::Into => donor.push_into_slot(node, &mut host),
            PushMode::NewSlot => {
                let slot = slot.ok_or_else(|| miette!("--slot is required for a new slot"))?;
                donor.push_into_new_slot(node, slot, &mut host)
            }
        };
        let outcome = result
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot push from {} into {}", path, host_path))?;
        self.finish_pair(&path, outcome, &host_path, &host, &host_before)
            .await
    }

    async fn push_option(
        &self,
        component: &str,
        kind: EntryKind,
        name: &str,
        to: &str,
    ) -> Result<Report> {
        let path = self.resolve(component)?;
        let host_path = self.resolve(to)?;
        if path == host_path {
            return Err(miette!("{} cannot receive its own {}", path, name));
        }
        let mut donor = self.open(&path).await?;
        let mut host = self.open(&host_path).await?;
        let host_before = host.to_string();

        let result = match kind {
            EntryKind::Component => donor.push_component(name, &mut host),
            EntryKind::Data => donor.push_data(name, &mut host),
            EntryKind::Computed => donor.push_computed(name, &mut host),
            EntryKind::Watcher => donor.push_watcher(name, &mut host),
            EntryKind::Method => donor.push_method(name, &mut host),
        };
        let outcome = result
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot push `{}` from {} into {}", name, path, host_path))?;
        self.finish_pair(&path, outcome, &host_path, &host, &host_before)
            .await
    }

    async fn finish_pair(
        &self,
        donor_path: &Utf8Path,
        donor_outcome: Outcome,
        host_path: &Utf8Path,
        host: &Document,
        host_before: &str,
    ) -> Result<Report> {
        let host_text = host.to_string();
        let host_outcome = if host_text == host_before {
            Outcome::Unchanged
        } else {
            Outcome::Text(host_text)
        };
        self.save(donor_path, &donor_outcome).await?;
        self.save(host_path, &host_outcome).await?;

        let mut report = Report::default();
        report.push(donor_path, donor_outcome);
        report.push(host_path, host_outcome);
        Ok(report)
    }

    async fn list(&self, component: &str) -> Result<Report> {
        let path = self.resolve(component)?;
        let document = self.open(&path).await?;
        Ok(Report {
            files: Vec::new(),
            listing: Some(Listing {
                props: document.props(),
                data: document.data(),
                watchers: document.watchers(),
                computed: document.computed(),
                methods: document.methods(),
                components: document.components(),
                path,
            }),
        })
    }
}

/// The innermost element at a 1-based `line:col` position.
fn element_at(document: &Document, path: &Utf8Path, (line, col): (u32, u32)) -> Result<NodeId> {
    let text = document.to_string();
    let offset = LineIndex::new(&text)
        .offset(LineCol::new(line - 1, col - 1))
        .ok_or_else(|| miette!("{}:{}:{} is outside the file", path, line, col))?;
    document
        .node_at(offset)
        .ok_or_else(|| miette!("no element at {}:{}:{}", path, line, col))
}

fn is_skipped_dir(name: &OsStr) -> bool {
    name == "node_modules" || name.to_str().is_some_and(|name| name.starts_with('.'))
}

/// Files under `root` whose name is one of `names`, sorted.
fn find_components(root: &Utf8Path, names: &[String]) -> Vec<Utf8PathBuf> {
    let mut found: Vec<Utf8PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry.file_name()))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| names.iter().any(|wanted| wanted == name))
        })
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .collect();
    found.sort();
    found
}

/// `my-card` becomes `MyCard`.
fn pascal_case(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
