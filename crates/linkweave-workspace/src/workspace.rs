//! Workspace lookup: identifiers, relative paths and exact paths → resources.

use linkweave_core::{LinkConfig, Resource};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::paths::{normalize_path, workspace_relative};

/// Read access to the resources of a note workspace
pub trait Workspace {
    /// Absolute root directory
    fn root(&self) -> &Path;

    /// Extension appended to extension-less references, with leading dot
    fn default_extension(&self) -> &str;

    /// Look up by identifier (`note`, `folder/note`) or by path (`/x`, `./x`,
    /// `../x`). Paths are taken relative to the directory of `relative_to`,
    /// or to the root when it is `None`.
    fn find(&self, reference: &str, relative_to: Option<&Path>) -> Option<&Resource>;

    /// Look up by absolute path
    fn find_by_exact_path(&self, path: &Path) -> Option<&Resource>;
}

/// In-memory workspace keyed by absolute path
#[derive(Debug, Clone)]
pub struct NoteWorkspace {
    root: PathBuf,
    default_extension: String,
    note_extensions: Vec<String>,
    case_insensitive: bool,
    resources: BTreeMap<PathBuf, Resource>,
}

impl NoteWorkspace {
    pub fn new(root: impl Into<PathBuf>, config: &LinkConfig) -> Self {
        Self {
            root: root.into(),
            default_extension: config.default_note_extension.clone(),
            note_extensions: config.note_extensions.clone(),
            case_insensitive: config.case_insensitive_titles,
            resources: BTreeMap::new(),
        }
    }

    /// Add or replace a resource, returning the previous one at that path
    pub fn insert(&mut self, resource: Resource) -> Option<Resource> {
        self.resources.insert(resource.path.clone(), resource)
    }

    pub fn remove(&mut self, path: &Path) -> Option<Resource> {
        self.resources.remove(path)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All resources in path order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Notes only, in path order
    pub fn notes(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values().filter(|r| r.is_note())
    }

    fn eq_str(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    }

    fn has_note_extension(&self, reference: &str) -> bool {
        Path::new(reference)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.note_extensions
                    .iter()
                    .any(|n| n.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }

    /// Candidate spellings of a reference: as written, and with the default
    /// extension when it does not already name a note file
    fn spellings(&self, reference: &str) -> Vec<String> {
        let mut spellings = vec![reference.to_string()];
        if !self.has_note_extension(reference) {
            spellings.push(format!("{}{}", reference, self.default_extension));
        }
        spellings
    }

    fn find_by_path_reference(&self, reference: &str, relative_to: Option<&Path>) -> Option<&Resource> {
        let base = match reference.strip_prefix('/') {
            Some(_) => self.root.clone(),
            None => relative_to
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone()),
        };
        self.spellings(reference.trim_start_matches('/'))
            .iter()
            .find_map(|spelling| self.find_by_exact_path(&normalize_path(&base.join(spelling))))
    }

    /// Match an identifier against the tail of each workspace-relative path,
    /// then against titles. Ties go to the shortest path.
    fn find_by_identifier(&self, identifier: &str) -> Option<&Resource> {
        let spellings = self.spellings(identifier.trim_end_matches('/'));
        let mut matches: Vec<(String, &Resource)> = self
            .resources
            .values()
            .filter_map(|r| workspace_relative(&r.path, &self.root).map(|rel| (rel, r)))
            .filter(|(rel, _)| {
                spellings.iter().any(|s| {
                    self.eq_str(rel, s)
                        || (rel.len() > s.len()
                            && rel.is_char_boundary(rel.len() - s.len() - 1)
                            && rel[rel.len() - s.len() - 1..].starts_with('/')
                            && self.eq_str(&rel[rel.len() - s.len()..], s))
                })
            })
            .collect();

        if matches.is_empty() {
            let by_title = self
                .resources
                .values()
                .filter(|r| r.is_note() && self.eq_str(&r.title, identifier));
            matches = by_title
                .filter_map(|r| workspace_relative(&r.path, &self.root).map(|rel| (rel, r)))
                .collect();
        }

        matches.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        if matches.len() > 1 {
            log::debug!(
                "Identifier '{}' is ambiguous ({} matches), picking {}",
                identifier,
                matches.len(),
                matches[0].0
            );
        }
        matches.into_iter().next().map(|(_, r)| r)
    }
}

impl Workspace for NoteWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn default_extension(&self) -> &str {
        &self.default_extension
    }

    fn find(&self, reference: &str, relative_to: Option<&Path>) -> Option<&Resource> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with('/') || reference.starts_with("./") || reference.starts_with("../") {
            self.find_by_path_reference(reference, relative_to)
        } else {
            self.find_by_identifier(reference)
        }
    }

    fn find_by_exact_path(&self, path: &Path) -> Option<&Resource> {
        if let Some(resource) = self.resources.get(path) {
            return Some(resource);
        }
        if !self.case_insensitive {
            return None;
        }
        let wanted = path.to_string_lossy().to_lowercase();
        self.resources
            .iter()
            .find(|(p, _)| p.to_string_lossy().to_lowercase() == wanted)
            .map(|(_, r)| r)
    }
}
