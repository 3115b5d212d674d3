//! Link resolver: link token + containing document → [`ResolvedReference`].
//!
//! Missing targets, `../` overflow and unknown sections are soft failures and
//! come back as values. Only tokens the analyzer rejects produce errors.

use linkweave_core::{
    DecomposedLink, Error, LinkConfig, LinkKind, LinkToken, Resource, ResolvedReference, Result,
    WikilinkGrammar,
};
use linkweave_parser::{analyze, target_with_path_prefixes};
use linkweave_parser::parsers::link_utils::{has_path_prefix, is_external_url};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::{
    SubdirContext, compute_subdirectory_context, compute_target_file_path, normalize_path,
};
use crate::workspace::Workspace;

/// Outcome of resolving one link of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResolution {
    pub link: LinkToken,
    pub reference: Option<ResolvedReference>,
    /// Message of the error that prevented resolution
    pub error: Option<String>,
}

impl LinkResolution {
    pub fn is_resolved(&self) -> bool {
        self.reference
            .as_ref()
            .is_some_and(|r| !r.is_placeholder())
    }
}

/// Resolve `token`, found in `document`, against `workspace`.
///
/// # Example
/// ```
/// use linkweave_core::{LinkConfig, LinkToken, Resource, ResourceType, ResolvedReference};
/// use linkweave_workspace::{NoteWorkspace, resolve};
///
/// let config = LinkConfig::default();
/// let mut workspace = NoteWorkspace::new("/ws", &config);
/// workspace.insert(Resource::new("/ws/note-a.md", ResourceType::Note));
/// let document = Resource::new("/ws/index.md", ResourceType::Note);
///
/// let reference = resolve(&LinkToken::wikilink("[[note-a#Intro]]"), &document, &workspace, &config).unwrap();
/// assert_eq!(reference.section(), Some("Intro"));
/// assert!(!reference.is_placeholder());
/// ```
pub fn resolve<W: Workspace + ?Sized>(
    token: &LinkToken,
    document: &Resource,
    workspace: &W,
    config: &LinkConfig,
) -> Result<ResolvedReference> {
    let grammar = config.grammar();
    let link = analyze(token, grammar, &config.image_extensions)?;

    let context = if grammar == WikilinkGrammar::Gollum {
        let context = document_context(document, workspace, link.parent_count);
        if context.parent_count_exceeded {
            log::debug!(
                "{} climbs above the workspace root from {}",
                token.raw_text,
                document.path.display()
            );
            return Ok(ResolvedReference::placeholder(target_with_path_prefixes(&link)));
        }
        Some(context)
    } else {
        None
    };

    let reference = match token.kind {
        LinkKind::WikiLink => resolve_wikilink(&link, context.as_ref(), document, workspace),
        LinkKind::DirectLink => resolve_direct_link(&link, context.as_ref(), document, workspace),
        other => return Err(Error::unsupported_kind(other)),
    };

    Ok(reference.with_section(&link.section))
}

/// Resolve every link of `document`. A failure is recorded on its link only.
pub fn resolve_all<W: Workspace + ?Sized>(
    document: &Resource,
    workspace: &W,
    config: &LinkConfig,
) -> Vec<LinkResolution> {
    document
        .links
        .iter()
        .map(|link| match resolve(link, document, workspace, config) {
            Ok(reference) => LinkResolution {
                link: link.clone(),
                reference: Some(reference),
                error: None,
            },
            Err(e) => {
                if matches!(e, Error::UnsupportedLinkKind { .. }) {
                    log::debug!("Skipping {} in {}: {}", link.raw_text, document.path.display(), e);
                } else {
                    log::warn!(
                        "Cannot resolve {} at {}:{} in {}: {}",
                        link.raw_text,
                        link.range.line,
                        link.range.column,
                        document.path.display(),
                        e
                    );
                }
                LinkResolution {
                    link: link.clone(),
                    reference: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

fn document_context<W: Workspace + ?Sized>(
    document: &Resource,
    workspace: &W,
    parent_count: usize,
) -> SubdirContext {
    let relative = document
        .path
        .strip_prefix(workspace.root())
        .unwrap_or(document.path.as_path());
    compute_subdirectory_context(relative, parent_count)
}

fn resolve_wikilink<W: Workspace + ?Sized>(
    link: &DecomposedLink,
    context: Option<&SubdirContext>,
    document: &Resource,
    workspace: &W,
) -> ResolvedReference {
    if let Some(definition) = document.find_definition(&link.target) {
        return resolve_definition_url(&definition.url, document, workspace);
    }

    if link.is_self_reference() {
        return ResolvedReference::SelfReference {
            section: link.section.clone(),
        };
    }

    match context {
        Some(context) => find_gollum_target(link, context, workspace),
        None => workspace
            .find(&link.target, Some(&document.path))
            .map(|r| ResolvedReference::resource(&r.path))
            .unwrap_or_else(|| ResolvedReference::placeholder(&link.target)),
    }
}

fn resolve_direct_link<W: Workspace + ?Sized>(
    link: &DecomposedLink,
    context: Option<&SubdirContext>,
    document: &Resource,
    workspace: &W,
) -> ResolvedReference {
    if link.is_self_reference() {
        return ResolvedReference::SelfReference {
            section: link.section.clone(),
        };
    }

    let target = percent_decoded(&link.target);
    match context {
        Some(context) => {
            let decoded = DecomposedLink {
                target,
                ..link.clone()
            };
            find_gollum_target(&decoded, context, workspace)
        }
        None => {
            // ambiguous direct links are relative to the document
            let path = if has_path_prefix(&target) {
                target
            } else {
                format!("./{}", target)
            };
            workspace
                .find(&path, Some(&document.path))
                .map(|r| ResolvedReference::resource(&r.path))
                .unwrap_or_else(|| ResolvedReference::placeholder(&link.target))
        }
    }
}

fn find_gollum_target<W: Workspace + ?Sized>(
    link: &DecomposedLink,
    context: &SubdirContext,
    workspace: &W,
) -> ResolvedReference {
    let path = compute_target_file_path(
        &link.target,
        &context.subdir,
        link.is_root,
        workspace.root(),
        workspace.default_extension(),
    );
    match workspace.find_by_exact_path(&path) {
        Some(resource) => ResolvedReference::resource(&resource.path),
        None => {
            let target = target_with_path_prefixes(link);
            log::debug!("No resource at {} for '{}'", path.display(), target);
            ResolvedReference::placeholder(target)
        }
    }
}

/// Resolve a reference-definition URL relative to the document's directory
fn resolve_definition_url<W: Workspace + ?Sized>(
    url: &str,
    document: &Resource,
    workspace: &W,
) -> ResolvedReference {
    if is_external_url(url) {
        return ResolvedReference::placeholder(url);
    }

    let decoded = percent_decoded(url);
    let base: PathBuf = match decoded.strip_prefix('/') {
        Some(_) => workspace.root().to_path_buf(),
        None => document
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| workspace.root().to_path_buf()),
    };
    let path = normalize_path(&base.join(decoded.trim_start_matches('/')));

    let with_extension = || {
        let mut name = path.clone().into_os_string();
        name.push(workspace.default_extension());
        PathBuf::from(name)
    };

    workspace
        .find_by_exact_path(&path)
        .or_else(|| {
            if path.extension().is_none() {
                workspace.find_by_exact_path(&with_extension())
            } else {
                None
            }
        })
        .map(|r| ResolvedReference::resource(&r.path))
        .unwrap_or_else(|| ResolvedReference::placeholder(path.to_string_lossy()))
}

fn percent_decoded(text: &str) -> String {
    match urlencoding::decode(text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text.to_string(),
    }
}
