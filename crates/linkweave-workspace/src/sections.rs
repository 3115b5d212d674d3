//! Markdown text behind a resolved reference: a whole note, or the lines of
//! one of its sections.

use linkweave_core::{Resource, ResolvedReference, ResourceType, Result};
use linkweave_parser::find_section_by_anchor;

use crate::workspace::Workspace;

/// Text of the section of `resource` named by `fragment`, sliced out of
/// `content`.
///
/// `content` must be the text `resource` was parsed from; `None` when no
/// section matches or the recorded range no longer fits the text.
pub fn section_text<'a>(content: &'a str, resource: &Resource, fragment: &str) -> Option<&'a str> {
    let section = find_section_by_anchor(resource, fragment)?;
    let text = content.get(section.range.offset..section.range.end_offset());
    if text.is_none() {
        log::warn!(
            "Section '{}' of {} is outside the current file contents",
            section.label,
            resource.path.display()
        );
    }
    text
}

/// Read the markdown `reference` points at, seen from `document`.
///
/// A reference with a section yields only that section's text; when the
/// section is unknown the whole note is returned. Placeholders and non-note
/// resources have no markdown and yield `None`.
///
/// # Example
/// ```no_run
/// use linkweave_core::{LinkConfig, LinkToken};
/// use linkweave_workspace::{Workspace, load_workspace, read_as_markdown, resolve};
/// use std::path::Path;
///
/// let config = LinkConfig::default();
/// let workspace = load_workspace(Path::new("notes"), &config).unwrap();
/// let document = workspace.find_by_exact_path(Path::new("notes/index.md")).unwrap();
///
/// let token = LinkToken::wikilink("[[ada#Early life]]");
/// let reference = resolve(&token, document, &workspace, &config).unwrap();
/// if let Some(text) = read_as_markdown(&reference, document, &workspace).unwrap() {
///     println!("{}", text);
/// }
/// ```
pub fn read_as_markdown<W: Workspace + ?Sized>(
    reference: &ResolvedReference,
    document: &Resource,
    workspace: &W,
) -> Result<Option<String>> {
    let Some(path) = reference.target_path(&document.path) else {
        return Ok(None);
    };
    let resource = if path == document.path.as_path() {
        Some(document)
    } else {
        workspace.find_by_exact_path(path)
    };
    if resource.is_some_and(|r| r.resource_type != ResourceType::Note) {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let (Some(resource), Some(fragment)) = (resource, reference.section()) else {
        return Ok(Some(content));
    };

    match section_text(&content, resource, fragment) {
        Some(text) => Ok(Some(text.to_string())),
        None => {
            log::debug!("No section '{}' in {}, using the whole note", fragment, path.display());
            Ok(Some(content))
        }
    }
}
