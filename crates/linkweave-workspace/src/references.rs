//! Markdown reference definitions for a note's wikilinks.
//!
//! Appending `[note-a]: path/to/note-a "Title"` lines lets plain markdown
//! renderers follow wikilinks.

use linkweave_core::{LinkConfig, LinkKind, NoteLinkDefinition, Resource, ResolvedReference};
use std::collections::HashSet;
use std::path::Path;

use crate::paths::relative_to;
use crate::resolver::resolve;
use crate::workspace::Workspace;

/// Build one definition per distinct wikilink of `resource` that resolves to
/// an existing resource.
///
/// URLs are relative to the note's directory; the default note extension is
/// dropped unless `include_extension` is set. The file name is percent-encoded
/// with spaces kept. Results are sorted by label and deduplicated by their
/// formatted text.
pub fn create_markdown_references<W: Workspace + ?Sized>(
    workspace: &W,
    resource: &Resource,
    include_extension: bool,
    config: &LinkConfig,
) -> Vec<NoteLinkDefinition> {
    let base_dir = resource.path.parent().unwrap_or(workspace.root());

    let mut definitions: Vec<NoteLinkDefinition> = resource
        .links
        .iter()
        .filter(|link| link.kind == LinkKind::WikiLink)
        .filter_map(|link| {
            let reference = match resolve(link, resource, workspace, config) {
                Ok(reference) => reference,
                Err(e) => {
                    log::warn!(
                        "Link {} in {} is not valid: {}",
                        link.raw_text,
                        resource.path.display(),
                        e
                    );
                    return None;
                }
            };
            let ResolvedReference::Resource { path, .. } = reference else {
                // placeholders and self references need no definition
                return None;
            };
            let Some(target) = workspace.find_by_exact_path(&path) else {
                log::warn!(
                    "Link {} in {} resolved to unknown {}",
                    link.raw_text,
                    resource.path.display(),
                    path.display()
                );
                return None;
            };

            Some(NoteLinkDefinition {
                label: wikilink_label(&link.raw_text).to_string(),
                url: definition_url(
                    &target.path,
                    base_dir,
                    workspace.default_extension(),
                    include_extension,
                ),
                title: Some(target.title.clone()),
                range: None,
            })
        })
        .collect();

    definitions.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.url.cmp(&b.url)));

    let mut seen = HashSet::new();
    definitions.retain(|def| seen.insert(def.format()));
    definitions
}

/// Text between the brackets: `note-a|alias` for `![[note-a|alias]]`
fn wikilink_label(raw: &str) -> &str {
    let raw = raw.strip_prefix('!').unwrap_or(raw);
    raw.strip_prefix("[[")
        .and_then(|r| r.strip_suffix("]]"))
        .unwrap_or(raw)
}

fn definition_url(
    target: &Path,
    base_dir: &Path,
    default_extension: &str,
    include_extension: bool,
) -> String {
    let mut relative = relative_to(target, base_dir);
    if !include_extension && relative.ends_with(default_extension) {
        relative.truncate(relative.len() - default_extension.len());
    }

    let (base, name) = match relative.rsplit_once('/') {
        Some((base, name)) => (Some(base), name),
        None => (None, relative.as_str()),
    };
    let encoded = urlencoding::encode(name).replace("%20", " ");
    match base {
        Some(base) => format!("{}/{}", base, encoded),
        None => encoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::NoteWorkspace;
    use linkweave_core::{LinkToken, ResourceType};

    fn note(path: &str, title: &str) -> Resource {
        let mut resource = Resource::new(path, ResourceType::Note);
        resource.title = title.to_string();
        resource
    }

    fn setup() -> (NoteWorkspace, Resource) {
        let config = LinkConfig::default();
        let mut ws = NoteWorkspace::new("/ws", &config);
        ws.insert(note("/ws/notes/note-a.md", "Note A"));
        ws.insert(note("/ws/other/café & co.md", "Cafe"));
        ws.insert(Resource::new("/ws/notes/pic.png", ResourceType::Image));

        let mut doc = note("/ws/notes/index.md", "Index");
        doc.links = vec![
            LinkToken::wikilink("[[note-a]]"),
            LinkToken::wikilink("![[note-a]]"),
            LinkToken::wikilink("[[note-a|Alias]]"),
            LinkToken::wikilink("[[café & co]]"),
            LinkToken::wikilink("[[missing]]"),
            LinkToken::wikilink("[[#local]]"),
            LinkToken::wikilink("[[pic.png]]"),
            LinkToken::direct("[x](note-a.md)"),
        ];
        ws.insert(doc.clone());
        (ws, doc)
    }

    #[test]
    fn test_definitions_for_wikilinks() {
        let (ws, doc) = setup();
        let defs = create_markdown_references(&ws, &doc, false, &LinkConfig::default());
        let formatted: Vec<String> = defs.iter().map(|d| d.format()).collect();
        assert_eq!(
            formatted,
            vec![
                r#"[café & co]: <../other/caf%C3%A9 %26 co> "Cafe""#.to_string(),
                r#"[note-a]: note-a "Note A""#.to_string(),
                r#"[note-a|Alias]: note-a "Note A""#.to_string(),
                r#"[pic.png]: pic.png "pic""#.to_string(),
            ]
        );
    }

    #[test]
    fn test_definitions_with_extension() {
        let (ws, doc) = setup();
        let defs = create_markdown_references(&ws, &doc, true, &LinkConfig::default());
        let note_a = defs.iter().find(|d| d.label == "note-a").unwrap();
        assert_eq!(note_a.url, "note-a.md");
    }

    #[test]
    fn test_wikilink_label() {
        assert_eq!(wikilink_label("[[a|b]]"), "a|b");
        assert_eq!(wikilink_label("![[a]]"), "a");
    }
}
