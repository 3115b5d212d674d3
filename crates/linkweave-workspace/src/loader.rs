//! Build a [`NoteWorkspace`] from a directory on disk.

use linkweave_core::{Error, LinkConfig, Resource, ResourceType, Result};
use linkweave_parser::Parser;
use std::path::Path;
use walkdir::WalkDir;

use crate::workspace::NoteWorkspace;

/// Walk `root`, parsing notes and registering every other file as an image
/// or attachment. Hidden files and directories (`.git`, `.obsidian`, ...)
/// are skipped; unreadable entries are logged and skipped.
pub fn load_workspace(root: &Path, config: &LinkConfig) -> Result<NoteWorkspace> {
    if !root.is_dir() {
        return Err(Error::file_not_found(root));
    }
    config.validate()?;

    log::info!("Loading workspace at {}", root.display());
    let parser = Parser::new(config.clone());
    let mut workspace = NoteWorkspace::new(root, config);

    let entries = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let resource = match parser.resource_type(path) {
            ResourceType::Note => match std::fs::read_to_string(path) {
                Ok(content) => parser.parse_file(path, &content)?,
                Err(e) => {
                    log::warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            },
            other => Resource::new(path, other),
        };
        workspace.insert(resource);
    }

    log::info!(
        "Workspace loaded: {} resources, {} notes",
        workspace.len(),
        workspace.notes().count()
    );
    Ok(workspace)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_workspace() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("notes")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("index.md"), "# Home\n\n[[notes/a]]\n").unwrap();
        fs::write(root.join("notes/a.md"), "---\ntitle: A Note\n---\nbody\n").unwrap();
        fs::write(root.join("notes/pic.png"), [0u8; 4]).unwrap();
        fs::write(root.join("notes/paper.pdf"), "pdf").unwrap();
        fs::write(root.join(".git/HEAD.md"), "hidden").unwrap();
        fs::write(root.join(".hidden.md"), "hidden").unwrap();

        let ws = load_workspace(root, &LinkConfig::default()).unwrap();
        assert_eq!(ws.len(), 4);
        assert_eq!(ws.notes().count(), 2);

        let index = ws.find_by_exact_path(&root.join("index.md")).unwrap();
        assert_eq!(index.title, "Home");
        assert_eq!(index.links.len(), 1);

        let a = ws.find("a", None).unwrap();
        assert_eq!(a.title, "A Note");
        assert_eq!(
            ws.find_by_exact_path(&root.join("notes/pic.png")).unwrap().resource_type,
            ResourceType::Image
        );
        assert_eq!(
            ws.find_by_exact_path(&root.join("notes/paper.pdf")).unwrap().resource_type,
            ResourceType::Attachment
        );
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = load_workspace(&dir.path().join("nope"), &LinkConfig::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
