//! Command implementations. Each returns a serializable report so the
//! binary can print it as text or JSON.

use anyhow::{Context, anyhow};
use linkweave_core::{LinkConfig, LinkKind, NoteLinkDefinition, Resource, ResolvedReference};
use linkweave_parser::{LinkDelta, TextEdit, find_section_by_anchor, render_edit_with_config};
use linkweave_workspace::paths::workspace_relative;
use linkweave_workspace::{
    LinkResolution, NoteWorkspace, Workspace, create_markdown_references, read_as_markdown,
    resolve_all,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Resolutions of every link in one note
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Workspace-relative path of the note
    pub file: String,
    pub resolutions: Vec<LinkResolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    /// Resolved to a placeholder
    Unresolved,
    /// Could not be analyzed
    Invalid,
}

/// A link `check` complains about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub link: String,
    pub kind: ProblemKind,
    pub message: String,
}

/// Links of one note pointing at a renamed resource, and their replacements
#[derive(Debug, Clone, Serialize)]
pub struct FileEdits {
    pub file: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub edits: Vec<TextEdit>,
}

/// Find the note named by `file`, taken relative to the vault root first and
/// then as given
pub fn locate<'a>(workspace: &'a NoteWorkspace, file: &Path) -> anyhow::Result<&'a Resource> {
    let candidates = [workspace.root().join(file), file.to_path_buf()];
    candidates
        .iter()
        .find_map(|path| workspace.find_by_exact_path(path))
        .ok_or_else(|| anyhow!("{} is not part of the workspace", file.display()))
}

/// Resolve the links of `file`, or of every note when `None`
pub fn resolve_notes(
    workspace: &NoteWorkspace,
    file: Option<&Path>,
    config: &LinkConfig,
) -> anyhow::Result<Vec<FileReport>> {
    let notes: Vec<&Resource> = match file {
        Some(file) => vec![locate(workspace, file)?],
        None => workspace.notes().collect(),
    };

    Ok(notes
        .into_iter()
        .map(|note| FileReport {
            file: display_path(workspace, &note.path),
            resolutions: resolve_all(note, workspace, config),
        })
        .collect())
}

/// Every placeholder and invalid link in the workspace.
///
/// Reference-style links are resolved by markdown itself and never reported.
pub fn check(workspace: &NoteWorkspace, config: &LinkConfig) -> Vec<Problem> {
    let mut problems = Vec::new();
    for note in workspace.notes() {
        for resolution in resolve_all(note, workspace, config) {
            let (kind, message) = match (&resolution.reference, &resolution.error) {
                (Some(ResolvedReference::Placeholder { target }), _) => {
                    (ProblemKind::Unresolved, format!("no resource named '{}'", target))
                }
                (None, Some(_)) if resolution.link.kind == LinkKind::ReferenceLink => continue,
                (None, Some(error)) => (ProblemKind::Invalid, error.clone()),
                _ => continue,
            };
            problems.push(Problem {
                file: display_path(workspace, &note.path),
                line: resolution.link.range.line,
                column: resolution.link.range.column,
                link: resolution.link.raw_text.clone(),
                kind,
                message,
            });
        }
    }
    log::info!("Checked {} notes, {} problems", workspace.notes().count(), problems.len());
    problems
}

/// Reference definitions for the wikilinks of `file`
pub fn references(
    workspace: &NoteWorkspace,
    file: &Path,
    include_extension: bool,
    config: &LinkConfig,
) -> anyhow::Result<Vec<NoteLinkDefinition>> {
    let note = locate(workspace, file)?;
    Ok(create_markdown_references(
        workspace,
        note,
        include_extension,
        config,
    ))
}

/// Markdown of `file`, or of one of its sections
pub fn show(
    workspace: &NoteWorkspace,
    file: &Path,
    section: Option<&str>,
) -> anyhow::Result<String> {
    let note = locate(workspace, file)?;
    if let Some(section) = section.filter(|s| find_section_by_anchor(note, s).is_none()) {
        return Err(anyhow!("{} has no section '{}'", file.display(), section));
    }

    let reference = ResolvedReference::Resource {
        path: note.path.clone(),
        section: section.map(str::to_string),
    };
    read_as_markdown(&reference, note, workspace)
        .with_context(|| format!("Failed to read {}", note.path.display()))?
        .ok_or_else(|| anyhow!("{} is not a note", file.display()))
}

/// Edits pointing every link that resolves to `from` at `new_target`.
///
/// Sections and aliases are kept; only the target field changes.
pub fn retarget(
    workspace: &NoteWorkspace,
    from: &Path,
    new_target: &str,
    config: &LinkConfig,
) -> anyhow::Result<Vec<FileEdits>> {
    let from = locate(workspace, from)?.path.clone();
    let delta = LinkDelta::new().target(new_target);

    let mut changes = Vec::new();
    for note in workspace.notes() {
        let mut edits = Vec::new();
        for resolution in resolve_all(note, workspace, config) {
            let Some(ResolvedReference::Resource { path, .. }) = &resolution.reference else {
                continue;
            };
            if *path != from {
                continue;
            }
            let edit = render_edit_with_config(&resolution.link, &delta, config)
                .with_context(|| format!("Cannot rewrite {}", resolution.link.raw_text))?;
            edits.push(edit);
        }
        if !edits.is_empty() {
            changes.push(FileEdits {
                file: display_path(workspace, &note.path),
                path: note.path.clone(),
                edits,
            });
        }
    }
    Ok(changes)
}

/// Apply non-overlapping edits to `content`
pub fn apply_edits(content: &str, edits: &[TextEdit]) -> anyhow::Result<String> {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| std::cmp::Reverse(edit.range.offset));

    let mut result = content.to_string();
    for edit in sorted {
        let start = edit.range.offset;
        let end = edit.range.end_offset();
        if end > result.len() || !result.is_char_boundary(start) || !result.is_char_boundary(end) {
            return Err(anyhow!(
                "Edit at {}:{} is outside the document",
                edit.range.line,
                edit.range.column
            ));
        }
        result.replace_range(start..end, &edit.new_text);
    }
    Ok(result)
}

/// Write retarget edits back to disk
pub fn write_edits(changes: &[FileEdits]) -> anyhow::Result<()> {
    for change in changes {
        let content = std::fs::read_to_string(&change.path)
            .with_context(|| format!("Failed to read {}", change.path.display()))?;
        let updated = apply_edits(&content, &change.edits)?;
        std::fs::write(&change.path, updated)
            .with_context(|| format!("Failed to write {}", change.path.display()))?;
        log::info!("Updated {} links in {}", change.edits.len(), change.file);
    }
    Ok(())
}

pub fn render_file_reports(reports: &[FileReport], workspace: &NoteWorkspace) -> String {
    let mut out = String::new();
    for report in reports.iter().filter(|r| !r.resolutions.is_empty()) {
        let _ = writeln!(out, "{}", report.file);
        for resolution in &report.resolutions {
            let outcome = match (&resolution.reference, &resolution.error) {
                (Some(reference), _) => describe(reference, workspace),
                (None, Some(error)) => format!("error: {}", error),
                (None, None) => "skipped".to_string(),
            };
            let _ = writeln!(
                out,
                "  {}:{}  {} -> {}",
                resolution.link.range.line,
                resolution.link.range.column,
                resolution.link.raw_text,
                outcome
            );
        }
    }
    out
}

pub fn render_problems(problems: &[Problem]) -> String {
    let mut out = String::new();
    for problem in problems {
        let _ = writeln!(
            out,
            "{}:{}:{}: {} {}",
            problem.file, problem.line, problem.column, problem.link, problem.message
        );
    }
    out
}

pub fn render_definitions(definitions: &[NoteLinkDefinition]) -> String {
    definitions
        .iter()
        .map(|def| format!("{}\n", def.format()))
        .collect()
}

pub fn render_file_edits(changes: &[FileEdits]) -> String {
    let mut out = String::new();
    for change in changes {
        for edit in &change.edits {
            let _ = writeln!(
                out,
                "{}:{}:{}: {}",
                change.file, edit.range.line, edit.range.column, edit.new_text
            );
        }
    }
    out
}

fn describe(reference: &ResolvedReference, workspace: &NoteWorkspace) -> String {
    match reference {
        ResolvedReference::Resource { path, section } => {
            let path = display_path(workspace, path);
            match section {
                Some(section) => format!("{}#{}", path, section),
                None => path,
            }
        }
        ResolvedReference::Placeholder { target } => format!("placeholder '{}'", target),
        ResolvedReference::SelfReference { section } => format!("this note#{}", section),
    }
}

fn display_path(workspace: &NoteWorkspace, path: &Path) -> String {
    workspace_relative(path, workspace.root()).unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkweave_core::{LinkToken, ResourceType, SourceRange};

    fn note(path: &str, links: Vec<LinkToken>) -> Resource {
        let mut resource = Resource::new(path, ResourceType::Note);
        resource.links = links;
        resource
    }

    fn workspace() -> (NoteWorkspace, LinkConfig) {
        let config = LinkConfig::standard();
        let mut ws = NoteWorkspace::new("/ws", &config);
        ws.insert(note(
            "/ws/index.md",
            vec![
                LinkToken::wikilink("[[a]]"),
                LinkToken::wikilink("[[missing]]"),
                LinkToken::new(LinkKind::ReferenceLink, "[x][y]", SourceRange::start()),
            ],
        ));
        ws.insert(note("/ws/a.md", vec![LinkToken::wikilink("[[index#Top]]")]));
        (ws, config)
    }

    #[test]
    fn test_locate() {
        let (ws, _) = workspace();
        assert!(locate(&ws, Path::new("index.md")).is_ok());
        assert!(locate(&ws, Path::new("/ws/a.md")).is_ok());
        assert!(locate(&ws, Path::new("nope.md")).is_err());
    }

    #[test]
    fn test_check_reports_placeholders_only() {
        let (ws, config) = workspace();
        let problems = check(&ws, &config);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].file, "index.md");
        assert_eq!(problems[0].link, "[[missing]]");
        assert_eq!(problems[0].kind, ProblemKind::Unresolved);
    }

    #[test]
    fn test_resolve_single_note() {
        let (ws, config) = workspace();
        let reports = resolve_notes(&ws, Some(Path::new("a.md")), &config).unwrap();
        assert_eq!(reports.len(), 1);
        let text = render_file_reports(&reports, &ws);
        assert_eq!(text, "a.md\n  0:0  [[index#Top]] -> index.md#Top\n");
    }

    #[test]
    fn test_retarget_collects_edits() {
        let (ws, config) = workspace();
        let changes = retarget(&ws, Path::new("index.md"), "home", &config).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].file, "a.md");
        assert_eq!(changes[0].edits[0].new_text, "[[home#Top]]");
    }

    #[test]
    fn test_apply_edits_from_the_end() {
        let content = "[[a]] and [[b]]";
        let edits = vec![
            TextEdit {
                new_text: "[[alpha]]".to_string(),
                range: SourceRange::new(1, 1, 0, 5),
            },
            TextEdit {
                new_text: "[[beta]]".to_string(),
                range: SourceRange::new(1, 11, 10, 5),
            },
        ];
        assert_eq!(apply_edits(content, &edits).unwrap(), "[[alpha]] and [[beta]]");
    }

    #[test]
    fn test_apply_edits_out_of_range() {
        let edits = vec![TextEdit {
            new_text: "x".to_string(),
            range: SourceRange::new(1, 1, 3, 10),
        }];
        assert!(apply_edits("short", &edits).is_err());
    }
}
