//! Path normalizer for directory-relative (gollum) links.
//!
//! Paths inside the workspace are compared as `/`-separated strings, so the
//! helpers here work on [`Path`] components and never touch the filesystem.

use std::path::{Component, Path, PathBuf};

/// Directory a link is interpreted in, after walking up `parent_count` levels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubdirContext {
    /// Workspace-relative directory with a trailing `/`, or empty for the root
    pub subdir: String,
    /// More `../` hops than the document is deep
    pub parent_count_exceeded: bool,
}

/// Walk up from the directory containing `document_path` (relative to the
/// workspace root), one segment per parent hop.
///
/// A hop taken while already at the root flags `parent_count_exceeded` and
/// stops the walk; a document directly under the root can afford exactly as
/// many hops as it has directory segments.
///
/// ```
/// use linkweave_workspace::compute_subdirectory_context;
/// use std::path::Path;
///
/// let ctx = compute_subdirectory_context(Path::new("a/b/note.md"), 1);
/// assert_eq!(ctx.subdir, "a/");
/// assert!(!ctx.parent_count_exceeded);
/// ```
pub fn compute_subdirectory_context(document_path: &Path, parent_count: usize) -> SubdirContext {
    let mut segments: Vec<String> = document_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    // drop the file name
    segments.pop();

    let mut parent_count_exceeded = false;
    for _ in 0..parent_count {
        if segments.pop().is_none() {
            parent_count_exceeded = true;
            break;
        }
    }

    let subdir = if segments.is_empty() {
        String::new()
    } else {
        format!("{}/", segments.join("/"))
    };

    SubdirContext {
        subdir,
        parent_count_exceeded,
    }
}

/// Absolute file path a gollum target points at.
///
/// Root-anchored targets start at `workspace_root`, others at
/// `workspace_root/subdir`. `.` and `..` are folded lexically and
/// `default_extension` is appended when the last segment has no extension.
pub fn compute_target_file_path(
    target: &str,
    subdir: &str,
    is_root: bool,
    workspace_root: &Path,
    default_extension: &str,
) -> PathBuf {
    let mut path = workspace_root.to_path_buf();
    if !is_root {
        path.push(subdir);
    }
    path.push(target.trim_start_matches('/'));

    let mut path = normalize_path(&path);
    if let (None, Some(name)) = (path.extension(), path.file_name()) {
        let mut file_name = name.to_os_string();
        file_name.push(default_extension);
        path.set_file_name(file_name);
    }
    path
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// `path` relative to `base_dir` with `/` separators (`../x/y.md`)
pub fn relative_to(path: &Path, base_dir: &Path) -> String {
    let path_buf = normalize_path(path);
    let base_buf = normalize_path(base_dir);
    let path: Vec<Component> = path_buf.components().collect::<Vec<_>>();
    let base: Vec<Component> = base_buf.components().collect::<Vec<_>>();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); base.len() - common];
    parts.extend(
        path[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Workspace-relative `/`-separated form of an absolute path, if it lies
/// under `root`
pub fn workspace_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(|rel| {
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(path: &str, parents: usize) -> (String, bool) {
        let c = compute_subdirectory_context(Path::new(path), parents);
        (c.subdir, c.parent_count_exceeded)
    }

    #[test]
    fn test_subdirectory_context() {
        assert_eq!(ctx("a/b/note.md", 0), ("a/b/".to_string(), false));
        assert_eq!(ctx("a/b/note.md", 1), ("a/".to_string(), false));
        assert_eq!(ctx("a/b/note.md", 2), (String::new(), false));
        assert_eq!(ctx("a/b/note.md", 3), (String::new(), true));
    }

    #[test]
    fn test_subdirectory_context_at_root() {
        assert_eq!(ctx("note.md", 0), (String::new(), false));
        assert_eq!(ctx("note.md", 1), (String::new(), true));
        assert_eq!(ctx("a/note.md", 1), (String::new(), false));
        assert_eq!(ctx("a/note.md", 5), (String::new(), true));
    }

    #[test]
    fn test_target_file_path() {
        let root = Path::new("/ws");
        assert_eq!(
            compute_target_file_path("page", "docs/", false, root, ".md"),
            PathBuf::from("/ws/docs/page.md")
        );
        assert_eq!(
            compute_target_file_path("page", "docs/", true, root, ".md"),
            PathBuf::from("/ws/page.md")
        );
        assert_eq!(
            compute_target_file_path("img/cat.png", "", false, root, ".md"),
            PathBuf::from("/ws/img/cat.png")
        );
        assert_eq!(
            compute_target_file_path("./x/../y", "a/", false, root, ".md"),
            PathBuf::from("/ws/a/y.md")
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a/b/..")), PathBuf::from("../a"));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to(Path::new("/ws/a/b.md"), Path::new("/ws/a")), "b.md");
        assert_eq!(
            relative_to(Path::new("/ws/x/y.md"), Path::new("/ws/a/b")),
            "../../x/y.md"
        );
        assert_eq!(relative_to(Path::new("/ws/top.md"), Path::new("/ws")), "top.md");
    }

    #[test]
    fn test_workspace_relative() {
        assert_eq!(
            workspace_relative(Path::new("/ws/a/b.md"), Path::new("/ws")).as_deref(),
            Some("a/b.md")
        );
        assert_eq!(workspace_relative(Path::new("/other/b.md"), Path::new("/ws")), None);
    }
}
