//! Core data models for links, resources and resolution results.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Value-like**: Links and decompositions are immutable once produced
//! - **Type-Safe**: Enums replace magic strings (`"wikilink"`, `"placeholder"`, ...)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Location of a link or section in source text (line, column, byte offset, length)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
}

impl SourceRange {
    /// Create a new source range
    pub fn new(line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Create range at start of document
    pub fn start() -> Self {
        Self::default()
    }

    /// Create range from byte offset using a pre-computed line index.
    pub fn from_offset_indexed(index: &LineIndex, offset: usize, length: usize) -> Self {
        let (line, column) = index.line_col(offset);
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Byte offset just past the end of the range
    pub fn end_offset(&self) -> usize {
        self.offset + self.length
    }

    /// Whether two ranges share at least one byte
    pub fn overlaps(&self, other: &SourceRange) -> bool {
        self.offset < other.end_offset() && other.offset < self.end_offset()
    }
}

/// Pre-computed line starts for O(log n) line/column lookup.
///
/// # Example
/// ```
/// use linkweave_core::{LineIndex, SourceRange};
///
/// let content = "Line 1\nLine 2\nLine 3";
/// let index = LineIndex::new(content);
///
/// let range = SourceRange::from_offset_indexed(&index, 7, 6);
/// assert_eq!(range.line, 2);
/// assert_eq!(range.column, 1);
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts (line 1 = index 0)
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build line index in O(n) - do once per document.
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Get (line, column) for a byte offset, both 1-based.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line = line_idx.max(1);
        let line_start = self
            .line_starts
            .get(line_idx.saturating_sub(1))
            .copied()
            .unwrap_or(0);
        (line, offset - line_start + 1)
    }
}

/// Syntactic kind of a link token as produced by the document scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[[target]]`, `[[alias|target]]`, ...
    WikiLink,
    /// `[alias](target#section)`
    #[serde(rename = "link")]
    DirectLink,
    /// `[text][label]` - resolved by markdown itself, not by the link engine
    #[serde(rename = "reference")]
    ReferenceLink,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::WikiLink => write!(f, "wikilink"),
            LinkKind::DirectLink => write!(f, "link"),
            LinkKind::ReferenceLink => write!(f, "reference"),
        }
    }
}

/// A raw link as found in a document. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkToken {
    pub kind: LinkKind,
    /// Exact source text including brackets, parens and a leading `!` for embeds
    pub raw_text: String,
    pub range: SourceRange,
    pub is_embed: bool,
}

impl LinkToken {
    /// Create a new link token
    pub fn new(kind: LinkKind, raw_text: impl Into<String>, range: SourceRange) -> Self {
        let raw_text = raw_text.into();
        let is_embed = raw_text.starts_with('!');
        Self {
            kind,
            raw_text,
            range,
            is_embed,
        }
    }

    /// Wikilink token with an empty range, mostly useful in tests and previews
    pub fn wikilink(raw_text: impl Into<String>) -> Self {
        Self::new(LinkKind::WikiLink, raw_text, SourceRange::start())
    }

    /// Direct link token with an empty range
    pub fn direct(raw_text: impl Into<String>) -> Self {
        Self::new(LinkKind::DirectLink, raw_text, SourceRange::start())
    }
}

/// What a decomposed link points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkCategory {
    #[default]
    Link,
    Image,
}

/// Structured fields of a link. Missing pieces are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecomposedLink {
    pub target: String,
    pub section: String,
    pub alias: String,
    /// Target was anchored at the workspace root with a leading `/`
    pub is_root: bool,
    /// Number of leading `../` segments consumed from the target
    pub parent_count: usize,
    /// Raw `key=value` list of a gollum image link
    pub image_properties: String,
    pub category: LinkCategory,
}

impl DecomposedLink {
    /// Empty target means "the current document"
    pub fn is_self_reference(&self) -> bool {
        self.target.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.category == LinkCategory::Image
    }
}

/// Outcome of resolving one link. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedReference {
    /// An existing workspace resource, optionally narrowed to a section
    Resource {
        path: PathBuf,
        section: Option<String>,
    },
    /// A note that does not exist yet; the unresolved target is kept verbatim
    Placeholder { target: String },
    /// A section of the document containing the link
    SelfReference { section: String },
}

impl ResolvedReference {
    pub fn resource(path: impl Into<PathBuf>) -> Self {
        ResolvedReference::Resource {
            path: path.into(),
            section: None,
        }
    }

    pub fn placeholder(target: impl Into<String>) -> Self {
        ResolvedReference::Placeholder {
            target: target.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResolvedReference::Placeholder { .. })
    }

    /// Attach a section fragment. Placeholders and empty sections are left as-is.
    #[must_use]
    pub fn with_section(self, section: &str) -> Self {
        if section.is_empty() {
            return self;
        }
        match self {
            ResolvedReference::Resource { path, .. } => ResolvedReference::Resource {
                path,
                section: Some(section.to_string()),
            },
            ResolvedReference::SelfReference { .. } => ResolvedReference::SelfReference {
                section: section.to_string(),
            },
            placeholder @ ResolvedReference::Placeholder { .. } => placeholder,
        }
    }

    /// Path of the referenced document, using `document` for self references
    pub fn target_path<'a>(&'a self, document: &'a Path) -> Option<&'a Path> {
        match self {
            ResolvedReference::Resource { path, .. } => Some(path),
            ResolvedReference::SelfReference { .. } => Some(document),
            ResolvedReference::Placeholder { .. } => None,
        }
    }

    /// Section fragment, if any
    pub fn section(&self) -> Option<&str> {
        match self {
            ResolvedReference::Resource { section, .. } => section.as_deref(),
            ResolvedReference::SelfReference { section } if !section.is_empty() => {
                Some(section.as_str())
            }
            _ => None,
        }
    }
}

/// Type of a workspace resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Note,
    Attachment,
    Image,
    Placeholder,
}

/// A heading-delimited section of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    pub range: SourceRange,
}

/// A `[label]: url "title"` line scoped to one document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteLinkDefinition {
    pub label: String,
    pub url: String,
    pub title: Option<String>,
    pub range: Option<SourceRange>,
}

impl NoteLinkDefinition {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            title: None,
            range: None,
        }
    }

    /// Render as a markdown link reference definition.
    ///
    /// ```
    /// use linkweave_core::NoteLinkDefinition;
    ///
    /// let mut def = NoteLinkDefinition::new("note-a", "docs/note a");
    /// def.title = Some("Note A".to_string());
    /// assert_eq!(def.format(), r#"[note-a]: <docs/note a> "Note A""#);
    /// ```
    pub fn format(&self) -> String {
        let url = if self.url.contains(' ') {
            format!("<{}>", self.url)
        } else {
            self.url.clone()
        };
        match &self.title {
            Some(title) if !title.is_empty() => format!("[{}]: {} \"{}\"", self.label, url, title),
            _ => format!("[{}]: {}", self.label, url),
        }
    }
}

/// A document or file in the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Absolute path (workspace root joined with the relative path)
    pub path: PathBuf,
    pub resource_type: ResourceType,
    pub title: String,
    pub sections: Vec<Section>,
    pub links: Vec<LinkToken>,
    pub definitions: Vec<NoteLinkDefinition>,
}

impl Resource {
    /// Create an empty resource of the given type, titled after its file stem
    pub fn new(path: impl Into<PathBuf>, resource_type: ResourceType) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            path,
            resource_type,
            title,
            sections: Vec::new(),
            links: Vec::new(),
            definitions: Vec::new(),
        }
    }

    pub fn is_note(&self) -> bool {
        self.resource_type == ResourceType::Note
    }

    /// Find a section by its exact label
    pub fn find_section(&self, label: &str) -> Option<&Section> {
        if label.is_empty() {
            return None;
        }
        self.sections.iter().find(|s| s.label == label)
    }

    /// Find the definition whose label matches exactly
    pub fn find_definition(&self, label: &str) -> Option<&NoteLinkDefinition> {
        self.definitions.iter().find(|d| d.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let content = "a\nbb\nccc\n";
        let index = LineIndex::new(content);
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(2), (2, 1));
        assert_eq!(index.line_col(4), (2, 3));
        assert_eq!(index.line_col(7), (3, 3));

        let range = SourceRange::from_offset_indexed(&index, 5, 3);
        assert_eq!((range.line, range.column, range.end_offset()), (3, 1, 8));
    }

    #[test]
    fn test_range_overlap() {
        let a = SourceRange::new(1, 1, 0, 10);
        let b = SourceRange::new(1, 6, 5, 3);
        let c = SourceRange::new(1, 11, 10, 2);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_token_detects_embed() {
        assert!(LinkToken::wikilink("![[image.png]]").is_embed);
        assert!(!LinkToken::wikilink("[[note]]").is_embed);
        assert_eq!(LinkToken::direct("[a](b)").kind, LinkKind::DirectLink);
    }

    #[test]
    fn test_with_section_skips_placeholders() {
        let placeholder = ResolvedReference::placeholder("missing").with_section("intro");
        assert_eq!(placeholder, ResolvedReference::placeholder("missing"));

        let resource = ResolvedReference::resource("/ws/a.md").with_section("intro");
        assert_eq!(resource.section(), Some("intro"));

        let unchanged = ResolvedReference::resource("/ws/a.md").with_section("");
        assert_eq!(unchanged.section(), None);
    }

    #[test]
    fn test_self_reference_target_path() {
        let doc = Path::new("/ws/doc.md");
        let reference = ResolvedReference::SelfReference {
            section: "intro".to_string(),
        };
        assert_eq!(reference.target_path(doc), Some(doc));
        assert_eq!(ResolvedReference::placeholder("x").target_path(doc), None);
    }

    #[test]
    fn test_definition_format_without_title() {
        let def = NoteLinkDefinition::new("note-b", "note-b.md");
        assert_eq!(def.format(), "[note-b]: note-b.md");
    }

    #[test]
    fn test_resource_title_from_stem() {
        let resource = Resource::new("/ws/folder/My Note.md", ResourceType::Note);
        assert_eq!(resource.title, "My Note");
        assert!(resource.find_section("").is_none());
    }

    #[test]
    fn test_link_kind_display() {
        assert_eq!(LinkKind::WikiLink.to_string(), "wikilink");
        assert_eq!(LinkKind::DirectLink.to_string(), "link");
        assert_eq!(LinkKind::ReferenceLink.to_string(), "reference");
    }
}
