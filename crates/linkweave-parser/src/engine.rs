//! Document scanner: markdown text → link tokens, sections, definitions.
//!
//! Two phases share one `LineIndex`:
//! - pulldown-cmark pass: frontmatter, headings, direct/reference links and
//!   images, plus the byte ranges of code and raw HTML
//! - regex pass: wikilinks, embeds and link reference definitions, skipping
//!   the ranges collected in the first phase

use linkweave_core::{LineIndex, LinkKind, LinkToken, NoteLinkDefinition, Section, SourceRange};
use pulldown_cmark::{Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::parsers::link_utils::is_external_url;

/// `[[...]]` or `![[...]]` on a single line, no nested brackets
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[\[([^\[\]\n]+?)\]\]").expect("valid wikilink regex"));

/// `[label]: url "title"` with the url optionally in angle brackets
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^ {0,3}\[([^\]\n]+)\]:[ \t]*(<[^>\n]*>|\S+)(?:[ \t]+(?:"([^"\n]*)"|'([^'\n]*)'|\(([^)\n]*)\)))?[ \t]*$"#,
    )
    .expect("valid definition regex")
});

#[inline]
fn has_wikilink(content: &str) -> bool {
    content.contains("[[")
}

#[inline]
fn has_definition(content: &str) -> bool {
    content.contains("]:")
}

/// Byte ranges where link syntax is not interpreted (code, raw HTML)
#[derive(Debug, Default, Clone)]
struct ExcludedRanges {
    ranges: Vec<Range<usize>>,
}

impl ExcludedRanges {
    /// Binary search over the sorted, merged ranges
    #[inline]
    fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx > 0 && offset < self.ranges[idx - 1].end
    }

    fn add(&mut self, range: Range<usize>) {
        self.ranges.push(range);
    }

    /// Sort and merge overlapping ranges. Must run before `contains`.
    fn optimize(&mut self) {
        self.ranges.sort_by_key(|r| r.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

/// Everything the scanner extracts from one document
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// `title` field of the YAML frontmatter
    pub frontmatter_title: Option<String>,
    /// Text of the first level-1 heading
    pub first_heading: Option<String>,
    /// Offset where the body starts (end of frontmatter)
    pub body_start: usize,
    pub sections: Vec<Section>,
    /// Wikilinks, direct links and reference links in document order
    pub links: Vec<LinkToken>,
    pub definitions: Vec<NoteLinkDefinition>,
}

impl ScanResult {
    /// Frontmatter title, else first H1
    pub fn title(&self) -> Option<&str> {
        self.frontmatter_title
            .as_deref()
            .or(self.first_heading.as_deref())
    }
}

struct PendingHeading {
    level: u8,
    start: usize,
    text: String,
}

/// Scanner over a single document's content
pub struct ScanEngine<'a> {
    content: &'a str,
    index: LineIndex,
}

impl<'a> ScanEngine<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            index: LineIndex::new(content),
        }
    }

    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();

        let excluded = self.pulldown_pass(&mut result);
        let body_start = result.body_start;
        let body = &self.content[body_start..];

        self.scan_wikilinks(body, body_start, &excluded, &mut result);
        self.scan_definitions(body, body_start, &excluded, &mut result);

        result.links.sort_by_key(|link| link.range.offset);
        result
    }

    fn range(&self, range: &Range<usize>) -> SourceRange {
        SourceRange::from_offset_indexed(&self.index, range.start, range.end - range.start)
    }

    /// Phase 1: CommonMark elements and excluded ranges.
    fn pulldown_pass(&self, result: &mut ScanResult) -> ExcludedRanges {
        let mut excluded = ExcludedRanges::default();

        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_FOOTNOTES);

        let parser = Parser::new_ext(self.content, opts);

        let mut code_block_start: Option<usize> = None;
        let mut in_metadata = false;
        let mut metadata = String::new();
        let mut heading: Option<PendingHeading> = None;
        let mut headings: Vec<(u8, String, usize)> = Vec::new();

        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(_)) => code_block_start = Some(range.start),
                Event::End(TagEnd::CodeBlock) => {
                    excluded.add(code_block_start.take().unwrap_or(range.start)..range.end);
                }
                Event::Code(ref code) => {
                    if let Some(pending) = heading.as_mut() {
                        pending.text.push_str(code);
                    }
                    excluded.add(range);
                }
                Event::Html(_) | Event::InlineHtml(_) => excluded.add(range),

                Event::Start(Tag::MetadataBlock(_)) => {
                    in_metadata = true;
                    metadata.clear();
                }
                Event::End(TagEnd::MetadataBlock(_)) => {
                    in_metadata = false;
                    result.body_start = range.end;
                    result.frontmatter_title = frontmatter_title(&metadata);
                }
                Event::Text(text) if in_metadata => metadata.push_str(&text),

                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some(PendingHeading {
                        level: heading_level(level),
                        start: range.start,
                        text: String::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(pending) = heading.take() {
                        let label = pending.text.trim().to_string();
                        if pending.level == 1 && result.first_heading.is_none() && !label.is_empty()
                        {
                            result.first_heading = Some(label.clone());
                        }
                        headings.push((pending.level, label, pending.start));
                    }
                }
                Event::Text(text) if heading.is_some() => {
                    if let Some(pending) = heading.as_mut() {
                        pending.text.push_str(&text);
                    }
                }

                Event::Start(Tag::Link {
                    link_type,
                    ref dest_url,
                    ..
                })
                | Event::Start(Tag::Image {
                    link_type,
                    ref dest_url,
                    ..
                }) => {
                    if let Some(kind) = token_kind(link_type, dest_url) {
                        let raw = &self.content[range.clone()];
                        result
                            .links
                            .push(LinkToken::new(kind, raw, self.range(&range)));
                    }
                }

                _ => {}
            }
        }

        result.sections = self.sections(&headings);
        excluded.optimize();
        excluded
    }

    /// A section runs from its heading to the next heading of the same or
    /// higher level, or to the end of the document.
    fn sections(&self, headings: &[(u8, String, usize)]) -> Vec<Section> {
        headings
            .iter()
            .enumerate()
            .map(|(i, (level, label, start))| {
                let end = headings[i + 1..]
                    .iter()
                    .find(|(next_level, _, _)| next_level <= level)
                    .map(|(_, _, next_start)| *next_start)
                    .unwrap_or(self.content.len());
                Section {
                    label: label.clone(),
                    range: self.range(&(*start..end)),
                }
            })
            .collect()
    }

    /// Phase 2a: wikilinks and embeds.
    ///
    /// Markdown links overlapping a wikilink (`[[note]]` can also read as a
    /// shortcut reference) are dropped in favor of the wikilink.
    fn scan_wikilinks(
        &self,
        body: &str,
        body_offset: usize,
        excluded: &ExcludedRanges,
        result: &mut ScanResult,
    ) {
        if !has_wikilink(body) {
            return;
        }

        let mut wikilinks = Vec::new();
        for found in WIKILINK.find_iter(body) {
            let start = body_offset + found.start();
            if excluded.contains(start) {
                continue;
            }
            let range = self.range(&(start..body_offset + found.end()));
            wikilinks.push(LinkToken::new(LinkKind::WikiLink, found.as_str(), range));
        }

        if wikilinks.is_empty() {
            return;
        }
        result
            .links
            .retain(|link| !wikilinks.iter().any(|w| w.range.overlaps(&link.range)));
        result.links.extend(wikilinks);
    }

    /// Phase 2b: `[label]: url` definitions. Footnotes (`[^1]:`) are skipped.
    fn scan_definitions(
        &self,
        body: &str,
        body_offset: usize,
        excluded: &ExcludedRanges,
        result: &mut ScanResult,
    ) {
        if !has_definition(body) {
            return;
        }

        for caps in DEFINITION.captures_iter(body) {
            let (Some(full), Some(label), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let start = body_offset + full.start();
            if excluded.contains(start) || label.as_str().starts_with('^') {
                continue;
            }

            let url = url.as_str();
            let url = url
                .strip_prefix('<')
                .and_then(|u| u.strip_suffix('>'))
                .unwrap_or(url);
            let title = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|t| t.as_str().to_string());

            result.definitions.push(NoteLinkDefinition {
                label: label.as_str().to_string(),
                url: url.to_string(),
                title,
                range: Some(self.range(&(start..body_offset + full.end()))),
            });
        }
    }
}

/// Token kind for a pulldown-cmark link, `None` for links outside the workspace
fn token_kind(link_type: LinkType, dest_url: &str) -> Option<LinkKind> {
    match link_type {
        LinkType::Inline if !is_external_url(dest_url) => Some(LinkKind::DirectLink),
        LinkType::Reference
        | LinkType::Collapsed
        | LinkType::Shortcut
        | LinkType::ReferenceUnknown
        | LinkType::CollapsedUnknown
        | LinkType::ShortcutUnknown => Some(LinkKind::ReferenceLink),
        _ => None,
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn frontmatter_title(yaml: &str) -> Option<String> {
    match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(value) => value
            .get("title")
            .and_then(|t| t.as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        Err(e) => {
            log::debug!("Ignoring unparsable frontmatter: {}", e);
            None
        }
    }
}

/// Scan `content` in one go
pub fn scan(content: &str) -> ScanResult {
    ScanEngine::new(content).scan()
}
