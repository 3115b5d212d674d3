//! Minimal preview markup for resolved links: anchors and image embeds.

use html_escape::{encode_double_quoted_attribute, encode_text};
use linkweave_core::{DecomposedLink, LinkConfig, LinkToken, Resource, ResolvedReference};
use linkweave_parser::{ImageProperties, analyze, convert_anchor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::paths::workspace_relative;
use crate::resolver::resolve;
use crate::workspace::Workspace;

const PLACEHOLDER_TITLE: &str = "Link to non-existing resource";
const PLACEHOLDER_HREF: &str = "javascript:void(0);";

/// CSS class of a preview anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkClass {
    NoteLink,
    PlaceholderLink,
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkClass::NoteLink => write!(f, "note-link"),
            LinkClass::PlaceholderLink => write!(f, "placeholder-link"),
        }
    }
}

/// Anchor shown in place of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewLink {
    pub class: LinkClass,
    pub href: String,
    pub title: String,
    pub label: String,
}

impl PreviewLink {
    /// Placeholder anchor labelled `label`
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            class: LinkClass::PlaceholderLink,
            href: PLACEHOLDER_HREF.to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            label: label.into(),
        }
    }

    /// Build the anchor for a decomposed link and its resolution.
    ///
    /// Resource titles take the case of the target's first letter, so
    /// `[[note-a]]` to a note titled `Note A` reads `note A`.
    pub fn for_reference<W: Workspace + ?Sized>(
        link: &DecomposedLink,
        reference: &ResolvedReference,
        workspace: &W,
    ) -> Self {
        let fragment = if link.section.is_empty() {
            String::new()
        } else {
            format!("#{}", link.section)
        };
        let anchor = if link.section.is_empty() {
            String::new()
        } else {
            format!("#{}", convert_anchor(&link.section))
        };
        let alias_or = |fallback: String| {
            if link.alias.is_empty() {
                fallback
            } else {
                link.alias.clone()
            }
        };

        match reference {
            ResolvedReference::Placeholder { .. } => {
                Self::placeholder(alias_or(format!("{}{}", link.target, fragment)))
            }
            ResolvedReference::SelfReference { section } => Self {
                class: LinkClass::NoteLink,
                href: anchor,
                title: section.clone(),
                label: alias_or(fragment),
            },
            ResolvedReference::Resource { path, .. } => {
                let title = workspace
                    .find_by_exact_path(path)
                    .map(|r| match_title_case(&r.title, &link.target))
                    .unwrap_or_else(|| link.target.clone());
                let relative = workspace_relative(path, workspace.root())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());
                Self {
                    class: LinkClass::NoteLink,
                    href: format!("/{}{}", relative, anchor),
                    title: format!("{}{}", title, fragment),
                    label: alias_or(format!("{}{}", title, fragment)),
                }
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.class == LinkClass::PlaceholderLink
    }

    /// HTML anchor, attributes and label escaped
    pub fn render(&self) -> String {
        let title = encode_double_quoted_attribute(&self.title);
        let href = encode_double_quoted_attribute(&self.href);
        let label = encode_text(&self.label);
        match self.class {
            LinkClass::PlaceholderLink => format!(
                r#"<a class="{}" title="{}" href="{}">{}</a>"#,
                self.class, title, href, label
            ),
            LinkClass::NoteLink => format!(
                r#"<a class="{}" title="{}" href="{}" data-href="{}">{}</a>"#,
                self.class, title, href, href, label
            ),
        }
    }
}

/// `<img>` for a resolved image link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEmbed {
    pub src: String,
    pub alt: String,
    pub properties: ImageProperties,
}

impl ImageEmbed {
    /// `None` unless `link` is an image link that resolved to a resource
    pub fn from_link<W: Workspace + ?Sized>(
        link: &DecomposedLink,
        reference: &ResolvedReference,
        workspace: &W,
    ) -> Option<Self> {
        if !link.is_image() {
            return None;
        }
        let ResolvedReference::Resource { path, .. } = reference else {
            return None;
        };

        let properties = ImageProperties::parse(&link.image_properties);
        let alt = properties
            .alt()
            .map(str::to_string)
            .filter(|alt| !alt.is_empty())
            .unwrap_or_else(|| {
                if link.alias.is_empty() {
                    link.target.clone()
                } else {
                    link.alias.clone()
                }
            });
        let src = workspace_relative(path, workspace.root())
            .map(|rel| format!("/{}", rel))
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Some(Self {
            src,
            alt,
            properties,
        })
    }

    pub fn render(&self) -> String {
        let mut html = format!(
            r#"<img src="{}" alt="{}""#,
            encode_double_quoted_attribute(&self.src),
            encode_double_quoted_attribute(&self.alt)
        );
        for key in ["width", "height"] {
            if let Some(value) = self.properties.get(key).filter(|v| !v.is_empty()) {
                html.push_str(&format!(
                    r#" {}="{}""#,
                    key,
                    encode_double_quoted_attribute(value)
                ));
            }
        }

        let mut classes = Vec::new();
        if let Some(align) = self.properties.align().filter(|a| !a.is_empty()) {
            classes.push(format!("align-{}", align));
        }
        classes.extend(
            ["float", "frame"]
                .iter()
                .filter_map(|key| self.properties.flag_class(key)),
        );
        if !classes.is_empty() {
            html.push_str(&format!(
                r#" class="{}""#,
                encode_double_quoted_attribute(&classes.join(" "))
            ));
        }
        html.push('>');
        html
    }
}

/// Preview markup for one link of `document`.
///
/// Links that cannot be analyzed render as placeholders showing their raw text.
pub fn render_preview<W: Workspace + ?Sized>(
    token: &LinkToken,
    document: &Resource,
    workspace: &W,
    config: &LinkConfig,
) -> String {
    let analyzed = analyze(token, config.grammar(), &config.image_extensions)
        .and_then(|link| Ok((resolve(token, document, workspace, config)?, link)));

    match analyzed {
        Ok((reference, link)) => ImageEmbed::from_link(&link, &reference, workspace)
            .map(|embed| embed.render())
            .unwrap_or_else(|| PreviewLink::for_reference(&link, &reference, workspace).render()),
        Err(e) => {
            log::error!(
                "Error while creating preview for {} in {}: {}",
                token.raw_text,
                document.path.display(),
                e
            );
            PreviewLink::placeholder(token.raw_text.clone()).render()
        }
    }
}

/// Give `title` the case of the first letter of the target's last segment
fn match_title_case(title: &str, target: &str) -> String {
    let segment = target.rsplit('/').next().unwrap_or(target);
    let (Some(target_first), Some(title_first)) = (segment.chars().next(), title.chars().next())
    else {
        return title.to_string();
    };

    let target_upper = target_first.to_uppercase().eq([target_first]);
    let title_upper = title_first.to_uppercase().eq([title_first]);
    if target_upper == title_upper {
        return title.to_string();
    }

    let rest = &title[title_first.len_utf8()..];
    if target_upper {
        format!("{}{}", title_first.to_uppercase(), rest)
    } else {
        format!("{}{}", title_first.to_lowercase(), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::NoteWorkspace;
    use linkweave_core::ResourceType;

    fn setup(config: &LinkConfig) -> (NoteWorkspace, Resource) {
        let mut ws = NoteWorkspace::new("/ws", config);
        let mut note = Resource::new("/ws/notes/note-a.md", ResourceType::Note);
        note.title = "Note A".to_string();
        ws.insert(note);
        ws.insert(Resource::new("/ws/pics/cat.png", ResourceType::Image));
        let doc = Resource::new("/ws/index.md", ResourceType::Note);
        ws.insert(doc.clone());
        (ws, doc)
    }

    fn preview(raw: &str, config: &LinkConfig) -> String {
        let (ws, doc) = setup(config);
        render_preview(&LinkToken::wikilink(raw), &doc, &ws, config)
    }

    #[test]
    fn test_note_link() {
        assert_eq!(
            preview("[[note-a#Café Menu]]", &LinkConfig::standard()),
            r#"<a class="note-link" title="note A#Café Menu" href="/notes/note-a.md#cafe-menu" data-href="/notes/note-a.md#cafe-menu">note A#Café Menu</a>"#
        );
    }

    #[test]
    fn test_alias_is_label() {
        let config = LinkConfig::builder()
            .case_insensitive_titles(true)
            .build()
            .unwrap();
        let html = preview("[[Note-a|<b>Bold</b>]]", &config);
        assert!(html.contains(r#"title="Note A""#), "{html}");
        assert!(html.ends_with("&lt;b&gt;Bold&lt;/b&gt;</a>"), "{html}");
    }

    #[test]
    fn test_placeholder_link() {
        assert_eq!(
            preview("[[nowhere#part]]", &LinkConfig::standard()),
            r#"<a class="placeholder-link" title="Link to non-existing resource" href="javascript:void(0);">nowhere#part</a>"#
        );
    }

    #[test]
    fn test_self_reference_link() {
        let html = preview("[[#Getting Started]]", &LinkConfig::standard());
        assert!(html.contains(r##"href="#getting-started""##), "{html}");
        assert!(html.ends_with(">#Getting Started</a>"), "{html}");
    }

    #[test]
    fn test_image_embed() {
        let html = preview(
            "[[pics/cat.png|width=200, align=right, frame, alt=\"A cat\"]]",
            &LinkConfig::gollum(),
        );
        assert_eq!(
            html,
            r#"<img src="/pics/cat.png" alt="A cat" width="200" class="align-right frame">"#
        );
    }

    #[test]
    fn test_image_float_value() {
        let html = preview("[[pics/cat.png|float=left, frame=thin]]", &LinkConfig::gollum());
        assert_eq!(
            html,
            r#"<img src="/pics/cat.png" alt="pics/cat.png" class="float-left frame-thin">"#
        );
    }

    #[test]
    fn test_malformed_link_renders_placeholder() {
        let html = preview("[[a\nb]]", &LinkConfig::standard());
        assert!(html.starts_with(r#"<a class="placeholder-link""#));
    }

    #[test]
    fn test_match_title_case() {
        assert_eq!(match_title_case("Note A", "note-a"), "note A");
        assert_eq!(match_title_case("note a", "folder/Note-a"), "Note a");
        assert_eq!(match_title_case("Note A", "Note-a"), "Note A");
        assert_eq!(match_title_case("", "x"), "");
        assert_eq!(match_title_case("Élan", "élan"), "élan");
    }
}
