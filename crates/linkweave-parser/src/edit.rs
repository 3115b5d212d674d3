//! Link edit generator: existing link + delta → replacement source text.
//!
//! Serialization mirrors the analyzer grammars, so re-analyzing the text
//! produced for an empty delta yields the original decomposition.

use linkweave_core::{
    Error, LinkConfig, LinkKind, LinkToken, Result, SourceRange, WikilinkGrammar,
};
use serde::{Deserialize, Serialize};

use crate::analyzer::{analyze, has_image_extension, target_with_path_prefixes};

/// Optional overrides applied on top of a link's current fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDelta {
    /// New target, written verbatim (including any `/` or `../` prefix)
    pub target: Option<String>,
    pub section: Option<String>,
    pub alias: Option<String>,
    pub kind: Option<LinkKind>,
    pub is_embed: Option<bool>,
}

impl LinkDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn kind(mut self, kind: LinkKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn embed(mut self, is_embed: bool) -> Self {
        self.is_embed = Some(is_embed);
        self
    }
}

/// Replacement text for the range the original link occupied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub new_text: String,
    pub range: SourceRange,
}

/// Render `token` with `delta` applied, using the grammar and image
/// extensions of `config`.
///
/// # Example
/// ```
/// use linkweave_core::{LinkConfig, LinkToken};
/// use linkweave_parser::{LinkDelta, render_edit_with_config};
///
/// let token = LinkToken::wikilink("[[note-a#Intro|Title]]");
/// let edit = render_edit_with_config(&token, &LinkDelta::new().target("note-b"), &LinkConfig::standard()).unwrap();
/// assert_eq!(edit.new_text, "[[note-b#Intro|Title]]");
/// ```
pub fn render_edit_with_config(
    token: &LinkToken,
    delta: &LinkDelta,
    config: &LinkConfig,
) -> Result<TextEdit> {
    render_edit(token, delta, config.grammar(), &config.image_extensions)
}

/// Merge `delta` over the analyzed fields of `token` and re-serialize.
///
/// The resulting kind is `delta.kind` or the token's own kind; reference
/// links cannot be produced and fail with [`Error::UnsupportedLinkKind`].
pub fn render_edit(
    token: &LinkToken,
    delta: &LinkDelta,
    grammar: WikilinkGrammar,
    image_extensions: &[String],
) -> Result<TextEdit> {
    let current = analyze(token, grammar, image_extensions)?;
    let keeps_image = current.is_image()
        && delta
            .target
            .as_deref()
            .is_none_or(|target| has_image_extension(target, image_extensions));

    let target = match &delta.target {
        Some(target) => target.clone(),
        None => target_with_path_prefixes(&current),
    };
    let section = delta.section.clone().unwrap_or(current.section);
    let alias = delta.alias.clone().unwrap_or(current.alias);
    let kind = delta.kind.unwrap_or(token.kind);
    let embed = if delta.is_embed.unwrap_or(token.is_embed) {
        "!"
    } else {
        ""
    };

    let section_part = if section.is_empty() {
        String::new()
    } else {
        format!("#{}", section)
    };

    let new_text = match kind {
        LinkKind::WikiLink => {
            let body = if grammar == WikilinkGrammar::Gollum && keeps_image {
                join_pipe(&target, &current.image_properties)
            } else if grammar.alias_first() {
                if target.is_empty() {
                    // an alias would be read back as the target
                    if section.is_empty() {
                        return Err(Error::malformed(
                            &token.raw_text,
                            "cannot render a wikilink without target or section",
                        ));
                    }
                    section_part
                } else if alias.is_empty()
                    && grammar == WikilinkGrammar::Gollum
                    && has_image_extension(&target, image_extensions)
                {
                    // a bare image path would be read back as an image link
                    format!("|{}{}", target, section_part)
                } else {
                    join_pipe(&alias, &format!("{}{}", target, section_part))
                }
            } else if alias.is_empty() {
                format!("{}{}", target, section_part)
            } else {
                format!("{}{}|{}", target, section_part, alias)
            };
            format!("{}[[{}]]", embed, body)
        }
        LinkKind::DirectLink => {
            let url = format!("{}{}", target, section_part);
            let label = if alias.is_empty() && token.kind != LinkKind::DirectLink {
                &url
            } else {
                &alias
            };
            if target.contains(' ') || section.contains(' ') {
                format!("{}[{}](<{}>)", embed, label, url)
            } else {
                format!("{}[{}]({})", embed, label, url)
            }
        }
        other => return Err(Error::unsupported_kind(other)),
    };

    Ok(TextEdit {
        new_text,
        range: token.range,
    })
}

/// `left|right`, or whichever side is non-empty
fn join_pipe(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (_, true) => left.to_string(),
        (true, false) => right.to_string(),
        (false, false) => format!("{}|{}", left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    fn images() -> Vec<String> {
        LinkConfig::default().image_extensions
    }

    fn edit(token: &LinkToken, delta: LinkDelta, grammar: WikilinkGrammar) -> String {
        render_edit(token, &delta, grammar, &images())
            .unwrap()
            .new_text
    }

    fn assert_round_trip(token: LinkToken, grammar: WikilinkGrammar) {
        let rendered = edit(&token, LinkDelta::new(), grammar);
        let regenerated = LinkToken::new(token.kind, rendered.clone(), token.range);
        assert_eq!(
            analyze(&regenerated, grammar, &images()).unwrap(),
            analyze(&token, grammar, &images()).unwrap(),
            "{} -> {} ({grammar})",
            token.raw_text,
            rendered
        );
    }

    #[test]
    fn test_identity_round_trip_wikilinks() {
        let samples = [
            "[[note-a]]",
            "[[#intro]]",
            "[[note-a#Intro]]",
            "[[note-a|Custom Title]]",
            "[[note-a#Intro|Custom Title]]",
            "![[note-a]]",
            "[[|only alias]]",
            "[[ spaced | out ]]",
            r"[[escaped\/path]]",
        ];
        for raw in samples {
            assert_round_trip(LinkToken::wikilink(raw), WikilinkGrammar::Standard);
        }

        let alias_first = [
            "[[note-a]]",
            "[[Title|note-a]]",
            "[[Title|note-a#Intro]]",
            "[[note-a|#Intro]]",
            "[[#intro]]",
        ];
        for raw in alias_first {
            assert_round_trip(LinkToken::wikilink(raw), WikilinkGrammar::AliasFirst);
        }

        let gollum = [
            "[[Title|docs/page]]",
            "[[/index]]",
            "[[Up|../../shared/glossary#Terms]]",
            "[[./sibling]]",
            "[[image.png|width=200,align=right]]",
            "![[/pics/photo.jpg]]",
            "[[Photo of cat|pics/cat.png]]",
            "[[Caption|../cat.png#x]]",
            "[[|pics/cat.png]]",
        ];
        for raw in gollum {
            assert_round_trip(LinkToken::wikilink(raw), WikilinkGrammar::Gollum);
        }
    }

    #[test]
    fn test_identity_round_trip_direct_links() {
        for raw in [
            "[label](note.md)",
            "[label](note.md#Part)",
            "[label](<my note.md#Some Part>)",
            "![alt](img.png)",
            "[](note.md)",
        ] {
            assert_round_trip(LinkToken::direct(raw), WikilinkGrammar::Standard);
        }
    }

    #[test]
    fn test_identity_edit_preserves_text() {
        let token = LinkToken::wikilink("[[note-a#Intro|Custom Title]]");
        assert_eq!(
            edit(&token, LinkDelta::new(), WikilinkGrammar::Standard),
            "[[note-a#Intro|Custom Title]]"
        );
    }

    #[test]
    fn test_change_target_keeps_section_and_alias() {
        let token = LinkToken::wikilink("[[note-a#Intro|Custom Title]]");
        assert_eq!(
            edit(&token, LinkDelta::new().target("renamed"), WikilinkGrammar::Standard),
            "[[renamed#Intro|Custom Title]]"
        );
    }

    #[test]
    fn test_clear_section_and_alias() {
        let token = LinkToken::wikilink("[[note-a#Intro|Custom Title]]");
        let delta = LinkDelta::new().section("").alias("");
        assert_eq!(edit(&token, delta, WikilinkGrammar::Standard), "[[note-a]]");
    }

    #[test]
    fn test_alias_first_serialization() {
        let token = LinkToken::wikilink("[[Title|note-a]]");
        assert_eq!(
            edit(&token, LinkDelta::new().section("Part"), WikilinkGrammar::AliasFirst),
            "[[Title|note-a#Part]]"
        );
    }

    #[test]
    fn test_gollum_keeps_path_prefixes() {
        let token = LinkToken::wikilink("[[Up|../shared/glossary]]");
        assert_eq!(
            edit(&token, LinkDelta::new().alias("Glossary"), WikilinkGrammar::Gollum),
            "[[Glossary|../shared/glossary]]"
        );
    }

    #[test]
    fn test_gollum_image_keeps_properties() {
        let token = LinkToken::wikilink("[[image.png|width=200]]");
        assert_eq!(
            edit(&token, LinkDelta::new().target("other.png"), WikilinkGrammar::Gollum),
            "[[other.png|width=200]]"
        );
    }

    #[test]
    fn test_gollum_link_to_image_stays_a_link() {
        let token = LinkToken::wikilink("[[Photo of cat|pics/cat.png]]");
        assert_eq!(
            edit(&token, LinkDelta::new().section("Whiskers"), WikilinkGrammar::Gollum),
            "[[Photo of cat|pics/cat.png#Whiskers]]"
        );
        assert_eq!(
            edit(&token, LinkDelta::new().alias(""), WikilinkGrammar::Gollum),
            "[[|pics/cat.png]]"
        );

        let token = LinkToken::wikilink("[[image.png|width=200]]");
        assert_eq!(
            edit(&token, LinkDelta::new().target("notes/page"), WikilinkGrammar::Gollum),
            "[[notes/page]]"
        );
    }

    #[test]
    fn test_alias_first_self_reference_drops_alias() {
        let token = LinkToken::wikilink("[[Title|note-a#Intro]]");
        for grammar in [WikilinkGrammar::AliasFirst, WikilinkGrammar::Gollum] {
            let rendered = edit(&token, LinkDelta::new().target(""), grammar);
            assert_eq!(rendered, "[[#Intro]]");
            let reparsed = analyze(&LinkToken::wikilink(rendered), grammar, &images()).unwrap();
            assert_eq!(reparsed.target, "");
            assert_eq!(reparsed.section, "Intro");
        }

        let delta = LinkDelta::new().target("").section("");
        let err = render_edit(&token, &delta, WikilinkGrammar::AliasFirst, &images()).unwrap_err();
        assert!(matches!(err, Error::MalformedLinkSyntax { .. }));
    }

    #[test]
    fn test_direct_link_label_defaults_on_kind_change_only() {
        let token = LinkToken::direct("[](note.md)");
        assert_eq!(
            edit(&token, LinkDelta::new().section("Part"), WikilinkGrammar::Standard),
            "[](note.md#Part)"
        );

        let token = LinkToken::wikilink("[[note-a]]");
        let delta = LinkDelta::new().kind(LinkKind::DirectLink);
        assert_eq!(
            edit(&token, delta, WikilinkGrammar::Standard),
            "[note-a](note-a)"
        );
    }

    #[test]
    fn test_embed_toggle() {
        let token = LinkToken::wikilink("[[note-a]]");
        assert_eq!(
            edit(&token, LinkDelta::new().embed(true), WikilinkGrammar::Standard),
            "![[note-a]]"
        );
        let token = LinkToken::wikilink("![[note-a]]");
        assert_eq!(
            edit(&token, LinkDelta::new().embed(false), WikilinkGrammar::Standard),
            "[[note-a]]"
        );
    }

    #[test]
    fn test_wikilink_to_direct_link() {
        let token = LinkToken::wikilink("[[note-a#Intro]]");
        let delta = LinkDelta::new().kind(LinkKind::DirectLink).target("note-a.md");
        assert_eq!(
            edit(&token, delta, WikilinkGrammar::Standard),
            "[note-a.md#Intro](note-a.md#Intro)"
        );
    }

    #[test]
    fn test_direct_link_to_wikilink() {
        let token = LinkToken::direct("[Label](note-a#Part)");
        let delta = LinkDelta::new().kind(LinkKind::WikiLink);
        assert_eq!(
            edit(&token, delta, WikilinkGrammar::Standard),
            "[[note-a#Part|Label]]"
        );
    }

    #[test]
    fn test_direct_link_angles_for_spaces() {
        let token = LinkToken::direct("[Label](note.md)");
        assert_eq!(
            edit(&token, LinkDelta::new().section("Some Part"), WikilinkGrammar::Standard),
            "[Label](<note.md#Some Part>)"
        );
        assert_eq!(
            edit(&token, LinkDelta::new().target("my note.md"), WikilinkGrammar::Standard),
            "[Label](<my note.md>)"
        );
    }

    #[test]
    fn test_range_is_preserved() {
        let token = LinkToken::new(
            LinkKind::WikiLink,
            "[[note-a]]",
            SourceRange::new(3, 5, 40, 10),
        );
        let result = render_edit(&token, &LinkDelta::new(), WikilinkGrammar::Standard, &images())
            .unwrap();
        assert_eq!(result.range, token.range);
    }

    #[test]
    fn test_reference_kind_unsupported() {
        let token = LinkToken::wikilink("[[note-a]]");
        let delta = LinkDelta::new().kind(LinkKind::ReferenceLink);
        let err = render_edit(&token, &delta, WikilinkGrammar::Standard, &images()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLinkKind { .. }));
    }

    #[test]
    fn test_malformed_source_propagates() {
        let token = LinkToken::wikilink("[[broken");
        let err = render_edit(&token, &LinkDelta::new(), WikilinkGrammar::Standard, &images())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedLinkSyntax { .. }));
    }
}
