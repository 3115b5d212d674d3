//! Link syntax analyzer: raw link text → [`DecomposedLink`].
//!
//! One small hand-written grammar per wikilink mode. Every grammar is a
//! decision tree over the first `|` and the first `#`, so precedence
//! (alias vs. target, image reclassification) is explicit:
//!
//! | grammar      | shape                        | notes                                       |
//! |--------------|------------------------------|---------------------------------------------|
//! | `Standard`   | `[[target#section\|alias]]`  | backslashes removed from target             |
//! | `AliasFirst` | `[[alias\|target#section]]`  | bare `[[X]]` is always a target             |
//! | `Gollum`     | `[[alias\|target#section]]`  | image links, `/`, `./`, `../` path prefixes |
//!
//! Direct links `[alias](target#section)` accept an angle-quoted URL.

use linkweave_core::{
    DecomposedLink, Error, LinkCategory, LinkConfig, LinkKind, LinkToken, Result,
    WikilinkGrammar,
};
use std::path::Path;

/// Decompose a link token using the grammar and image extensions of `config`.
///
/// # Example
/// ```
/// use linkweave_core::{LinkConfig, LinkToken};
/// use linkweave_parser::analyze_with_config;
///
/// let link = analyze_with_config(&LinkToken::wikilink("[[note-a#Intro|Custom Title]]"), &LinkConfig::standard()).unwrap();
/// assert_eq!(link.target, "note-a");
/// assert_eq!(link.section, "Intro");
/// assert_eq!(link.alias, "Custom Title");
/// ```
pub fn analyze_with_config(token: &LinkToken, config: &LinkConfig) -> Result<DecomposedLink> {
    analyze(token, config.grammar(), &config.image_extensions)
}

/// Decompose a link token.
///
/// Fails with [`Error::UnsupportedLinkKind`] for reference-style links and with
/// [`Error::MalformedLinkSyntax`] when the raw text does not fit the grammar.
pub fn analyze(
    token: &LinkToken,
    grammar: WikilinkGrammar,
    image_extensions: &[String],
) -> Result<DecomposedLink> {
    match token.kind {
        LinkKind::WikiLink => {
            let body = wikilink_body(&token.raw_text)?;
            Ok(match grammar {
                WikilinkGrammar::Standard => standard_fields(body),
                WikilinkGrammar::AliasFirst => alias_first_fields(body),
                WikilinkGrammar::Gollum => gollum_fields(body, image_extensions),
            })
        }
        LinkKind::DirectLink => {
            let mut link = direct_link_fields(&token.raw_text)?;
            if grammar == WikilinkGrammar::Gollum {
                normalize_path_prefixes(&mut link);
            }
            Ok(link)
        }
        other => Err(Error::unsupported_kind(other)),
    }
}

/// Whether the last extension of `field` is in `image_extensions`
pub fn has_image_extension(field: &str, image_extensions: &[String]) -> bool {
    Path::new(field.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            image_extensions
                .iter()
                .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Rebuild the path syntax consumed by root/parent normalization.
///
/// `/` for root-anchored targets, one `../` per parent hop.
pub fn target_with_path_prefixes(link: &DecomposedLink) -> String {
    let mut target = String::with_capacity(link.target.len() + 1 + 3 * link.parent_count);
    if link.is_root {
        target.push('/');
    }
    for _ in 0..link.parent_count {
        target.push_str("../");
    }
    target.push_str(&link.target);
    target
}

fn wikilink_body(raw: &str) -> Result<&str> {
    let text = raw.strip_prefix('!').unwrap_or(raw);
    let body = text
        .strip_prefix("[[")
        .and_then(|t| t.strip_suffix("]]"))
        .ok_or_else(|| Error::malformed(raw, "expected [[...]]"))?;

    if body.trim().is_empty() {
        return Err(Error::malformed(raw, "empty wikilink"));
    }
    if body.contains('\n') {
        return Err(Error::malformed(raw, "wikilinks cannot span lines"));
    }
    if body.contains("[[") || body.contains("]]") {
        return Err(Error::malformed(raw, "nested brackets"));
    }
    Ok(body)
}

fn split_section(field: &str) -> (&str, &str) {
    field.split_once('#').unwrap_or((field, ""))
}

fn unescape_target(target: &str) -> String {
    target.replace('\\', "")
}

/// `[[target#section|alias]]`
fn standard_fields(body: &str) -> DecomposedLink {
    let (head, alias) = body.split_once('|').unwrap_or((body, ""));
    let (target, section) = split_section(head);
    DecomposedLink {
        target: unescape_target(target),
        section: section.to_string(),
        alias: alias.to_string(),
        ..DecomposedLink::default()
    }
}

/// `[[alias|target#section]]`, falling back to `[[target#section]]`
fn alias_first_fields(body: &str) -> DecomposedLink {
    let (first, second) = match body.split_once('|') {
        Some((first, second)) => (first.trim(), second.trim()),
        None => (body.trim(), ""),
    };
    let (second_target, second_section) = split_section(second);

    if second_target.trim().is_empty() {
        // no usable target after the pipe: the first field is the target
        let (target, section) = split_section(first);
        let section = if second_section.trim().is_empty() {
            section
        } else {
            second_section
        };
        return DecomposedLink {
            target: unescape_target(target.trim()),
            section: section.trim().to_string(),
            ..DecomposedLink::default()
        };
    }

    DecomposedLink {
        target: unescape_target(second_target.trim()),
        section: second_section.trim().to_string(),
        alias: first.to_string(),
        ..DecomposedLink::default()
    }
}

/// Alias-first grammar plus image links and path prefixes
fn gollum_fields(body: &str, image_extensions: &[String]) -> DecomposedLink {
    let (first, second) = match body.split_once('|') {
        Some((first, second)) => (first.trim(), second.trim()),
        None => (body.trim(), ""),
    };

    let mut link = if has_image_extension(first, image_extensions) {
        DecomposedLink {
            target: unescape_target(first),
            image_properties: second.to_string(),
            category: LinkCategory::Image,
            ..DecomposedLink::default()
        }
    } else {
        alias_first_fields(body)
    };

    normalize_path_prefixes(&mut link);
    link
}

/// Strip `/`, `./` and any number of `../` from the target, recording them.
fn normalize_path_prefixes(link: &mut DecomposedLink) {
    let mut target = link.target.as_str();

    if let Some(rest) = target.strip_prefix('/') {
        link.is_root = true;
        target = rest;
    }
    if let Some(rest) = target.strip_prefix("./") {
        target = rest;
    }
    while let Some(rest) = target.strip_prefix("../") {
        link.parent_count += 1;
        target = rest;
    }

    link.target = target.to_string();
}

/// `[alias](target#section)` or `[alias](<target with spaces#section>)`
fn direct_link_fields(raw: &str) -> Result<DecomposedLink> {
    let is_image = raw.starts_with('!');
    let text = raw.strip_prefix('!').unwrap_or(raw);
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| Error::malformed(raw, "expected [alias](target)"))?;
    let (alias, destination) = inner
        .rsplit_once("](")
        .ok_or_else(|| Error::malformed(raw, "expected [alias](target)"))?;

    let destination = destination.trim();
    let url = match destination.strip_prefix('<') {
        Some(quoted) => {
            quoted
                .split_once('>')
                .ok_or_else(|| Error::malformed(raw, "unterminated <...> destination"))?
                .0
        }
        None => strip_link_title(destination),
    };
    let (target, section) = split_section(url);

    Ok(DecomposedLink {
        target: target.to_string(),
        section: section.to_string(),
        alias: alias.to_string(),
        category: if is_image {
            LinkCategory::Image
        } else {
            LinkCategory::Link
        },
        ..DecomposedLink::default()
    })
}

/// Drop a trailing `"title"`, `'title'` or `(title)` from an unquoted destination
fn strip_link_title(destination: &str) -> &str {
    match destination.split_once(char::is_whitespace) {
        Some((url, rest)) if rest.trim_start().starts_with(['"', '\'', '(']) => url,
        _ => destination,
    }
}
