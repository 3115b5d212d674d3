//! Heading anchors.

use linkweave_core::{Resource, Section};
use unicode_normalization::UnicodeNormalization;

/// Lower-case slug of heading text: `"Hello, World!"` → `"hello-world"`.
///
/// Alphanumerics are kept, whitespace and `-` collapse to single dashes,
/// everything else is dropped.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Anchor used by rendered previews: accents stripped, lower-cased,
/// punctuation dropped, each whitespace run turned into a single `-`.
///
/// ```
/// use linkweave_parser::convert_anchor;
///
/// assert_eq!(convert_anchor("Café Déjà Vu"), "cafe-deja-vu");
/// assert_eq!(convert_anchor("What's new?"), "whats-new");
/// ```
pub fn convert_anchor(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    stripped
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Find the section whose label or anchor matches `fragment`
pub fn find_section_by_anchor<'a>(resource: &'a Resource, fragment: &str) -> Option<&'a Section> {
    if fragment.is_empty() {
        return None;
    }
    resource.find_section(fragment).or_else(|| {
        let wanted = convert_anchor(fragment);
        resource
            .sections
            .iter()
            .find(|s| convert_anchor(&s.label) == wanted || slugify(&s.label) == fragment)
    })
}
