//! Shared helpers for classifying link destinations.
//!
//! The scanner only emits tokens for destinations that can point into the
//! workspace; anything carrying a URI scheme is left to the renderer.

/// Whether `url` starts with a URI scheme (`https:`, `mailto:`, `obsidian:` ...).
///
/// Single-letter schemes are treated as Windows drive letters, not schemes.
///
/// # Examples
///
/// ```
/// use linkweave_parser::parsers::link_utils::is_external_url;
///
/// assert!(is_external_url("https://example.com"));
/// assert!(is_external_url("mailto:user@example.com"));
/// assert!(!is_external_url("docs/api.md#methods"));
/// assert!(!is_external_url("#section"));
/// ```
pub fn is_external_url(url: &str) -> bool {
    let url = url.trim().trim_start_matches('<');
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Whether `target` is written as an explicit path (`/`, `./` or `../` prefix)
pub fn has_path_prefix(target: &str) -> bool {
    target.starts_with('/') || target.starts_with("./") || target.starts_with("../")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_urls() {
        assert!(is_external_url("http://example.com/path"));
        assert!(is_external_url("<https://example.com/a b>"));
        assert!(is_external_url("vscode://file/x"));
        assert!(is_external_url("tel:+123"));
    }

    #[test]
    fn test_workspace_urls() {
        assert!(!is_external_url("./path/file.md"));
        assert!(!is_external_url("../parent/file.txt"));
        assert!(!is_external_url("note#Heading: part"));
        assert!(!is_external_url("C:/notes/a.md"));
        assert!(!is_external_url("1abc:foo"));
    }

    #[test]
    fn test_path_prefix() {
        assert!(has_path_prefix("/root"));
        assert!(has_path_prefix("./here"));
        assert!(has_path_prefix("../up"));
        assert!(!has_path_prefix("plain/path"));
        assert!(!has_path_prefix(".hidden"));
    }
}
