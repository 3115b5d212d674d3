//! Link configuration.
//!
//! A [`LinkConfig`] is a read-only snapshot: callers capture it once and pass
//! it by reference into every analysis or resolution call. Follows a builder
//! pattern for construction with validation, and loads from YAML.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Wikilink syntax family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WikilinkSyntax {
    /// Note identifiers, resolved anywhere in the workspace
    #[default]
    Standard,
    /// Directory-based wiki paths with image links and `../` navigation
    Gollum,
}

impl FromStr for WikilinkSyntax {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "gollum" => Ok(Self::Gollum),
            other => Err(Error::config_error(format!(
                "Unknown wikilink syntax '{}' (expected standard or gollum)",
                other
            ))),
        }
    }
}

impl fmt::Display for WikilinkSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikilinkSyntax::Standard => write!(f, "standard"),
            WikilinkSyntax::Gollum => write!(f, "gollum"),
        }
    }
}

/// Field order inside `[[...]]` for the standard syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WikilinkOrder {
    /// `[[target#section|alias]]`
    #[default]
    AliasLast,
    /// `[[alias|target#section]]`
    AliasFirst,
}

/// The concrete wikilink grammar, derived once per call from a [`LinkConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WikilinkGrammar {
    /// `[[target#section|alias]]`
    Standard,
    /// `[[alias|target#section]]`
    AliasFirst,
    /// `[[alias|target#section]]`, image links and root/parent path prefixes
    Gollum,
}

impl WikilinkGrammar {
    /// Whether the alias field precedes the target
    pub fn alias_first(self) -> bool {
        !matches!(self, WikilinkGrammar::Standard)
    }
}

impl fmt::Display for WikilinkGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikilinkGrammar::Standard => write!(f, "standard"),
            WikilinkGrammar::AliasFirst => write!(f, "alias-first"),
            WikilinkGrammar::Gollum => write!(f, "gollum"),
        }
    }
}

/// Configuration consumed by the link engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub wikilink_syntax: WikilinkSyntax,
    pub wikilink_order: WikilinkOrder,
    /// Match note identifiers and titles ignoring case
    pub case_insensitive_titles: bool,
    /// Extension appended to extension-less targets, with leading dot
    pub default_note_extension: String,
    /// Extensions treated as notes, with leading dot
    pub note_extensions: Vec<String>,
    /// Extensions that turn gollum links into image links, with leading dot
    pub image_extensions: Vec<String>,
    /// Folder receiving uploaded files, relative to the workspace root.
    /// Read by the host's upload integration.
    pub uploads_folder: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            wikilink_syntax: WikilinkSyntax::Standard,
            wikilink_order: WikilinkOrder::AliasLast,
            case_insensitive_titles: false,
            default_note_extension: ".md".to_string(),
            note_extensions: vec![".md".to_string(), ".markdown".to_string()],
            image_extensions: [".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            uploads_folder: "uploads".to_string(),
        }
    }
}

impl LinkConfig {
    /// Create new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard wikilinks, alias last
    pub fn standard() -> Self {
        Self::default()
    }

    /// Gollum-style wiki: alias first, image links, directory-relative paths
    pub fn gollum() -> Self {
        Self {
            wikilink_syntax: WikilinkSyntax::Gollum,
            wikilink_order: WikilinkOrder::AliasFirst,
            ..Self::default()
        }
    }

    /// Create a builder starting from defaults
    pub fn builder() -> LinkConfigBuilder {
        LinkConfigBuilder::new()
    }

    /// Derive the wikilink grammar. Syntax wins over order.
    pub fn grammar(&self) -> WikilinkGrammar {
        match (self.wikilink_syntax, self.wikilink_order) {
            (WikilinkSyntax::Gollum, _) => WikilinkGrammar::Gollum,
            (WikilinkSyntax::Standard, WikilinkOrder::AliasFirst) => WikilinkGrammar::AliasFirst,
            (WikilinkSyntax::Standard, WikilinkOrder::AliasLast) => WikilinkGrammar::Standard,
        }
    }

    pub fn is_gollum(&self) -> bool {
        self.wikilink_syntax == WikilinkSyntax::Gollum
    }

    /// Whether `ext` (with or without leading dot, any case) is an image extension
    pub fn is_image_extension(&self, ext: &str) -> bool {
        contains_extension(&self.image_extensions, ext)
    }

    /// Whether `ext` (with or without leading dot, any case) is a note extension
    pub fn is_note_extension(&self, ext: &str) -> bool {
        contains_extension(&self.note_extensions, ext)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.default_note_extension.starts_with('.') || self.default_note_extension.len() < 2
        {
            return Err(Error::config_error(format!(
                "Default note extension must look like '.md', got '{}'",
                self.default_note_extension
            )));
        }

        if self.note_extensions.is_empty() {
            return Err(Error::config_error("At least one note extension is required"));
        }

        if !self.is_note_extension(&self.default_note_extension) {
            return Err(Error::config_error(format!(
                "Default note extension '{}' is not listed in note extensions",
                self.default_note_extension
            )));
        }

        if let Some(ext) = self
            .image_extensions
            .iter()
            .find(|ext| self.is_note_extension(ext))
        {
            return Err(Error::config_error(format!(
                "Extension '{}' cannot be both a note and an image extension",
                ext
            )));
        }

        if self.uploads_folder.starts_with('/') || self.uploads_folder.contains("..") {
            return Err(Error::config_error(
                "Uploads folder must be a path inside the workspace",
            ));
        }

        Ok(())
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config_error(format!("Invalid link configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No link configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config_error(format!(
                "Failed to load configuration from {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize configuration: {}", e)))
    }
}

fn contains_extension(list: &[String], ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    !ext.is_empty()
        && list
            .iter()
            .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Builder for LinkConfig
pub struct LinkConfigBuilder {
    config: LinkConfig,
}

impl LinkConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: LinkConfig::default(),
        }
    }

    pub fn syntax(mut self, syntax: WikilinkSyntax) -> Self {
        self.config.wikilink_syntax = syntax;
        self
    }

    pub fn order(mut self, order: WikilinkOrder) -> Self {
        self.config.wikilink_order = order;
        self
    }

    pub fn case_insensitive_titles(mut self, enabled: bool) -> Self {
        self.config.case_insensitive_titles = enabled;
        self
    }

    pub fn default_note_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.default_note_extension = ext.into();
        self
    }

    pub fn note_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.note_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.image_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn uploads_folder(mut self, folder: impl Into<String>) -> Self {
        self.config.uploads_folder = folder.into();
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<LinkConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for LinkConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_grammar_derivation() {
        assert_eq!(LinkConfig::standard().grammar(), WikilinkGrammar::Standard);
        assert_eq!(LinkConfig::gollum().grammar(), WikilinkGrammar::Gollum);

        let alias_first = LinkConfig::builder()
            .order(WikilinkOrder::AliasFirst)
            .build()
            .unwrap();
        assert_eq!(alias_first.grammar(), WikilinkGrammar::AliasFirst);

        // gollum implies alias-first regardless of the configured order
        let gollum_alias_last = LinkConfig::builder()
            .syntax(WikilinkSyntax::Gollum)
            .order(WikilinkOrder::AliasLast)
            .build()
            .unwrap();
        assert_eq!(gollum_alias_last.grammar(), WikilinkGrammar::Gollum);
    }

    #[test]
    fn test_extension_matching() {
        let config = LinkConfig::default();
        assert!(config.is_image_extension("png"));
        assert!(config.is_image_extension(".PNG"));
        assert!(!config.is_image_extension("md"));
        assert!(!config.is_image_extension(""));
        assert!(config.is_note_extension(".md"));
    }

    #[test]
    fn test_validation_rejects_bad_extension() {
        let result = LinkConfig::builder().default_note_extension("md").build();
        assert!(result.is_err());

        let result = LinkConfig::builder()
            .image_extensions([".png", ".md"])
            .build();
        assert!(result.is_err());

        let result = LinkConfig::builder().uploads_folder("../outside").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = LinkConfig::from_yaml_str(
            "wikilink_syntax: gollum\ncase_insensitive_titles: true\n",
        )
        .unwrap();
        assert!(config.is_gollum());
        assert!(config.case_insensitive_titles);
        assert_eq!(config.default_note_extension, ".md");
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(LinkConfig::from_yaml_str("wikilink_syntax: mediawiki\n").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = LinkConfig::load(&temp.path().join("absent.yaml")).unwrap();
        assert_eq!(config, LinkConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("links.yaml");
        let config = LinkConfig::gollum();
        std::fs::write(&path, config.to_yaml_string().unwrap()).unwrap();
        assert_eq!(LinkConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_syntax_from_str() {
        assert_eq!(
            "Gollum".parse::<WikilinkSyntax>().unwrap(),
            WikilinkSyntax::Gollum
        );
        assert!("other".parse::<WikilinkSyntax>().is_err());
    }
}
