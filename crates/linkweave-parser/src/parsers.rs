//! Resource construction from file paths and content.

use linkweave_core::{LinkConfig, Resource, ResourceType, Result};
use std::path::Path;

use crate::engine::ScanEngine;

pub mod link_utils;

/// Turns files into workspace [`Resource`]s
pub struct Parser {
    config: LinkConfig,
}

impl Parser {
    /// Create a parser for the given configuration
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    /// Classify a path by extension: note, image, or other attachment
    pub fn resource_type(&self, path: &Path) -> ResourceType {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if self.config.is_note_extension(ext) {
            ResourceType::Note
        } else if self.config.is_image_extension(ext) {
            ResourceType::Image
        } else {
            ResourceType::Attachment
        }
    }

    /// Build a resource from its path and content.
    ///
    /// Notes are scanned for sections, links and definitions and titled by
    /// frontmatter `title`, else first H1, else file stem. Other files only
    /// get a type and a stem title.
    pub fn parse_file(&self, path: &Path, content: &str) -> Result<Resource> {
        let resource_type = self.resource_type(path);
        let mut resource = Resource::new(path, resource_type);
        if resource_type != ResourceType::Note {
            return Ok(resource);
        }

        let scanned = ScanEngine::new(content).scan();
        if let Some(title) = scanned.title() {
            resource.title = title.to_string();
        }
        resource.sections = scanned.sections;
        resource.links = scanned.links;
        resource.definitions = scanned.definitions;

        log::debug!(
            "Parsed {}: {} links, {} sections, {} definitions",
            path.display(),
            resource.links.len(),
            resource.sections.len(),
            resource.definitions.len()
        );
        Ok(resource)
    }
}

/// Parse one file with a throwaway [`Parser`]
pub fn parse_resource(path: &Path, content: &str, config: &LinkConfig) -> Result<Resource> {
    Parser::new(config.clone()).parse_file(path, content)
}
