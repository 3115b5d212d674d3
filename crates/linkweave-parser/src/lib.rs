//! # linkweave Parser
//!
//! Link syntax for markdown note workspaces, built on `pulldown-cmark`.
//!
//! This crate provides:
//! - **Link analysis**: raw `[[wikilink]]` / `[alias](target)` text → [`DecomposedLink`]
//!   under the standard, alias-first and gollum grammars
//! - **Link editing**: the inverse, re-serializing a link with a [`LinkDelta`] applied
//! - **Image properties** of gollum image links (`width=200, align=right`)
//! - **Document scanning**: link tokens, sections and link reference
//!   definitions, with code blocks and inline code excluded
//!
//! ## Architecture
//!
//! Scanning is two-phase, as in [`engine`]:
//!
//! ### Phase 1: pulldown-cmark pass
//! - Frontmatter title, headings (sections), direct and reference links
//! - Builds excluded ranges (code blocks, inline code, HTML)
//!
//! ### Phase 2: Regex pass
//! - Wikilinks `[[]]`, embeds `![[]]` and `[label]: url` definitions
//! - **Skips excluded ranges** so nothing inside code is treated as a link
//!
//! Analysis and editing never touch the workspace: they are pure functions of
//! the token, the grammar and the image extension list.
//!
//! ## Quick Start
//!
//! ```
//! use linkweave_core::{LinkConfig, LinkToken};
//! use linkweave_parser::{LinkDelta, analyze_with_config, render_edit_with_config};
//!
//! let config = LinkConfig::gollum();
//! let token = LinkToken::wikilink("[[Glossary|../shared/glossary#Terms]]");
//!
//! let link = analyze_with_config(&token, &config).unwrap();
//! assert_eq!(link.target, "shared/glossary");
//! assert_eq!(link.parent_count, 1);
//!
//! let edit = render_edit_with_config(&token, &LinkDelta::new().alias("Words"), &config).unwrap();
//! assert_eq!(edit.new_text, "[[Words|../shared/glossary#Terms]]");
//! ```
//!
//! ### Scanning a document
//!
//! ```
//! use linkweave_parser::scan;
//!
//! let result = scan("# Title\n\n[[note-a]] and `[[not a link]]` and [doc](doc.md)");
//! assert_eq!(result.links.len(), 2);
//! assert_eq!(result.title(), Some("Title"));
//! ```

pub mod analyzer;
pub mod edit;
pub mod engine;
pub mod image;
pub mod parsers;
pub mod slug;

pub use analyzer::{analyze, analyze_with_config, has_image_extension, target_with_path_prefixes};
pub use edit::{LinkDelta, TextEdit, render_edit, render_edit_with_config};
pub use engine::{ScanEngine, ScanResult, scan};
pub use image::ImageProperties;
pub use parsers::{Parser, parse_resource};
pub use slug::{convert_anchor, find_section_by_anchor, slugify};

pub use linkweave_core::{DecomposedLink, LinkKind, LinkToken};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ImageProperties, LinkDelta, Parser, ScanResult, TextEdit, analyze, analyze_with_config,
        render_edit, render_edit_with_config, scan,
    };
    pub use linkweave_core::prelude::*;
}
