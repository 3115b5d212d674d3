//! # linkweave Workspace
//!
//! Resolution of links against a workspace of notes.
//!
//! This crate provides:
//! - [`Workspace`]: lookup by identifier, relative path or exact path, with an
//!   in-memory implementation [`NoteWorkspace`]
//! - The path normalizer for directory-relative (gollum) links
//! - [`resolve`] / [`resolve_all`]: link token → [`ResolvedReference`]
//! - [`create_markdown_references`]: reference definitions for wikilinks
//! - Preview anchors and image embeds
//! - [`read_as_markdown`]: the note or section text a reference points at
//! - [`load_workspace`]: build a workspace from a directory on disk
//!
//! ## Quick Start
//!
//! ```
//! use linkweave_core::{LinkConfig, LinkToken, Resource, ResourceType, ResolvedReference};
//! use linkweave_workspace::prelude::*;
//! use std::path::PathBuf;
//!
//! let config = LinkConfig::gollum();
//! let mut workspace = NoteWorkspace::new("/wiki", &config);
//! workspace.insert(Resource::new("/wiki/shared/glossary.md", ResourceType::Note));
//! let document = Resource::new("/wiki/docs/page.md", ResourceType::Note);
//!
//! let token = LinkToken::wikilink("[[Terms|../shared/glossary#Terms]]");
//! let reference = resolve(&token, &document, &workspace, &config).unwrap();
//! assert_eq!(
//!     reference,
//!     ResolvedReference::Resource {
//!         path: PathBuf::from("/wiki/shared/glossary.md"),
//!         section: Some("Terms".to_string()),
//!     }
//! );
//!
//! // climbing above the root is a soft failure
//! let token = LinkToken::wikilink("[[../../elsewhere]]");
//! assert!(resolve(&token, &document, &workspace, &config).unwrap().is_placeholder());
//! ```

pub mod loader;
pub mod paths;
pub mod preview;
pub mod references;
pub mod resolver;
pub mod sections;
pub mod workspace;

pub use linkweave_core::{Error, ResolvedReference, Result};
pub use loader::load_workspace;
pub use paths::{
    SubdirContext, compute_subdirectory_context, compute_target_file_path, normalize_path,
};
pub use preview::{ImageEmbed, LinkClass, PreviewLink, render_preview};
pub use references::create_markdown_references;
pub use resolver::{LinkResolution, resolve, resolve_all};
pub use sections::{read_as_markdown, section_text};
pub use workspace::{NoteWorkspace, Workspace};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        LinkResolution, NoteWorkspace, PreviewLink, Workspace, create_markdown_references,
        load_workspace, read_as_markdown, render_preview, resolve, resolve_all,
    };
    pub use linkweave_core::prelude::*;
}
