//! # linkweave Core
//!
//! Core data models, error types, and configuration for the link engine.
//! This crate defines the canonical types that all other crates depend on.
//!
//! ## Architecture Principles
//!
//! - **Type-Driven Design**: link kinds, grammars and resolution outcomes are enums
//! - **Zero Panic in Libraries**: All errors are `Result<T, Error>`
//! - **Soft failures are values**: unresolved links become placeholders, not errors
//! - **Immutable by Default**: tokens, decompositions and config are read-only snapshots
//!
//! ## Core Modules
//!
//! - [`models`] - Link tokens, decomposed links, resources, resolved references
//! - [`error`] - Error taxonomy and Result alias
//! - [`config`] - Link configuration and grammar selection
//!
//! ## Usage Examples
//!
//! ```
//! use linkweave_core::prelude::*;
//!
//! let config = LinkConfig::gollum();
//! assert_eq!(config.grammar(), WikilinkGrammar::Gollum);
//!
//! let token = LinkToken::wikilink("[[note-a|Custom Title]]");
//! assert_eq!(token.kind, LinkKind::WikiLink);
//!
//! let reference = ResolvedReference::placeholder("note-b");
//! assert!(reference.is_placeholder());
//! ```

pub mod config;
pub mod error;
pub mod models;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{LinkConfig, WikilinkGrammar, WikilinkOrder, WikilinkSyntax};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        DecomposedLink, LineIndex, LinkCategory, LinkKind, LinkToken, NoteLinkDefinition,
        ResolvedReference, Resource, ResourceType, Section, SourceRange,
    };
}
