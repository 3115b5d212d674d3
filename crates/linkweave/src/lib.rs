//! # linkweave
//!
//! Command-line front end for the link engine: resolve, check and rewrite the
//! wikilinks of a markdown note workspace.

pub mod commands;
pub mod settings;

pub use commands::{FileEdits, FileReport, Problem, ProblemKind};
pub use linkweave_core::prelude::*;
pub use settings::{Overrides, load_settings};
