//! # ptx-format
//!
//! A canonical reformatter for PreTeXt XML documents.
//!
//! ## Features
//!
//! - One canonical layout per document: reformatting formatted output is a
//!   no-op
//! - Content-driven inline/block layout, with per-tag overrides
//! - Verbatim handling for code chunks, with configurable CDATA policies
//! - Preserves comments, processing instructions and namespace
//!   declarations
//! - Configurable via TOML files or the builder-style [`Config`] API
//!
//! ## Quick Start
//!
//! ```
//! use ptx_format::format_pretext;
//!
//! let formatted = format_pretext("<section>  <p>Hello,\n<em>world</em>!</p></section>").unwrap();
//! assert_eq!(
//!     formatted,
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\n\
//!      <section>\n  <p>Hello, <em>world</em>!</p>\n</section>"
//! );
//! ```
//!
//! ## Custom Configuration
//!
//! The standard profile ships the common PreTeXt tag classifications. Build
//! a [`Config`] to change the indent, the CDATA policy, or how individual
//! tags are laid out:
//!
//! ```
//! use ptx_format::{Classification, Config, format_pretext_with};
//!
//! let mut config = Config::standard();
//! config.set_indent_spaces(4);
//! config.classify("aside", Classification::Block);
//!
//! let formatted = format_pretext_with("<aside><p>Hi</p></aside>", &config).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod parse;
pub mod tree;

mod context;
mod indent;
mod namespace;
mod render;

pub use config::{CdataPolicy, Classification, Config, MultilineAttrs};
pub use error::{Error, Result};
pub use parse::parse_document;
pub use tree::{Element, Node};

use context::Context;

/// Reformat a PreTeXt document with the standard profile.
pub fn format_pretext(source: &str) -> Result<String> {
    format_pretext_with(source, &Config::standard())
}

/// Reformat a PreTeXt document with an explicit configuration.
///
/// The returned string carries no trailing newline; callers writing files
/// normally append one.
pub fn format_pretext_with(source: &str, config: &Config) -> Result<String> {
    let root = parse::parse_document(source)?;
    let ctx = Context::new(config);
    Ok(render::render_document(&root, &ctx))
}
