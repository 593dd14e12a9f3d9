//! Error types for formatting operations.

use thiserror::Error;

/// Errors that can occur while parsing or reformatting a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("malformed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A close tag did not match the currently open element. This is a
    /// parser contract violation, not a recoverable formatting condition.
    #[error("tag <{open}> was closed by </{close}>")]
    MismatchedTag { open: String, close: String },

    #[error("unknown tag classification: {0}")]
    UnknownClassification(String),

    #[error("invalid option value: {0}")]
    InvalidOption(String),

    #[error("unknown entity reference: &{0};")]
    UnknownEntity(String),

    #[error("undeclared namespace prefix: {0}")]
    UndeclaredPrefix(String),

    #[error("unclosed element <{0}>")]
    UnclosedTag(String),

    #[error("cannot decrease indent level below zero")]
    IndentUnderflow,
}

pub type Result<T> = std::result::Result<T, Error>;
