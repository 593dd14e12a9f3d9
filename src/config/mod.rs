//! Formatter configuration.
//!
//! A [`Config`] is built once per run (from the standard profile, a TOML
//! file, or the builder-style setters) and is read-only while rendering.

mod file;

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

/// How a tag should be laid out, independent of its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    /// No forced behavior; the inline/block decision is content-driven.
    #[default]
    None,
    /// Contents are rendered as-is (code chunks and other extrinsic text).
    Verbatim,
    /// Always rendered inline, and treated as text by the parent.
    Inline,
    /// Treated as inline only when the element is empty.
    InlineEmpty,
    /// Always rendered in block mode.
    Block,
    /// Block mode, but the contents do not gain an indent level.
    BlockNoIndent,
}

impl Classification {
    /// Parse a configuration key (`verbatim`, `inline`, `inline-empty`,
    /// `block`, `block-no-indent`). Unknown keys are a fatal configuration
    /// error.
    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "verbatim" => Ok(Classification::Verbatim),
            "inline" => Ok(Classification::Inline),
            "inline-empty" => Ok(Classification::InlineEmpty),
            "block" => Ok(Classification::Block),
            "block-no-indent" => Ok(Classification::BlockNoIndent),
            other => Err(Error::UnknownClassification(other.to_string())),
        }
    }

    /// The configuration key for this classification, if it has one.
    pub fn key(self) -> Option<&'static str> {
        match self {
            Classification::None => None,
            Classification::Verbatim => Some("verbatim"),
            Classification::Inline => Some("inline"),
            Classification::InlineEmpty => Some("inline-empty"),
            Classification::Block => Some("block"),
            Classification::BlockNoIndent => Some("block-no-indent"),
        }
    }
}

/// When verbatim content should be wrapped in a CDATA section instead of
/// being entity-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdataPolicy {
    Always,
    Never,
    /// Use CDATA when the escaped content holds at least this many escape
    /// sequences.
    Threshold(usize),
    /// Use CDATA inside exactly these tags.
    Tags(Vec<String>),
}

/// Layout of attributes on a block open tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultilineAttrs {
    /// All attributes stay on the open-tag line.
    Never,
    /// With `count` or more attributes, spread them over multiple lines.
    /// `indent` of zero keeps the first attribute on the open-tag line and
    /// aligns the rest with it; a positive value puts every attribute on
    /// its own line indented by that many columns.
    Threshold { count: usize, indent: usize },
}

/// The recognized option set. See the crate docs for what each option does
/// to the output.
#[derive(Debug, Clone)]
pub struct Config {
    indent_unit: String,
    include_doc_id: bool,
    self_closing_space: bool,
    classifications: HashMap<String, Classification>,
    cdata: CdataPolicy,
    multiline_attrs: MultilineAttrs,
    emptyline_before: HashSet<String>,
    emptyline_after: HashSet<String>,
}

impl Default for Config {
    /// The neutral profile: two-space indent, no document identifier, no
    /// tag classifications, never CDATA, single-line attributes.
    fn default() -> Self {
        Config {
            indent_unit: "  ".to_string(),
            include_doc_id: false,
            self_closing_space: true,
            classifications: HashMap::new(),
            cdata: CdataPolicy::Never,
            multiline_attrs: MultilineAttrs::Never,
            emptyline_before: HashSet::new(),
            emptyline_after: HashSet::new(),
        }
    }
}

// The shipped PreTeXt profile.
const STANDARD_VERBATIM: &[&str] = &[
    "cd",
    "cline",
    "input",
    "latex-image",
    "latex-preamble",
    "macros",
    "output",
    "pre",
    "prompt",
    "tests",
];

const STANDARD_INLINE: &[&str] = &[
    "abbr", "acro", "alert", "c", "delete", "em", "foreign", "init", "insert", "m", "pubtitle",
    "q", "sq", "stale", "taxon", "term",
];

const STANDARD_INLINE_EMPTY: &[&str] = &[
    "copyright", "ellipsis", "mdash", "ndash", "nbsp", "times", "var", "xref",
];

const STANDARD_BLOCK: &[&str] = &[
    "appendix",
    "article",
    "blockquote",
    "book",
    "chapter",
    "dl",
    "exercises",
    "glossary",
    "introduction",
    "ol",
    "part",
    "pretext",
    "references",
    "section",
    "subsection",
    "subsubsection",
    "task",
    "ul",
];

impl Config {
    /// The standard PreTeXt profile: two-space indent, document identifier
    /// included, and the common PreTeXt tags classified.
    pub fn standard() -> Self {
        let mut config = Config {
            include_doc_id: true,
            ..Config::default()
        };
        for &tag in STANDARD_VERBATIM {
            config.classify(tag, Classification::Verbatim);
        }
        for &tag in STANDARD_INLINE {
            config.classify(tag, Classification::Inline);
        }
        for &tag in STANDARD_INLINE_EMPTY {
            config.classify(tag, Classification::InlineEmpty);
        }
        for &tag in STANDARD_BLOCK {
            config.classify(tag, Classification::Block);
        }
        config
    }

    /// The classification for a tag; tags absent from every list get
    /// [`Classification::None`].
    pub fn classification(&self, tag: &str) -> Classification {
        self.classifications.get(tag).copied().unwrap_or_default()
    }

    /// Force a classification for one tag.
    pub fn classify(&mut self, tag: &str, classification: Classification) {
        self.classifications
            .insert(tag.to_string(), classification);
    }

    /// The string emitted for one indent level.
    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    /// Indent by a number of spaces.
    pub fn set_indent_spaces(&mut self, count: usize) {
        self.indent_unit = " ".repeat(count);
    }

    /// Indent by a literal string (e.g. a tab).
    pub fn set_indent_literal(&mut self, unit: &str) {
        self.indent_unit = unit.to_string();
    }

    /// Whether the XML declaration line is prefixed to the output.
    pub fn include_doc_id(&self) -> bool {
        self.include_doc_id
    }

    pub fn set_include_doc_id(&mut self, include: bool) {
        self.include_doc_id = include;
    }

    /// Whether self-closing tags carry a space before `/>`.
    pub fn self_closing_space(&self) -> bool {
        self.self_closing_space
    }

    pub fn set_self_closing_space(&mut self, space: bool) {
        self.self_closing_space = space;
    }

    pub fn cdata_policy(&self) -> &CdataPolicy {
        &self.cdata
    }

    pub fn set_cdata_policy(&mut self, policy: CdataPolicy) {
        self.cdata = policy;
    }

    /// Decide CDATA for one verbatim element, given its fully-escaped
    /// content.
    pub fn should_use_cdata(&self, tag: &str, escaped: &str) -> bool {
        match &self.cdata {
            CdataPolicy::Always => true,
            CdataPolicy::Never => false,
            CdataPolicy::Tags(tags) => tags.iter().any(|t| t == tag),
            CdataPolicy::Threshold(n) => count_escape_sequences(escaped) >= *n,
        }
    }

    pub fn multiline_attrs(&self) -> MultilineAttrs {
        self.multiline_attrs
    }

    pub fn set_multiline_attrs(&mut self, policy: MultilineAttrs) {
        self.multiline_attrs = policy;
    }

    pub fn emptyline_before(&self, tag: &str) -> bool {
        self.emptyline_before.contains(tag)
    }

    pub fn emptyline_after(&self, tag: &str) -> bool {
        self.emptyline_after.contains(tag)
    }

    pub fn set_emptyline_before<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, tags: I) {
        self.emptyline_before = tags.into_iter().map(Into::into).collect();
    }

    pub fn set_emptyline_after<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, tags: I) {
        self.emptyline_after = tags.into_iter().map(Into::into).collect();
    }

    pub(crate) fn tags_with(&self, classification: Classification) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .classifications
            .iter()
            .filter(|(_, c)| **c == classification)
            .map(|(tag, _)| tag.as_str())
            .collect();
        tags.sort_unstable();
        tags
    }

    pub(crate) fn emptyline_before_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.emptyline_before.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub(crate) fn emptyline_after_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.emptyline_after.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

/// Count the `&amp;`, `&lt;` and `&gt;` sequences in escaped content.
fn count_escape_sequences(escaped: &str) -> usize {
    let bytes = escaped.as_bytes();
    memchr::memchr_iter(b'&', bytes)
        .filter(|&i| {
            let rest = &bytes[i..];
            rest.starts_with(b"&amp;") || rest.starts_with(b"&lt;") || rest.starts_with(b"&gt;")
        })
        .count()
}
