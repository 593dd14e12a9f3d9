//! Rendering context: a configuration snapshot plus the current indent.

use crate::config::{Classification, Config, MultilineAttrs};
use crate::indent::Indent;

/// Immutable per-render state. Deriving a child context is the only place
/// the context forks: the indent grows by one level unless the parent tag
/// is classified block-no-indent.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    config: &'a Config,
    indent: Indent,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a Config) -> Self {
        Context {
            config,
            indent: Indent::new(config.indent_unit()),
        }
    }

    /// The indent string for the current level.
    pub fn indent(&self) -> &str {
        self.indent.as_str()
    }

    /// The context for children of an element with the given tag.
    pub fn child(&self, tag: &str) -> Context<'a> {
        if self.classification(tag) == Classification::BlockNoIndent {
            self.clone()
        } else {
            Context {
                config: self.config,
                indent: self.indent.incr(),
            }
        }
    }

    pub fn classification(&self, tag: &str) -> Classification {
        self.config.classification(tag)
    }

    /// Whether the tag forces inline layout (possibly only when empty).
    pub fn must_inline(&self, tag: &str, is_empty: bool) -> bool {
        match self.classification(tag) {
            Classification::Inline => true,
            Classification::InlineEmpty => is_empty,
            _ => false,
        }
    }

    /// Whether the tag forces block layout.
    pub fn must_block(&self, tag: &str) -> bool {
        matches!(
            self.classification(tag),
            Classification::Block | Classification::BlockNoIndent
        )
    }

    pub fn is_verbatim(&self, tag: &str) -> bool {
        self.classification(tag) == Classification::Verbatim
    }

    pub fn include_doc_id(&self) -> bool {
        self.config.include_doc_id()
    }

    pub fn self_closing_space(&self) -> bool {
        self.config.self_closing_space()
    }

    pub fn should_use_cdata(&self, tag: &str, escaped: &str) -> bool {
        self.config.should_use_cdata(tag, escaped)
    }

    pub fn multiline_attrs(&self) -> MultilineAttrs {
        self.config.multiline_attrs()
    }

    pub fn emptyline_before(&self, tag: &str) -> bool {
        self.config.emptyline_before(tag)
    }

    pub fn emptyline_after(&self, tag: &str) -> bool {
        self.config.emptyline_after(tag)
    }
}
