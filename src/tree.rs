//! The parsed document tree.
//!
//! Nodes are a plain sum type; each variant knows how to render itself
//! inline and verbatim, and whether it can join an inline run. Block layout
//! lives in [`crate::render`], which is where the interesting decisions
//! happen.

use crate::context::Context;
use crate::render;

/// One unit of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Raw character data. Adjacent text children are always merged, so no
    /// two consecutive `Text` nodes ever exist.
    Text(String),
    /// Raw comment body, emitted without escaping.
    Comment(String),
    /// Raw target + data of a processing instruction. Never inlineable.
    ProcessingInstruction(String),
    /// Marker meaning "emit one blank line here". Inserted by the engine,
    /// never produced by parsing.
    EmptyLine,
    /// An element paired with a comment that followed it on the same line.
    WithComment(TrailingComment),
}

/// Keeps an element and its trailing comment together so the comment is
/// not pushed onto its own line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingComment {
    pub element: Element,
    /// The whitespace that separated the close tag from the comment, if
    /// any. Contains no newlines; that is what made it "same line".
    pub gap: Option<String>,
    pub comment: String,
}

/// An element: tag, attributes, children. The synthetic root has no tag
/// and renders only its children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    tag: Option<String>,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// The synthetic document root.
    pub fn root() -> Self {
        Element::default()
    }

    pub fn new(tag: &str) -> Self {
        Element {
            tag: Some(tag.to_string()),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The tag name; `None` only for the root.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.tag.is_none()
    }

    /// Attributes in insertion order. Canonical output order is computed at
    /// render time.
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn push_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((name.into(), value.into()));
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child, merging adjacent text nodes into one.
    pub fn append(&mut self, child: Node) {
        if let (Node::Text(text), Some(Node::Text(last))) = (&child, self.children.last_mut()) {
            last.push_str(text);
            return;
        }
        self.children.push(child);
    }
}

impl Node {
    /// Whether this node may be concatenated onto the current inline run
    /// instead of starting a new line. Only elements consult tag
    /// classification; comments, processing instructions and blank-line
    /// markers always break a run.
    pub(crate) fn is_inlineable(&self, ctx: &Context<'_>) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Element(el) => match el.tag() {
                Some(tag) => ctx.must_inline(tag, el.is_empty()),
                None => false,
            },
            _ => false,
        }
    }

    /// A single-line fragment: text escaped, comments and processing
    /// instructions as literal markup, elements with their whole content
    /// on the line (self-closing when the content collapses to nothing).
    pub(crate) fn render_inline(&self, ctx: &Context<'_>) -> String {
        match self {
            Node::Text(text) => escape_text(&collapse_whitespace(text)),
            Node::Comment(text) => format!("<!--{text}-->"),
            Node::ProcessingInstruction(text) => format!("<?{text}?>"),
            Node::EmptyLine => String::new(),
            Node::Element(el) => render::element_inline(el, ctx),
            Node::WithComment(tc) => {
                let gap = tc.gap.as_deref().unwrap_or("");
                format!(
                    "{}{}<!--{}-->",
                    render::element_inline(&tc.element, ctx),
                    gap,
                    tc.comment
                )
            }
        }
    }

    /// An indented, possibly multi-line fragment.
    pub(crate) fn render_block(&self, ctx: &Context<'_>) -> String {
        match self {
            Node::Text(text) => {
                let collapsed = collapse_whitespace(text);
                format!("{}{}", ctx.indent(), escape_text(collapsed.trim()))
            }
            Node::Comment(text) => format!("{}<!--{text}-->", ctx.indent()),
            Node::ProcessingInstruction(text) => format!("{}<?{text}?>", ctx.indent()),
            Node::EmptyLine => String::new(),
            Node::Element(el) => render::element_block(el, ctx),
            Node::WithComment(tc) => {
                let gap = tc.gap.as_deref().unwrap_or("");
                format!(
                    "{}{}<!--{}-->",
                    render::element_block(&tc.element, ctx),
                    gap,
                    tc.comment
                )
            }
        }
    }

    /// Verbatim content: text escaped but whitespace untouched, nested
    /// markup intact. The enclosing verbatim element decides afterwards
    /// whether to un-escape the whole thing into a CDATA section.
    pub(crate) fn render_verbatim(&self, ctx: &Context<'_>) -> String {
        match self {
            Node::Text(text) => escape_text(text),
            Node::Comment(text) => format!("<!--{text}-->"),
            Node::ProcessingInstruction(text) => format!("<?{text}?>"),
            Node::EmptyLine => String::new(),
            Node::Element(el) => render::element_verbatim_markup(el, ctx),
            Node::WithComment(tc) => {
                let gap = tc.gap.as_deref().unwrap_or("");
                format!(
                    "{}{}<!--{}-->",
                    render::element_verbatim_markup(&tc.element, ctx),
                    gap,
                    tc.comment
                )
            }
        }
    }

    /// The element's tag, looking through a trailing-comment wrapper.
    pub fn element_tag(&self) -> Option<&str> {
        match self {
            Node::Element(el) => el.tag(),
            Node::WithComment(tc) => tc.element.tag(),
            _ => None,
        }
    }

    /// Whether this is a text node containing only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

/// Escape the characters XML requires escaping in character data.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Collapse every whitespace run to a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
