//! The rendering engine.
//!
//! Walks the document tree top-down with a [`Context`], deciding
//! inline/block/verbatim layout per element. Before an element's children
//! are read they go through three normalization passes: trailing comments
//! are paired with their element, whitespace-only text is dropped, and
//! blank-line markers are injected where the configuration asks for them.
//! Each pass produces a new child sequence, so the render itself stays a
//! pure function of (node, context).

use crate::config::MultilineAttrs;
use crate::context::Context;
use crate::tree::{Element, Node, TrailingComment, escape_text};

/// Render the whole document: the synthetic root concatenates its
/// children's block forms, optionally prefixed by the XML declaration.
pub(crate) fn render_document(root: &Element, ctx: &Context<'_>) -> String {
    let children = normalize_children(root.children(), ctx);
    let parts: Vec<String> = children
        .iter()
        .filter_map(|c| match c {
            Node::EmptyLine => Some(String::new()),
            other => {
                let block = other.render_block(ctx);
                (!block.trim().is_empty()).then_some(block)
            }
        })
        .collect();
    let content = parts.join("\n");
    if ctx.include_doc_id() && !content.starts_with("<?xml ") {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\n{content}")
    } else {
        content
    }
}

/// Block form of an element: verbatim, inline-on-one-line, or open tag /
/// indented children / close tag.
pub(crate) fn element_block(el: &Element, ctx: &Context<'_>) -> String {
    let Some(tag) = el.tag() else {
        return render_document(el, ctx);
    };
    // Verbatim bypasses normalization and the inline/block choice; an
    // empty verbatim element falls through and self-closes.
    if ctx.is_verbatim(tag) && !el.is_empty() {
        return render_verbatim(el, tag, ctx);
    }
    let children = normalize_children(el.children(), ctx);
    if will_inline(tag, &children, ctx) {
        let content = inline_content(&children, ctx);
        if content.is_empty() {
            return format!("{}{}", ctx.indent(), self_closing_tag(el, ctx));
        }
        return format!(
            "{}{}{}{}",
            ctx.indent(),
            open_tag(el, ctx, false),
            content,
            close_tag(tag)
        );
    }
    if children.is_empty() {
        // Empty block: adjacent open and close tags, no artificial blank.
        return format!(
            "{}{}{}",
            ctx.indent(),
            open_tag(el, ctx, true),
            close_tag(tag)
        );
    }
    let child_ctx = ctx.child(tag);
    let body = block_body(&children, &child_ctx);
    format!(
        "{}{}\n{}\n{}{}",
        ctx.indent(),
        open_tag(el, ctx, true),
        body.join("\n"),
        ctx.indent(),
        close_tag(tag)
    )
}

/// Inline form: the whole element on one line, self-closing when the
/// content collapses to nothing.
pub(crate) fn element_inline(el: &Element, ctx: &Context<'_>) -> String {
    let content = inline_content(el.children(), ctx);
    if content.is_empty() {
        return self_closing_tag(el, ctx);
    }
    let Some(tag) = el.tag() else {
        return content;
    };
    format!("{}{}{}", open_tag(el, ctx, false), content, close_tag(tag))
}

/// An element appearing inside verbatim content: markup intact, children
/// verbatim.
pub(crate) fn element_verbatim_markup(el: &Element, ctx: &Context<'_>) -> String {
    if el.is_empty() {
        return self_closing_tag(el, ctx);
    }
    let content: String = el
        .children()
        .iter()
        .map(|c| c.render_verbatim(ctx))
        .collect();
    let Some(tag) = el.tag() else {
        return content;
    };
    format!("{}{}{}", open_tag(el, ctx, false), content, close_tag(tag))
}

/// An element renders inline iff its tag forces it, or its tag does not
/// force block and no child breaks an inline run. This one-level lookahead
/// keeps a paragraph of text and inline spans on one line while any
/// comment, processing instruction or block-level child forces block mode.
fn will_inline(tag: &str, children: &[Node], ctx: &Context<'_>) -> bool {
    if ctx.must_inline(tag, children.is_empty()) {
        return true;
    }
    if ctx.must_block(tag) {
        return false;
    }
    children.iter().all(|c| c.is_inlineable(ctx))
}

fn inline_content(children: &[Node], ctx: &Context<'_>) -> String {
    let content: String = children.iter().map(|c| c.render_inline(ctx)).collect();
    content.trim().to_string()
}

/// Lay out normalized children as output lines. Consecutive inlineable
/// siblings are concatenated onto one line; anything else gets its own
/// block, and an EmptyLine marker becomes a real blank line.
fn block_body(children: &[Node], ctx: &Context<'_>) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut run = String::new();
    for child in children {
        if child.is_inlineable(ctx) {
            run.push_str(&child.render_inline(ctx));
            continue;
        }
        flush_run(&mut run, &mut lines, ctx);
        match child {
            Node::EmptyLine => lines.push(String::new()),
            other => {
                let block = other.render_block(ctx);
                if !block.trim().is_empty() {
                    lines.push(block);
                }
            }
        }
    }
    flush_run(&mut run, &mut lines, ctx);
    lines
}

fn flush_run(run: &mut String, lines: &mut Vec<String>, ctx: &Context<'_>) {
    let trimmed = run.trim();
    if !trimmed.is_empty() {
        lines.push(format!("{}{}", ctx.indent(), trimmed));
    }
    run.clear();
}

/// The three normalization passes, in order. Whitespace-only text is
/// dropped only when it spans a line break; space-only text is prose
/// spacing (the same distinction the trailing-comment rule makes) and
/// survives into inline runs, where line-edge trimming handles it.
pub(crate) fn normalize_children(children: &[Node], ctx: &Context<'_>) -> Vec<Node> {
    let merged = pair_trailing_comments(children);
    let kept: Vec<Node> = merged
        .into_iter()
        .filter(|n| !is_line_break_text(n))
        .collect();
    inject_empty_lines(kept, ctx)
}

fn is_line_break_text(node: &Node) -> bool {
    node.is_blank_text()
        && matches!(node, Node::Text(text) if text.contains('\n') || text.is_empty())
}

/// Pair each element with a comment that follows it on the same line,
/// optionally across whitespace-only text. Only spaces qualify: a newline
/// in the gap means the comment starts its own line.
fn pair_trailing_comments(children: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    let mut i = 0;
    while i < children.len() {
        if let Node::Element(el) = &children[i] {
            if let Some(Node::Comment(comment)) = children.get(i + 1) {
                out.push(Node::WithComment(TrailingComment {
                    element: el.clone(),
                    gap: None,
                    comment: comment.clone(),
                }));
                i += 2;
                continue;
            }
            if let (Some(Node::Text(gap)), Some(Node::Comment(comment))) =
                (children.get(i + 1), children.get(i + 2))
                && !gap.is_empty()
                && gap.chars().all(|c| c == ' ')
            {
                out.push(Node::WithComment(TrailingComment {
                    element: el.clone(),
                    gap: Some(gap.clone()),
                    comment: comment.clone(),
                }));
                i += 3;
                continue;
            }
        }
        out.push(children[i].clone());
        i += 1;
    }
    out
}

/// Insert one EmptyLine marker at each boundary where the previous child's
/// tag wants a blank line after it or the next child's tag wants one
/// before it. Never at the start or end of the child list, and never
/// doubled when both triggers fire on the same boundary.
fn inject_empty_lines(children: Vec<Node>, ctx: &Context<'_>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for node in children {
        if let Some(prev) = out.last() {
            let after_prev = prev
                .element_tag()
                .is_some_and(|tag| ctx.emptyline_after(tag));
            let before_next = node
                .element_tag()
                .is_some_and(|tag| ctx.emptyline_before(tag));
            if after_prev || before_next {
                out.push(Node::EmptyLine);
            }
        }
        out.push(node);
    }
    out
}

/// Verbatim layout: content assembled escaped, trailing spaces trimmed,
/// closing indent only for multi-line content. The CDATA policy is
/// evaluated against the escaped content; when CDATA wins, the content is
/// un-escaped back to raw form inside the section.
fn render_verbatim(el: &Element, tag: &str, ctx: &Context<'_>) -> String {
    let escaped: String = el
        .children()
        .iter()
        .map(|c| c.render_verbatim(ctx))
        .collect();
    let use_cdata = ctx.should_use_cdata(tag, &escaped);
    let body = if use_cdata {
        unescape_content(&escaped)
    } else {
        escaped
    };
    let trimmed = body.trim_end_matches(' ');
    let mut out = format!("{}{}", ctx.indent(), open_tag(el, ctx, true));
    if use_cdata {
        out.push_str("<![CDATA[");
    }
    out.push_str(trimmed);
    if trimmed.contains('\n') {
        if !trimmed.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(ctx.indent());
    }
    if use_cdata {
        out.push_str("]]>");
    }
    out.push_str(&close_tag(tag));
    out
}

/// Reverse of [`escape_text`], applied when content moves into a CDATA
/// section. `&amp;` must go last so it cannot manufacture new sequences.
fn unescape_content(escaped: &str) -> String {
    escaped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// The open tag with attributes in canonical order. Multiline attribute
/// layout only applies to block open tags (`block` true); inline tags keep
/// everything on one line.
fn open_tag(el: &Element, ctx: &Context<'_>, block: bool) -> String {
    let tag = el.tag().unwrap_or_default();
    let attrs = sorted_attrs(el);
    if block && let MultilineAttrs::Threshold { count, indent } = ctx.multiline_attrs()
        && attrs.len() >= count
        && !attrs.is_empty()
    {
        return multiline_open_tag(tag, &attrs, ctx, indent);
    }
    let mut out = format!("<{tag}");
    for (name, value) in &attrs {
        out.push(' ');
        out.push_str(&attr_pair(name, value));
    }
    out.push('>');
    out
}

fn multiline_open_tag(
    tag: &str,
    attrs: &[(&String, &String)],
    ctx: &Context<'_>,
    indent: usize,
) -> String {
    let mut out = format!("<{tag}");
    if indent == 0 {
        // Align-with-first: the first attribute stays on the open-tag line
        // and the rest line up under it.
        let column = " ".repeat(tag.len() + 2);
        for (i, (name, value)) in attrs.iter().enumerate() {
            if i == 0 {
                out.push(' ');
            } else {
                out.push('\n');
                out.push_str(ctx.indent());
                out.push_str(&column);
            }
            out.push_str(&attr_pair(name, value));
        }
    } else {
        let column = " ".repeat(indent);
        for (name, value) in attrs {
            out.push('\n');
            out.push_str(ctx.indent());
            out.push_str(&column);
            out.push_str(&attr_pair(name, value));
        }
    }
    out.push('>');
    out
}

fn self_closing_tag(el: &Element, ctx: &Context<'_>) -> String {
    let tag = el.tag().unwrap_or_default();
    let mut out = format!("<{tag}");
    for (name, value) in sorted_attrs(el) {
        out.push(' ');
        out.push_str(&attr_pair(name, value));
    }
    if ctx.self_closing_space() {
        out.push(' ');
    }
    out.push_str("/>");
    out
}

fn close_tag(tag: &str) -> String {
    format!("</{tag}>")
}

/// Canonical attribute order: `xml:id` first, then plain attributes in
/// lexicographic order, then namespace declarations last.
fn sorted_attrs(el: &Element) -> Vec<(&String, &String)> {
    let mut attrs: Vec<(&String, &String)> = el.attrs().iter().map(|(k, v)| (k, v)).collect();
    attrs.sort_by(|(a, _), (b, _)| attr_rank(a).cmp(&attr_rank(b)).then_with(|| a.cmp(b)));
    attrs
}

fn attr_rank(name: &str) -> u8 {
    if name == "xml:id" {
        0
    } else if name == "xmlns" || name.starts_with("xmlns:") {
        2
    } else {
        1
    }
}

fn attr_pair(name: &str, value: &str) -> String {
    format!("{name}=\"{}\"", escape_attr(value))
}

/// Escape an attribute value for double-quoted output.
fn escape_attr(value: &str) -> String {
    let mut out = escape_text(value);
    if out.contains('"') {
        out = out.replace('"', "&quot;");
    }
    out
}
