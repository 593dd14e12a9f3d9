//! Streaming XML parsing into the document tree.
//!
//! A single pass over `quick_xml` events builds the [`Element`] tree the
//! renderer consumes. Text arrives raw: entity references come through as
//! separate `GeneralRef` events and are resolved here, and adjacent text
//! fragments merge in [`Element::append`]. Tag matching is checked here
//! rather than left to the reader so a mismatch reports both names.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::namespace::Namespaces;
use crate::tree::{Element, Node};

/// An element whose end tag has not arrived yet, together with the
/// namespace prefixes it declared.
struct OpenElement {
    element: Element,
    declared: Vec<String>,
}

/// Parse a whole document into a synthetic root element whose children are
/// the top-level nodes. The XML declaration and doctype are dropped; the
/// formatter re-synthesizes the declaration.
pub fn parse_document(text: &str) -> Result<Element> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = false;

    let mut ns = Namespaces::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut current = OpenElement {
        element: Element::root(),
        declared: Vec::new(),
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let opened = open_element(&e, &mut ns)?;
                stack.push(std::mem::replace(&mut current, opened));
            }
            Event::Empty(e) => {
                let opened = open_element(&e, &mut ns)?;
                for prefix in opened.declared.iter().rev() {
                    ns.leave(prefix);
                }
                current.element.append(Node::Element(opened.element));
            }
            Event::End(e) => {
                let close = String::from_utf8(e.name().as_ref().to_vec())?;
                if current.element.tag() != Some(close.as_str()) {
                    return Err(Error::MismatchedTag {
                        open: current.element.tag().unwrap_or_default().to_string(),
                        close,
                    });
                }
                for prefix in current.declared.iter().rev() {
                    ns.leave(prefix);
                }
                let Some(parent) = stack.pop() else {
                    return Err(Error::MismatchedTag {
                        open: String::new(),
                        close,
                    });
                };
                let finished = std::mem::replace(&mut current, parent);
                current.element.append(Node::Element(finished.element));
            }
            Event::Text(e) => {
                current.element.append(Node::Text(String::from_utf8(e.to_vec())?));
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8(e.to_vec())?;
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| Error::UnknownEntity(entity.clone()))?;
                current.element.append(Node::Text(resolved));
            }
            Event::CData(e) => {
                current.element.append(Node::Text(String::from_utf8(e.to_vec())?));
            }
            Event::Comment(e) => {
                current
                    .element
                    .append(Node::Comment(String::from_utf8(e.to_vec())?));
            }
            Event::PI(e) => {
                current
                    .element
                    .append(Node::ProcessingInstruction(String::from_utf8(e.to_vec())?));
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(tag) = current.element.tag() {
        return Err(Error::UnclosedTag(tag.to_string()));
    }
    Ok(current.element)
}

/// Build an element from a start tag: `xmlns` attributes go through the
/// namespace tracker and are re-attached after the ordinary attributes, so
/// declarations always end up in canonical position.
fn open_element(e: &BytesStart<'_>, ns: &mut Namespaces) -> Result<OpenElement> {
    let raw_name = String::from_utf8(e.name().as_ref().to_vec())?;
    let mut declared = Vec::new();
    let mut plain: Vec<(String, String)> = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(Error::Attr)?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        if key == "xmlns" {
            ns.enter("", &value);
            declared.push(String::new());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            ns.enter(prefix, &value);
            declared.push(prefix.to_string());
        } else {
            plain.push((key, value));
        }
    }

    // Declarations on this element are in scope for its own name.
    let mut element = Element::new(&ns.qualified_name(&raw_name)?);
    for (key, value) in plain {
        element.push_attr(ns.qualified_name(&key)?, value);
    }
    for (name, uri) in ns.take_declarations() {
        element.push_attr(name, uri);
    }
    Ok(OpenElement { element, declared })
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_entity() {
        // Named entities
        assert_eq!(resolve_entity("apos"), Some("'".to_string()));
        assert_eq!(resolve_entity("quot"), Some("\"".to_string()));
        assert_eq!(resolve_entity("lt"), Some("<".to_string()));
        assert_eq!(resolve_entity("gt"), Some(">".to_string()));
        assert_eq!(resolve_entity("amp"), Some("&".to_string()));

        // Numeric character references
        assert_eq!(resolve_entity("#65"), Some("A".to_string()));
        assert_eq!(resolve_entity("#x2019"), Some("\u{2019}".to_string()));

        // Unknown entities
        assert_eq!(resolve_entity("mdash"), None);
        assert_eq!(resolve_entity("invalid"), None);
    }

    #[test]
    fn test_simple_document() {
        let root = parse_document("<section><p>Hello</p></section>").unwrap();
        assert_eq!(root.children().len(), 1);
        let Node::Element(section) = &root.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(section.tag(), Some("section"));
        let Node::Element(p) = &section.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(p.children(), &[Node::Text("Hello".to_string())]);
    }

    #[test]
    fn test_entities_merge_into_surrounding_text() {
        let root = parse_document("<p>a &amp; b</p>").unwrap();
        let Node::Element(p) = &root.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(p.children(), &[Node::Text("a & b".to_string())]);
    }

    #[test]
    fn test_cdata_becomes_text() {
        let root = parse_document("<pre><![CDATA[x < y]]></pre>").unwrap();
        let Node::Element(pre) = &root.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(pre.children(), &[Node::Text("x < y".to_string())]);
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let root = parse_document("<p title=\"a &lt; b\" />").unwrap();
        let Node::Element(p) = &root.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(
            p.attrs(),
            &[("title".to_string(), "a < b".to_string())]
        );
    }

    #[test]
    fn test_mismatched_close_tag() {
        let err = parse_document("<a><b></a></b>").unwrap_err();
        assert!(
            matches!(err, Error::MismatchedTag { open, close } if open == "b" && close == "a")
        );
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let err = parse_document("<p>&mdash;</p>").unwrap_err();
        assert!(matches!(err, Error::UnknownEntity(name) if name == "mdash"));
    }

    #[test]
    fn test_unclosed_document() {
        assert!(parse_document("<a><b></b>").is_err());
    }

    #[test]
    fn test_namespace_declarations_survive() {
        let root = parse_document(
            "<pretext xmlns:xi=\"http://www.w3.org/2001/XInclude\">\
             <xi:include href=\"ch.ptx\" /></pretext>",
        )
        .unwrap();
        let Node::Element(pretext) = &root.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(
            pretext.attrs(),
            &[(
                "xmlns:xi".to_string(),
                "http://www.w3.org/2001/XInclude".to_string()
            )]
        );
        let Node::Element(include) = &pretext.children()[0] else {
            panic!("expected element");
        };
        assert_eq!(include.tag(), Some("xi:include"));
    }

    #[test]
    fn test_undeclared_prefix_is_rejected() {
        let err = parse_document("<pretext><xi:include href=\"x\" /></pretext>").unwrap_err();
        assert!(matches!(err, Error::UndeclaredPrefix(prefix) if prefix == "xi"));
    }

    #[test]
    fn test_doctype_and_declaration_are_dropped() {
        let root = parse_document(
            "<?xml version=\"1.0\"?>\n<!DOCTYPE section>\n<section />",
        )
        .unwrap();
        let children: Vec<_> = root
            .children()
            .iter()
            .filter(|n| !n.is_blank_text())
            .collect();
        assert_eq!(children.len(), 1);
    }
}
