//! Namespace prefix tracking.
//!
//! The streaming parser hands us names in `prefix:local` form and `xmlns`
//! declarations as plain attributes. This tracker scopes each declared
//! prefix to the element subtree that declared it, rejects names whose
//! prefix was never declared, and hands back the declarations introduced on
//! the current element so the parser can re-attach them as attributes in
//! canonical position.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Tracks the namespace prefixes currently in scope.
#[derive(Debug)]
pub struct Namespaces {
    /// Prefix -> stack of URIs. A stack because an inner element may
    /// shadow an outer declaration of the same prefix.
    scopes: HashMap<String, Vec<String>>,
    /// Declarations since the last element start, in declaration order.
    /// Drained into synthesized `xmlns` attributes.
    pending: Vec<(String, String)>,
}

impl Namespaces {
    pub fn new() -> Self {
        let mut scopes = HashMap::new();
        // The xml prefix is bound implicitly in every document.
        scopes.insert(
            "xml".to_string(),
            vec!["http://www.w3.org/XML/1998/namespace".to_string()],
        );
        Namespaces {
            scopes,
            pending: Vec::new(),
        }
    }

    /// Bring a prefix into scope. The empty prefix is the default
    /// namespace.
    pub fn enter(&mut self, prefix: &str, uri: &str) {
        self.scopes
            .entry(prefix.to_string())
            .or_default()
            .push(uri.to_string());
        self.pending.push((prefix.to_string(), uri.to_string()));
    }

    /// Drop the innermost binding of a prefix, restoring whatever it
    /// shadowed.
    pub fn leave(&mut self, prefix: &str) {
        if let Some(stack) = self.scopes.get_mut(prefix) {
            stack.pop();
            if stack.is_empty() {
                self.scopes.remove(prefix);
            }
        }
    }

    /// Synthesized attributes for the namespaces declared on the current
    /// element, as `(name, uri)` pairs. Several namespaces introduced at
    /// once must all be re-emitted.
    pub fn take_declarations(&mut self) -> Vec<(String, String)> {
        self.pending
            .drain(..)
            .map(|(prefix, uri)| {
                let name = if prefix.is_empty() {
                    "xmlns".to_string()
                } else {
                    format!("xmlns:{prefix}")
                };
                (name, uri)
            })
            .collect()
    }

    /// Validate a qualified name against the prefixes in scope and pass it
    /// through. Unprefixed names are always fine; a prefixed name whose
    /// prefix has no declaration is a document error.
    pub fn qualified_name(&self, name: &str) -> Result<String> {
        if let Some((prefix, _)) = name.split_once(':')
            && prefix != "xmlns"
            && !self.scopes.contains_key(prefix)
        {
            return Err(Error::UndeclaredPrefix(prefix.to_string()));
        }
        Ok(name.to_string())
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_prefix_is_seeded() {
        let ns = Namespaces::new();
        assert_eq!(ns.qualified_name("xml:id").unwrap(), "xml:id");
    }

    #[test]
    fn test_plain_names_pass_through() {
        let ns = Namespaces::new();
        assert_eq!(ns.qualified_name("section").unwrap(), "section");
    }

    #[test]
    fn test_declared_prefix_resolves() {
        let mut ns = Namespaces::new();
        ns.enter("xi", "http://www.w3.org/2001/XInclude");
        assert_eq!(ns.qualified_name("xi:include").unwrap(), "xi:include");
    }

    #[test]
    fn test_undeclared_prefix_is_an_error() {
        let ns = Namespaces::new();
        assert!(matches!(
            ns.qualified_name("xi:include"),
            Err(Error::UndeclaredPrefix(prefix)) if prefix == "xi"
        ));
    }

    #[test]
    fn test_take_declarations_emits_all_new_namespaces() {
        let mut ns = Namespaces::new();
        ns.enter("", "http://pretextbook.org/2020/pretext");
        ns.enter("xi", "http://www.w3.org/2001/XInclude");
        let decls = ns.take_declarations();
        assert_eq!(
            decls,
            vec![
                (
                    "xmlns".to_string(),
                    "http://pretextbook.org/2020/pretext".to_string()
                ),
                (
                    "xmlns:xi".to_string(),
                    "http://www.w3.org/2001/XInclude".to_string()
                ),
            ]
        );
        // Drained: a second element start sees nothing new.
        assert!(ns.take_declarations().is_empty());
    }

    #[test]
    fn test_leave_restores_shadowed_binding() {
        let mut ns = Namespaces::new();
        ns.enter("a", "http://outer");
        ns.enter("a", "http://inner");
        ns.leave("a");
        assert!(ns.qualified_name("a:x").is_ok());
        ns.leave("a");
        assert!(ns.qualified_name("a:x").is_err());
    }
}
