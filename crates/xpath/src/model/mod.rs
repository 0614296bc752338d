use core::cmp::Ordering;
use core::fmt;
use std::collections::BTreeMap;

use crate::consts::XML_URI;

pub mod simple;

/// Kind of a node as seen through the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Element,
    Attribute,
    /// Character data.
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Element => "element",
            NodeKind::Attribute => "attribute",
            NodeKind::Text => "text",
            NodeKind::Comment => "comment",
            NodeKind::ProcessingInstruction => "processing-instruction",
            NodeKind::Namespace => "namespace",
        }
    }
}

/// Lexical and resolved name of a node.
///
/// Elements and attributes carry their namespace URI in `ns_uri`. Processing
/// instructions carry their target in `local`, namespace nodes their prefix
/// (empty for the default namespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            ns_uri: None,
        }
    }

    pub fn expanded(&self) -> ExpandedName {
        ExpandedName {
            ns_uri: self.ns_uri.clone().filter(|u| !u.is_empty()),
            local: self.local.clone(),
        }
    }
}

/// Namespace URI plus local name; the identity used for functions and variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<&str>, local: &str) -> Self {
        Self {
            ns_uri: ns_uri.map(str::to_string),
            local: local.to_string(),
        }
    }

    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(uri) => write!(f, "{{{uri}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Read-only view of a document tree consumed by the engine.
///
/// Implementors provide identity (`Eq`), kind, parent lookup and a total
/// document-order position. Navigation capabilities default to "none", so an
/// adapter without attributes or namespace nodes simply leaves those methods
/// alone.
///
/// Positions must be stable for the lifetime of the tree and consistent with
/// document order: an element precedes its namespace nodes, which precede its
/// attributes, which precede its children. Gaps are allowed.
pub trait XPathNode: Clone + Eq + fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    fn string_value(&self) -> String;
    /// Parent node; `None` only for the topmost node of a tree.
    fn parent(&self) -> Option<Self>;
    fn document_position(&self) -> u64;

    fn children(&self) -> Vec<Self> {
        Vec::new()
    }
    fn attributes(&self) -> Vec<Self> {
        Vec::new()
    }
    /// In-scope namespace nodes of an element, see [`in_scope_namespaces`].
    fn namespaces(&self) -> Vec<Self> {
        Vec::new()
    }

    fn compare_document_order(&self, other: &Self) -> Ordering {
        self.document_position().cmp(&other.document_position())
    }

    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    fn attribute(&self, ns_uri: Option<&str>, local: &str) -> Option<Self> {
        self.attributes().into_iter().find(|a| {
            a.name()
                .is_some_and(|n| n.local == local && n.ns_uri.as_deref() == ns_uri)
        })
    }
}

/// Prefix to URI bindings in scope at an element. The empty prefix is the
/// default namespace.
pub type NamespaceMap = BTreeMap<String, String>;

/// Bindings in scope at the top of every tree.
pub fn root_namespaces() -> NamespaceMap {
    let mut map = NamespaceMap::new();
    map.insert("xml".to_string(), XML_URI.to_string());
    map
}

/// Merge one element's declarations into the bindings inherited from its parent.
///
/// Closer declarations shadow farther ones and a declaration with an empty URI
/// removes the prefix from scope. The `xml` prefix cannot be rebound.
pub fn in_scope_namespaces<'a, I>(inherited: &NamespaceMap, declarations: I) -> NamespaceMap
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut scope = inherited.clone();
    for (prefix, uri) in declarations {
        if prefix == "xml" {
            continue;
        }
        if uri.is_empty() {
            scope.remove(prefix);
        } else {
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closer_declaration_shadows_inherited() {
        let outer = in_scope_namespaces(&root_namespaces(), [("p", "urn:outer"), ("", "urn:d")]);
        let inner = in_scope_namespaces(&outer, [("p", "urn:inner")]);
        assert_eq!(inner.get("p").map(String::as_str), Some("urn:inner"));
        assert_eq!(inner.get("").map(String::as_str), Some("urn:d"));
        assert_eq!(outer.get("p").map(String::as_str), Some("urn:outer"));
    }

    #[test]
    fn empty_uri_undeclares() {
        let outer = in_scope_namespaces(&root_namespaces(), [("", "urn:d")]);
        let inner = in_scope_namespaces(&outer, [("", "")]);
        assert!(!inner.contains_key(""));
        assert_eq!(inner.get("xml").map(String::as_str), Some(XML_URI));
    }

    #[test]
    fn xml_prefix_is_fixed() {
        let scope = in_scope_namespaces(&root_namespaces(), [("xml", "urn:nope")]);
        assert_eq!(scope.get("xml").map(String::as_str), Some(XML_URI));
    }
}
