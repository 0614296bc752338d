//! Simple in-memory tree implementing [`XPathNode`], for tests and quick prototypes.
//!
//! Trees are described with a small builder and frozen by `build()` into an
//! immutable arena shared through an `Arc`. Handles are cheap to clone and
//! compare by (tree, index).
//!
//! ```
//! use treepath::simple::{attr, doc, elem, text};
//! use treepath::XPathNode;
//!
//! // <root id="r"><child>Hello</child><child world="yes"/></root>
//! let document = doc()
//!     .child(
//!         elem("root")
//!             .attr(attr("id", "r"))
//!             .child(elem("child").child(text("Hello")))
//!             .child(elem("child").attr(attr("world", "yes"))),
//!     )
//!     .build();
//!
//! let root = document.children()[0].clone();
//! assert_eq!(root.name().unwrap().local, "root");
//! assert_eq!(root.children().len(), 2);
//! assert_eq!(document.string_value(), "Hello");
//! ```
//!
//! Namespaces are declared with [`ns`] or with `xmlns` attributes and resolved
//! when the tree is built:
//! ```
//! use treepath::simple::{attr, doc, elem, ns};
//! use treepath::XPathNode;
//!
//! let document = doc()
//!     .child(
//!         elem("p:root")
//!             .namespace(ns("p", "urn:one"))
//!             .child(elem("child").attr(attr("xmlns", "urn:two"))),
//!     )
//!     .build();
//! let root = document.children()[0].clone();
//! assert_eq!(root.name().unwrap().ns_uri.as_deref(), Some("urn:one"));
//! let child = root.children()[0].clone();
//! assert_eq!(child.name().unwrap().ns_uri.as_deref(), Some("urn:two"));
//! ```
use std::fmt;
use std::sync::Arc;

use crate::consts::XML_URI;
use crate::model::{NamespaceMap, NodeKind, QName, XPathNode, in_scope_namespaces, root_namespaces};

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    name: Option<QName>,
    value: String,
    parent: Option<usize>,
    namespaces: Vec<usize>,
    attributes: Vec<usize>,
    children: Vec<usize>,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeData>,
}

/// Handle to a node of a built tree.
#[derive(Clone)]
pub struct SimpleNode {
    tree: Arc<Tree>,
    index: usize,
}

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && Arc::ptr_eq(&self.tree, &other.tree)
    }
}
impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.tree).hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("SimpleNode")
            .field("kind", &data.kind.as_str())
            .field("name", &data.name.as_ref().map(|n| n.local.as_str()))
            .field("position", &self.index)
            .finish()
    }
}

impl SimpleNode {
    fn data(&self) -> &NodeData {
        &self.tree.nodes[self.index]
    }

    fn at(&self, index: usize) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            index,
        }
    }

    fn handles(&self, indices: &[usize]) -> Vec<Self> {
        indices.iter().map(|&i| self.at(i)).collect()
    }

    /// Resolve `prefix` against the namespace nodes in scope at this element.
    pub fn lookup_namespace_uri(&self, prefix: &str) -> Option<String> {
        self.data()
            .namespaces
            .iter()
            .map(|&i| &self.tree.nodes[i])
            .find(|ns| ns.name.as_ref().is_some_and(|n| n.local == prefix))
            .map(|ns| ns.value.clone())
    }

    fn collect_text(&self, out: &mut String) {
        for &child in &self.data().children {
            let node = &self.tree.nodes[child];
            match node.kind {
                NodeKind::Text => out.push_str(&node.value),
                NodeKind::Element => self.at(child).collect_text(out),
                _ => {}
            }
        }
    }
}

impl XPathNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.data().kind
    }

    fn name(&self) -> Option<QName> {
        self.data().name.clone()
    }

    fn string_value(&self) -> String {
        let data = self.data();
        match data.kind {
            NodeKind::Root | NodeKind::Element => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
            _ => data.value.clone(),
        }
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|p| self.at(p))
    }

    fn document_position(&self) -> u64 {
        self.index as u64
    }

    fn children(&self) -> Vec<Self> {
        self.handles(&self.data().children)
    }

    fn attributes(&self) -> Vec<Self> {
        self.handles(&self.data().attributes)
    }

    fn namespaces(&self) -> Vec<Self> {
        self.handles(&self.data().namespaces)
    }
}

/// An attribute waiting to be attached to an element builder.
#[derive(Debug, Clone)]
pub struct AttrSpec {
    name: String,
    value: String,
}

/// A namespace declaration waiting to be attached to an element builder.
#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    prefix: String,
    uri: String,
}

#[derive(Debug, Clone)]
pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: String,
    value: String,
    declarations: Vec<NamespaceDecl>,
    attributes: Vec<AttrSpec>,
    children: Vec<SimpleNodeBuilder>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: &str, value: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            value: value.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: SimpleNodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = SimpleNodeBuilder>>(mut self, it: I) -> Self {
        self.children.extend(it);
        self
    }

    /// Attach an attribute. `xmlns` and `xmlns:p` become namespace declarations.
    pub fn attr(mut self, attr: AttrSpec) -> Self {
        if attr.name == "xmlns" {
            self.declarations.push(NamespaceDecl {
                prefix: String::new(),
                uri: attr.value,
            });
        } else if let Some(prefix) = attr.name.strip_prefix("xmlns:") {
            self.declarations.push(NamespaceDecl {
                prefix: prefix.to_string(),
                uri: attr.value,
            });
        } else {
            self.attributes.push(attr);
        }
        self
    }

    pub fn attrs<I: IntoIterator<Item = AttrSpec>>(self, attrs: I) -> Self {
        attrs.into_iter().fold(self, SimpleNodeBuilder::attr)
    }

    pub fn namespace(mut self, decl: NamespaceDecl) -> Self {
        self.declarations.push(decl);
        self
    }

    /// Freeze the description into a tree and return the handle of this node.
    pub fn build(self) -> SimpleNode {
        let mut nodes = Vec::new();
        flatten(&self, None, &root_namespaces(), &mut nodes);
        SimpleNode {
            tree: Arc::new(Tree { nodes }),
            index: 0,
        }
    }
}

fn split_qname(lexical: &str) -> (Option<&str>, &str) {
    match lexical.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, lexical),
    }
}

fn resolve_name(lexical: &str, scope: &NamespaceMap, use_default: bool) -> QName {
    let (prefix, local) = split_qname(lexical);
    let ns_uri = match prefix {
        Some("xml") => Some(XML_URI.to_string()),
        Some(p) => scope.get(p).cloned(),
        None if use_default => scope.get("").cloned(),
        None => None,
    };
    QName {
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
        ns_uri,
    }
}

fn push(nodes: &mut Vec<NodeData>, kind: NodeKind, name: Option<QName>, value: String, parent: Option<usize>) -> usize {
    nodes.push(NodeData {
        kind,
        name,
        value,
        parent,
        namespaces: Vec::new(),
        attributes: Vec::new(),
        children: Vec::new(),
    });
    nodes.len() - 1
}

// Pre-order layout: the node, then its namespace nodes, its attributes and
// finally its children. Arena indices double as document positions.
fn flatten(b: &SimpleNodeBuilder, parent: Option<usize>, inherited: &NamespaceMap, nodes: &mut Vec<NodeData>) -> usize {
    match b.kind {
        NodeKind::Element => {
            let scope = in_scope_namespaces(
                inherited,
                b.declarations.iter().map(|d| (d.prefix.as_str(), d.uri.as_str())),
            );
            let name = resolve_name(&b.name, &scope, true);
            let id = push(nodes, NodeKind::Element, Some(name), String::new(), parent);
            for (prefix, uri) in &scope {
                let ns = push(nodes, NodeKind::Namespace, Some(QName::local(prefix.as_str())), uri.clone(), Some(id));
                nodes[id].namespaces.push(ns);
            }
            for a in &b.attributes {
                let name = resolve_name(&a.name, &scope, false);
                let at = push(nodes, NodeKind::Attribute, Some(name), a.value.clone(), Some(id));
                nodes[id].attributes.push(at);
            }
            for c in &b.children {
                let child = flatten(c, Some(id), &scope, nodes);
                nodes[id].children.push(child);
            }
            id
        }
        NodeKind::Root => {
            let id = push(nodes, NodeKind::Root, None, String::new(), parent);
            for c in &b.children {
                let child = flatten(c, Some(id), inherited, nodes);
                nodes[id].children.push(child);
            }
            id
        }
        NodeKind::ProcessingInstruction => push(nodes, b.kind, Some(QName::local(b.name.as_str())), b.value.clone(), parent),
        kind => push(nodes, kind, None, b.value.clone(), parent),
    }
}

pub fn doc() -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Root, "", "")
}
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Element, name, "")
}
pub fn text(v: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Text, "", v)
}
pub fn comment(v: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::Comment, "", v)
}
pub fn pi(target: &str, data: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(NodeKind::ProcessingInstruction, target, data)
}
pub fn attr(name: &str, v: &str) -> AttrSpec {
    AttrSpec {
        name: name.to_string(),
        value: v.to_string(),
    }
}
/// Declare `prefix` (empty for the default namespace); an empty `uri` undeclares it.
pub fn ns(prefix: &str, uri: &str) -> NamespaceDecl {
    NamespaceDecl {
        prefix: prefix.to_string(),
        uri: uri.to_string(),
    }
}
