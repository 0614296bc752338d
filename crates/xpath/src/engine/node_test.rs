//! Node tests resolved against the namespace bindings of one evaluation.

use std::collections::HashMap;

use crate::consts::XML_URI;
use crate::engine::runtime::{Error, ErrorCode};
use crate::model::{NodeKind, XPathNode};
use crate::parser::ast::{Axis, NodeTest, NodeTypeTest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResolvedTest {
    AnyNode,
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
    /// `*`: any node of the axis' principal kind.
    AnyName,
    /// `prefix:*`
    Namespace(String),
    Name { ns_uri: Option<String>, local: String },
}

pub(crate) fn resolve_prefix(prefix: &str, namespaces: &HashMap<String, String>) -> Result<String, Error> {
    if let Some(uri) = namespaces.get(prefix) {
        return Ok(uri.clone());
    }
    if prefix == "xml" {
        return Ok(XML_URI.to_string());
    }
    Err(Error::from_code(
        ErrorCode::XPST0081,
        format!("namespace prefix '{prefix}' is not bound"),
    ))
}

impl ResolvedTest {
    pub(crate) fn resolve(test: &NodeTest, axis: Axis, namespaces: &HashMap<String, String>) -> Result<Self, Error> {
        Ok(match test {
            NodeTest::Kind(NodeTypeTest::Node) => ResolvedTest::AnyNode,
            NodeTest::Kind(NodeTypeTest::Text) => ResolvedTest::Text,
            NodeTest::Kind(NodeTypeTest::Comment) => ResolvedTest::Comment,
            NodeTest::ProcessingInstruction(target) => {
                ResolvedTest::ProcessingInstruction(target.as_ref().map(ToString::to_string))
            }
            NodeTest::Wildcard => ResolvedTest::AnyName,
            NodeTest::NamespaceWildcard(prefix) => ResolvedTest::Namespace(resolve_prefix(prefix, namespaces)?),
            NodeTest::Name { prefix: Some(prefix), local } => ResolvedTest::Name {
                ns_uri: Some(resolve_prefix(prefix, namespaces)?),
                local: local.to_string(),
            },
            // Only element names pick up the caller's default namespace.
            NodeTest::Name { prefix: None, local } => ResolvedTest::Name {
                ns_uri: match axis {
                    Axis::Attribute | Axis::Namespace => None,
                    _ => namespaces.get("").filter(|u| !u.is_empty()).cloned(),
                },
                local: local.to_string(),
            },
        })
    }

    pub(crate) fn matches<N: XPathNode>(&self, node: &N, principal: NodeKind) -> bool {
        let kind = node.kind();
        match self {
            ResolvedTest::AnyNode => true,
            ResolvedTest::Text => kind == NodeKind::Text,
            ResolvedTest::Comment => kind == NodeKind::Comment,
            ResolvedTest::ProcessingInstruction(target) => {
                kind == NodeKind::ProcessingInstruction
                    && target
                        .as_ref()
                        .is_none_or(|t| node.name().is_some_and(|n| &n.local == t))
            }
            ResolvedTest::AnyName => kind == principal,
            ResolvedTest::Namespace(uri) => {
                kind == principal && node.name().is_some_and(|n| n.ns_uri.as_ref() == Some(uri))
            }
            ResolvedTest::Name { ns_uri, local } => {
                kind == principal
                    && node.name().is_some_and(|n| {
                        &n.local == local && n.ns_uri.as_deref().filter(|u| !u.is_empty()) == ns_uri.as_deref()
                    })
            }
        }
    }
}

/// The node kind a name test selects on `axis`.
pub(crate) fn principal_kind(axis: Axis) -> NodeKind {
    match axis {
        Axis::Attribute => NodeKind::Attribute,
        Axis::Namespace => NodeKind::Namespace,
        _ => NodeKind::Element,
    }
}
