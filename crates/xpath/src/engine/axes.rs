//! Axis traversal.
//!
//! Every axis is a pure function of the context node and a resolved node test.
//! The test is applied while walking, so unmatched nodes are never collected.
//! Results come back in axis order: document order for forward axes, nearest
//! node first for reverse axes. That order defines proximity positions.

use smallvec::SmallVec;

use super::node_test::{ResolvedTest, principal_kind};
use crate::model::{NodeKind, XPathNode};
use crate::parser::ast::Axis;

struct Collector<'t, N> {
    test: &'t ResolvedTest,
    principal: NodeKind,
    out: Vec<N>,
}

impl<N: XPathNode> Collector<'_, N> {
    fn offer(&mut self, node: N) {
        if self.test.matches(&node, self.principal) {
            self.out.push(node);
        }
    }
}

pub(crate) fn find<N: XPathNode>(node: &N, axis: Axis, test: &ResolvedTest) -> Vec<N> {
    let mut c = Collector {
        test,
        principal: principal_kind(axis),
        out: Vec::new(),
    };
    match axis {
        Axis::Child => node.children().into_iter().for_each(|n| c.offer(n)),
        Axis::Attribute => node.attributes().into_iter().for_each(|n| c.offer(n)),
        Axis::Namespace => node.namespaces().into_iter().for_each(|n| c.offer(n)),
        Axis::SelfAxis => c.offer(node.clone()),
        Axis::Parent => {
            if let Some(parent) = node.parent() {
                c.offer(parent);
            }
        }
        Axis::Ancestor => ancestors(node, &mut c),
        Axis::AncestorOrSelf => {
            c.offer(node.clone());
            ancestors(node, &mut c);
        }
        Axis::Descendant => descendants(node, &mut c),
        Axis::DescendantOrSelf => {
            c.offer(node.clone());
            descendants(node, &mut c);
        }
        Axis::FollowingSibling => {
            if let Some((siblings, idx)) = siblings(node) {
                siblings.into_iter().skip(idx + 1).for_each(|n| c.offer(n));
            }
        }
        Axis::PrecedingSibling => {
            if let Some((mut siblings, idx)) = siblings(node) {
                siblings.truncate(idx);
                siblings.into_iter().rev().for_each(|n| c.offer(n));
            }
        }
        Axis::Following => following(node, &mut c),
        Axis::Preceding => preceding(node, &mut c),
    }
    c.out
}

fn ancestors<N: XPathNode>(node: &N, c: &mut Collector<'_, N>) {
    let mut current = node.parent();
    while let Some(n) = current {
        current = n.parent();
        c.offer(n);
    }
}

fn descendants<N: XPathNode>(node: &N, c: &mut Collector<'_, N>) {
    let mut stack: SmallVec<[N; 16]> = node.children().into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        stack.extend(n.children().into_iter().rev());
        c.offer(n);
    }
}

/// Subtree rooted at `node` (inclusive) in reverse document order.
fn subtree_reversed<N: XPathNode>(node: N, c: &mut Collector<'_, N>) {
    let mut stack: SmallVec<[(N, bool); 16]> = SmallVec::new();
    stack.push((node, false));
    while let Some((n, expanded)) = stack.pop() {
        if expanded {
            c.offer(n);
            continue;
        }
        let children = n.children();
        stack.push((n, true));
        stack.extend(children.into_iter().map(|child| (child, false)));
    }
}

/// The parent's children and the index of `node` among them. Attributes and
/// namespace nodes have no siblings.
fn siblings<N: XPathNode>(node: &N) -> Option<(Vec<N>, usize)> {
    if matches!(node.kind(), NodeKind::Attribute | NodeKind::Namespace) {
        return None;
    }
    let children = node.parent()?.children();
    let idx = children.iter().position(|c| c == node)?;
    Some((children, idx))
}

/// Attributes and namespace nodes sit right after their element, so their
/// `following` starts with the element's content and their `preceding` is the
/// element's.
fn owner_for_document_axes<N: XPathNode>(node: &N) -> Option<N> {
    match node.kind() {
        NodeKind::Attribute | NodeKind::Namespace => node.parent(),
        _ => None,
    }
}

fn following<N: XPathNode>(node: &N, c: &mut Collector<'_, N>) {
    let mut current = node.clone();
    if let Some(owner) = owner_for_document_axes(node) {
        descendants(&owner, c);
        current = owner;
    }
    loop {
        if let Some((siblings, idx)) = siblings(&current) {
            for sibling in siblings.into_iter().skip(idx + 1) {
                c.offer(sibling.clone());
                descendants(&sibling, c);
            }
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
}

fn preceding<N: XPathNode>(node: &N, c: &mut Collector<'_, N>) {
    let mut current = owner_for_document_axes(node).unwrap_or_else(|| node.clone());
    loop {
        if let Some((mut siblings, idx)) = siblings(&current) {
            siblings.truncate(idx);
            for sibling in siblings.into_iter().rev() {
                subtree_reversed(sibling, c);
            }
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
}
