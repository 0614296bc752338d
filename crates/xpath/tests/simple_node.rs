//! Tests for the in-memory `SimpleNode` adapter.

use std::cmp::Ordering;

use treepath::consts::XML_URI;
use treepath::simple::{SimpleNode, attr, comment, doc, elem, ns, pi, text};
use treepath::{NodeKind, QName, XPathNode};

fn make_tree() -> SimpleNode {
    doc()
        .child(comment("lead"))
        .child(
            elem("root")
                .attr(attr("xmlns:p", "urn:p"))
                .attr(attr("id", "42"))
                .attr(attr("p:class", "main"))
                .child(elem("p:child").child(text("Hello ")).child(pi("go", "now")))
                .child(elem("child").child(elem("inner").child(text("World")))),
        )
        .build()
}

fn root_element(tree: &SimpleNode) -> SimpleNode {
    tree.children()
        .into_iter()
        .find(|n| n.kind() == NodeKind::Element)
        .expect("root element")
}

#[test]
fn document_node_shape() {
    let tree = make_tree();
    assert_eq!(tree.kind(), NodeKind::Root);
    assert!(tree.parent().is_none());
    assert!(tree.name().is_none());
    assert_eq!(tree.children().len(), 2);
    assert_eq!(tree.string_value(), "Hello World");
}

#[test]
fn xmlns_attributes_become_namespace_nodes() {
    let root = root_element(&make_tree());
    let attrs: Vec<String> = root.attributes().iter().map(|a| a.name().unwrap().local).collect();
    assert_eq!(attrs, ["id", "class"]);

    let prefixes: Vec<String> = root.namespaces().iter().map(|n| n.name().unwrap().local).collect();
    assert_eq!(prefixes, ["p", "xml"]);
    assert_eq!(root.lookup_namespace_uri("p").as_deref(), Some("urn:p"));
    assert_eq!(root.lookup_namespace_uri("xml").as_deref(), Some(XML_URI));
    assert!(root.lookup_namespace_uri("q").is_none());
}

#[test]
fn names_resolve_against_scope() {
    let root = root_element(&make_tree());
    let child = root.children()[0].clone();
    assert_eq!(
        child.name(),
        Some(QName {
            prefix: Some("p".into()),
            local: "child".into(),
            ns_uri: Some("urn:p".into()),
        })
    );
    let class = root.attribute(Some("urn:p"), "class").expect("p:class");
    assert_eq!(class.string_value(), "main");
    assert!(root.attribute(None, "class").is_none());
    assert_eq!(root.attribute(None, "id").map(|a| a.string_value()).as_deref(), Some("42"));
}

#[test]
fn default_namespace_skips_attributes() {
    let tree = doc()
        .child(elem("a").namespace(ns("", "urn:d")).attr(attr("k", "v")))
        .build();
    let a = root_element(&tree);
    assert_eq!(a.name().unwrap().ns_uri.as_deref(), Some("urn:d"));
    assert_eq!(a.attributes()[0].name().unwrap().ns_uri, None);
}

#[test]
fn positions_follow_document_order() {
    let tree = make_tree();
    let root = root_element(&tree);
    let ns_node = root.namespaces()[0].clone();
    let attr_node = root.attributes()[0].clone();
    let first_child = root.children()[0].clone();
    assert!(root.document_position() < ns_node.document_position());
    assert!(ns_node.document_position() < attr_node.document_position());
    assert!(attr_node.document_position() < first_child.document_position());
    assert_eq!(first_child.compare_document_order(&root), Ordering::Greater);
    assert_eq!(root.compare_document_order(&root.clone()), Ordering::Equal);
}

#[test]
fn parents_and_root() {
    let tree = make_tree();
    let root = root_element(&tree);
    let inner = root.children()[1].children()[0].clone();
    assert_eq!(inner.parent().and_then(|p| p.parent()), Some(root.clone()));
    assert_eq!(inner.root(), tree);
    assert_eq!(root.attributes()[0].parent(), Some(root.clone()));
    assert_eq!(root.namespaces()[0].parent(), Some(root));
}

#[test]
fn leaf_values() {
    let tree = make_tree();
    let lead = tree.children()[0].clone();
    assert_eq!(lead.kind(), NodeKind::Comment);
    assert_eq!(lead.string_value(), "lead");

    let root = root_element(&tree);
    let go = root.children()[0].children()[1].clone();
    assert_eq!(go.kind(), NodeKind::ProcessingInstruction);
    assert_eq!(go.name().unwrap().local, "go");
    assert_eq!(go.string_value(), "now");
    assert!(go.children().is_empty());
}

#[test]
fn handles_from_different_trees_differ() {
    let a = doc().child(elem("x")).build();
    let b = doc().child(elem("x")).build();
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn attrs_adds_attributes_and_declarations_in_one_call() {
    let tree = doc()
        .child(elem("e").attrs([attr("xmlns:q", "urn:q"), attr("a", "1"), attr("q:b", "2")]))
        .build();
    let e = root_element(&tree);
    let names: Vec<QName> = e.attributes().iter().filter_map(XPathNode::name).collect();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].local, "a");
    assert_eq!(names[1].ns_uri.as_deref(), Some("urn:q"));
}

#[test]
fn debug_output_names_the_node_kind() {
    let tree = doc().child(pi("go", "now")).build();
    let rendered = format!("{:?}", tree.children()[0]);
    assert!(rendered.contains("kind: \"processing-instruction\""), "{rendered}");
    assert_eq!(NodeKind::Comment.as_str(), "comment");
}
