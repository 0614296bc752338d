use proptest::prelude::*;
use treepath::simple::{SimpleNode, SimpleNodeBuilder, attr, doc, elem};
use treepath::{DynamicContext, NodeSet, XPathNode, compile};

type N = SimpleNode;

// Node `i + 1` hangs below node `parents[i] % (i + 1)`, so every shape is reachable.
fn build_tree(parents: &[usize]) -> N {
    let mut children = vec![Vec::new(); parents.len() + 1];
    for (i, p) in parents.iter().enumerate() {
        let id = i + 1;
        children[p % id].push(id);
    }
    fn make(id: usize, children: &[Vec<usize>]) -> SimpleNodeBuilder {
        let base = elem(&format!("e{id}")).attr(attr("id", &id.to_string()));
        children[id].iter().fold(base, |b, &c| b.child(make(c, children)))
    }
    doc().child(make(0, &children)).build()
}

fn select(node: &N, expr: &str) -> NodeSet<N> {
    compile(expr)
        .unwrap()
        .evaluate_nodes(node, &DynamicContext::default())
        .unwrap()
}

fn pick(all: &[N], indices: &[usize]) -> Vec<N> {
    indices.iter().map(|&i| all[i % all.len()].clone()).collect()
}

fn shape() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..64, 0..40)
}

proptest! {
    #[test]
    fn prop_node_sets_are_sorted_and_unique(parents in shape(), picks in prop::collection::vec(0usize..64, 0..30)) {
        let tree = build_tree(&parents);
        let all = select(&tree, "//node() | //@*").into_vec();
        let set = NodeSet::from_nodes(pick(&all, &picks));
        prop_assert!(set.as_slice().windows(2).all(|w| w[0].document_position() < w[1].document_position()));
        let again = NodeSet::from_nodes(set.clone().into_vec());
        prop_assert_eq!(again, set);
    }

    #[test]
    fn prop_union_is_commutative_and_associative(
        parents in shape(),
        a in prop::collection::vec(0usize..64, 0..10),
        b in prop::collection::vec(0usize..64, 0..10),
        c in prop::collection::vec(0usize..64, 0..10),
    ) {
        let tree = build_tree(&parents);
        let all = select(&tree, "//node() | //@*").into_vec();
        let (a, b, c) = (
            NodeSet::from_nodes(pick(&all, &a)),
            NodeSet::from_nodes(pick(&all, &b)),
            NodeSet::from_nodes(pick(&all, &c)),
        );
        prop_assert_eq!(a.union(&b), b.union(&a));
        prop_assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        let merged = NodeSet::from_nodes(a.iter().chain(b.iter()).cloned());
        prop_assert_eq!(a.union(&b), merged);
    }

    #[test]
    fn prop_ancestor_descendant_symmetry(parents in shape(), at in 0usize..64) {
        let tree = build_tree(&parents);
        let elements = select(&tree, "//*").into_vec();
        let node = &elements[at % elements.len()];
        for ancestor in select(node, "ancestor::*").iter() {
            prop_assert!(select(ancestor, "descendant::*").iter().any(|d| d == node));
        }
        for child in select(node, "*").iter() {
            let parent = child.parent();
            prop_assert_eq!(parent.as_ref(), Some(node));
            prop_assert!(select(child, "preceding-sibling::* | following-sibling::*").iter().all(|s| s != child));
        }
    }

    #[test]
    fn prop_axes_partition_the_elements(parents in shape(), at in 0usize..64) {
        let tree = build_tree(&parents);
        let elements = select(&tree, "//*").into_vec();
        let node = &elements[at % elements.len()];
        let parts = ["ancestor::*", "descendant::*", "following::*", "preceding::*", "self::*"];
        let total: usize = parts.iter().map(|axis| select(node, axis).len()).sum();
        prop_assert_eq!(total, elements.len());
        let union = select(node, "ancestor::* | descendant::* | following::* | preceding::* | self::*");
        prop_assert_eq!(union.into_vec(), elements);
    }
}
