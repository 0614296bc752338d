use rstest::{fixture, rstest};
use treepath::simple::{SimpleNode, attr, doc, elem, ns};
use treepath::{DynamicContext, DynamicContextBuilder, ErrorCode, ExpandedName, compile};

type N = SimpleNode;

// <root xmlns="urn:default" xmlns:p="urn:p">
//   <p:item p:kind="x" plain="y"/>
//   <item/>
//   <other xmlns=""><item/></other>
// </root>
#[fixture]
fn tree() -> N {
    doc()
        .child(
            elem("root")
                .namespace(ns("", "urn:default"))
                .namespace(ns("p", "urn:p"))
                .child(elem("p:item").attr(attr("p:kind", "x")).attr(attr("plain", "y")))
                .child(elem("item"))
                .child(elem("other").namespace(ns("", "")).child(elem("item"))),
        )
        .build()
}

fn bound() -> DynamicContext<N> {
    DynamicContextBuilder::new()
        .with_namespaces([("d", "urn:default"), ("q", "urn:p")])
        .build()
}

fn number(tree: &N, ctx: &DynamicContext<N>, expr: &str) -> f64 {
    compile(expr).unwrap().evaluate_number(tree, ctx).unwrap()
}

fn string(tree: &N, ctx: &DynamicContext<N>, expr: &str) -> String {
    compile(expr).unwrap().evaluate_string(tree, ctx).unwrap()
}

#[rstest]
#[case("count(//item)", 1.0)]
#[case("count(//d:item)", 1.0)]
#[case("count(//q:item)", 1.0)]
#[case("count(//q:*)", 1.0)]
#[case("count(//d:*)", 2.0)]
#[case("count(//q:item/@q:kind)", 1.0)]
#[case("count(//q:item/@*)", 2.0)]
#[case("count(/d:root/d:other)", 0.0)]
#[case("count(/d:root/*[local-name() = 'other']/item)", 1.0)]
fn prefixed_name_tests(tree: N, #[case] expr: &str, #[case] expected: f64) {
    assert_eq!(number(&tree, &bound(), expr), expected, "{expr}");
}

#[rstest]
fn unprefixed_attribute_names_ignore_the_default_namespace(tree: N) {
    let ctx = DynamicContextBuilder::new().with_namespace("q", "urn:p").build();
    assert_eq!(string(&tree, &ctx, "string(//q:item/@plain)"), "y");
}

#[rstest]
fn default_namespace_applies_to_element_tests(tree: N) {
    let plain = DynamicContext::default();
    assert_eq!(number(&tree, &plain, "count(/root)"), 0.0);

    let defaulted = DynamicContextBuilder::new().with_namespace("", "urn:default").build();
    assert_eq!(number(&tree, &defaulted, "count(/root)"), 1.0);
    assert_eq!(number(&tree, &defaulted, "count(/root/item)"), 1.0);
}

#[rstest]
#[case("//zz:item")]
#[case("//zz:*")]
#[case("$zz:v")]
fn unbound_prefix(tree: N, #[case] expr: &str) {
    let err = compile(expr).unwrap().evaluate(&tree, &bound()).unwrap_err();
    assert_eq!(err.code, ErrorCode::XPST0081, "{expr}");
}

#[rstest]
fn xml_prefix_is_always_bound(tree: N) {
    assert_eq!(number(&tree, &DynamicContext::default(), "count(//@xml:lang)"), 0.0);
}

#[rstest]
#[case("name(/*)", "{urn:default}root")]
#[case("local-name(/*)", "root")]
#[case("namespace-uri(/*)", "urn:default")]
#[case("name((//*[local-name() = 'item'])[1])", "{urn:p}item")]
#[case("name((//@*)[1])", "{urn:p}kind")]
#[case("name(//@plain)", "plain")]
#[case("namespace-uri(//@plain)", "")]
#[case("namespace-uri(/*/*[local-name() = 'other']/*)", "")]
fn names_of_namespaced_nodes(tree: N, #[case] expr: &str, #[case] expected: &str) {
    assert_eq!(string(&tree, &DynamicContext::default(), expr), expected, "{expr}");
}

#[rstest]
fn namespace_axis_lists_in_scope_bindings(tree: N) {
    let ctx = DynamicContext::default();
    // xml, the default namespace and p
    assert_eq!(number(&tree, &ctx, "count(/*/namespace::*)"), 3.0);
    assert_eq!(string(&tree, &ctx, "string(/*/namespace::p)"), "urn:p");
    assert_eq!(string(&tree, &ctx, "name(/*/namespace::p)"), "p");
    assert_eq!(string(&tree, &ctx, "local-name(/*/namespace::p)"), "p");
    assert_eq!(string(&tree, &ctx, "namespace-uri(/*/namespace::p)"), "");
    // the undeclared default is gone below <other>
    assert_eq!(number(&tree, &ctx, "count(//*[local-name() = 'other']/namespace::*)"), 2.0);
    assert_eq!(number(&tree, &ctx, "count(/*/namespace::*/parent::*)"), 1.0);
}

#[rstest]
fn qualified_variables_resolve_through_bindings(tree: N) {
    let ctx = DynamicContextBuilder::new()
        .with_namespace("q", "urn:p")
        .with_qualified_variable(ExpandedName::new(Some("urn:p"), "limit"), 5.0)
        .build();
    assert_eq!(number(&tree, &ctx, "$q:limit * 2"), 10.0);
}
