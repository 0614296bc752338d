use rstest::rstest;
use treepath::parse;
use treepath::parser::{
    Axis, BinaryOp, Expr, FunctionCall, LocationPath, NodeTest, NodeTypeTest, PathStart, QualifiedName, Step, StepKind,
};

fn num(n: f64) -> Expr {
    Expr::Number(n)
}

fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn name(local: &str) -> NodeTest {
    NodeTest::Name {
        prefix: None,
        local: local.into(),
    }
}

fn child(local: &str) -> Step {
    Step::axis(Axis::Child, name(local))
}

fn relative(steps: Vec<Step>) -> Expr {
    Expr::Path(LocationPath {
        start: PathStart::Context,
        steps,
    })
}

fn absolute(steps: Vec<Step>) -> Expr {
    Expr::Path(LocationPath {
        start: PathStart::Root,
        steps,
    })
}

#[rstest]
#[case("1 + 2 * 3", bin(BinaryOp::Add, num(1.0), bin(BinaryOp::Mul, num(2.0), num(3.0))))]
#[case("(1 + 2) * 3", bin(BinaryOp::Mul, bin(BinaryOp::Add, num(1.0), num(2.0)), num(3.0)))]
#[case("1 - 2 - 3", bin(BinaryOp::Sub, bin(BinaryOp::Sub, num(1.0), num(2.0)), num(3.0)))]
#[case("8 div 4 mod 3", bin(BinaryOp::Mod, bin(BinaryOp::Div, num(8.0), num(4.0)), num(3.0)))]
#[case("1 < 2 = 3 > 4", bin(BinaryOp::Gt, bin(BinaryOp::Eq, bin(BinaryOp::Lt, num(1.0), num(2.0)), num(3.0)), num(4.0)))]
#[case("-1 + 2", bin(BinaryOp::Add, Expr::Negate(Box::new(num(1.0))), num(2.0)))]
fn arithmetic_precedence(#[case] expr: &str, #[case] expected: Expr) {
    assert_eq!(parse(expr).unwrap(), expected);
}

#[test]
fn or_binds_loosest() {
    let expected = bin(
        BinaryOp::Or,
        relative(vec![child("a")]),
        bin(BinaryOp::And, relative(vec![child("b")]), relative(vec![child("c")])),
    );
    assert_eq!(parse("a or b and c").unwrap(), expected);
}

#[test]
fn union_binds_tighter_than_arithmetic() {
    let union = bin(BinaryOp::Union, relative(vec![child("a")]), relative(vec![child("b")]));
    assert_eq!(parse("-a | b").unwrap(), Expr::Negate(Box::new(union)));
}

#[test]
fn abbreviated_steps_expand() {
    let expected = relative(vec![
        Step::axis(Axis::SelfAxis, NodeTest::Kind(NodeTypeTest::Node)),
        Step::descendant_or_self_node(),
        Step::axis(Axis::Parent, NodeTest::Kind(NodeTypeTest::Node)),
        Step::axis(Axis::Attribute, name("id")),
    ]);
    assert_eq!(parse(".//../@id").unwrap(), expected);
}

#[test]
fn absolute_paths() {
    assert_eq!(parse("/").unwrap(), absolute(vec![]));
    assert_eq!(
        parse("//a").unwrap(),
        absolute(vec![Step::descendant_or_self_node(), child("a")])
    );
}

#[test]
fn explicit_axes_and_node_tests() {
    let expected = relative(vec![
        Step::axis(Axis::AncestorOrSelf, NodeTest::Kind(NodeTypeTest::Node)),
        Step::axis(
            Axis::FollowingSibling,
            NodeTest::Name {
                prefix: Some("p".into()),
                local: "x".into(),
            },
        ),
        Step::axis(Axis::Child, NodeTest::NamespaceWildcard("p".into())),
        Step::axis(Axis::Child, NodeTest::ProcessingInstruction(Some("style".into()))),
    ]);
    assert_eq!(
        parse("ancestor-or-self::node()/following-sibling::p:x/p:*/processing-instruction('style')").unwrap(),
        expected
    );
}

#[test]
fn predicates_attach_to_their_step() {
    let mut step = child("item");
    let attr_k = relative(vec![Step::axis(Axis::Attribute, name("k"))]);
    step.predicates = vec![num(2.0), bin(BinaryOp::Eq, attr_k, Expr::Literal("v".into()))];
    assert_eq!(parse("item[2][@k = 'v']").unwrap(), relative(vec![step]));
}

#[test]
fn filter_expression_continues_into_path() {
    let expected = Expr::Path(LocationPath {
        start: PathStart::Filter(Box::new(Expr::Filter {
            primary: Box::new(Expr::Variable(QualifiedName::parse("v"))),
            predicates: vec![num(1.0)],
        })),
        steps: vec![Step::descendant_or_self_node(), child("b")],
    });
    assert_eq!(parse("$v[1]//b").unwrap(), expected);
}

#[test]
fn function_call_as_last_step() {
    let expr = parse("/p1/*/last()").unwrap();
    let Expr::Path(path) = expr else {
        panic!("expected a location path");
    };
    assert_eq!(path.start, PathStart::Root);
    assert_eq!(path.steps.len(), 3);
    assert_eq!(
        path.steps[2].kind,
        StepKind::Function(FunctionCall {
            name: QualifiedName::parse("last"),
            args: vec![],
        })
    );
}

#[test]
fn prefixed_function_and_variable_names() {
    let expected = Expr::FunctionCall(FunctionCall {
        name: QualifiedName::parse("f:twice"),
        args: vec![Expr::Variable(QualifiedName::parse("p:n"))],
    });
    assert_eq!(parse("f:twice($p:n)").unwrap(), expected);
}

#[test]
fn number_literals() {
    assert_eq!(parse(".5").unwrap(), num(0.5));
    assert_eq!(parse("12.").unwrap(), num(12.0));
}

#[rstest]
#[case(BinaryOp::Or, "or")]
#[case(BinaryOp::Ne, "!=")]
#[case(BinaryOp::Le, "<=")]
#[case(BinaryOp::Div, "div")]
#[case(BinaryOp::Union, "|")]
fn operator_symbols_match_the_lexer(#[case] op: BinaryOp, #[case] symbol: &str) {
    assert_eq!(op.symbol(), symbol);
    assert_eq!(BinaryOp::from_symbol(symbol), Some(op));
}
