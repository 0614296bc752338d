use rstest::rstest;
use treepath::parser::Delimiter;
use treepath::{ParseErrorKind, compile, parse};

#[rstest]
#[case("", ParseErrorKind::EmptyExpression)]
#[case("   ", ParseErrorKind::EmptyExpression)]
#[case("/a[", ParseErrorKind::Unterminated(Delimiter::Predicate))]
#[case("count(1", ParseErrorKind::Unterminated(Delimiter::ArgumentList))]
#[case("(1 + 2", ParseErrorKind::Unterminated(Delimiter::Group))]
#[case("a[]", ParseErrorKind::EmptyPredicate)]
#[case("()", ParseErrorKind::EmptyGroup)]
#[case("1 +", ParseErrorKind::UnexpectedEnd)]
#[case("'open", ParseErrorKind::UnterminatedString)]
#[case("3.1.4", ParseErrorKind::MalformedNumber)]
#[case("child::bogus()", ParseErrorKind::InvalidNodeType)]
#[case("a b", ParseErrorKind::UnexpectedToken)]
#[case("1 ? 2", ParseErrorKind::UnexpectedCharacter)]
fn error_kinds(#[case] expr: &str, #[case] expected: ParseErrorKind) {
    let err = parse(expr).unwrap_err();
    assert_eq!(err.kind, expected, "{expr}: {err}");
}

#[test]
fn invalid_axis_is_named() {
    let err = compile("/test/chil::p2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidAxis);
    assert_eq!(err.token.as_deref(), Some("chil"));
    assert_eq!(err.offset, 6);
    assert_eq!(err.to_string(), "invalid axis 'chil' at offset 6");
}

#[test]
fn unexpected_token_is_named() {
    let err = parse("a b").unwrap_err();
    assert_eq!(err.token.as_deref(), Some("b"));
    assert!(err.message.contains("'b'"), "{}", err.message);
}

#[test]
fn unknown_functions_are_not_parse_errors() {
    assert!(compile("no-such-function(1, 2)").is_ok());
}

#[test]
fn from_str_reports_the_same_error() {
    let err = "/a[".parse::<treepath::XPath>().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Unterminated(Delimiter::Predicate));
}
