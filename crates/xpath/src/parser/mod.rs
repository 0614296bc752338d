//! Expression parser: tokens from [`Lexer`] to an [`Expr`] tree.
//!
//! Binary operators are handled by precedence climbing; paths, predicates and
//! argument lists by recursive descent. Before a token is consumed it is
//! checked against the follower set of the previous token, so the first
//! offending token is reported.

pub mod ast;
pub mod lexer;
pub mod token;

use core::fmt;

pub use ast::{
    Axis, BinaryOp, Expr, FunctionCall, LocationPath, NodeTest, NodeTypeTest, PathStart, QualifiedName, Step,
    StepKind,
};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Predicate,
    Group,
    ArgumentList,
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Delimiter::Predicate => "predicate",
            Delimiter::Group => "parenthesized group",
            Delimiter::ArgumentList => "argument list",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    EmptyExpression,
    UnexpectedToken,
    UnexpectedEnd,
    UnexpectedCharacter,
    UnterminatedString,
    Unterminated(Delimiter),
    EmptyPredicate,
    EmptyGroup,
    InvalidAxis,
    MalformedNumber,
    InvalidNodeType,
}

impl ParseErrorKind {
    fn describe(self) -> String {
        match self {
            ParseErrorKind::EmptyExpression => "empty expression".into(),
            ParseErrorKind::UnexpectedToken => "unexpected token".into(),
            ParseErrorKind::UnexpectedEnd => "unexpected end of expression".into(),
            ParseErrorKind::UnexpectedCharacter => "unexpected character".into(),
            ParseErrorKind::UnterminatedString => "unterminated string literal".into(),
            ParseErrorKind::Unterminated(d) => format!("unterminated {d}"),
            ParseErrorKind::EmptyPredicate => "empty predicate".into(),
            ParseErrorKind::EmptyGroup => "empty parentheses".into(),
            ParseErrorKind::InvalidAxis => "invalid axis".into(),
            ParseErrorKind::MalformedNumber => "malformed number literal".into(),
            ParseErrorKind::InvalidNodeType => "invalid node type test".into(),
        }
    }
}

/// Compile-time failure. `offset` is a byte offset into the expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub offset: usize,
    pub token: Option<String>,
}

impl ParseError {
    fn new(kind: ParseErrorKind, token: Option<&str>, offset: usize) -> Self {
        let message = match token {
            Some(t) if !t.is_empty() => format!("{} '{t}'", kind.describe()),
            _ => kind.describe(),
        };
        Self {
            kind,
            message,
            offset,
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    fn at(kind: ParseErrorKind, token: &Token) -> Self {
        Self::new(kind, Some(&token.text), token.offset)
    }
}

/// Lazily tokenize `expr`.
pub fn tokenize(expr: &str) -> Lexer<'_> {
    Lexer::new(expr)
}

/// Parse `expr` into an expression tree.
pub fn parse(expr: &str) -> Result<Expr, ParseError> {
    Parser::new(expr).parse()
}

/// Pulls tokens one at a time and validates each against its predecessor.
struct TokenCursor<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    previous: Option<TokenKind>,
}

impl<'a> TokenCursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
            peeked: None,
            previous: None,
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        if self.peeked.is_none() {
            let Some(token) = self.lexer.next() else {
                return Ok(None);
            };
            if let TokenKind::Error(kind) = token.kind {
                return Err(ParseError::at(kind, &token));
            }
            let legal = match self.previous {
                Some(prev) => prev.may_precede(token.kind),
                None => TokenKind::expression_start().contains(&token.kind),
            };
            if !legal {
                return Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token));
            }
            self.peeked = Some(token);
        }
        Ok(self.peeked.as_ref())
    }

    fn peek_kind(&mut self) -> Result<Option<TokenKind>, ParseError> {
        Ok(self.peek()?.map(|t| t.kind))
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        self.peek()?;
        match self.peeked.take() {
            Some(token) => {
                self.previous = Some(token.kind);
                Ok(token)
            }
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEnd, None, self.lexer.source().len())),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.peek_kind()? == Some(kind) {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }
}

pub struct Parser<'a> {
    tokens: TokenCursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            tokens: TokenCursor::new(src),
        }
    }

    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr(0)?;
        match self.tokens.peek()? {
            None => Ok(expr),
            Some(token) => Err(ParseError::at(ParseErrorKind::UnexpectedToken, token)),
        }
    }

    fn peek_binary_op(&mut self) -> Result<Option<BinaryOp>, ParseError> {
        Ok(match self.tokens.peek()? {
            Some(t) if t.kind == TokenKind::Operator => BinaryOp::from_symbol(&t.text),
            _ => None,
        })
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.peek_binary_op()? {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.tokens.next()?;
            let rhs = self.parse_expr(precedence + 1)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let is_minus = matches!(
            self.tokens.peek()?,
            Some(t) if t.kind == TokenKind::Operator && t.text == "-"
        );
        if is_minus {
            self.tokens.next()?;
            let operand = self.parse_expr(BinaryOp::Union.precedence())?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.parse_path_expr()
    }

    fn parse_path_expr(&mut self) -> Result<Expr, ParseError> {
        let Some(kind) = self.tokens.peek_kind()? else {
            return Err(ParseError::new(ParseErrorKind::UnexpectedEnd, None, self.tokens.lexer.source().len()));
        };
        match kind {
            TokenKind::AbsolutePath => {
                self.tokens.next()?;
                if self.tokens.eat(TokenKind::EndPath)? {
                    return Ok(Expr::Path(LocationPath {
                        start: PathStart::Root,
                        steps: Vec::new(),
                    }));
                }
                let steps = self.parse_steps(Vec::new())?;
                Ok(Expr::Path(LocationPath {
                    start: PathStart::Root,
                    steps,
                }))
            }
            TokenKind::AbbrAbsolutePath => {
                self.tokens.next()?;
                let steps = self.parse_steps(vec![Step::descendant_or_self_node()])?;
                Ok(Expr::Path(LocationPath {
                    start: PathStart::Root,
                    steps,
                }))
            }
            TokenKind::Axis
            | TokenKind::AbbrAxis
            | TokenKind::NamespacePrefix
            | TokenKind::LocalName
            | TokenKind::NodeType => {
                let steps = self.parse_steps(Vec::new())?;
                Ok(Expr::Path(LocationPath {
                    start: PathStart::Context,
                    steps,
                }))
            }
            _ => self.parse_filter_expr(),
        }
    }

    fn parse_filter_expr(&mut self) -> Result<Expr, ParseError> {
        let primary = self.parse_primary()?;
        let predicates = self.parse_predicates()?;
        let filter = if predicates.is_empty() {
            primary
        } else {
            Expr::Filter {
                primary: Box::new(primary),
                predicates,
            }
        };
        let initial = match self.tokens.peek_kind()? {
            Some(TokenKind::RelativePath) => Vec::new(),
            Some(TokenKind::AbbrRelativePath) => vec![Step::descendant_or_self_node()],
            _ => return Ok(filter),
        };
        self.tokens.next()?;
        let steps = self.parse_steps(initial)?;
        Ok(Expr::Path(LocationPath {
            start: PathStart::Filter(Box::new(filter)),
            steps,
        }))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.tokens.next()?;
        match token.kind {
            TokenKind::StringLiteral => Ok(Expr::Literal(token.text)),
            TokenKind::NumberLiteral => token
                .text
                .parse::<f64>()
                .map(Expr::Number)
                .map_err(|_| ParseError::at(ParseErrorKind::MalformedNumber, &token)),
            TokenKind::Variable => Ok(Expr::Variable(QualifiedName::parse(&token.text))),
            TokenKind::FunctionName => Ok(Expr::FunctionCall(self.parse_call(&token)?)),
            TokenKind::GroupOpen => {
                if self.tokens.peek_kind()? == Some(TokenKind::GroupClose) {
                    return Err(ParseError::at(ParseErrorKind::EmptyGroup, &token));
                }
                let inner = self.parse_expr(0)?;
                self.tokens.expect(TokenKind::GroupClose)?;
                Ok(inner)
            }
            _ => Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token)),
        }
    }

    fn parse_call(&mut self, name: &Token) -> Result<FunctionCall, ParseError> {
        let mut args = Vec::new();
        if !self.tokens.eat(TokenKind::FunctionClose)? {
            loop {
                args.push(self.parse_expr(0)?);
                let token = self.tokens.next()?;
                match token.kind {
                    TokenKind::ArgumentSeparator => {}
                    TokenKind::FunctionClose => break,
                    _ => return Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token)),
                }
            }
        }
        Ok(FunctionCall {
            name: QualifiedName::parse(&name.text),
            args,
        })
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut predicates = Vec::new();
        while self.tokens.peek_kind()? == Some(TokenKind::PredicateOpen) {
            let open = self.tokens.next()?;
            if self.tokens.peek_kind()? == Some(TokenKind::PredicateClose) {
                return Err(ParseError::at(ParseErrorKind::EmptyPredicate, &open));
            }
            predicates.push(self.parse_expr(0)?);
            self.tokens.expect(TokenKind::PredicateClose)?;
        }
        Ok(predicates)
    }

    /// Steps up to and including the end-of-path marker.
    fn parse_steps(&mut self, mut steps: Vec<Step>) -> Result<Vec<Step>, ParseError> {
        loop {
            steps.push(self.parse_step()?);
            let token = self.tokens.next()?;
            match token.kind {
                TokenKind::RelativePath => {}
                TokenKind::AbbrRelativePath => steps.push(Step::descendant_or_self_node()),
                TokenKind::EndPath => return Ok(steps),
                _ => return Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token)),
            }
        }
    }

    fn parse_step(&mut self) -> Result<Step, ParseError> {
        let mut token = self.tokens.next()?;
        let axis = match token.kind {
            TokenKind::Axis => {
                let axis = Axis::from_name(&token.text).ok_or_else(|| ParseError::at(ParseErrorKind::InvalidAxis, &token))?;
                token = self.tokens.next()?;
                Some(axis)
            }
            TokenKind::AbbrAxis => {
                token = self.tokens.next()?;
                Some(Axis::Attribute)
            }
            _ => None,
        };
        let kind = match token.kind {
            TokenKind::FunctionName if axis.is_none() => StepKind::Function(self.parse_call(&token)?),
            TokenKind::LocalName if axis.is_none() && token.text == "." => {
                StepKind::Axis {
                    axis: Axis::SelfAxis,
                    test: NodeTest::Kind(NodeTypeTest::Node),
                }
            }
            TokenKind::LocalName if axis.is_none() && token.text == ".." => {
                StepKind::Axis {
                    axis: Axis::Parent,
                    test: NodeTest::Kind(NodeTypeTest::Node),
                }
            }
            _ => StepKind::Axis {
                axis: axis.unwrap_or(Axis::Child),
                test: self.parse_node_test(token)?,
            },
        };
        Ok(Step {
            kind,
            predicates: self.parse_predicates()?,
        })
    }

    fn parse_node_test(&mut self, token: Token) -> Result<NodeTest, ParseError> {
        match token.kind {
            TokenKind::NamespacePrefix => {
                let local = self.tokens.expect(TokenKind::LocalName)?;
                Ok(if local.text == "*" {
                    NodeTest::NamespaceWildcard(token.text)
                } else {
                    NodeTest::Name {
                        prefix: Some(token.text),
                        local: local.text,
                    }
                })
            }
            TokenKind::LocalName if token.text == "*" => Ok(NodeTest::Wildcard),
            TokenKind::LocalName if token.text == "." || token.text == ".." => {
                Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token))
            }
            TokenKind::LocalName => Ok(NodeTest::Name {
                prefix: None,
                local: token.text,
            }),
            TokenKind::NodeType => match token.text.as_str() {
                "node" => Ok(NodeTest::Kind(NodeTypeTest::Node)),
                "text" => Ok(NodeTest::Kind(NodeTypeTest::Text)),
                "comment" => Ok(NodeTest::Kind(NodeTypeTest::Comment)),
                "processing-instruction" => {
                    let literal = if self.tokens.peek_kind()? == Some(TokenKind::ProcInstLiteral) {
                        Some(self.tokens.next()?.text)
                    } else {
                        None
                    };
                    Ok(NodeTest::ProcessingInstruction(literal))
                }
                _ => Err(ParseError::at(ParseErrorKind::InvalidNodeType, &token)),
            },
            _ => Err(ParseError::at(ParseErrorKind::UnexpectedToken, &token)),
        }
    }
}

