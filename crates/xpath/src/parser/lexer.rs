//! Pull-based tokenizer for XPath 1.0 expressions.
//!
//! The lexer is a small state machine: `Expect` records which class of token
//! is legal next, which is how `*`, `div` and friends are told apart from name
//! tests, and a stack of open frames decides where predicates, argument lists,
//! groups and paths end. Every call to `next` scans at most one token. A
//! malformed input yields one `Error` token, after which the stream is fused.

use smallvec::SmallVec;

use super::token::{Token, TokenKind};
use super::{Delimiter, ParseErrorKind};
use crate::consts::{AXIS_NAMES, NODE_TYPE_NAMES};
use crate::value::is_xml_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Path,
    Predicate,
    Function,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Start of an expression or operand.
    Operand,
    /// Right after a leading `/`; a step may follow or the path may end.
    RootStep,
    Step,
    /// After an axis specifier.
    NodeTest,
    /// After `prefix:`.
    LocalPart,
    /// A step is complete; predicates or further steps may follow.
    AfterStep,
    /// An operand is complete; an operator or a closer may follow.
    AfterOperand,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    expect: Expect,
    frames: SmallVec<[Frame; 8]>,
    pending: Option<Token>,
    just_opened: bool,
    started: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            expect: Expect::Operand,
            frames: SmallVec::new(),
            pending: None,
            just_opened: false,
            started: false,
            done: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.src
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.src.get(at..)?.chars().next()
    }

    fn ws_end(&self, from: usize) -> usize {
        self.src[from..]
            .char_indices()
            .find(|&(_, c)| !is_xml_whitespace(c))
            .map_or(self.src.len(), |(i, _)| from + i)
    }

    fn ncname_end(&self, from: usize) -> Option<usize> {
        let mut chars = self.src.get(from..)?.char_indices();
        let (_, first) = chars.next()?;
        if !is_name_start(first) {
            return None;
        }
        Some(
            chars
                .find(|&(_, c)| !is_name_char(c))
                .map_or(self.src.len(), |(i, _)| from + i),
        )
    }

    fn qname_end(&self, from: usize) -> Option<usize> {
        let end = self.ncname_end(from)?;
        if self.char_at(end) == Some(':')
            && let Some(local_end) = self.ncname_end(end + 1)
        {
            return Some(local_end);
        }
        Some(end)
    }

    /// `(name end, position after '(')` when a function call starts at `start`.
    fn function_call_at(&self, start: usize) -> Option<(usize, usize)> {
        let name_end = self.qname_end(start)?;
        let name = &self.src[start..name_end];
        if !name.contains(':') && NODE_TYPE_NAMES.contains(&name) {
            return None;
        }
        let after = self.ws_end(name_end);
        (self.char_at(after) == Some('(')).then_some((name_end, after + 1))
    }

    fn token(&mut self, kind: TokenKind, start: usize, end: usize, next: Expect) -> Option<Token> {
        self.pos = end;
        self.expect = next;
        Some(Token::new(kind, &self.src[start..end], start))
    }

    fn error(&self, kind: ParseErrorKind, text: &str, offset: usize) -> Option<Token> {
        Some(Token::new(TokenKind::Error(kind), text, offset))
    }

    fn unexpected(&self, c: char, offset: usize) -> Option<Token> {
        self.error(ParseErrorKind::UnexpectedCharacter, c.encode_utf8(&mut [0; 4]), offset)
    }

    fn open(&mut self, frame: Frame, kind: TokenKind, start: usize, end: usize) -> Option<Token> {
        self.frames.push(frame);
        self.just_opened = true;
        self.token(kind, start, end, Expect::Operand)
    }

    fn end_path(&mut self, at: usize) -> Option<Token> {
        if self.frames.last() == Some(&Frame::Path) {
            self.frames.pop();
        }
        self.expect = Expect::AfterOperand;
        Some(Token::new(TokenKind::EndPath, "", at))
    }

    /// State after a predicate or function call closed: a step that carried
    /// it continues the path, anything else is a finished operand.
    fn resume_after_close(&self) -> Expect {
        if self.frames.last() == Some(&Frame::Path) {
            Expect::AfterStep
        } else {
            Expect::AfterOperand
        }
    }

    fn close(&mut self, c: char, start: usize) -> Option<Token> {
        match (c, self.frames.last().copied()) {
            (']', Some(Frame::Predicate)) => {
                self.frames.pop();
                let next = self.resume_after_close();
                self.token(TokenKind::PredicateClose, start, start + 1, next)
            }
            (')', Some(Frame::Function)) => {
                self.frames.pop();
                let next = self.resume_after_close();
                self.token(TokenKind::FunctionClose, start, start + 1, next)
            }
            (')', Some(Frame::Group)) => {
                self.frames.pop();
                self.token(TokenKind::GroupClose, start, start + 1, Expect::AfterOperand)
            }
            _ => self.unexpected(c, start),
        }
    }

    fn scan(&mut self) -> Option<Token> {
        self.pos = self.ws_end(self.pos);
        let start = self.pos;
        let first = !self.started;
        self.started = true;
        let Some(c) = self.char_at(start) else {
            return self.scan_end(first);
        };
        let just_opened = std::mem::take(&mut self.just_opened);
        match self.expect {
            Expect::Operand => self.scan_operand(c, start, just_opened),
            Expect::RootStep if starts_step(c) => self.scan_step(c, start),
            Expect::RootStep => self.end_path(start),
            Expect::Step if starts_step(c) => self.scan_step(c, start),
            Expect::Step => self.unexpected(c, start),
            Expect::NodeTest => match c {
                '*' => self.token(TokenKind::LocalName, start, start + 1, Expect::AfterStep),
                c if is_name_start(c) => self.scan_name_test(start),
                c => self.unexpected(c, start),
            },
            Expect::LocalPart => match c {
                '*' => self.token(TokenKind::LocalName, start, start + 1, Expect::AfterStep),
                _ => match self.ncname_end(start) {
                    Some(end) => self.token(TokenKind::LocalName, start, end, Expect::AfterStep),
                    None => self.unexpected(c, start),
                },
            },
            Expect::AfterStep => self.scan_after_step(c, start),
            Expect::AfterOperand => self.scan_after_operand(c, start),
        }
    }

    fn scan_end(&mut self, first: bool) -> Option<Token> {
        let at = self.pos;
        let unterminated = |frame: Option<&Frame>| match frame {
            Some(Frame::Predicate) => Some(ParseErrorKind::Unterminated(Delimiter::Predicate)),
            Some(Frame::Function) => Some(ParseErrorKind::Unterminated(Delimiter::ArgumentList)),
            Some(Frame::Group) => Some(ParseErrorKind::Unterminated(Delimiter::Group)),
            _ => None,
        };
        match self.expect {
            Expect::RootStep | Expect::AfterStep => self.end_path(at),
            Expect::AfterOperand => match unterminated(self.frames.last()) {
                Some(kind) => self.error(kind, "", at),
                None => None,
            },
            Expect::Operand if first => self.error(ParseErrorKind::EmptyExpression, "", at),
            Expect::Operand if self.just_opened => {
                let kind = unterminated(self.frames.last()).unwrap_or(ParseErrorKind::UnexpectedEnd);
                self.error(kind, "", at)
            }
            _ => self.error(ParseErrorKind::UnexpectedEnd, "", at),
        }
    }

    fn scan_operand(&mut self, c: char, start: usize, just_opened: bool) -> Option<Token> {
        match c {
            '/' if self.src[start..].starts_with("//") => {
                self.frames.push(Frame::Path);
                self.token(TokenKind::AbbrAbsolutePath, start, start + 2, Expect::Step)
            }
            '/' => {
                self.frames.push(Frame::Path);
                self.token(TokenKind::AbsolutePath, start, start + 1, Expect::RootStep)
            }
            '\'' | '"' => self.scan_string(c, start),
            '0'..='9' => self.scan_number(start),
            '.' if self.char_at(start + 1).is_some_and(|d| d.is_ascii_digit()) => self.scan_number(start),
            '$' => match self.qname_end(start + 1) {
                Some(end) => {
                    self.pos = end;
                    self.expect = Expect::AfterOperand;
                    Some(Token::new(TokenKind::Variable, &self.src[start + 1..end], start))
                }
                None => self.unexpected(c, start),
            },
            '(' => self.open(Frame::Group, TokenKind::GroupOpen, start, start + 1),
            '-' => self.token(TokenKind::Operator, start, start + 1, Expect::Operand),
            ')' | ']' if just_opened => self.close(c, start),
            c if starts_step(c) => {
                if let Some((name_end, after)) = self.function_call_at(start) {
                    return self.open_function(start, name_end, after);
                }
                self.frames.push(Frame::Path);
                self.scan_step(c, start)
            }
            c => self.unexpected(c, start),
        }
    }

    fn open_function(&mut self, start: usize, name_end: usize, after: usize) -> Option<Token> {
        self.frames.push(Frame::Function);
        self.just_opened = true;
        self.pos = after;
        self.expect = Expect::Operand;
        Some(Token::new(TokenKind::FunctionName, &self.src[start..name_end], start))
    }

    fn scan_step(&mut self, c: char, start: usize) -> Option<Token> {
        match c {
            '@' => self.token(TokenKind::AbbrAxis, start, start + 1, Expect::NodeTest),
            '.' if self.char_at(start + 1) == Some('.') => {
                self.token(TokenKind::LocalName, start, start + 2, Expect::AfterStep)
            }
            '.' => self.token(TokenKind::LocalName, start, start + 1, Expect::AfterStep),
            '*' => self.token(TokenKind::LocalName, start, start + 1, Expect::AfterStep),
            _ => {
                if let Some((name_end, after)) = self.function_call_at(start) {
                    return self.open_function(start, name_end, after);
                }
                let Some(end) = self.ncname_end(start) else {
                    return self.unexpected(c, start);
                };
                let after = self.ws_end(end);
                if self.src[after..].starts_with("::") {
                    let src = self.src;
                    let name = &src[start..end];
                    if !AXIS_NAMES.contains(&name) {
                        return self.error(ParseErrorKind::InvalidAxis, name, start);
                    }
                    self.pos = after + 2;
                    self.expect = Expect::NodeTest;
                    return Some(Token::new(TokenKind::Axis, name, start));
                }
                self.scan_name_test(start)
            }
        }
    }

    fn scan_name_test(&mut self, start: usize) -> Option<Token> {
        let Some(end) = self.ncname_end(start) else {
            return self.error(ParseErrorKind::UnexpectedCharacter, "", start);
        };
        let src = self.src;
        let name = &src[start..end];
        if self.char_at(end) == Some(':') {
            return match self.char_at(end + 1) {
                Some(c) if c == '*' || is_name_start(c) => {
                    self.pos = end + 1;
                    self.expect = Expect::LocalPart;
                    Some(Token::new(TokenKind::NamespacePrefix, name, start))
                }
                _ => self.unexpected(':', end),
            };
        }
        let after = self.ws_end(end);
        if self.char_at(after) == Some('(') {
            if NODE_TYPE_NAMES.contains(&name) {
                return self.scan_node_type(start, end, after + 1);
            }
            return self.error(ParseErrorKind::InvalidNodeType, name, start);
        }
        self.token(TokenKind::LocalName, start, end, Expect::AfterStep)
    }

    fn scan_node_type(&mut self, start: usize, name_end: usize, inner: usize) -> Option<Token> {
        let src = self.src;
        let name = &src[start..name_end];
        let mut at = self.ws_end(inner);
        let mut literal = None;
        if name == "processing-instruction"
            && let Some(quote @ ('\'' | '"')) = self.char_at(at)
        {
            let Some(len) = self.src[at + 1..].find(quote) else {
                return self.error(ParseErrorKind::UnterminatedString, &self.src[at..], at);
            };
            let body = &self.src[at + 1..at + 1 + len];
            literal = Some(Token::new(TokenKind::ProcInstLiteral, body, at));
            at = self.ws_end(at + len + 2);
        }
        if self.char_at(at) != Some(')') {
            return self.error(ParseErrorKind::InvalidNodeType, name, start);
        }
        self.pos = at + 1;
        self.expect = Expect::AfterStep;
        self.pending = literal;
        Some(Token::new(TokenKind::NodeType, name, start))
    }

    fn scan_after_step(&mut self, c: char, start: usize) -> Option<Token> {
        match c {
            '[' => self.open(Frame::Predicate, TokenKind::PredicateOpen, start, start + 1),
            '/' if self.src[start..].starts_with("//") => {
                self.token(TokenKind::AbbrRelativePath, start, start + 2, Expect::Step)
            }
            '/' => self.token(TokenKind::RelativePath, start, start + 1, Expect::Step),
            _ => self.end_path(start),
        }
    }

    fn scan_after_operand(&mut self, c: char, start: usize) -> Option<Token> {
        let operator = |lexer: &mut Self, len: usize| lexer.token(TokenKind::Operator, start, start + len, Expect::Operand);
        match c {
            '[' => self.open(Frame::Predicate, TokenKind::PredicateOpen, start, start + 1),
            ']' | ')' => self.close(c, start),
            ',' if self.frames.last() == Some(&Frame::Function) => {
                self.token(TokenKind::ArgumentSeparator, start, start + 1, Expect::Operand)
            }
            '/' => {
                self.frames.push(Frame::Path);
                if self.src[start..].starts_with("//") {
                    self.token(TokenKind::AbbrRelativePath, start, start + 2, Expect::Step)
                } else {
                    self.token(TokenKind::RelativePath, start, start + 1, Expect::Step)
                }
            }
            '|' | '+' | '-' | '*' | '=' => operator(self, 1),
            '!' if self.char_at(start + 1) == Some('=') => operator(self, 2),
            '<' | '>' if self.char_at(start + 1) == Some('=') => operator(self, 2),
            '<' | '>' => operator(self, 1),
            c if is_name_start(c) => {
                let src = self.src;
                let end = self.ncname_end(start).unwrap_or(start + c.len_utf8());
                match &src[start..end] {
                    "and" | "or" | "div" | "mod" => operator(self, end - start),
                    word => self.error(ParseErrorKind::UnexpectedToken, word, start),
                }
            }
            c => self.unexpected(c, start),
        }
    }

    fn scan_string(&mut self, quote: char, start: usize) -> Option<Token> {
        let Some(len) = self.src[start + 1..].find(quote) else {
            return self.error(ParseErrorKind::UnterminatedString, &self.src[start..], start);
        };
        self.pos = start + len + 2;
        self.expect = Expect::AfterOperand;
        Some(Token::new(
            TokenKind::StringLiteral,
            &self.src[start + 1..start + 1 + len],
            start,
        ))
    }

    fn scan_number(&mut self, start: usize) -> Option<Token> {
        let digits_end = |from: usize| {
            self.src[from..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(self.src.len(), |i| from + i)
        };
        let mut end = digits_end(start);
        if self.char_at(end) == Some('.') {
            end = digits_end(end + 1);
        }
        if let Some(c) = self.char_at(end)
            && (c == '.' || c.is_alphanumeric())
        {
            return self.error(
                ParseErrorKind::MalformedNumber,
                &self.src[start..end + c.len_utf8()],
                start,
            );
        }
        self.token(TokenKind::NumberLiteral, start, end, Expect::AfterOperand)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        if self.done {
            return None;
        }
        let token = self.scan();
        match &token {
            None => self.done = true,
            Some(t) if matches!(t.kind, TokenKind::Error(_)) => self.done = true,
            Some(_) => {}
        }
        token
    }
}

impl core::iter::FusedIterator for Lexer<'_> {}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}')
}

fn starts_step(c: char) -> bool {
    matches!(c, '@' | '.' | '*') || is_name_start(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind as K;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(src).map(|t| (t.kind, t.text.to_string())).collect()
    }

    fn k(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn star_is_wildcard_then_multiplication() {
        assert_eq!(
            kinds("* * *"),
            vec![
                k(K::LocalName, "*"),
                k(K::EndPath, ""),
                k(K::Operator, "*"),
                k(K::LocalName, "*"),
                k(K::EndPath, ""),
            ]
        );
    }

    #[test]
    fn operator_names_depend_on_position() {
        assert_eq!(
            kinds("div div div"),
            vec![
                k(K::LocalName, "div"),
                k(K::EndPath, ""),
                k(K::Operator, "div"),
                k(K::LocalName, "div"),
                k(K::EndPath, ""),
            ]
        );
    }

    #[test]
    fn absolute_path_with_axes_and_predicate() {
        assert_eq!(
            kinds("/a/child::p:b[@id = '1']"),
            vec![
                k(K::AbsolutePath, "/"),
                k(K::LocalName, "a"),
                k(K::RelativePath, "/"),
                k(K::Axis, "child"),
                k(K::NamespacePrefix, "p"),
                k(K::LocalName, "b"),
                k(K::PredicateOpen, "["),
                k(K::AbbrAxis, "@"),
                k(K::LocalName, "id"),
                k(K::EndPath, ""),
                k(K::Operator, "="),
                k(K::StringLiteral, "1"),
                k(K::PredicateClose, "]"),
                k(K::EndPath, ""),
            ]
        );
    }

    #[test]
    fn processing_instruction_literal_follows_node_type() {
        assert_eq!(
            kinds("processing-instruction( 'x' )"),
            vec![
                k(K::NodeType, "processing-instruction"),
                k(K::ProcInstLiteral, "x"),
                k(K::EndPath, ""),
            ]
        );
    }

    #[test]
    fn function_arguments() {
        assert_eq!(
            kinds("concat('a', $v)"),
            vec![
                k(K::FunctionName, "concat"),
                k(K::StringLiteral, "a"),
                k(K::ArgumentSeparator, ","),
                k(K::Variable, "v"),
                k(K::FunctionClose, ")"),
            ]
        );
    }

    #[test]
    fn unterminated_string_ends_stream() {
        let tokens: Vec<_> = Lexer::new("'abc").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, K::Error(ParseErrorKind::UnterminatedString));
    }

    #[test]
    fn invalid_axis_names_the_axis() {
        let last = Lexer::new("/test/chil::p2").last().unwrap();
        assert_eq!(last.kind, K::Error(ParseErrorKind::InvalidAxis));
        assert_eq!(last.text, "chil");
    }

    #[test]
    fn lexer_is_lazy() {
        let mut lexer = Lexer::new("1 + 'unterminated");
        assert_eq!(lexer.next().map(|t| t.kind), Some(K::NumberLiteral));
        assert_eq!(lexer.next().map(|t| t.kind), Some(K::Operator));
        assert!(matches!(lexer.next().map(|t| t.kind), Some(K::Error(_))));
        assert_eq!(lexer.next(), None);
    }
}
