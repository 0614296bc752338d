use compact_str::CompactString;

use super::ParseErrorKind;

/// Closed set of token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `/` opening an absolute location path.
    AbsolutePath,
    /// `//` opening an absolute location path.
    AbbrAbsolutePath,
    /// `/` between two steps, or after a filter expression.
    RelativePath,
    /// `//` between two steps, or after a filter expression.
    AbbrRelativePath,
    Axis,
    /// `@`
    AbbrAxis,
    NamespacePrefix,
    /// Local part of a name test, `*`, or the abbreviated steps `.` and `..`.
    LocalName,
    NodeType,
    ProcInstLiteral,
    PredicateOpen,
    PredicateClose,
    FunctionName,
    ArgumentSeparator,
    FunctionClose,
    GroupOpen,
    GroupClose,
    StringLiteral,
    NumberLiteral,
    Operator,
    Variable,
    EndPath,
    Error(ParseErrorKind),
}

const STEP_START: &[TokenKind] = &[
    TokenKind::Axis,
    TokenKind::AbbrAxis,
    TokenKind::NamespacePrefix,
    TokenKind::LocalName,
    TokenKind::NodeType,
    TokenKind::FunctionName,
];

const NODE_TEST: &[TokenKind] = &[TokenKind::NamespacePrefix, TokenKind::LocalName, TokenKind::NodeType];

const OPERAND_START: &[TokenKind] = &[
    TokenKind::AbsolutePath,
    TokenKind::AbbrAbsolutePath,
    TokenKind::Axis,
    TokenKind::AbbrAxis,
    TokenKind::NamespacePrefix,
    TokenKind::LocalName,
    TokenKind::NodeType,
    TokenKind::FunctionName,
    TokenKind::GroupOpen,
    TokenKind::StringLiteral,
    TokenKind::NumberLiteral,
    TokenKind::Operator,
    TokenKind::Variable,
];

const AFTER_STEP: &[TokenKind] = &[
    TokenKind::PredicateOpen,
    TokenKind::RelativePath,
    TokenKind::AbbrRelativePath,
    TokenKind::EndPath,
];

const AFTER_OPERAND: &[TokenKind] = &[
    TokenKind::Operator,
    TokenKind::PredicateOpen,
    TokenKind::PredicateClose,
    TokenKind::ArgumentSeparator,
    TokenKind::FunctionClose,
    TokenKind::GroupClose,
    TokenKind::RelativePath,
    TokenKind::AbbrRelativePath,
];

const AFTER_CLOSE: &[TokenKind] = &[
    TokenKind::Operator,
    TokenKind::PredicateOpen,
    TokenKind::PredicateClose,
    TokenKind::ArgumentSeparator,
    TokenKind::FunctionClose,
    TokenKind::GroupClose,
    TokenKind::RelativePath,
    TokenKind::AbbrRelativePath,
    TokenKind::EndPath,
];

const AFTER_PATH: &[TokenKind] = &[
    TokenKind::Operator,
    TokenKind::PredicateClose,
    TokenKind::ArgumentSeparator,
    TokenKind::FunctionClose,
    TokenKind::GroupClose,
];

impl TokenKind {
    /// Kinds allowed to open an expression.
    pub fn expression_start() -> &'static [TokenKind] {
        OPERAND_START
    }

    /// Whether `next` may directly follow a token of this kind. Error tokens
    /// may follow anything.
    pub fn may_precede(self, next: TokenKind) -> bool {
        if matches!(next, TokenKind::Error(_)) {
            return true;
        }
        let followers: &[TokenKind] = match self {
            TokenKind::AbsolutePath => {
                return next == TokenKind::EndPath || STEP_START.contains(&next);
            }
            TokenKind::AbbrAbsolutePath | TokenKind::RelativePath | TokenKind::AbbrRelativePath => STEP_START,
            TokenKind::Axis | TokenKind::AbbrAxis => NODE_TEST,
            TokenKind::NamespacePrefix => return next == TokenKind::LocalName,
            TokenKind::LocalName | TokenKind::ProcInstLiteral => AFTER_STEP,
            TokenKind::NodeType => {
                return next == TokenKind::ProcInstLiteral || AFTER_STEP.contains(&next);
            }
            TokenKind::PredicateOpen => {
                return next == TokenKind::PredicateClose || OPERAND_START.contains(&next);
            }
            TokenKind::GroupOpen => {
                return next == TokenKind::GroupClose || OPERAND_START.contains(&next);
            }
            TokenKind::FunctionName => {
                return next == TokenKind::FunctionClose || OPERAND_START.contains(&next);
            }
            TokenKind::ArgumentSeparator | TokenKind::Operator => OPERAND_START,
            TokenKind::PredicateClose | TokenKind::FunctionClose => AFTER_CLOSE,
            TokenKind::GroupClose | TokenKind::StringLiteral | TokenKind::NumberLiteral | TokenKind::Variable => {
                AFTER_OPERAND
            }
            TokenKind::EndPath => AFTER_PATH,
            TokenKind::Error(_) => &[],
        };
        followers.contains(&next)
    }
}

/// One lexeme. `text` holds the name, literal body or operator; `offset` is
/// the byte offset of the lexeme in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: CompactString,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<CompactString>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }
}
