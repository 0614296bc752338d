use core::fmt;

use compact_str::CompactString;

use crate::consts::AXIS_NAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    const ALL: [Axis; 13] = [
        Axis::Ancestor,
        Axis::AncestorOrSelf,
        Axis::Attribute,
        Axis::Child,
        Axis::Descendant,
        Axis::DescendantOrSelf,
        Axis::Following,
        Axis::FollowingSibling,
        Axis::Namespace,
        Axis::Parent,
        Axis::Preceding,
        Axis::PrecedingSibling,
        Axis::SelfAxis,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        AXIS_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| Self::ALL[i])
    }

    pub fn name(self) -> &'static str {
        AXIS_NAMES[self as usize]
    }

    /// Reverse axes number their proximity positions from the context node backwards.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTypeTest {
    Node,
    Text,
    Comment,
}

/// Node test of a location step. Names stay lexical; prefixes are resolved
/// against the caller's namespace map at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`
    Wildcard,
    /// `prefix:*`
    NamespaceWildcard(CompactString),
    Name {
        prefix: Option<CompactString>,
        local: CompactString,
    },
    Kind(NodeTypeTest),
    ProcessingInstruction(Option<CompactString>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub prefix: Option<CompactString>,
    pub local: CompactString,
}

impl QualifiedName {
    pub fn parse(lexical: &str) -> Self {
        match lexical.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.into()),
                local: local.into(),
            },
            None => Self {
                prefix: None,
                local: lexical.into(),
            },
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{p}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: QualifiedName,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Axis { axis: Axis, test: NodeTest },
    /// A function call used as the last step of a path, e.g. `/a/*/last()`.
    Function(FunctionCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub predicates: Vec<Expr>,
}

impl Step {
    pub fn axis(axis: Axis, test: NodeTest) -> Self {
        Self {
            kind: StepKind::Axis { axis, test },
            predicates: Vec::new(),
        }
    }

    /// The step `//` stands for.
    pub fn descendant_or_self_node() -> Self {
        Self::axis(Axis::DescendantOrSelf, NodeTest::Kind(NodeTypeTest::Node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathStart {
    /// `/`: the root of the context node's tree.
    Root,
    /// A relative path starts at the context node.
    Context,
    /// A filter expression followed by `/` or `//`.
    Filter(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub start: PathStart,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Union,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "or" => BinaryOp::Or,
            "and" => BinaryOp::And,
            "=" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "div" => BinaryOp::Div,
            "mod" => BinaryOp::Mod,
            "|" => BinaryOp::Union,
            _ => return None,
        })
    }

    /// Binding strength; all levels are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
            BinaryOp::Union => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Union => "|",
        }
    }
}

/// Expression tree produced by the parser. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Literal(CompactString),
    Variable(QualifiedName),
    FunctionCall(FunctionCall),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A primary expression with predicates, e.g. `$items[2]`.
    Filter {
        primary: Box<Expr>,
        predicates: Vec<Expr>,
    },
    Path(LocationPath),
}
