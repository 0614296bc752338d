//! The four XPath 1.0 result types and the conversions between them.

use core::cmp::Ordering;
use core::fmt;

use crate::engine::runtime::{Error, ErrorCode};
use crate::model::XPathNode;

/// Nodes without duplicates, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSet<N> {
    nodes: Vec<N>,
}

impl<N> Default for NodeSet<N> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<N: XPathNode> NodeSet<N> {
    pub fn singleton(node: N) -> Self {
        Self { nodes: vec![node] }
    }

    /// Collect arbitrary nodes, then sort by document position and drop duplicates.
    pub fn from_nodes<I: IntoIterator<Item = N>>(nodes: I) -> Self {
        let mut nodes: Vec<N> = nodes.into_iter().collect();
        normalize(&mut nodes);
        Self { nodes }
    }

    pub fn union(&self, other: &Self) -> Self {
        if other.nodes.is_empty() {
            return self.clone();
        }
        if self.nodes.is_empty() {
            return other.clone();
        }
        let (a, b) = (&self.nodes, &other.nodes);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].compare_document_order(&b[j]) {
                Ordering::Less => {
                    merged.push(a[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(b[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    merged.push(a[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        Self { nodes: merged }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<&N> {
        self.nodes.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[N] {
        &self.nodes
    }

    pub fn into_vec(self) -> Vec<N> {
        self.nodes
    }

    /// String-value of the first node, or "" for an empty set.
    pub fn string_value(&self) -> String {
        self.nodes.first().map(XPathNode::string_value).unwrap_or_default()
    }
}

impl<N> IntoIterator for NodeSet<N> {
    type Item = N;
    type IntoIter = std::vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a, N> IntoIterator for &'a NodeSet<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl<N: XPathNode> FromIterator<N> for NodeSet<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}

/// Sort by document position and remove duplicates in place.
pub(crate) fn normalize<N: XPathNode>(nodes: &mut Vec<N>) {
    if nodes.len() < 2 {
        return;
    }
    if nodes
        .windows(2)
        .all(|w| w[0].compare_document_order(&w[1]).is_lt())
    {
        return;
    }
    nodes.sort_by_key(XPathNode::document_position);
    nodes.dedup();
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    NodeSet(NodeSet<N>),
    Number(f64),
    String(String),
    Boolean(bool),
}

impl<N: XPathNode> Value<N> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::NodeSet(_) => "node-set",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
        }
    }

    pub fn to_boolean(&self) -> bool {
        match self {
            Value::NodeSet(set) => !set.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::NodeSet(set) => match set.first() {
                Some(node) => string_to_number(&node.string_value()),
                None => f64::NAN,
            },
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Boolean(b) => f64::from(u8::from(*b)),
        }
    }

    pub fn to_xpath_string(&self) -> String {
        match self {
            Value::NodeSet(set) => set.string_value(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
        }
    }

    pub fn into_node_set(self) -> Result<NodeSet<N>, Error> {
        match self {
            Value::NodeSet(set) => Ok(set),
            other => Err(Error::from_code(
                ErrorCode::XPTY0004,
                format!("cannot convert {} to a node-set", other.type_name()),
            )),
        }
    }

    pub fn as_node_set(&self) -> Option<&NodeSet<N>> {
        match self {
            Value::NodeSet(set) => Some(set),
            _ => None,
        }
    }
}

impl<N: XPathNode> fmt::Display for Value<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath_string())
    }
}

impl<N> From<bool> for Value<N> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
impl<N> From<f64> for Value<N> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}
impl<N> From<String> for Value<N> {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
impl<N> From<&str> for Value<N> {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
impl<N> From<NodeSet<N>> for Value<N> {
    fn from(set: NodeSet<N>) -> Self {
        Value::NodeSet(set)
    }
}

pub(crate) fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Parse the XPath `Number` production, surrounded by optional whitespace.
/// Anything else, including exponents and `Infinity`, yields NaN.
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim_matches(is_xml_whitespace);
    let digits = t.strip_prefix('-').unwrap_or(t);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    let valid = all_digits(int_part)
        && frac_part.is_none_or(all_digits)
        && (!int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty()));
    if !valid {
        return f64::NAN;
    }
    t.parse().unwrap_or(f64::NAN)
}

/// Format a number the way `string()` does: shortest round-trip decimal,
/// no exponent, integers without a fraction.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}
