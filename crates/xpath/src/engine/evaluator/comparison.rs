//! Equality and relational comparisons across the four value types.

use crate::model::XPathNode;
use crate::parser::ast::BinaryOp;
use crate::value::Value;

/// Node-set operands compare existentially: the comparison holds if it holds
/// for at least one member's string-value. A node-set against a boolean is the
/// exception and compares as `boolean(node-set)`.
pub(super) fn compare<N: XPathNode>(op: BinaryOp, left: &Value<N>, right: &Value<N>) -> bool {
    match (left, right) {
        (Value::NodeSet(a), Value::NodeSet(b)) => {
            let rights: Vec<Value<N>> = b.iter().map(|n| Value::String(n.string_value())).collect();
            a.iter().any(|x| {
                let x = Value::String(x.string_value());
                rights.iter().any(|y| compare_scalars(op, &x, y))
            })
        }
        (Value::NodeSet(set), Value::Boolean(_)) => {
            compare_scalars(op, &Value::Boolean(!set.is_empty()), right)
        }
        (Value::Boolean(_), Value::NodeSet(set)) => {
            compare_scalars(op, left, &Value::Boolean(!set.is_empty()))
        }
        (Value::NodeSet(set), scalar) => set
            .iter()
            .any(|n| compare_scalars(op, &Value::String(n.string_value()), scalar)),
        (scalar, Value::NodeSet(set)) => set
            .iter()
            .any(|n| compare_scalars(op, scalar, &Value::String(n.string_value()))),
        _ => compare_scalars(op, left, right),
    }
}

/// `=` and `!=` promote to boolean, then number, then compare as strings.
/// Relational operators always compare numbers.
fn compare_scalars<N: XPathNode>(op: BinaryOp, left: &Value<N>, right: &Value<N>) -> bool {
    let is = |pred: fn(&Value<N>) -> bool| pred(left) || pred(right);
    match op {
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = if is(|v| matches!(v, Value::Boolean(_))) {
                left.to_boolean() == right.to_boolean()
            } else if is(|v| matches!(v, Value::Number(_))) {
                left.to_number() == right.to_number()
            } else {
                left.to_xpath_string() == right.to_xpath_string()
            };
            (op == BinaryOp::Eq) == equal
        }
        BinaryOp::Lt => left.to_number() < right.to_number(),
        BinaryOp::Le => left.to_number() <= right.to_number(),
        BinaryOp::Gt => left.to_number() > right.to_number(),
        BinaryOp::Ge => left.to_number() >= right.to_number(),
        _ => false,
    }
}
