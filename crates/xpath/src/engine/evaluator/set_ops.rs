use crate::engine::runtime::{Error, ErrorCode};
use crate::model::XPathNode;
use crate::value::{NodeSet, Value};

/// `|`: both operands must be node-sets.
pub(super) fn union<N: XPathNode>(left: Value<N>, right: Value<N>) -> Result<NodeSet<N>, Error> {
    match (left, right) {
        (Value::NodeSet(a), Value::NodeSet(b)) => Ok(a.union(&b)),
        (a, b) => Err(Error::from_code(
            ErrorCode::XPTY0004,
            format!(
                "union operator requires node-sets, got {} and {}",
                a.type_name(),
                b.type_name()
            ),
        )),
    }
}
