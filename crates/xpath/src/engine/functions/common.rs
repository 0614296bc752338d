use std::borrow::Cow;

use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::model::XPathNode;
use crate::value::{NodeSet, Value};

/// The first argument, or the context node as a singleton node-set when the
/// argument was omitted.
pub(super) fn arg_or_context<'a, N: XPathNode>(ctx: &CallCtx<N>, args: &'a [Value<N>]) -> Cow<'a, Value<N>> {
    match args.first() {
        Some(v) => Cow::Borrowed(v),
        None => Cow::Owned(Value::NodeSet(
            ctx.node.clone().map(NodeSet::singleton).unwrap_or_default(),
        )),
    }
}

pub(super) fn node_set_arg<'a, N: XPathNode>(value: &'a Value<N>, fname: &str) -> Result<&'a NodeSet<N>, Error> {
    value.as_node_set().ok_or_else(|| {
        Error::from_code(
            ErrorCode::XPTY0004,
            format!("{fname}() expects a node-set, got {}", value.type_name()),
        )
    })
}

pub(super) fn string_arg<N: XPathNode>(args: &[Value<N>], idx: usize) -> String {
    args.get(idx).map(Value::to_xpath_string).unwrap_or_default()
}

pub(super) fn number_arg<N: XPathNode>(args: &[Value<N>], idx: usize) -> f64 {
    args.get(idx).map_or(f64::NAN, Value::to_number)
}
