use super::common::{arg_or_context, node_set_arg, number_arg};
use crate::engine::runtime::{CallCtx, Error};
use crate::model::XPathNode;
use crate::value::{Value, string_to_number};

/// `round()`: halves move away from zero, (-0.5, 0.5) maps to 0, NaN and infinities pass through.
pub(crate) fn xpath_round(n: f64) -> f64 {
    if !n.is_finite() {
        n
    } else if n <= -0.5 {
        (n - 0.5).trunc()
    } else if n >= 0.5 {
        (n + 0.5).trunc()
    } else {
        0.0
    }
}

pub(super) fn number_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(arg_or_context(ctx, args).to_number()))
}

pub(super) fn sum_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let set = node_set_arg(&args[0], "sum")?;
    let total = set.iter().map(|n| string_to_number(&n.string_value())).sum();
    Ok(Value::Number(total))
}

pub(super) fn floor_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(number_arg(args, 0).floor()))
}

pub(super) fn ceiling_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(number_arg(args, 0).ceil()))
}

pub(super) fn round_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(xpath_round(number_arg(args, 0))))
}
