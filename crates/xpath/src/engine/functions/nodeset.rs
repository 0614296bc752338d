use super::common::{arg_or_context, node_set_arg};
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::model::{NodeKind, XPathNode};
use crate::value::Value;

pub(super) fn last_fn<N: XPathNode>(ctx: &CallCtx<N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(ctx.size as f64))
}

pub(super) fn position_fn<N: XPathNode>(ctx: &CallCtx<N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Number(ctx.position as f64))
}

pub(super) fn count_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let set = node_set_arg(&args[0], "count")?;
    Ok(Value::Number(set.len() as f64))
}

/// First node of the argument (or the context node), rejecting the root.
fn subject<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>], fname: &str) -> Result<Option<N>, Error> {
    let arg = arg_or_context(ctx, args);
    let node = node_set_arg(&arg, fname)?.first().cloned();
    if let Some(n) = &node
        && n.kind() == NodeKind::Root
    {
        return Err(Error::from_code(
            ErrorCode::FOER0000,
            format!("{fname}() is not defined for the root node"),
        ));
    }
    Ok(node)
}

pub(super) fn local_name_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let local = subject(ctx, args, "local-name")?
        .and_then(|n| n.name())
        .map(|q| q.local)
        .unwrap_or_default();
    Ok(Value::String(local))
}

pub(super) fn namespace_uri_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let uri = subject(ctx, args, "namespace-uri")?
        .filter(|n| matches!(n.kind(), NodeKind::Element | NodeKind::Attribute))
        .and_then(|n| n.name())
        .and_then(|q| q.ns_uri)
        .unwrap_or_default();
    Ok(Value::String(uri))
}

pub(super) fn name_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let Some(node) = subject(ctx, args, "name")? else {
        return Ok(Value::String(String::new()));
    };
    let name = match (node.kind(), node.name()) {
        (NodeKind::Element | NodeKind::Attribute, Some(q)) => match q.ns_uri.as_deref() {
            Some(uri) if !uri.is_empty() => format!("{{{uri}}}{}", q.local),
            _ => q.local,
        },
        (NodeKind::ProcessingInstruction | NodeKind::Namespace, Some(q)) => q.local,
        _ => String::new(),
    };
    Ok(Value::String(name))
}
