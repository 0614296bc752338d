use super::common::string_arg;
use crate::consts::XML_URI;
use crate::engine::runtime::{CallCtx, Error};
use crate::model::{NodeKind, XPathNode};
use crate::value::Value;

pub(super) fn boolean_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(args[0].to_boolean()))
}

pub(super) fn not_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(!args[0].to_boolean()))
}

pub(super) fn true_fn<N: XPathNode>(_ctx: &CallCtx<N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(true))
}

pub(super) fn false_fn<N: XPathNode>(_ctx: &CallCtx<N>, _args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(false))
}

/// `lang(tag)`: the nearest `xml:lang` on the context node or its ancestors decides.
pub(super) fn lang_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let requested = string_arg(args, 0);
    let mut current = ctx.node.clone();
    while let Some(node) = current {
        if node.kind() == NodeKind::Element
            && let Some(attr) = node.attribute(Some(XML_URI), "lang")
        {
            return Ok(Value::Boolean(lang_matches(&requested, &attr.string_value())));
        }
        current = node.parent();
    }
    Ok(Value::Boolean(false))
}

/// Case-insensitive. A bare language matches any region of it; a request with
/// a region only matches that exact region.
fn lang_matches(requested: &str, declared: &str) -> bool {
    let requested = requested.to_ascii_lowercase();
    let declared = declared.to_ascii_lowercase();
    let (req_lang, req_region) = split_tag(&requested);
    let (decl_lang, decl_region) = split_tag(&declared);
    if req_lang.is_empty() || req_lang != decl_lang {
        return false;
    }
    req_region.is_none() || req_region == decl_region
}

fn split_tag(tag: &str) -> (&str, Option<&str>) {
    match tag.split_once('-') {
        Some((lang, region)) => (lang, Some(region)),
        None => (tag, None),
    }
}
