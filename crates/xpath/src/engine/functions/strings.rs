use itertools::Itertools;

use super::common::{arg_or_context, number_arg, string_arg};
use super::numeric::xpath_round;
use crate::engine::runtime::{CallCtx, Error};
use crate::model::XPathNode;
use crate::value::{Value, is_xml_whitespace};

pub(super) fn string_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::String(arg_or_context(ctx, args).to_xpath_string()))
}

pub(super) fn concat_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::String(args.iter().map(Value::to_xpath_string).collect()))
}

pub(super) fn starts_with_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(string_arg(args, 0).starts_with(&string_arg(args, 1))))
}

pub(super) fn contains_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(string_arg(args, 0).contains(&string_arg(args, 1))))
}

pub(super) fn substring_before_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let (s, needle) = (string_arg(args, 0), string_arg(args, 1));
    let before = s.find(&needle).map(|i| &s[..i]).unwrap_or_default();
    Ok(Value::String(before.to_string()))
}

pub(super) fn substring_after_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let (s, needle) = (string_arg(args, 0), string_arg(args, 1));
    let after = s.find(&needle).map(|i| &s[i + needle.len()..]).unwrap_or_default();
    Ok(Value::String(after.to_string()))
}

/// Characters at 1-based positions `p` with `round(start) <= p < round(start) + round(len)`.
/// NaN bounds select nothing.
pub(super) fn substring_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = string_arg(args, 0);
    let start = xpath_round(number_arg(args, 1));
    let end = match args.get(2) {
        Some(len) => start + xpath_round(len.to_number()),
        None => f64::INFINITY,
    };
    let out: String = s
        .chars()
        .zip(1u32..)
        .filter(|&(_, pos)| {
            let p = f64::from(pos);
            p >= start && p < end
        })
        .map(|(c, _)| c)
        .collect();
    Ok(Value::String(out))
}

pub(super) fn string_length_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = arg_or_context(ctx, args).to_xpath_string();
    Ok(Value::Number(s.chars().count() as f64))
}

pub(super) fn normalize_space_fn<N: XPathNode>(ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = arg_or_context(ctx, args).to_xpath_string();
    let normalized = s.split(is_xml_whitespace).filter(|part| !part.is_empty()).join(" ");
    Ok(Value::String(normalized))
}

/// Replace each character found in the second argument by the character at
/// the same index in the third; characters past its end are dropped.
pub(super) fn translate_fn<N: XPathNode>(_ctx: &CallCtx<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let s = string_arg(args, 0);
    let from: Vec<char> = string_arg(args, 1).chars().collect();
    let to: Vec<char> = string_arg(args, 2).chars().collect();
    let out: String = s
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect();
    Ok(Value::String(out))
}
