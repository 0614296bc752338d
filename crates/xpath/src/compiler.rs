//! Compiled expressions and the evaluation entry points.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::engine::evaluator::evaluate_ast;
use crate::engine::runtime::{DynamicContext, Error};
use crate::model::XPathNode;
use crate::parser::{self, ParseError, ast::Expr};
use crate::value::{NodeSet, Value};

/// Either failure of a one-shot [`evaluate_expr`] call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum XPathError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] Error),
}

/// A parsed expression, ready to be evaluated any number of times against
/// any tree. Cloning is cheap; the expression tree is shared.
#[derive(Debug, Clone)]
pub struct XPath {
    source: String,
    expr: Arc<Expr>,
}

/// Parse `expr` once for repeated evaluation.
///
/// ```
/// use treepath::simple::{doc, elem};
/// use treepath::{DynamicContext, compile};
///
/// let tree = doc().child(elem("list").child(elem("item")).child(elem("item"))).build();
/// let xpath = compile("count(/list/item)").unwrap();
/// let ctx = DynamicContext::default();
/// assert_eq!(xpath.evaluate_number(&tree, &ctx).unwrap(), 2.0);
/// ```
pub fn compile(expr: &str) -> Result<XPath, ParseError> {
    match parser::parse(expr) {
        Ok(ast) => {
            debug!(expr, "compiled expression");
            Ok(XPath {
                source: expr.to_string(),
                expr: Arc::new(ast),
            })
        }
        Err(err) => {
            debug!(expr, error = %err, "compilation failed");
            Err(err)
        }
    }
}

impl XPath {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate with `root` as the context node.
    pub fn evaluate<N: XPathNode>(&self, root: &N, ctx: &DynamicContext<N>) -> Result<Value<N>, Error> {
        debug!(expr = %self.source, "evaluating expression");
        let result = evaluate_ast(&self.expr, root, ctx);
        match &result {
            Ok(value) => debug!(expr = %self.source, kind = value.type_name(), "evaluation finished"),
            Err(err) => debug!(expr = %self.source, error = %err, "evaluation failed"),
        }
        result
    }

    pub fn evaluate_boolean<N: XPathNode>(&self, root: &N, ctx: &DynamicContext<N>) -> Result<bool, Error> {
        self.evaluate(root, ctx).map(|v| v.to_boolean())
    }

    pub fn evaluate_number<N: XPathNode>(&self, root: &N, ctx: &DynamicContext<N>) -> Result<f64, Error> {
        self.evaluate(root, ctx).map(|v| v.to_number())
    }

    pub fn evaluate_string<N: XPathNode>(&self, root: &N, ctx: &DynamicContext<N>) -> Result<String, Error> {
        self.evaluate(root, ctx).map(|v| v.to_xpath_string())
    }

    /// Evaluate and require a node-set result (`err:XPTY0004` otherwise).
    pub fn evaluate_nodes<N: XPathNode>(&self, root: &N, ctx: &DynamicContext<N>) -> Result<NodeSet<N>, Error> {
        self.evaluate(root, ctx)?.into_node_set()
    }
}

impl FromStr for XPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile and evaluate in one call.
pub fn evaluate_expr<N: XPathNode>(expr: &str, root: &N, ctx: &DynamicContext<N>) -> Result<Value<N>, XPathError> {
    Ok(compile(expr)?.evaluate(root, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_source() {
        let xpath: XPath = "/a/b[1]".parse().unwrap();
        assert_eq!(xpath.to_string(), "/a/b[1]");
    }

    #[test]
    fn ast_is_the_parsed_expression() {
        let xpath = compile("1 + 2").unwrap();
        assert_eq!(xpath.ast(), &crate::parser::parse("1 + 2").unwrap());
        assert!(matches!(xpath.ast(), Expr::Binary { .. }));
    }

    #[test]
    fn compiled_expressions_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XPath>();
    }

    #[test]
    fn parse_errors_surface_through_xpath_error() {
        let ctx = DynamicContext::default();
        let tree = crate::simple::doc().build();
        let err = evaluate_expr("/a[", &tree, &ctx).unwrap_err();
        assert!(matches!(err, XPathError::Parse(_)));
    }
}
