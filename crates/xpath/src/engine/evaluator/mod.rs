//! Tree-walking evaluation of a parsed expression.
//!
//! The evaluator is stateless apart from the borrowed [`DynamicContext`]; every
//! predicate iteration and function argument gets its own [`Focus`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::engine::axes;
use crate::engine::functions::default_function_registry;
use crate::engine::node_test::{ResolvedTest, resolve_prefix};
use crate::engine::runtime::{
    CallCtx, DynamicContext, Error, ErrorCode, FunctionImpl, FunctionRegistry, FunctionSignature,
};
use crate::model::{ExpandedName, XPathNode};
use crate::parser::ast::{Axis, BinaryOp, Expr, FunctionCall, LocationPath, NodeTest, PathStart, QualifiedName, StepKind};
use crate::value::{NodeSet, Value};

mod comparison;
pub(crate) mod numeric;
mod set_ops;

/// Context node, proximity position and context size of one evaluation frame.
///
/// Arguments of a function step see the whole node-set selected so far as
/// their context; `nodes` carries that set and `node` is then its first member
/// (or the outer context node when the set is empty).
#[derive(Debug, Clone)]
pub(crate) struct Focus<N> {
    pub node: N,
    pub position: usize,
    pub size: usize,
    pub nodes: Option<NodeSet<N>>,
}

impl<N: XPathNode> Focus<N> {
    pub(crate) fn new(node: N) -> Self {
        Self::at(node, 1, 1)
    }

    fn at(node: N, position: usize, size: usize) -> Self {
        Self {
            node,
            position,
            size,
            nodes: None,
        }
    }

    /// What `.` and relative paths start from.
    fn context_set(&self) -> NodeSet<N> {
        match &self.nodes {
            Some(set) => set.clone(),
            None => NodeSet::singleton(self.node.clone()),
        }
    }

    fn context_node(&self) -> Option<N> {
        match &self.nodes {
            Some(set) => set.first().cloned(),
            None => Some(self.node.clone()),
        }
    }
}

/// Proximity position of each selected node, keyed by document position.
type Proximity = HashMap<u64, usize>;

fn document_proximity<N: XPathNode>(nodes: &[N]) -> Proximity {
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.document_position(), idx + 1))
        .collect()
}

/// Evaluate `expr` with `node` as the context node.
pub fn evaluate_ast<N: XPathNode>(expr: &Expr, node: &N, ctx: &DynamicContext<N>) -> Result<Value<N>, Error> {
    Evaluator::new(ctx).eval(expr, &Focus::new(node.clone()))
}

pub(crate) struct Evaluator<'a, N> {
    ctx: &'a DynamicContext<N>,
    builtins: Arc<FunctionRegistry<N>>,
}

impl<'a, N: XPathNode> Evaluator<'a, N> {
    pub(crate) fn new(ctx: &'a DynamicContext<N>) -> Self {
        Self {
            ctx,
            builtins: default_function_registry(),
        }
    }

    pub(crate) fn eval(&self, expr: &Expr, focus: &Focus<N>) -> Result<Value<N>, Error> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Literal(s) => Ok(Value::String(s.to_string())),
            Expr::Variable(name) => self.variable(name),
            Expr::FunctionCall(call) => {
                let call_ctx = self.call_ctx(focus.context_node(), focus.position, focus.size);
                self.invoke(call, focus, &call_ctx, focus.context_set())
            }
            Expr::Negate(inner) => Ok(Value::Number(-self.eval(inner, focus)?.to_number())),
            Expr::Binary { op, left, right } => {
                // No short-circuit: both operands are evaluated.
                let left = self.eval(left, focus)?;
                let right = self.eval(right, focus)?;
                self.binary(*op, left, right)
            }
            Expr::Filter { primary, predicates } => {
                let value = self.eval(primary, focus)?;
                self.filter(value, predicates)
            }
            Expr::Path(path) => self.path(path, focus),
        }
    }

    fn binary(&self, op: BinaryOp, left: Value<N>, right: Value<N>) -> Result<Value<N>, Error> {
        trace!(op = op.symbol(), left = left.type_name(), right = right.type_name(), "binary operator");
        Ok(match op {
            BinaryOp::Or => Value::Boolean(left.to_boolean() | right.to_boolean()),
            BinaryOp::And => Value::Boolean(left.to_boolean() & right.to_boolean()),
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                Value::Boolean(comparison::compare(op, &left, &right))
            }
            BinaryOp::Add => Value::Number(left.to_number() + right.to_number()),
            BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
            BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
            BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
            BinaryOp::Mod => Value::Number(numeric::xpath_mod(left.to_number(), right.to_number())),
            BinaryOp::Union => Value::NodeSet(set_ops::union(left, right)?),
        })
    }

    fn variable(&self, name: &QualifiedName) -> Result<Value<N>, Error> {
        let expanded = match &name.prefix {
            Some(prefix) => {
                let uri = resolve_prefix(prefix, &self.ctx.namespaces)?;
                ExpandedName::new(Some(uri.as_str()), &name.local)
            }
            None => ExpandedName::local(&name.local),
        };
        self.ctx
            .variables
            .get(&expanded)
            .cloned()
            .ok_or_else(|| Error::from_code(ErrorCode::XPST0008, format!("variable ${name} is not bound")))
    }

    fn path(&self, path: &LocationPath, focus: &Focus<N>) -> Result<Value<N>, Error> {
        let mut current = match &path.start {
            PathStart::Root => NodeSet::singleton(focus.node.root()),
            PathStart::Context => focus.context_set(),
            PathStart::Filter(expr) => path_input(self.eval(expr, focus)?)?,
        };
        for (idx, step) in path.steps.iter().enumerate() {
            match &step.kind {
                StepKind::Axis { axis, test } => {
                    current = self.axis_step(&current, *axis, test, &step.predicates)?;
                }
                StepKind::Function(call) => {
                    let value = self.function_step(call, current, focus)?;
                    let value = self.filter(value, &step.predicates)?;
                    if idx + 1 == path.steps.len() {
                        return Ok(value);
                    }
                    current = path_input(value)?;
                }
            }
        }
        Ok(Value::NodeSet(current))
    }

    /// Apply one location step to every node of `input`.
    ///
    /// The per-context results are unioned into one document-ordered set before
    /// any predicate runs, so `position()` and `last()` range over that set. A
    /// numeric predicate compares against the node's position within its own
    /// context's axis result, counted in axis direction. A node reached from
    /// several contexts keeps the position from the last of them.
    fn axis_step(
        &self,
        input: &NodeSet<N>,
        axis: Axis,
        test: &NodeTest,
        predicates: &[Expr],
    ) -> Result<NodeSet<N>, Error> {
        let resolved = ResolvedTest::resolve(test, axis, &self.ctx.namespaces)?;
        let mut selected = Vec::new();
        let mut proximity = Proximity::new();
        for node in input {
            for (idx, found) in axes::find(node, axis, &resolved).into_iter().enumerate() {
                proximity.insert(found.document_position(), idx + 1);
                selected.push(found);
            }
        }
        let selected = NodeSet::from_nodes(selected).into_vec();
        let out = NodeSet::from_nodes(self.apply_predicates(selected, proximity, predicates)?);
        trace!(axis = axis.name(), input = input.len(), output = out.len(), "axis step");
        Ok(out)
    }

    /// A function used as a step runs once against the whole node-set: the
    /// set is both its implicit argument and the context its arguments start from.
    fn function_step(&self, call: &FunctionCall, set: NodeSet<N>, outer: &Focus<N>) -> Result<Value<N>, Error> {
        let size = set.len();
        let first = set.first().cloned();
        let arg_focus = Focus {
            node: first.clone().unwrap_or_else(|| outer.node.clone()),
            position: 1,
            size,
            nodes: Some(set.clone()),
        };
        let call_ctx = self.call_ctx(first, 1, size);
        self.invoke(call, &arg_focus, &call_ctx, set)
    }

    fn filter(&self, value: Value<N>, predicates: &[Expr]) -> Result<Value<N>, Error> {
        if predicates.is_empty() {
            return Ok(value);
        }
        let set = match value {
            Value::NodeSet(set) => set,
            other => {
                return Err(Error::from_code(
                    ErrorCode::XPTY0004,
                    format!("predicates require a node-set, got {}", other.type_name()),
                ));
            }
        };
        let nodes = set.into_vec();
        let proximity = document_proximity(&nodes);
        let kept = self.apply_predicates(nodes, proximity, predicates)?;
        Ok(Value::NodeSet(NodeSet::from_nodes(kept)))
    }

    fn apply_predicates(
        &self,
        mut nodes: Vec<N>,
        mut proximity: Proximity,
        predicates: &[Expr],
    ) -> Result<Vec<N>, Error> {
        for predicate in predicates {
            nodes = self.apply_predicate(nodes, &proximity, predicate)?;
            // survivors are renumbered for the next predicate
            proximity = document_proximity(&nodes);
        }
        Ok(nodes)
    }

    fn apply_predicate(&self, nodes: Vec<N>, proximity: &Proximity, predicate: &Expr) -> Result<Vec<N>, Error> {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (idx, node) in nodes.into_iter().enumerate() {
            let focus = Focus::at(node, idx + 1, size);
            let keep = match self.eval(predicate, &focus)? {
                Value::Number(n) => proximity
                    .get(&focus.node.document_position())
                    .is_some_and(|&pos| n == pos as f64),
                other => other.to_boolean(),
            };
            if keep {
                kept.push(focus.node);
            }
        }
        trace!(before = size, after = kept.len(), "predicate applied");
        Ok(kept)
    }

    fn call_ctx(&self, node: Option<N>, position: usize, size: usize) -> CallCtx<'a, N> {
        CallCtx {
            node,
            position,
            size,
            namespaces: &self.ctx.namespaces,
        }
    }

    fn invoke(
        &self,
        call: &FunctionCall,
        arg_focus: &Focus<N>,
        call_ctx: &CallCtx<'_, N>,
        implicit: NodeSet<N>,
    ) -> Result<Value<N>, Error> {
        let name = self.function_name(&call.name)?;
        let (signature, func) = self.lookup(&name)?;
        signature.check_arity(&name, call.args.len())?;
        let mut args = call
            .args
            .iter()
            .map(|arg| self.eval(arg, arg_focus))
            .collect::<Result<Vec<_>, _>>()?;
        if args.is_empty() && signature.defaults_to_context() {
            args.push(Value::NodeSet(implicit));
        }
        trace!(function = %name, argc = args.len(), "calling function");
        func(call_ctx, &args)
    }

    /// Custom functions shadow built-ins of the same name.
    fn lookup(&self, name: &ExpandedName) -> Result<(FunctionSignature, &FunctionImpl<N>), Error> {
        self.ctx
            .functions
            .get(name)
            .or_else(|| self.builtins.get(name))
            .ok_or_else(|| unknown_function(&name.to_string()))
    }

    fn function_name(&self, name: &QualifiedName) -> Result<ExpandedName, Error> {
        match &name.prefix {
            None => Ok(ExpandedName::local(&name.local)),
            Some(prefix) => match self.ctx.namespaces.get(prefix.as_str()) {
                Some(uri) => Ok(ExpandedName::new(Some(uri.as_str()), &name.local)),
                None => Err(unknown_function(&name.to_string())),
            },
        }
    }
}

fn path_input<N: XPathNode>(value: Value<N>) -> Result<NodeSet<N>, Error> {
    match value {
        Value::NodeSet(set) => Ok(set),
        other => Err(Error::from_code(
            ErrorCode::XPTY0004,
            format!("cannot run path expression on a primitive ({})", other.type_name()),
        )),
    }
}

fn unknown_function(name: &str) -> Error {
    Error::from_code(ErrorCode::XPST0017, format!("unknown function {name}()"))
}
