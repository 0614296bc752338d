use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{ExpandedName, XPathNode};
use crate::value::{NodeSet, Value};

pub type Arity = usize;

/// How a function treats arguments beyond its minimum arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgPolicy {
    /// Exactly `min_arity` arguments.
    Exact,
    /// One further optional argument. A zero-arity optional argument defaults
    /// to the context node.
    Optional,
    /// Any number of further arguments.
    Variadic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    pub min_arity: Arity,
    pub policy: ArgPolicy,
}

impl FunctionSignature {
    pub fn max_arity(&self) -> Option<Arity> {
        match self.policy {
            ArgPolicy::Exact => Some(self.min_arity),
            ArgPolicy::Optional => Some(self.min_arity + 1),
            ArgPolicy::Variadic => None,
        }
    }

    pub fn check_arity(&self, name: &ExpandedName, argc: Arity) -> Result<(), Error> {
        if argc < self.min_arity {
            return Err(Error::from_code(
                ErrorCode::XPST0017,
                format!("not enough arguments for {name}(): expected at least {}, got {argc}", self.min_arity),
            ));
        }
        if let Some(max) = self.max_arity()
            && argc > max
        {
            return Err(Error::from_code(
                ErrorCode::XPST0017,
                format!("too many arguments for {name}(): expected at most {max}, got {argc}"),
            ));
        }
        Ok(())
    }

    /// Whether an omitted argument is replaced by the context node.
    pub fn defaults_to_context(&self) -> bool {
        self.min_arity == 0 && self.policy == ArgPolicy::Optional
    }
}

/// Focus handed to a function implementation.
pub struct CallCtx<'a, N> {
    /// `None` only when a function step runs against an empty node-set.
    pub node: Option<N>,
    pub position: usize,
    pub size: usize,
    pub namespaces: &'a HashMap<String, String>,
}

pub type FunctionImpl<N> = Arc<dyn Fn(&CallCtx<N>, &[Value<N>]) -> Result<Value<N>, Error> + Send + Sync>;

pub struct FunctionRegistry<N> {
    fns: HashMap<ExpandedName, (FunctionSignature, FunctionImpl<N>)>,
}

impl<N> Default for FunctionRegistry<N> {
    fn default() -> Self {
        Self { fns: HashMap::new() }
    }
}

impl<N> fmt::Debug for FunctionRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.fns.keys().map(ToString::to_string).collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

impl<N: XPathNode> FunctionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a function.
    pub fn register(&mut self, name: ExpandedName, min_arity: Arity, policy: ArgPolicy, func: FunctionImpl<N>) {
        self.fns.insert(name, (FunctionSignature { min_arity, policy }, func));
    }

    /// Convenience: register an unqualified function taking exactly `arity` arguments.
    pub fn register_local<F>(&mut self, local: &str, arity: Arity, f: F)
    where
        F: 'static + Send + Sync + Fn(&CallCtx<N>, &[Value<N>]) -> Result<Value<N>, Error>,
    {
        self.register(ExpandedName::local(local), arity, ArgPolicy::Exact, Arc::new(f));
    }

    /// Convenience: register a function in a namespace taking exactly `arity` arguments.
    pub fn register_ns<F>(&mut self, ns_uri: &str, local: &str, arity: Arity, f: F)
    where
        F: 'static + Send + Sync + Fn(&CallCtx<N>, &[Value<N>]) -> Result<Value<N>, Error>,
    {
        self.register(ExpandedName::new(Some(ns_uri), local), arity, ArgPolicy::Exact, Arc::new(f));
    }

    pub fn get(&self, name: &ExpandedName) -> Option<(FunctionSignature, &FunctionImpl<N>)> {
        self.fns.get(name).map(|(sig, f)| (*sig, f))
    }

    pub fn contains(&self, name: &ExpandedName) -> bool {
        self.fns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}

/// Per-evaluation bindings: namespace prefixes, variables and custom functions.
///
/// Contexts are immutable once built and may be shared between threads; one
/// context can serve any number of evaluations.
pub struct DynamicContext<N> {
    pub namespaces: HashMap<String, String>,
    pub variables: HashMap<ExpandedName, Value<N>>,
    pub functions: Arc<FunctionRegistry<N>>,
}

impl<N> Default for DynamicContext<N> {
    fn default() -> Self {
        Self {
            namespaces: HashMap::new(),
            variables: HashMap::new(),
            functions: Arc::new(FunctionRegistry::default()),
        }
    }
}

impl<N> fmt::Debug for DynamicContext<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicContext")
            .field("namespaces", &self.namespaces)
            .field("variables", &self.variables.keys().collect::<Vec<_>>())
            .field("functions", &self.functions)
            .finish()
    }
}

pub struct DynamicContextBuilder<N> {
    ctx: DynamicContext<N>,
}

impl<N: XPathNode> Default for DynamicContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: XPathNode> DynamicContextBuilder<N> {
    pub fn new() -> Self {
        Self {
            ctx: DynamicContext::default(),
        }
    }

    /// Bind `prefix` for name tests, variable and function names. The empty
    /// prefix sets the default namespace for unprefixed element name tests.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.ctx.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_namespaces<I, P, U>(self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        bindings
            .into_iter()
            .fold(self, |builder, (prefix, uri)| builder.with_namespace(prefix, uri))
    }

    /// Bind an unqualified variable, referenced as `$name`.
    pub fn with_variable(self, name: &str, value: impl Into<Value<N>>) -> Self {
        self.with_qualified_variable(ExpandedName::local(name), value)
    }

    pub fn with_qualified_variable(mut self, name: ExpandedName, value: impl Into<Value<N>>) -> Self {
        self.ctx.variables.insert(name, value.into());
        self
    }

    /// Bind a node-set variable from arbitrary nodes.
    pub fn with_nodes<I: IntoIterator<Item = N>>(self, name: &str, nodes: I) -> Self {
        self.with_variable(name, NodeSet::from_nodes(nodes))
    }

    pub fn with_functions(mut self, reg: Arc<FunctionRegistry<N>>) -> Self {
        self.ctx.functions = reg;
        self
    }

    pub fn build(self) -> DynamicContext<N> {
        self.ctx
    }
}

/// Evaluation error codes, named after their W3C counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unknown function or wrong number of arguments.
    XPST0017,
    /// Unbound variable.
    XPST0008,
    /// Namespace prefix without a binding.
    XPST0081,
    /// Operand of the wrong type.
    XPTY0004,
    /// Function-specific failure, e.g. `name()` of the root node.
    FOER0000,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::XPST0017 => "err:XPST0017",
            ErrorCode::XPST0008 => "err:XPST0008",
            ErrorCode::XPST0081 => "err:XPST0081",
            ErrorCode::XPTY0004 => "err:XPTY0004",
            ErrorCode::FOER0000 => "err:FOER0000",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-time failure. Deterministic for the same expression, tree and context.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} ({code})")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            source: None,
        }
    }

    /// Attach the underlying cause, e.g. the failure a custom function ran into.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }
}
