pub(crate) mod axes;
pub mod evaluator;
pub mod functions;
pub(crate) mod node_test;
pub mod runtime;
