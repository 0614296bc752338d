//! XPath 1.0 for any read-only tree.
//!
//! Expressions are compiled once into an immutable [`XPath`] and evaluated
//! against a node type implementing [`XPathNode`]. Namespace bindings,
//! variables and custom functions travel in a [`DynamicContext`].
//!
//! ```
//! use treepath::simple::{attr, doc, elem, text};
//! use treepath::{DynamicContextBuilder, Value, compile};
//!
//! let tree = doc()
//!     .child(
//!         elem("order")
//!             .child(elem("item").attr(attr("price", "3")).child(text("tea")))
//!             .child(elem("item").attr(attr("price", "4")).child(text("cake"))),
//!     )
//!     .build();
//! let ctx = DynamicContextBuilder::new().with_variable("limit", 3.5).build();
//!
//! let cheap = compile("string(//item[@price < $limit])").unwrap();
//! assert_eq!(cheap.evaluate(&tree, &ctx).unwrap(), Value::String("tea".into()));
//! ```

pub mod compiler;
pub mod consts;
pub mod engine;
pub mod model;
pub mod parser;
pub mod value;

pub use compiler::{XPath, XPathError, compile, evaluate_expr};
pub use engine::functions::default_function_registry;
pub use engine::runtime::{
    ArgPolicy, CallCtx, DynamicContext, DynamicContextBuilder, Error, ErrorCode, FunctionRegistry, FunctionSignature,
};
pub use model::{ExpandedName, NodeKind, QName, XPathNode, simple};
pub use parser::{ParseError, ParseErrorKind, parse, tokenize};
pub use value::{NodeSet, Value};
