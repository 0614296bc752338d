//! The XPath 1.0 core function library.

use crate::engine::runtime::{ArgPolicy, FunctionRegistry};
use crate::model::{ExpandedName, XPathNode};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

mod boolean;
mod common;
mod nodeset;
mod numeric;
mod strings;

fn register_default_functions<N: XPathNode>(reg: &mut FunctionRegistry<N>) {
    macro_rules! reg_fn {
        ($local:expr, $min:expr, $policy:ident, $func:expr $(,)?) => {{
            reg.register(ExpandedName::local($local), $min, ArgPolicy::$policy, Arc::new($func));
        }};
    }

    // node-set
    reg_fn!("last", 0, Exact, nodeset::last_fn::<N>);
    reg_fn!("position", 0, Exact, nodeset::position_fn::<N>);
    reg_fn!("count", 1, Exact, nodeset::count_fn::<N>);
    reg_fn!("local-name", 0, Optional, nodeset::local_name_fn::<N>);
    reg_fn!("namespace-uri", 0, Optional, nodeset::namespace_uri_fn::<N>);
    reg_fn!("name", 0, Optional, nodeset::name_fn::<N>);

    // string
    reg_fn!("string", 0, Optional, strings::string_fn::<N>);
    reg_fn!("concat", 2, Variadic, strings::concat_fn::<N>);
    reg_fn!("starts-with", 2, Exact, strings::starts_with_fn::<N>);
    reg_fn!("contains", 2, Exact, strings::contains_fn::<N>);
    reg_fn!("substring-before", 2, Exact, strings::substring_before_fn::<N>);
    reg_fn!("substring-after", 2, Exact, strings::substring_after_fn::<N>);
    reg_fn!("substring", 2, Optional, strings::substring_fn::<N>);
    reg_fn!("string-length", 0, Optional, strings::string_length_fn::<N>);
    reg_fn!("normalize-space", 0, Optional, strings::normalize_space_fn::<N>);
    reg_fn!("translate", 3, Exact, strings::translate_fn::<N>);

    // boolean
    reg_fn!("boolean", 1, Exact, boolean::boolean_fn::<N>);
    reg_fn!("not", 1, Exact, boolean::not_fn::<N>);
    reg_fn!("true", 0, Exact, boolean::true_fn::<N>);
    reg_fn!("false", 0, Exact, boolean::false_fn::<N>);
    reg_fn!("lang", 1, Exact, boolean::lang_fn::<N>);

    // number
    reg_fn!("number", 0, Optional, numeric::number_fn::<N>);
    reg_fn!("sum", 1, Exact, numeric::sum_fn::<N>);
    reg_fn!("floor", 1, Exact, numeric::floor_fn::<N>);
    reg_fn!("ceiling", 1, Exact, numeric::ceiling_fn::<N>);
    reg_fn!("round", 1, Exact, numeric::round_fn::<N>);
}

/// The built-in functions for node type `N`.
///
/// Built once per node type and shared afterwards.
pub fn default_function_registry<N: XPathNode>() -> Arc<FunctionRegistry<N>> {
    static CACHE: OnceLock<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> = OnceLock::new();
    let map = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = map.lock().unwrap_or_else(PoisonError::into_inner);
    let type_id = TypeId::of::<N>();
    if let Some(existing) = guard
        .get(&type_id)
        .and_then(|entry| entry.downcast_ref::<Arc<FunctionRegistry<N>>>())
    {
        return Arc::clone(existing);
    }
    let mut reg = FunctionRegistry::new();
    register_default_functions(&mut reg);
    tracing::debug!(
        node_type = std::any::type_name::<N>(),
        functions = reg.len(),
        "built-in function registry created"
    );
    let reg = Arc::new(reg);
    guard.insert(type_id, Box::new(Arc::clone(&reg)));
    reg
}
