/// Namespace bound to the reserved `xml` prefix in every scope.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// The thirteen axis names accepted before `::`.
pub const AXIS_NAMES: [&str; 13] = [
    "ancestor",
    "ancestor-or-self",
    "attribute",
    "child",
    "descendant",
    "descendant-or-self",
    "following",
    "following-sibling",
    "namespace",
    "parent",
    "preceding",
    "preceding-sibling",
    "self",
];

/// Names that introduce a node-type test when followed by `(`.
pub const NODE_TYPE_NAMES: [&str; 4] = ["comment", "text", "processing-instruction", "node"];
