/// Mermaid keywords that cannot be used as bare node ids.
const RESERVED: &[&str] = &[
    "end",
    "subgraph",
    "graph",
    "flowchart",
    "direction",
    "click",
    "style",
    "linkstyle",
    "classdef",
    "class",
    "callback",
    "call",
    "init",
    "default",
];

/// Derive a renderer-safe identifier from a free-text label.
///
/// Deterministic and total. Non-alphanumeric characters collapse to single
/// underscores, the trimmed result is lowercased, and reserved Mermaid
/// keywords get a `node_` prefix. Distinct labels can still normalize to
/// the same id; callers own that collision.
pub fn node_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            id.push(ch.to_ascii_lowercase());
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    let id = id.trim_matches('_');
    if RESERVED.contains(&id) {
        format!("node_{id}")
    } else {
        id.to_string()
    }
}
