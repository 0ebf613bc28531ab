//! Write protection for node fields that ordinary updates may not touch.
//!
//! Update bodies are parsed leniently: protected keys are removed from the raw
//! JSON before it is turned into `NodeChanges`, and the caller audits what was
//! dropped. The only writers of these fields are node creation and the admin
//! clear-debt action.

use serde_json::Value;

pub const PROTECTED_NODE_FIELDS: &[&str] = &["debt_to_supplier"];

/// Removes protected keys from a JSON object body. Returns the keys removed.
pub fn strip_protected(body: &mut Value) -> Vec<&'static str> {
    let Value::Object(map) = body else {
        return Vec::new();
    };

    PROTECTED_NODE_FIELDS
        .iter()
        .copied()
        .filter(|field| map.remove(*field).is_some())
        .collect()
}
