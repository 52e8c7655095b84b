// Whitelist helpers shared by the global and per-guild documents

use serde_json::Value;

use super::id_string;
use crate::utils::store::Document;

pub const KEY: &str = "whitelist";

/// All ids currently whitelisted, in file order
pub fn entries(doc: &Document) -> Vec<String> {
    match doc.get(KEY) {
        Some(Value::Array(items)) => items.iter().filter_map(id_string).collect(),
        _ => Vec::new(),
    }
}

pub fn contains(doc: &Document, user_id: &str) -> bool {
    entries(doc).iter().any(|id| id == user_id)
}

/// Returns `false` when the id was already present.
pub fn add(doc: &mut Document, user_id: &str) -> bool {
    if contains(doc, user_id) {
        return false;
    }
    let list = doc
        .entry(KEY)
        .or_insert_with(|| Value::Array(Vec::new()));
    if !list.is_array() {
        *list = Value::Array(Vec::new());
    }
    if let Value::Array(items) = list {
        items.push(Value::String(user_id.to_string()));
    }
    true
}

/// Returns `false` when the id was not present.
pub fn remove(doc: &mut Document, user_id: &str) -> bool {
    let Some(Value::Array(items)) = doc.get_mut(KEY) else {
        return false;
    };
    let before = items.len();
    items.retain(|item| id_string(item).as_deref() != Some(user_id));
    items.len() != before
}
