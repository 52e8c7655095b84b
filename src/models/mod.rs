// Document conventions layered on top of the schema-less store
pub mod global;
pub mod guild;
pub mod reaction_role;
pub mod whitelist;

use serde_json::Value;

/// Snowflake ids show up as strings in new files and as bare numbers in
/// older ones. Either form is normalised to a decimal string.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

