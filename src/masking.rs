//! Recursive masking of sensitive fields for safe logging
//!
//! Runs over response and log payloads before serialization so credential
//! and identity values (BVN, NIN, card data) never reach logs or clients
//! in the clear.

use serde_json::Value;

/// Field names whose string values are masked, matched case-insensitively
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "bvn",
    "nin",
    "account_number",
    "card_number",
    "cvv",
    "pin",
];

/// Return a copy of `value` with sensitive string fields masked
///
/// Objects and arrays are walked recursively; the input is never mutated.
/// Non-string values under sensitive keys are recursed into rather than
/// replaced, so a nested object under `pin` still has its own strings masked.
pub fn mask_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let masked = match val {
                        Value::String(s) if is_sensitive(key) => Value::String(mask_string(s)),
                        other => mask_sensitive(other),
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive).collect()),
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS
        .iter()
        .any(|sensitive| key.eq_ignore_ascii_case(sensitive))
}

/// Mask a single string value
///
/// Strings of four characters or fewer become all asterisks; longer strings
/// keep their first two and last two characters. Character-indexed, so
/// non-ASCII input cannot split a code point.
pub fn mask_string(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let start: String = chars[..2].iter().collect();
    let end: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", start, "*".repeat(chars.len() - 4), end)
}
