//! Property-bag access with type-appropriate fallbacks.
//!
//! Element data is hand-edited and comes from several generations of the
//! editor, so every accessor tolerates missing keys and wrong JSON types.

use serde_json::{Map, Value};

/// Coerce a JSON value to a number.
///
/// Numbers pass through, booleans become 1/0 and strings are trimmed and
/// parsed. Empty strings, null, arrays and objects do not coerce.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Truthiness used by on/off elements (switch, lamp, state charts).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::String(s) => {
            let s = s.trim();
            match s.to_ascii_lowercase().as_str() {
                "" | "false" | "off" | "no" => false,
                "true" | "on" | "yes" => true,
                _ => coerce_number(value).map(|n| n != 0.0).unwrap_or(true),
            }
        }
        Value::Number(_) => coerce_number(value).map(|n| n != 0.0).unwrap_or(false),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Display form of a raw value (strings unquoted).
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Borrowed view of an element's property bag.
#[derive(Debug, Clone, Copy)]
pub struct Props<'a> {
    bag: &'a Map<String, Value>,
}

impl<'a> Props<'a> {
    pub fn new(bag: &'a Map<String, Value>) -> Self {
        Self { bag }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.bag.get(key)
    }

    /// Numeric property, `None` when missing or not coercible.
    pub fn num(&self, key: &str) -> Option<f64> {
        self.bag.get(key).and_then(coerce_number)
    }

    pub fn num_or(&self, key: &str, default: f64) -> f64 {
        self.num(key).unwrap_or(default)
    }

    /// Non-negative numeric property.
    pub fn len_or(&self, key: &str, default: f64) -> f64 {
        self.num(key).filter(|v| *v >= 0.0).unwrap_or(default)
    }

    /// Text property; numbers are accepted and rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.bag.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Colour property: a non-empty string.
    pub fn color(&self, key: &str) -> Option<&'a str> {
        match self.bag.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.bag.get(key) {
            Some(Value::Null) | None => default,
            Some(v) => is_truthy(v),
        }
    }

    pub fn array(&self, key: &str) -> &'a [Value] {
        match self.bag.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }
}
