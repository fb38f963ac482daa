//! Forgiving field deserializers.
//!
//! Element records are never rejected for bad field values: a field that
//! does not have the expected shape deserializes as absent and the element
//! falls back to its defaults.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::element::Range;
use super::props::coerce_number;
use crate::rules::{Rule, RuleSet};

/// Number or numeric string; anything else is `None`.
pub fn number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(coerce_number(&value))
}

/// String or number rendered as text; empty strings are `None`.
pub fn text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return Ok(None),
    };
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// Boolean flag, accepting `"true"`/`"false"` strings and numbers (as
/// JSON or strings), nonzero meaning true.
pub fn flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => true,
        other => coerce_number(&other).is_some_and(|n| n != 0.0),
    })
}

/// Rule list; entries that do not parse are dropped, order is preserved.
pub fn rules<'de, D>(d: D) -> Result<RuleSet, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    let Value::Array(items) = value else {
        return Ok(RuleSet::default());
    };
    let rules: Vec<Rule> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    Ok(RuleSet::from(rules))
}

/// Range list; entries without a numeric start and end are dropped.
pub fn ranges<'de, D>(d: D) -> Result<Vec<Range>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(range_from_value).collect())
}

fn range_from_value(item: &Value) -> Option<Range> {
    let obj = item.as_object()?;
    let start = obj.get("start").and_then(coerce_number)?;
    let end = obj.get("end").and_then(coerce_number)?;
    let color = obj
        .get("color")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Range { start, end, color })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blink(value: Value) -> bool {
        let rule: Rule = serde_json::from_value(json!({"operator": "==", "value": 1, "blink": value})).unwrap();
        rule.blink
    }

    #[test]
    fn flag_accepts_numeric_strings() {
        assert!(blink(json!("1")));
        assert!(blink(json!(" 2.5 ")));
        assert!(!blink(json!("0")));
        assert!(blink(json!("TRUE")));
        assert!(!blink(json!("false")));
        assert!(!blink(json!("yes")));
        assert!(blink(json!(1)));
        assert!(!blink(json!(null)));
    }
}
