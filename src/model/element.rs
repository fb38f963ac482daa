//! The element record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::kind::ElementKind;
use super::lenient;
use super::props::Props;
use crate::rules::RuleSet;
use crate::types::Rect;

/// Smallest width or height an element may have after any transform.
pub const MIN_SIZE: f64 = 5.0;

/// Stable element identifier. Records may carry ids as strings or numbers;
/// both deserialize to the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        ElementId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(ElementId(s)),
            Value::Number(n) => Ok(ElementId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "element id must be a string or number, got {other}"
            ))),
        }
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        ElementId(s.to_string())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coloured value band used by gauges (bands or gradient stops).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub start: f64,
    pub end: f64,
    pub color: String,
}

/// One visual element on the canvas.
///
/// Geometry fields are typed; everything type-specific lives in `props`.
/// The element's z-order is its index in the owning [`Scene`](super::Scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ElementRecord")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_binding_source: Option<String>,
    #[serde(skip_serializing_if = "RuleSet::is_empty")]
    pub convert_values: RuleSet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl Element {
    /// A new element of `kind` at `(x, y)` with the type's default size
    /// and property bag.
    pub fn new(id: ElementId, kind: ElementKind, x: f64, y: f64) -> Self {
        let (width, height) = kind.default_size();
        let props = kind.default_props();
        Element {
            id,
            kind,
            x,
            y,
            rotation: 0.0,
            opacity: 1.0,
            width,
            height,
            data_binding_source: None,
            convert_values: RuleSet::default(),
            ranges: Vec::new(),
            props,
        }
    }

    pub fn props(&self) -> Props<'_> {
        Props::new(&self.props)
    }

    /// Unrotated bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_prop(&mut self, key: &str, value: impl Into<Value>) {
        self.props.insert(key.to_string(), value.into());
    }

    /// Enforce the minimum size.
    pub fn clamp_size(&mut self) {
        self.width = clamp_len(self.width);
        self.height = clamp_len(self.height);
    }
}

fn clamp_len(v: f64) -> f64 {
    if v.is_finite() { v.max(MIN_SIZE) } else { MIN_SIZE }
}

/// Wire shape of an element; every geometric field is optional and
/// lenient so legacy or hand-edited records still load.
#[derive(Deserialize)]
struct ElementRecord {
    id: ElementId,
    #[serde(rename = "type")]
    kind: ElementKind,
    #[serde(default, deserialize_with = "lenient::number")]
    x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    rotation: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    opacity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    width: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    height: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    data_binding_source: Option<String>,
    #[serde(default, deserialize_with = "lenient::rules")]
    convert_values: RuleSet,
    #[serde(default, deserialize_with = "lenient::ranges")]
    ranges: Vec<Range>,
    #[serde(flatten)]
    props: Map<String, Value>,
}

impl From<ElementRecord> for Element {
    fn from(r: ElementRecord) -> Self {
        let (default_w, default_h) = r.kind.default_size();
        let size = |v: Option<f64>, default: f64| v.filter(|v| *v > 0.0).unwrap_or(default);
        Element {
            id: r.id,
            x: r.x.unwrap_or(0.0),
            y: r.y.unwrap_or(0.0),
            rotation: r.rotation.unwrap_or(0.0),
            opacity: r.opacity.map(|o| o.clamp(0.0, 1.0)).unwrap_or(1.0),
            width: size(r.width, default_w),
            height: size(r.height, default_h),
            data_binding_source: r.data_binding_source,
            convert_values: r.convert_values,
            ranges: r.ranges,
            props: r.props,
            kind: r.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_string_ids_deserialize() {
        let a: Element = serde_json::from_value(json!({"id": 7, "type": "lamp"})).unwrap();
        let b: Element = serde_json::from_value(json!({"id": "7", "type": "lamp"})).unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn malformed_geometry_falls_back() {
        let el: Element = serde_json::from_value(json!({
            "id": "a",
            "type": "rectangle",
            "x": "12.5",
            "y": "oops",
            "opacity": 3,
            "width": -4
        }))
        .unwrap();
        assert_eq!(el.x, 12.5);
        assert_eq!(el.y, 0.0);
        assert_eq!(el.opacity, 1.0);
        assert_eq!(el.width, ElementKind::Rectangle.default_size().0);
    }

    #[test]
    fn type_specific_keys_land_in_props() {
        let el: Element = serde_json::from_value(json!({
            "id": "g",
            "type": "circular_gauge",
            "sweep_angle": 270,
            "convert_values": [
                {"operator": ">", "value": 10, "color": "#f00"},
                {"operator": "~", "value": 1}
            ],
            "ranges": [{"start": 0, "end": 50, "color": "green"}, {"start": "x"}]
        }))
        .unwrap();
        assert_eq!(el.props().num("sweep_angle"), Some(270.0));
        assert_eq!(el.convert_values.len(), 1);
        assert_eq!(el.ranges.len(), 1);
        assert!(!el.props.contains_key("ranges"));
    }

    #[test]
    fn serializes_back_to_flat_record() {
        let el = Element::new("r1".into(), ElementKind::Rectangle, 10.0, 20.0);
        let v = serde_json::to_value(&el).unwrap();
        assert_eq!(v["type"], "rectangle");
        assert_eq!(v["id"], "r1");
        assert!(v.get("convert_values").is_none());
        let back: Element = serde_json::from_value(v).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn clamp_size_enforces_minimum() {
        let mut el = Element::new("r".into(), ElementKind::Rectangle, 0.0, 0.0);
        el.width = 1.0;
        el.height = f64::NAN;
        el.clamp_size();
        assert_eq!((el.width, el.height), (MIN_SIZE, MIN_SIZE));
    }
}
