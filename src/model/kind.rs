//! Element types and the per-type property schema.

use std::fmt;

use serde_json::{Map, Value, json};

/// Every element type the canvas knows how to draw.
///
/// Types the engine does not recognize are kept as `Unknown` with their
/// original name so they round-trip and render as a diagnostic placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Rectangle,
    RoundedRectangle,
    Circle,
    Ellipse,
    Triangle,
    Diamond,
    Star,
    Line,
    Arrow,
    Pipe,
    Text,
    DigitalDisplay,
    Button,
    Switch,
    Lamp,
    Tank,
    Valve,
    Motor,
    Image,
    Icon,
    ProgressBar,
    Slider,
    VerticalGauge,
    HorizontalGauge,
    CircularGauge,
    BarChart,
    LineChart,
    PieChart,
    DonutChart,
    Unknown(String),
}

/// Style keys every visible element accepts.
const COMMON_KEYS: &[&str] = &["color", "bg_color", "border_color", "border_width"];

impl ElementKind {
    pub const ALL: [ElementKind; 29] = [
        ElementKind::Rectangle,
        ElementKind::RoundedRectangle,
        ElementKind::Circle,
        ElementKind::Ellipse,
        ElementKind::Triangle,
        ElementKind::Diamond,
        ElementKind::Star,
        ElementKind::Line,
        ElementKind::Arrow,
        ElementKind::Pipe,
        ElementKind::Text,
        ElementKind::DigitalDisplay,
        ElementKind::Button,
        ElementKind::Switch,
        ElementKind::Lamp,
        ElementKind::Tank,
        ElementKind::Valve,
        ElementKind::Motor,
        ElementKind::Image,
        ElementKind::Icon,
        ElementKind::ProgressBar,
        ElementKind::Slider,
        ElementKind::VerticalGauge,
        ElementKind::HorizontalGauge,
        ElementKind::CircularGauge,
        ElementKind::BarChart,
        ElementKind::LineChart,
        ElementKind::PieChart,
        ElementKind::DonutChart,
    ];

    /// Canonical snake_case name used in element records.
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::RoundedRectangle => "rounded_rectangle",
            ElementKind::Circle => "circle",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Triangle => "triangle",
            ElementKind::Diamond => "diamond",
            ElementKind::Star => "star",
            ElementKind::Line => "line",
            ElementKind::Arrow => "arrow",
            ElementKind::Pipe => "pipe",
            ElementKind::Text => "text",
            ElementKind::DigitalDisplay => "digital_display",
            ElementKind::Button => "button",
            ElementKind::Switch => "switch",
            ElementKind::Lamp => "lamp",
            ElementKind::Tank => "tank",
            ElementKind::Valve => "valve",
            ElementKind::Motor => "motor",
            ElementKind::Image => "image",
            ElementKind::Icon => "icon",
            ElementKind::ProgressBar => "progress_bar",
            ElementKind::Slider => "slider",
            ElementKind::VerticalGauge => "vertical_gauge",
            ElementKind::HorizontalGauge => "horizontal_gauge",
            ElementKind::CircularGauge => "circular_gauge",
            ElementKind::BarChart => "bar_chart",
            ElementKind::LineChart => "line_chart",
            ElementKind::PieChart => "pie_chart",
            ElementKind::DonutChart => "donut_chart",
            ElementKind::Unknown(name) => name,
        }
    }

    /// Parse a type name. Case, `_`, `-` and spaces are ignored, so
    /// `"Rectangle"`, `"rectangle"` and `"vertical-gauge"` all resolve.
    pub fn parse(name: &str) -> ElementKind {
        let folded: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "rectangle" | "rect" => ElementKind::Rectangle,
            "roundedrectangle" | "roundrect" => ElementKind::RoundedRectangle,
            "circle" => ElementKind::Circle,
            "ellipse" | "oval" => ElementKind::Ellipse,
            "triangle" => ElementKind::Triangle,
            "diamond" => ElementKind::Diamond,
            "star" => ElementKind::Star,
            "line" => ElementKind::Line,
            "arrow" => ElementKind::Arrow,
            "pipe" => ElementKind::Pipe,
            "text" | "label" => ElementKind::Text,
            "digitaldisplay" | "display" => ElementKind::DigitalDisplay,
            "button" => ElementKind::Button,
            "switch" | "toggle" => ElementKind::Switch,
            "lamp" | "indicator" => ElementKind::Lamp,
            "tank" => ElementKind::Tank,
            "valve" => ElementKind::Valve,
            "motor" => ElementKind::Motor,
            "image" => ElementKind::Image,
            "icon" => ElementKind::Icon,
            "progressbar" | "progress" => ElementKind::ProgressBar,
            "slider" => ElementKind::Slider,
            "verticalgauge" => ElementKind::VerticalGauge,
            "horizontalgauge" => ElementKind::HorizontalGauge,
            "circulargauge" | "gauge" => ElementKind::CircularGauge,
            "barchart" => ElementKind::BarChart,
            "linechart" => ElementKind::LineChart,
            "piechart" | "pie" => ElementKind::PieChart,
            "donutchart" | "donut" => ElementKind::DonutChart,
            _ => ElementKind::Unknown(name.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ElementKind::Unknown(_))
    }

    /// Default width/height for a freshly created element.
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            ElementKind::Line | ElementKind::Arrow => (120.0, 10.0),
            ElementKind::Pipe => (160.0, 16.0),
            ElementKind::Text => (120.0, 30.0),
            ElementKind::DigitalDisplay => (120.0, 40.0),
            ElementKind::Button => (100.0, 36.0),
            ElementKind::Switch => (60.0, 30.0),
            ElementKind::Lamp | ElementKind::Circle => (40.0, 40.0),
            ElementKind::Tank => (80.0, 140.0),
            ElementKind::ProgressBar | ElementKind::Slider => (160.0, 20.0),
            ElementKind::VerticalGauge => (40.0, 160.0),
            ElementKind::HorizontalGauge => (160.0, 40.0),
            ElementKind::CircularGauge => (160.0, 160.0),
            ElementKind::BarChart | ElementKind::LineChart => (300.0, 200.0),
            ElementKind::PieChart | ElementKind::DonutChart => (200.0, 200.0),
            _ => (100.0, 80.0),
        }
    }

    /// Type-specific property keys (excluding the common style keys).
    pub fn property_keys(&self) -> &'static [&'static str] {
        match self {
            ElementKind::Rectangle | ElementKind::RoundedRectangle => &["corner_radius", "text"],
            ElementKind::Star => &["points", "inner_ratio"],
            ElementKind::Line => &["stroke_width"],
            ElementKind::Arrow => &["stroke_width", "arrow_size"],
            ElementKind::Pipe => &["stroke_width", "flow", "flow_color"],
            ElementKind::Text => &["text", "font_size", "align"],
            ElementKind::DigitalDisplay => &["decimals", "unit", "font_size", "current_value"],
            ElementKind::Button => &["text", "font_size", "corner_radius"],
            ElementKind::Switch | ElementKind::Lamp => &["on_color", "off_color", "current_value"],
            ElementKind::Tank => &["min", "max", "fill_color", "current_value"],
            ElementKind::Image => &["src"],
            ElementKind::Icon => &["icon"],
            ElementKind::ProgressBar | ElementKind::Slider => {
                &["min", "max", "track_color", "current_value"]
            }
            ElementKind::VerticalGauge | ElementKind::HorizontalGauge => &[
                "min",
                "max",
                "decimals",
                "unit",
                "use_gradient",
                "marker_color",
                "current_value",
            ],
            ElementKind::CircularGauge => &[
                "min",
                "max",
                "sweep_angle",
                "start_angle",
                "auto_start_angle",
                "min_thickness",
                "max_thickness",
                "needle_color",
                "custom_labels",
                "decimals",
                "unit",
                "current_value",
            ],
            ElementKind::BarChart => &["data", "y_min", "y_max", "bar_thickness", "divisions"],
            ElementKind::LineChart => {
                &["data", "mode", "y_min", "y_max", "tension", "line_width", "divisions"]
            }
            ElementKind::PieChart => &["data", "show_labels"],
            ElementKind::DonutChart => &["data", "inner_radius", "show_labels"],
            ElementKind::Circle
            | ElementKind::Ellipse
            | ElementKind::Triangle
            | ElementKind::Diamond
            | ElementKind::Valve
            | ElementKind::Motor
            | ElementKind::Unknown(_) => &[],
        }
    }

    /// Every key the property editor should offer for this type.
    pub fn all_property_keys(&self) -> Vec<&'static str> {
        let mut keys = COMMON_KEYS.to_vec();
        keys.extend_from_slice(self.property_keys());
        keys
    }

    /// Property bag for a freshly dropped element.
    pub fn default_props(&self) -> Map<String, Value> {
        let bag = match self {
            ElementKind::RoundedRectangle => json!({"corner_radius": 12}),
            ElementKind::Star => json!({"points": 5, "inner_ratio": 0.5}),
            ElementKind::Line | ElementKind::Arrow => json!({"stroke_width": 2}),
            ElementKind::Pipe => json!({"stroke_width": 12, "flow": false}),
            ElementKind::Text => json!({"text": "Text", "font_size": 16}),
            ElementKind::DigitalDisplay => json!({"decimals": 1, "unit": "", "current_value": 0}),
            ElementKind::Button => json!({"text": "Button", "corner_radius": 6}),
            ElementKind::Switch | ElementKind::Lamp => {
                json!({"on_color": "#22c55e", "off_color": "#6b7280", "current_value": false})
            }
            ElementKind::Tank | ElementKind::ProgressBar | ElementKind::Slider => {
                json!({"min": 0, "max": 100, "current_value": 0})
            }
            ElementKind::VerticalGauge | ElementKind::HorizontalGauge => {
                json!({"min": 0, "max": 100, "decimals": 1, "current_value": 0})
            }
            ElementKind::CircularGauge => json!({
                "min": 0,
                "max": 100,
                "sweep_angle": 300,
                "min_thickness": 4,
                "max_thickness": 16,
                "decimals": 1,
                "current_value": 0
            }),
            ElementKind::BarChart | ElementKind::LineChart => {
                json!({"data": [{"label": "A", "value": 10}, {"label": "B", "value": 20}]})
            }
            ElementKind::PieChart => json!({"data": [], "show_labels": true}),
            ElementKind::DonutChart => json!({"data": [], "inner_radius": "50%", "show_labels": true}),
            _ => json!({}),
        };
        match bag {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl From<String> for ElementKind {
    fn from(name: String) -> Self {
        ElementKind::parse(&name)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_kind() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::parse(kind.name()), kind);
        }
    }

    #[test]
    fn parse_is_forgiving() {
        assert_eq!(ElementKind::parse("Rectangle"), ElementKind::Rectangle);
        assert_eq!(ElementKind::parse("vertical-gauge"), ElementKind::VerticalGauge);
        assert_eq!(ElementKind::parse("BarChart"), ElementKind::BarChart);
    }

    #[test]
    fn unknown_keeps_its_name() {
        let kind = ElementKind::parse("Hologram");
        assert_eq!(kind, ElementKind::Unknown("Hologram".into()));
        assert_eq!(kind.to_string(), "Hologram");
        assert!(!kind.is_known());
    }

    #[test]
    fn schema_includes_common_keys() {
        let keys = ElementKind::CircularGauge.all_property_keys();
        assert!(keys.contains(&"color"));
        assert!(keys.contains(&"sweep_angle"));
    }

    #[test]
    fn default_props_are_objects() {
        for kind in ElementKind::ALL {
            let _ = kind.default_props();
        }
        assert_eq!(ElementKind::CircularGauge.default_props()["sweep_angle"], 300);
    }
}
