//! Default colours, sizes and layout constants (scene units are pixels)

use crate::model::ElementKind;

/// Paint value that draws nothing.
pub const NONE: &str = "none";

pub const STROKE: &str = "#1f2937";
pub const STROKE_WIDTH: f64 = 1.0;
pub const FONT_SIZE: f64 = 14.0;
pub const FONT_FAMILY: &str = "sans-serif";
pub const TEXT_COLOR: &str = "#111827";

pub const SHAPE_FILL: &str = "#3b82f6";
pub const CONTROL_FILL: &str = "#e5e7eb";
pub const GAUGE_TRACK: &str = "#e5e7eb";
pub const GAUGE_FILL: &str = "#10b981";
pub const MARKER: &str = "#ef4444";
pub const DISPLAY_BG: &str = "#111827";
pub const DISPLAY_TEXT: &str = "#22c55e";
pub const PIPE: &str = "#9ca3af";
pub const TANK_LIQUID: &str = "#38bdf8";

/// Slice colours for pie and donut charts without an explicit colour.
pub const PALETTE: [&str; 8] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

pub const DECIMALS: usize = 1;
pub const ARROW_SIZE: f64 = 10.0;
pub const STAR_POINTS: usize = 5;
pub const STAR_POINTS_RANGE: (usize, usize) = (3, 64);
pub const STAR_INNER_RATIO: f64 = 0.5;
pub const LINE_TENSION: f64 = 0.5;
pub const DONUT_INNER: &str = "50%";

pub const SWEEP_ANGLE: f64 = 300.0;
pub const MIN_THICKNESS: f64 = 4.0;
pub const MAX_THICKNESS: f64 = 16.0;
/// Fraction of the free radius the needle covers.
pub const NEEDLE_LENGTH: f64 = 0.85;

/// Gauge bar thickness as a fraction of the short side.
pub const LINEAR_TRACK: f64 = 0.5;

/// Plot-area padding inside chart elements: (left, top, right, bottom).
pub const CHART_PADDING: (f64, f64, f64, f64) = (36.0, 8.0, 8.0, 20.0);
pub const BAR_SLOT_FILL: f64 = 0.8;
pub const AUTO_HEADROOM: f64 = 1.10;
pub const AUTO_PADDING: f64 = 0.10;
/// Upper bound on axis divisions.
pub const MAX_DIVISIONS: usize = 100;

pub const PAGE_FILL: &str = "#ffffff";
pub const PAGE_STROKE: &str = "#9ca3af";
pub const GRID: &str = "#e5e7eb";
pub const SELECTION: &str = "#2563eb";
pub const PLACEHOLDER: &str = "#dc2626";
pub const DASH: f64 = 4.0;

/// Primary colour of a kind when neither a rule nor the element sets one.
pub fn primary_color(kind: &ElementKind) -> &'static str {
    match kind {
        ElementKind::Line | ElementKind::Arrow => STROKE,
        ElementKind::Pipe => PIPE,
        ElementKind::Text | ElementKind::Button => TEXT_COLOR,
        ElementKind::DigitalDisplay => DISPLAY_TEXT,
        ElementKind::Tank => TANK_LIQUID,
        ElementKind::VerticalGauge | ElementKind::HorizontalGauge => MARKER,
        ElementKind::CircularGauge => MARKER,
        ElementKind::ProgressBar | ElementKind::Slider => GAUGE_FILL,
        ElementKind::Switch | ElementKind::Lamp => GAUGE_FILL,
        ElementKind::Unknown(_) => PLACEHOLDER,
        _ => SHAPE_FILL,
    }
}

/// Background colour of a kind, for kinds that draw one.
pub fn background_color(kind: &ElementKind) -> Option<&'static str> {
    match kind {
        ElementKind::DigitalDisplay => Some(DISPLAY_BG),
        ElementKind::Button | ElementKind::Switch => Some(CONTROL_FILL),
        ElementKind::Tank
        | ElementKind::ProgressBar
        | ElementKind::Slider
        | ElementKind::VerticalGauge
        | ElementKind::HorizontalGauge
        | ElementKind::CircularGauge => Some(GAUGE_TRACK),
        _ => None,
    }
}

/// Grid spacing for a zoom factor.
pub fn grid_spacing(zoom: f64) -> f64 {
    if zoom < 0.5 {
        100.0
    } else if zoom < 1.5 {
        40.0
    } else {
        10.0
    }
}
