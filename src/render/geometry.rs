//! Geometry functions: gauge, chart and outline math
//!
//! Everything here is a pure function of its arguments. Coordinates are
//! element-local with the origin at the element's top-left corner and y
//! growing downward.

use glam::{DVec2, dvec2};
use serde_json::Value;

use crate::model::{Props, Range, coerce_number, is_truthy};
use crate::types::{Degrees, Domain, Rect, polar};

use super::defaults;
use super::types::GradientStop;

// ============================================================================
// Value formatting
// ============================================================================

/// Format a gauge/display value with a fixed number of decimals and an
/// optional unit suffix.
pub fn format_value(value: f64, decimals: usize, unit: &str) -> String {
    let text = format!("{value:.decimals$}");
    let unit = unit.trim();
    if unit.is_empty() { text } else { format!("{text} {unit}") }
}

/// `decimals` property, clamped to something printable.
pub fn decimals(props: &Props<'_>) -> usize {
    props
        .num("decimals")
        .filter(|d| *d >= 0.0)
        .map(|d| (d.round() as usize).min(10))
        .unwrap_or(defaults::DECIMALS)
}

// ============================================================================
// Outlines
// ============================================================================

pub fn triangle(size: DVec2) -> Vec<DVec2> {
    vec![dvec2(size.x / 2.0, 0.0), dvec2(size.x, size.y), dvec2(0.0, size.y)]
}

pub fn diamond(size: DVec2) -> Vec<DVec2> {
    let c = size / 2.0;
    vec![dvec2(c.x, 0.0), dvec2(size.x, c.y), dvec2(c.x, size.y), dvec2(0.0, c.y)]
}

/// Star inscribed in the element box, first point straight up.
pub fn star(size: DVec2, points: usize, inner_ratio: f64) -> Vec<DVec2> {
    let (min, max) = defaults::STAR_POINTS_RANGE;
    let points = points.clamp(min, max);
    let center = size / 2.0;
    let outer = center;
    let inner = outer * inner_ratio.clamp(0.05, 1.0);
    let step = 180.0 / points as f64;
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let dir = Degrees(-90.0 + step * i as f64).unit();
            center + dir * r
        })
        .collect()
}

/// Two triangles meeting in the middle.
pub fn bow_tie(size: DVec2) -> [Vec<DVec2>; 2] {
    let c = size / 2.0;
    [
        vec![dvec2(0.0, 0.0), c, dvec2(0.0, size.y)],
        vec![dvec2(size.x, 0.0), c, dvec2(size.x, size.y)],
    ]
}

/// Arrowhead triangle at `to` pointing away from `from`.
pub fn arrowhead(from: DVec2, to: DVec2, size: f64) -> [DVec2; 3] {
    let dir = (to - from).try_normalize().unwrap_or(DVec2::X);
    let normal = dir.perp();
    let base = to - dir * size;
    [to, base + normal * (size / 2.0), base - normal * (size / 2.0)]
}

// ============================================================================
// Linear gauges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Offset of the value marker along the gauge's long axis, measured from
/// the top (vertical) or left (horizontal) edge.
///
/// Vertical gauges are inverted because screen y grows downward: the
/// domain minimum sits at the bottom.
pub fn linear_marker(domain: Domain, value: f64, length: f64, orientation: Orientation) -> f64 {
    let ratio = domain.ratio(value);
    match orientation {
        Orientation::Vertical => (1.0 - ratio) * length,
        Orientation::Horizontal => ratio * length,
    }
}

/// A coloured span along a gauge, as domain ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub from: f64,
    pub to: f64,
    pub color: String,
}

/// Clamp each range to the domain, dropping empty or inverted ones.
pub fn range_bands(ranges: &[Range], domain: Domain) -> Vec<Band> {
    ranges
        .iter()
        .filter_map(|r| {
            let start = domain.clamp(r.start);
            let end = domain.clamp(r.end);
            (start < end).then(|| Band {
                from: domain.ratio(start),
                to: domain.ratio(end),
                color: r.color.clone(),
            })
        })
        .collect()
}

/// The part of `track` a band covers.
pub fn band_rect(band: &Band, track: Rect, orientation: Orientation) -> Rect {
    match orientation {
        Orientation::Vertical => Rect::new(
            track.x,
            track.y + (1.0 - band.to) * track.height,
            track.width,
            (band.to - band.from) * track.height,
        ),
        Orientation::Horizontal => Rect::new(
            track.x + band.from * track.width,
            track.y,
            (band.to - band.from) * track.width,
            track.height,
        ),
    }
}

/// Gradient stops for a gauge background.
///
/// Usable ranges (non-empty after clamping) are sorted by start and each
/// contributes one stop at its normalized start. No usable range gives a
/// flat two-stop gradient of `default_color`; a single stop is mirrored to
/// the opposite end so the gradient always has two stops.
pub fn gradient_stops(ranges: &[Range], domain: Domain, default_color: &str) -> Vec<GradientStop> {
    let mut usable: Vec<&Range> = ranges
        .iter()
        .filter(|r| domain.clamp(r.start) < domain.clamp(r.end))
        .collect();
    usable.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut stops: Vec<GradientStop> = usable
        .iter()
        .map(|r| GradientStop::new(domain.ratio(r.start), r.color.clone()))
        .collect();

    match stops.len() {
        0 => vec![
            GradientStop::new(0.0, default_color),
            GradientStop::new(1.0, default_color),
        ],
        1 => {
            let only = stops.remove(0);
            if only.offset < 0.5 {
                let mirror = GradientStop::new(1.0, only.color.clone());
                vec![only, mirror]
            } else {
                let mirror = GradientStop::new(0.0, only.color.clone());
                vec![mirror, only]
            }
        }
        _ => stops,
    }
}

// ============================================================================
// Circular gauge
// ============================================================================

/// Start angle that centres the sweep's gap on the bottom of the dial.
pub fn symmetric_start_angle(sweep: f64) -> Degrees {
    let gap = 360.0 - sweep.abs();
    Degrees(90.0 + gap / 2.0)
}

/// Where a circular gauge's start angle came from.
///
/// An explicit numeric `start_angle` property wins; the symmetric default
/// is used when the property is missing or not a number, or when
/// `auto_start_angle` is set (which lets an editor keep a previously
/// computed angle in the record without pinning it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartAngle {
    Explicit(Degrees),
    Symmetric(Degrees),
}

impl StartAngle {
    pub fn resolve(props: &Props<'_>, sweep: f64) -> Self {
        let auto = props.bool_or("auto_start_angle", false);
        match props.num("start_angle") {
            Some(angle) if !auto => StartAngle::Explicit(Degrees(angle)),
            _ => StartAngle::Symmetric(symmetric_start_angle(sweep)),
        }
    }

    pub fn degrees(self) -> Degrees {
        match self {
            StartAngle::Explicit(d) | StartAngle::Symmetric(d) => d,
        }
    }
}

/// Dial geometry of a circular gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGauge {
    pub center: DVec2,
    pub radius: f64,
    pub start: Degrees,
    pub sweep: f64,
    pub min_thickness: f64,
    pub max_thickness: f64,
}

impl ArcGauge {
    /// Build the dial for an element of `size` from its properties.
    pub fn from_props(props: &Props<'_>, size: DVec2) -> Self {
        let sweep = props.num("sweep_angle").unwrap_or(defaults::SWEEP_ANGLE);
        let radius = size.x.min(size.y) / 2.0;
        let min_thickness = props.len_or("min_thickness", defaults::MIN_THICKNESS).min(radius);
        let max_thickness = props.len_or("max_thickness", defaults::MAX_THICKNESS).min(radius);
        ArcGauge {
            center: size / 2.0,
            radius,
            start: StartAngle::resolve(props, sweep).degrees(),
            sweep,
            min_thickness,
            max_thickness,
        }
    }

    /// Ring thickness at sweep fraction `t`.
    pub fn thickness_at(&self, t: f64) -> f64 {
        self.min_thickness + (self.max_thickness - self.min_thickness) * t
    }

    pub fn angle_at(&self, t: f64) -> Degrees {
        self.start + Degrees(self.sweep * t)
    }

    pub fn needle_angle(&self, domain: Domain, value: f64) -> Degrees {
        self.angle_at(domain.ratio(value))
    }

    /// Closed tapered polygon covering sweep fractions `from..to`: the
    /// outer arc sampled forward, then the inner boundary sampled back.
    ///
    /// `samples` is the sample count of a full sweep; shorter segments get
    /// proportionally fewer (at least one step).
    pub fn tapered_segment(&self, from: f64, to: f64, samples: usize) -> Vec<DVec2> {
        let steps = ((samples as f64 * (to - from).abs()).ceil() as usize).max(1);
        let mut outer = Vec::with_capacity((steps + 1) * 2);
        let mut inner = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            let t = from + (to - from) * (i as f64 / steps as f64);
            let angle = self.angle_at(t);
            outer.push(polar(self.center, self.radius, angle));
            inner.push(polar(self.center, self.radius - self.thickness_at(t), angle));
        }
        outer.extend(inner.into_iter().rev());
        outer
    }

    /// Where a label for sweep fraction `t` goes: inside the ring, clear of
    /// the local thickness by `margin`.
    pub fn label_position(&self, t: f64, margin: f64) -> DVec2 {
        let r = (self.radius - self.thickness_at(t) - margin).max(0.0);
        polar(self.center, r, self.angle_at(t))
    }
}

/// A labelled value on a gauge scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleLabel {
    pub value: f64,
    pub text: String,
}

/// `custom_labels` entries, either bare numbers or `{value, label}`
/// objects. Without usable entries the scale ends are labelled.
pub fn scale_labels(props: &Props<'_>, domain: Domain, decimals: usize) -> Vec<ScaleLabel> {
    let labels: Vec<ScaleLabel> = props
        .array("custom_labels")
        .iter()
        .filter_map(|entry| {
            let (value, text) = match entry {
                Value::Object(obj) => {
                    let value = obj.get("value").and_then(coerce_number)?;
                    let text = obj
                        .get("label")
                        .or_else(|| obj.get("text"))
                        .and_then(|v| match v {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        });
                    (value, text)
                }
                other => (coerce_number(other)?, None),
            };
            let text = text.unwrap_or_else(|| format_value(value, decimals, ""));
            Some(ScaleLabel { value, text })
        })
        .collect();

    if labels.is_empty() {
        [domain.min, domain.max]
            .into_iter()
            .map(|value| ScaleLabel {
                value,
                text: format_value(value, decimals, ""),
            })
            .collect()
    } else {
        labels
    }
}

// ============================================================================
// Charts
// ============================================================================

/// One chart data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub label: String,
    /// Numeric value; 0 when the raw value does not coerce.
    pub value: f64,
    /// Truthiness of the raw value, for state charts.
    pub on: bool,
    pub color: Option<String>,
}

/// Parse a `data` array: bare values or `{label, value, color}` objects.
pub fn chart_data(items: &[Value]) -> Vec<Datum> {
    items
        .iter()
        .map(|item| match item {
            Value::Object(obj) => {
                let raw = obj.get("value").unwrap_or(&Value::Null);
                Datum {
                    label: obj
                        .get("label")
                        .or_else(|| obj.get("name"))
                        .map(crate::model::value_to_text)
                        .unwrap_or_default(),
                    value: coerce_number(raw).unwrap_or(0.0),
                    on: is_truthy(raw),
                    color: obj
                        .get("color")
                        .and_then(Value::as_str)
                        .filter(|c| !c.trim().is_empty())
                        .map(str::to_string),
                }
            }
            raw => Datum {
                label: String::new(),
                value: coerce_number(raw).unwrap_or(0.0),
                on: is_truthy(raw),
                color: None,
            },
        })
        .collect()
}

/// Plot area inside a chart element, leaving room for axis labels.
pub fn plot_area(size: DVec2) -> Rect {
    let (left, top, right, bottom) = defaults::CHART_PADDING;
    Rect::new(
        left,
        top,
        (size.x - left - right).max(1.0),
        (size.y - top - bottom).max(1.0),
    )
}

/// Screen y of `value` in the plot area.
pub fn y_for(domain: Domain, plot: Rect, value: f64) -> f64 {
    plot.y + plot.height * (1.0 - domain.ratio(value))
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    finite.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Bar chart y-domain: manual bounds where given, otherwise
/// `[min(0, lowest), highest * 1.1]`.
pub fn bar_domain(values: &[f64], y_min: Option<f64>, y_max: Option<f64>) -> Domain {
    let (auto_min, auto_max) = match extent(values) {
        Some((lo, hi)) => (lo.min(0.0), hi * defaults::AUTO_HEADROOM),
        None => (0.0, 1.0),
    };
    Domain::new(y_min.unwrap_or(auto_min), y_max.unwrap_or(auto_max))
}

pub fn slot_width(chart_width: f64, count: usize) -> f64 {
    if count == 0 {
        chart_width
    } else {
        chart_width / count as f64
    }
}

/// Bar width: the explicit thickness, capped at 80% of the slot.
pub fn bar_width(thickness: Option<f64>, slot: f64) -> f64 {
    let cap = defaults::BAR_SLOT_FILL * slot;
    match thickness.filter(|t| *t > 0.0) {
        Some(t) => t.min(cap),
        None => cap,
    }
}

/// Bar rectangles, each centred in its slot and grown from the zero line
/// (or the nearest domain edge when zero is outside the domain).
pub fn bar_rects(values: &[f64], domain: Domain, plot: Rect, thickness: Option<f64>) -> Vec<Rect> {
    let slot = slot_width(plot.width, values.len());
    let width = bar_width(thickness, slot);
    let baseline = y_for(domain, plot, domain.clamp(0.0));
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = plot.x + slot * i as f64 + (slot - width) / 2.0;
            let y = y_for(domain, plot, *v);
            Rect::new(x, y.min(baseline), width, (y - baseline).abs())
        })
        .collect()
}

/// Axis tick values: `divisions + 1` evenly spaced values, or
/// `{min, mid, max}` without a usable division count. Divisions are
/// capped at [`defaults::MAX_DIVISIONS`].
pub fn ticks(domain: Domain, divisions: Option<usize>) -> Vec<f64> {
    match divisions.filter(|d| *d > 0).map(|d| d.min(defaults::MAX_DIVISIONS)) {
        Some(n) => (0..=n).map(|i| domain.lerp(i as f64 / n as f64)).collect(),
        None => vec![domain.min, domain.lerp(0.5), domain.max],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    #[default]
    Linear,
    Step,
    Spline,
    /// Step rendering over a fixed `[0, 1]` domain with ON/OFF labels.
    State,
}

impl LineMode {
    pub fn parse(mode: &str) -> Self {
        match mode.trim().to_ascii_lowercase().as_str() {
            "step" | "stepped" => LineMode::Step,
            "spline" | "smooth" | "curve" => LineMode::Spline,
            "state" | "digital" | "boolean" => LineMode::State,
            _ => LineMode::Linear,
        }
    }
}

/// Line chart y-domain.
///
/// State charts use `[0, 1]`. Otherwise manual bounds win; the automatic
/// domain pads the data by 10% of its span and floors at 0 unless some
/// value is negative.
pub fn line_domain(values: &[f64], y_min: Option<f64>, y_max: Option<f64>, mode: LineMode) -> Domain {
    if mode == LineMode::State {
        return Domain::new(0.0, 1.0);
    }
    let (auto_min, auto_max) = match extent(values) {
        Some((lo, hi)) => {
            let pad = (hi - lo) * defaults::AUTO_PADDING;
            let min = if lo >= 0.0 { 0.0 } else { lo - pad };
            (min, hi + pad)
        }
        None => (0.0, 1.0),
    };
    Domain::new(y_min.unwrap_or(auto_min), y_max.unwrap_or(auto_max))
}

/// Points evenly spaced by index across the plot width.
pub fn line_points(values: &[f64], domain: Domain, plot: Rect) -> Vec<DVec2> {
    let n = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = if n > 1 {
                plot.x + plot.width * i as f64 / (n - 1) as f64
            } else {
                plot.center().x
            };
            dvec2(x, y_for(domain, plot, *v))
        })
        .collect()
}

/// Horizontal run to each new x, then vertical run to its y.
pub fn step_points(points: &[DVec2]) -> Vec<DVec2> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            let prev = out.last().copied().unwrap_or(*p);
            out.push(dvec2(p.x, prev.y));
        }
        out.push(*p);
    }
    out
}

/// Cubic Bézier control points for a cardinal spline through `points`.
/// Returns one `(c1, c2, end)` triple per segment.
pub fn spline_segments(points: &[DVec2], tension: f64) -> Vec<(DVec2, DVec2, DVec2)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let k = tension / 3.0;
    (0..n - 1)
        .map(|i| {
            let p0 = points[i.saturating_sub(1)];
            let p1 = points[i];
            let p2 = points[i + 1];
            let p3 = points[(i + 2).min(n - 1)];
            (p1 + (p2 - p0) * k, p2 - (p3 - p1) * k, p2)
        })
        .collect()
}

/// One pie or donut slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Index of the datum this slice shows.
    pub index: usize,
    pub start: Degrees,
    pub end: Degrees,
    pub label_anchor: DVec2,
}

/// Slices laid out cumulatively from 0°, each `value / total * 360` wide.
/// Non-positive values get no slice.
pub fn pie_slices(values: &[f64], center: DVec2, outer: f64, inner: f64) -> Vec<Slice> {
    let weight = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    let total: f64 = values.iter().copied().map(weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let label_radius = inner + (outer - inner) / 2.0;
    let mut cursor = 0.0;
    let mut slices = Vec::with_capacity(values.len());
    for (index, v) in values.iter().copied().enumerate() {
        let v = weight(v);
        if v == 0.0 {
            continue;
        }
        let sweep = v / total * 360.0;
        let start = Degrees(cursor);
        let end = Degrees(cursor + sweep);
        let mid = Degrees(cursor + sweep / 2.0);
        slices.push(Slice {
            index,
            start,
            end,
            label_anchor: polar(center, label_radius, mid),
        });
        cursor += sweep;
    }
    slices
}

/// Donut inner radius from an absolute number or an `"NN%"` string of the
/// outer radius. Falls back to `default` when missing or unparseable.
pub fn inner_radius(value: Option<&Value>, outer: f64, default: &str) -> f64 {
    let parse = |v: &Value| -> Option<f64> {
        let r = match v {
            Value::String(s) if s.trim().ends_with('%') => {
                let pct = s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
                outer * pct / 100.0
            }
            other => coerce_number(other)?,
        };
        r.is_finite().then(|| r.clamp(0.0, outer))
    };
    value
        .and_then(parse)
        .or_else(|| parse(&Value::String(default.to_string())))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use serde_json::{Map, json};

    fn bag(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn range(start: f64, end: f64, color: &str) -> Range {
        Range {
            start,
            end,
            color: color.to_string(),
        }
    }

    // ==================== Linear gauge ====================

    #[test]
    fn vertical_marker_is_inverted() {
        let d = Domain::new(0.0, 100.0);
        assert_eq!(linear_marker(d, 75.0, 160.0, Orientation::Vertical), 40.0);
        assert_eq!(linear_marker(d, 75.0, 160.0, Orientation::Horizontal), 120.0);
        assert_eq!(linear_marker(d, 500.0, 160.0, Orientation::Vertical), 0.0);
    }

    #[test]
    fn bands_are_clamped_and_empty_ones_skipped() {
        let d = Domain::new(0.0, 100.0);
        let bands = range_bands(
            &[
                range(-20.0, 30.0, "green"),
                range(50.0, 50.0, "x"),
                range(80.0, 60.0, "y"),
                range(90.0, 200.0, "red"),
            ],
            d,
        );
        assert_eq!(bands.len(), 2);
        assert_eq!((bands[0].from, bands[0].to), (0.0, 0.3));
        assert_eq!((bands[1].from, bands[1].to), (0.9, 1.0));
    }

    #[test]
    fn band_rect_runs_bottom_up_when_vertical() {
        let band = Band {
            from: 0.0,
            to: 0.25,
            color: "g".into(),
        };
        let r = band_rect(&band, Rect::new(0.0, 0.0, 10.0, 100.0), Orientation::Vertical);
        assert_eq!(r, Rect::new(0.0, 75.0, 10.0, 25.0));
    }

    #[test]
    fn gradient_without_ranges_is_flat() {
        let stops = gradient_stops(&[], Domain::new(0.0, 100.0), "#ccc");
        assert_eq!(
            stops,
            vec![GradientStop::new(0.0, "#ccc"), GradientStop::new(1.0, "#ccc")]
        );
    }

    #[test]
    fn single_gradient_stop_is_mirrored() {
        let d = Domain::new(0.0, 100.0);
        let low = gradient_stops(&[range(30.0, 60.0, "red")], d, "#ccc");
        assert_eq!(
            low,
            vec![GradientStop::new(0.3, "red"), GradientStop::new(1.0, "red")]
        );
        let high = gradient_stops(&[range(70.0, 90.0, "red")], d, "#ccc");
        assert_eq!(
            high,
            vec![GradientStop::new(0.0, "red"), GradientStop::new(0.7, "red")]
        );
    }

    #[test]
    fn gradient_stops_are_sorted() {
        let d = Domain::new(0.0, 100.0);
        let stops = gradient_stops(
            &[range(60.0, 100.0, "red"), range(0.0, 60.0, "green"), range(5.0, 5.0, "x")],
            d,
            "#ccc",
        );
        let offsets: Vec<f64> = stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.6]);
        assert_eq!(stops[0].color, "green");
    }

    // ==================== Circular gauge ====================

    #[test]
    fn symmetric_start_for_300_degrees_is_120() {
        assert_eq!(symmetric_start_angle(300.0), Degrees(120.0));
        assert_eq!(symmetric_start_angle(-300.0), Degrees(120.0));
        assert_eq!(symmetric_start_angle(360.0), Degrees(90.0));
    }

    #[test]
    fn explicit_start_angle_wins_unless_auto() {
        let explicit = bag(json!({"start_angle": 135}));
        assert_eq!(
            StartAngle::resolve(&Props::new(&explicit), 300.0),
            StartAngle::Explicit(Degrees(135.0))
        );
        let auto = bag(json!({"start_angle": 135, "auto_start_angle": true}));
        assert_eq!(
            StartAngle::resolve(&Props::new(&auto), 300.0),
            StartAngle::Symmetric(Degrees(120.0))
        );
        let junk = bag(json!({"start_angle": "abc"}));
        assert_eq!(StartAngle::resolve(&Props::new(&junk), 270.0).degrees(), Degrees(135.0));
    }

    fn dial() -> ArcGauge {
        ArcGauge {
            center: dvec2(100.0, 100.0),
            radius: 100.0,
            start: Degrees(120.0),
            sweep: 300.0,
            min_thickness: 4.0,
            max_thickness: 16.0,
        }
    }

    #[test]
    fn taper_interpolates_thickness() {
        let g = dial();
        assert_eq!(g.thickness_at(0.0), 4.0);
        assert_eq!(g.thickness_at(1.0), 16.0);
        assert_eq!(g.thickness_at(0.5), 10.0);
    }

    #[test]
    fn tapered_segment_stitches_outer_then_inner() {
        let g = dial();
        let poly = g.tapered_segment(0.0, 1.0, 10);
        assert_eq!(poly.len(), 22);
        let first_outer = poly[0];
        let first_inner = poly[poly.len() - 1];
        assert_abs_diff_eq!(first_outer.distance(g.center), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first_inner.distance(g.center), 96.0, epsilon = 1e-9);
        let last_inner = poly[11];
        assert_abs_diff_eq!(last_inner.distance(g.center), 84.0, epsilon = 1e-9);
    }

    #[test]
    fn sub_segment_uses_same_taper() {
        let g = dial();
        let seg = g.tapered_segment(0.5, 0.75, 64);
        let steps = 16;
        assert_eq!(seg.len(), (steps + 1) * 2);
        let inner_start = seg[seg.len() - 1];
        assert_abs_diff_eq!(inner_start.distance(g.center), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn needle_follows_ratio() {
        let g = dial();
        let d = Domain::new(0.0, 100.0);
        assert_eq!(g.needle_angle(d, 0.0), Degrees(120.0));
        assert_eq!(g.needle_angle(d, 50.0), Degrees(270.0));
        assert_eq!(g.needle_angle(d, 1000.0), Degrees(420.0));
    }

    #[test]
    fn labels_sit_inside_the_ring() {
        let g = dial();
        let p = g.label_position(1.0, 6.0);
        assert_abs_diff_eq!(p.distance(g.center), 78.0, epsilon = 1e-9);
    }

    #[test]
    fn custom_labels_parse_both_forms() {
        let props = bag(json!({"custom_labels": [25, {"value": "50", "label": "HALF"}, {"label": "x"}]}));
        let labels = scale_labels(&Props::new(&props), Domain::new(0.0, 100.0), 1);
        assert_eq!(
            labels,
            vec![
                ScaleLabel { value: 25.0, text: "25.0".into() },
                ScaleLabel { value: 50.0, text: "HALF".into() },
            ]
        );
        let none = Map::new();
        let ends = scale_labels(&Props::new(&none), Domain::new(0.0, 100.0), 0);
        assert_eq!(ends[1].text, "100");
    }

    // ==================== Bar chart ====================

    #[test]
    fn bar_auto_domain_adds_headroom() {
        let d = bar_domain(&[10.0, 40.0, 25.0], None, None);
        assert_eq!(d.min, 0.0);
        assert_relative_eq!(d.max, 44.0, epsilon = 1e-9);
    }

    #[test]
    fn bar_domain_manual_and_degenerate() {
        let d = bar_domain(&[10.0], Some(5.0), Some(5.0));
        assert_eq!((d.min, d.max), (5.0, 6.0));
        let d = bar_domain(&[-10.0, 20.0], None, Some(50.0));
        assert_eq!((d.min, d.max), (-10.0, 50.0));
        let d = bar_domain(&[0.0, 0.0], None, None);
        assert_eq!(d.span(), 1.0);
    }

    #[test]
    fn bar_width_is_capped_by_slot() {
        let slot = slot_width(300.0, 3);
        assert_eq!(slot, 100.0);
        assert_eq!(bar_width(Some(40.0), slot), 40.0);
        assert_eq!(bar_width(Some(400.0), slot), 80.0);
        assert_eq!(bar_width(None, slot), 80.0);
    }

    #[test]
    fn bars_are_centred_and_grow_from_zero() {
        let plot = Rect::new(0.0, 0.0, 300.0, 100.0);
        let bars = bar_rects(&[50.0, -50.0], Domain::new(-100.0, 100.0), plot, Some(20.0));
        assert_eq!(bars[0], Rect::new(65.0, 25.0, 20.0, 25.0));
        assert_eq!(bars[1], Rect::new(215.0, 50.0, 20.0, 25.0));
    }

    #[test]
    fn ticks_by_division_or_default_three() {
        let d = Domain::new(0.0, 100.0);
        assert_eq!(ticks(d, Some(4)), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(ticks(d, None), vec![0.0, 50.0, 100.0]);
        assert_eq!(ticks(d, Some(0)), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn huge_division_count_is_capped() {
        let t = ticks(Domain::new(0.0, 100.0), Some(usize::MAX));
        assert_eq!(t.len(), defaults::MAX_DIVISIONS + 1);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[defaults::MAX_DIVISIONS], 100.0);
    }

    // ==================== Line chart ====================

    #[test]
    fn line_domain_pads_and_floors() {
        let d = line_domain(&[10.0, 20.0], None, None, LineMode::Linear);
        assert_eq!(d.min, 0.0);
        assert_relative_eq!(d.max, 21.0, epsilon = 1e-9);

        let d = line_domain(&[-10.0, -20.0], None, None, LineMode::Linear);
        assert_relative_eq!(d.min, -21.0, epsilon = 1e-9);
        assert_relative_eq!(d.max, -9.0, epsilon = 1e-9);

        let d = line_domain(&[5.0, 900.0], None, None, LineMode::State);
        assert_eq!((d.min, d.max), (0.0, 1.0));
    }

    #[test]
    fn points_are_evenly_spaced_by_index() {
        let plot = Rect::new(0.0, 0.0, 100.0, 50.0);
        let pts = line_points(&[0.0, 1.0, 0.0], Domain::new(0.0, 1.0), plot);
        assert_eq!(pts, vec![dvec2(0.0, 50.0), dvec2(50.0, 0.0), dvec2(100.0, 50.0)]);
        let single = line_points(&[1.0], Domain::new(0.0, 1.0), plot);
        assert_eq!(single, vec![dvec2(50.0, 0.0)]);
    }

    #[test]
    fn step_runs_horizontally_then_vertically() {
        let pts = [dvec2(0.0, 10.0), dvec2(5.0, 0.0), dvec2(10.0, 5.0)];
        assert_eq!(
            step_points(&pts),
            vec![
                dvec2(0.0, 10.0),
                dvec2(5.0, 10.0),
                dvec2(5.0, 0.0),
                dvec2(10.0, 0.0),
                dvec2(10.0, 5.0),
            ]
        );
    }

    #[test]
    fn spline_segments_end_on_data_points() {
        let pts = [dvec2(0.0, 0.0), dvec2(10.0, 10.0), dvec2(20.0, 0.0)];
        let segs = spline_segments(&pts, 0.5);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].2, pts[1]);
        assert_eq!(segs[1].2, pts[2]);
        assert!(spline_segments(&pts[..1], 0.5).is_empty());
    }

    #[test]
    fn line_mode_parse() {
        assert_eq!(LineMode::parse("STEP"), LineMode::Step);
        assert_eq!(LineMode::parse("state"), LineMode::State);
        assert_eq!(LineMode::parse("bogus"), LineMode::Linear);
    }

    // ==================== Pie / donut ====================

    #[test]
    fn slices_accumulate_from_zero() {
        let slices = pie_slices(&[1.0, 1.0, 2.0], DVec2::ZERO, 100.0, 0.0);
        assert_eq!(slices.len(), 3);
        assert_eq!((slices[0].start, slices[0].end), (Degrees(0.0), Degrees(90.0)));
        assert_eq!((slices[2].start, slices[2].end), (Degrees(180.0), Degrees(360.0)));
    }

    #[test]
    fn slice_label_sits_mid_ring() {
        let slices = pie_slices(&[1.0], DVec2::ZERO, 100.0, 50.0);
        let anchor = slices[0].label_anchor;
        assert_abs_diff_eq!(anchor.length(), 75.0, epsilon = 1e-9);
        assert_abs_diff_eq!(anchor.x, -75.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_or_zero_pie_has_no_slices() {
        assert!(pie_slices(&[], DVec2::ZERO, 10.0, 0.0).is_empty());
        assert!(pie_slices(&[0.0, -3.0], DVec2::ZERO, 10.0, 0.0).is_empty());
        let slices = pie_slices(&[0.0, 5.0], DVec2::ZERO, 10.0, 0.0);
        assert_eq!(slices[0].index, 1);
    }

    #[test]
    fn inner_radius_forms() {
        assert_eq!(inner_radius(Some(&json!("25%")), 80.0, "50%"), 20.0);
        assert_eq!(inner_radius(Some(&json!(30)), 80.0, "50%"), 30.0);
        assert_eq!(inner_radius(Some(&json!(300)), 80.0, "50%"), 80.0);
        assert_eq!(inner_radius(Some(&json!("wide")), 80.0, "50%"), 40.0);
        assert_eq!(inner_radius(None, 80.0, "50%"), 40.0);
    }

    // ==================== Misc ====================

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(75.0, 1, ""), "75.0");
        assert_eq!(format_value(3.14159, 2, "bar"), "3.14 bar");
        assert_eq!(format_value(2.4, 0, " "), "2");
    }

    #[test]
    fn star_alternates_radii() {
        let pts = star(dvec2(100.0, 100.0), 5, 0.5);
        assert_eq!(pts.len(), 10);
        assert_abs_diff_eq!(pts[0].x, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[0].y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[1].distance(dvec2(50.0, 50.0)), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn star_point_count_is_bounded() {
        assert_eq!(star(dvec2(10.0, 10.0), usize::MAX, 0.5).len(), 128);
        assert_eq!(star(dvec2(10.0, 10.0), 0, 0.5).len(), 6);
    }

    #[test]
    fn arrowhead_points_along_the_line() {
        let head = arrowhead(dvec2(0.0, 0.0), dvec2(10.0, 0.0), 4.0);
        assert_eq!(head[0], dvec2(10.0, 0.0));
        assert_eq!(head[1].x, 6.0);
        assert_eq!(head[2].x, 6.0);
    }
}
