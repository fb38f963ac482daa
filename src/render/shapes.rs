//! Per-kind geometry
//!
//! Each element family is its own type that knows how to turn an
//! [`ElementView`] into primitives. Dispatch goes through the
//! [`ShapeGeometry`] enum, looked up by [`geometry_for`].

use enum_dispatch::enum_dispatch;
use glam::dvec2;

use crate::model::ElementKind;
use crate::types::{Rect, polar};

use super::context::ElementView;
use super::defaults;
use super::geometry::{
    self, ArcGauge, LineMode, Orientation, band_rect, bar_domain, bar_rects, chart_data,
    gradient_stops, inner_radius, line_domain, line_points, linear_marker, pie_slices, plot_area,
    range_bands, scale_labels, step_points, ticks, y_for,
};
use super::svg::fmt_num;
use super::types::{Gradient, GradientDirection, Label, Paint, Primitive, Style, TextAnchor};

/// Common behavior of all element geometries
#[enum_dispatch]
pub trait Geometry {
    /// Primitives in element-local coordinates. Must be a pure function of
    /// the view.
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive>;
}

#[enum_dispatch(Geometry)]
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Rect(RectShape),
    Round(RoundShape),
    Outline(OutlineShape),
    Stroke(StrokeShape),
    Pipe(PipeShape),
    Text(TextShape),
    Display(DisplayShape),
    Button(ButtonShape),
    Switch(SwitchShape),
    Lamp(LampShape),
    Tank(TankShape),
    Valve(ValveShape),
    Motor(MotorShape),
    Picture(PictureShape),
    Bar(BarShape),
    LinearGauge(LinearGaugeShape),
    CircularGauge(CircularGaugeShape),
    BarChart(BarChartShape),
    LineChart(LineChartShape),
    Pie(PieShape),
    Placeholder(Placeholder),
}

/// The geometry that draws `kind`.
pub fn geometry_for(kind: &ElementKind) -> ShapeGeometry {
    match kind {
        ElementKind::Rectangle => RectShape { rounded: false }.into(),
        ElementKind::RoundedRectangle => RectShape { rounded: true }.into(),
        ElementKind::Circle => RoundShape { circle: true }.into(),
        ElementKind::Ellipse => RoundShape { circle: false }.into(),
        ElementKind::Triangle => OutlineShape(Outline::Triangle).into(),
        ElementKind::Diamond => OutlineShape(Outline::Diamond).into(),
        ElementKind::Star => OutlineShape(Outline::Star).into(),
        ElementKind::Line => StrokeShape { arrow: false }.into(),
        ElementKind::Arrow => StrokeShape { arrow: true }.into(),
        ElementKind::Pipe => PipeShape.into(),
        ElementKind::Text => TextShape.into(),
        ElementKind::DigitalDisplay => DisplayShape.into(),
        ElementKind::Button => ButtonShape.into(),
        ElementKind::Switch => SwitchShape.into(),
        ElementKind::Lamp => LampShape.into(),
        ElementKind::Tank => TankShape.into(),
        ElementKind::Valve => ValveShape.into(),
        ElementKind::Motor => MotorShape.into(),
        ElementKind::Image => PictureShape { icon: false }.into(),
        ElementKind::Icon => PictureShape { icon: true }.into(),
        ElementKind::ProgressBar => BarShape { slider: false }.into(),
        ElementKind::Slider => BarShape { slider: true }.into(),
        ElementKind::VerticalGauge => LinearGaugeShape(Orientation::Vertical).into(),
        ElementKind::HorizontalGauge => LinearGaugeShape(Orientation::Horizontal).into(),
        ElementKind::CircularGauge => CircularGaugeShape.into(),
        ElementKind::BarChart => BarChartShape.into(),
        ElementKind::LineChart => LineChartShape.into(),
        ElementKind::PieChart => PieShape { donut: false }.into(),
        ElementKind::DonutChart => PieShape { donut: true }.into(),
        ElementKind::Unknown(name) => Placeholder {
            type_name: name.clone(),
        }
        .into(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Fill in the primary colour, optional border from `border_color` and
/// `border_width`.
fn body_style(view: &ElementView<'_>) -> Style {
    let style = Style::filled(view.style.color.clone());
    match view.props.color("border_color") {
        Some(color) => {
            let width = view.props.len_or("border_width", defaults::STROKE_WIDTH);
            style.with_stroke(color, width)
        }
        None => style,
    }
}

fn centered_label(view: &ElementView<'_>, text: impl Into<String>, color: &str, size: f64) -> Primitive {
    Primitive::Text(Label::new(view.size() / 2.0, text, color).size(size))
}

/// Colour of on/off elements: a colour-carrying or blinking rule wins,
/// otherwise the `on_color`/`off_color` pair.
fn state_color(view: &ElementView<'_>) -> String {
    let rule_colored = view.matched.is_some_and(|r| r.color.is_some() || r.blink);
    if rule_colored {
        return view.style.color.clone();
    }
    let (key, fallback) = if view.is_on() {
        ("on_color", defaults::GAUGE_FILL)
    } else {
        ("off_color", "#6b7280")
    };
    view.props.color(key).unwrap_or(fallback).to_string()
}

fn axis_lines(plot: Rect) -> [Primitive; 2] {
    let style = Style::stroked(defaults::STROKE, defaults::STROKE_WIDTH);
    let bottom_left = dvec2(plot.x, plot.y + plot.height);
    [
        Primitive::line(dvec2(plot.x, plot.y), bottom_left, style.clone()),
        Primitive::line(bottom_left, plot.max(), style),
    ]
}

fn tick_label(plot: Rect, y: f64, text: impl Into<String>) -> Primitive {
    Primitive::Text(
        Label::new(dvec2(plot.x - 4.0, y), text, defaults::TEXT_COLOR)
            .size(10.0)
            .anchor(TextAnchor::End),
    )
}

// ============================================================================
// Basic shapes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub rounded: bool,
}

impl Geometry for RectShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let rect = view.local_rect();
        let default_radius = if self.rounded { 12.0 } else { 0.0 };
        let corner_radius = view
            .props
            .len_or("corner_radius", default_radius)
            .min(rect.width.min(rect.height) / 2.0);
        let mut out = vec![Primitive::Rect {
            rect,
            corner_radius,
            style: body_style(view),
        }];
        if let Some(text) = view.props.text("text").filter(|t| !t.is_empty()) {
            out.push(centered_label(view, text, defaults::TEXT_COLOR, view.font_size(defaults::FONT_SIZE)));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundShape {
    pub circle: bool,
}

impl Geometry for RoundShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let center = size / 2.0;
        let style = body_style(view);
        if self.circle {
            vec![Primitive::Circle {
                center,
                radius: size.x.min(size.y) / 2.0,
                style,
            }]
        } else {
            vec![Primitive::Ellipse {
                center,
                radii: center,
                style,
            }]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    Triangle,
    Diamond,
    Star,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineShape(pub Outline);

impl Geometry for OutlineShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let points = match self.0 {
            Outline::Triangle => geometry::triangle(size),
            Outline::Diamond => geometry::diamond(size),
            Outline::Star => {
                let tips = view.props.num("points").filter(|p| *p >= 3.0);
                geometry::star(
                    size,
                    tips.map_or(defaults::STAR_POINTS, |p| p.round() as usize),
                    view.props.num_or("inner_ratio", defaults::STAR_INNER_RATIO),
                )
            }
        };
        vec![Primitive::Polygon {
            points,
            style: body_style(view),
        }]
    }
}

/// Horizontal line through the element's vertical centre.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeShape {
    pub arrow: bool,
}

impl Geometry for StrokeShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let from = dvec2(0.0, size.y / 2.0);
        let to = dvec2(size.x, size.y / 2.0);
        let width = view.props.len_or("stroke_width", 2.0);
        let color = view.style.color.clone();
        if !self.arrow {
            return vec![Primitive::line(from, to, Style::stroked(color, width))];
        }
        let head_size = view.props.len_or("arrow_size", defaults::ARROW_SIZE).min(size.x);
        let head = geometry::arrowhead(from, to, head_size);
        vec![
            Primitive::line(from, dvec2(to.x - head_size, to.y), Style::stroked(color.clone(), width)),
            Primitive::Polygon {
                points: head.to_vec(),
                style: Style::filled(color),
            },
        ]
    }
}

/// Thick line with an optional dashed flow marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeShape;

impl Geometry for PipeShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let from = dvec2(0.0, size.y / 2.0);
        let to = dvec2(size.x, size.y / 2.0);
        let width = view.props.len_or("stroke_width", size.y);
        let mut out = vec![Primitive::line(
            from,
            to,
            Style::stroked(view.style.color.clone(), width),
        )];
        let flowing = view.props.bool_or("flow", false)
            || (view.element.data_binding_source.is_some() && view.is_on());
        if flowing {
            let color = view.props.color("flow_color").unwrap_or("#ffffff");
            out.push(Primitive::line(
                from,
                to,
                Style::stroked(color, (width / 3.0).max(1.0)).dashed(),
            ));
        }
        out
    }
}

// ============================================================================
// Text and controls
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TextShape;

impl Geometry for TextShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let mut out = Vec::new();
        if let Some(bg) = &view.style.bg_color {
            out.push(Primitive::rect(view.local_rect(), Style::filled(bg.clone())));
        }
        let (x, anchor) = match view.props.text("align").as_deref() {
            Some("left") | Some("start") => (0.0, TextAnchor::Start),
            Some("right") | Some("end") => (size.x, TextAnchor::End),
            _ => (size.x / 2.0, TextAnchor::Middle),
        };
        out.push(Primitive::Text(
            Label::new(dvec2(x, size.y / 2.0), view.text(), view.style.color.clone())
                .size(view.font_size(defaults::FONT_SIZE))
                .anchor(anchor),
        ));
        out
    }
}

/// Background plate with the formatted value.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayShape;

impl Geometry for DisplayShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let text = match (view.matched.and_then(|r| r.display_text.clone()), view.number(), view.value) {
            (Some(text), _, _) => text,
            (None, Some(n), _) => view.formatted(n),
            (None, None, Some(raw)) if !raw.is_null() => crate::model::value_to_text(raw),
            _ => "--".to_string(),
        };
        vec![
            Primitive::Rect {
                rect: view.local_rect(),
                corner_radius: 4.0,
                style: Style::filled(view.background(defaults::DISPLAY_BG)),
            },
            Primitive::Text(
                Label::new(view.size() / 2.0, text, view.style.color.clone())
                    .size(view.font_size(view.size().y * 0.5))
                    .bold(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonShape;

impl Geometry for ButtonShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let rect = view.local_rect();
        vec![
            Primitive::Rect {
                rect,
                corner_radius: view.props.len_or("corner_radius", 6.0).min(rect.height / 2.0),
                style: Style::filled(view.background(defaults::CONTROL_FILL))
                    .with_stroke(defaults::STROKE, defaults::STROKE_WIDTH),
            },
            centered_label(view, view.text(), &view.style.color, view.font_size(defaults::FONT_SIZE)),
        ]
    }
}

/// Pill track with a knob on the left (off) or right (on).
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchShape;

impl Geometry for SwitchShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let rect = view.local_rect();
        let r = rect.height / 2.0;
        let knob_x = if view.is_on() { rect.width - r } else { r };
        vec![
            Primitive::Rect {
                rect,
                corner_radius: r,
                style: Style::filled(state_color(view)),
            },
            Primitive::Circle {
                center: dvec2(knob_x, r),
                radius: (r - 2.0).max(1.0),
                style: Style::filled("#ffffff").with_stroke(defaults::STROKE, 0.5),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LampShape;

impl Geometry for LampShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        vec![Primitive::Circle {
            center: size / 2.0,
            radius: size.x.min(size.y) / 2.0,
            style: Style::filled(state_color(view)).with_stroke(defaults::STROKE, defaults::STROKE_WIDTH),
        }]
    }
}

/// Vessel outline filled from the bottom by the value's ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct TankShape;

impl Geometry for TankShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let rect = view.local_rect();
        let domain = view.domain();
        let value = view.gauge_value();
        let inner = rect.inset(3.0);
        let level = domain.ratio(value) * inner.height;
        let liquid = view.props.color("fill_color").unwrap_or(view.style.color.as_str()).to_string();
        let liquid = if view.matched.is_some() { view.style.color.clone() } else { liquid };
        vec![
            Primitive::Rect {
                rect,
                corner_radius: 6.0,
                style: Style::filled(view.background(defaults::GAUGE_TRACK))
                    .with_stroke(defaults::STROKE, defaults::STROKE_WIDTH),
            },
            Primitive::rect(
                Rect::new(inner.x, inner.y + inner.height - level, inner.width, level),
                Style::filled(liquid),
            ),
            centered_label(view, view.formatted(value), defaults::TEXT_COLOR, defaults::FONT_SIZE),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValveShape;

impl Geometry for ValveShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let style = Style::filled(view.style.color.clone()).with_stroke(defaults::STROKE, defaults::STROKE_WIDTH);
        geometry::bow_tie(view.size())
            .into_iter()
            .map(|points| Primitive::Polygon {
                points,
                style: style.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotorShape;

impl Geometry for MotorShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let radius = size.x.min(size.y) / 2.0;
        vec![
            Primitive::Circle {
                center: size / 2.0,
                radius,
                style: Style::filled(view.style.color.clone()).with_stroke(defaults::STROKE, defaults::STROKE_WIDTH),
            },
            Primitive::Text(Label::new(size / 2.0, "M", "#ffffff").size(radius).bold()),
        ]
    }
}

/// Frame standing in for an image or icon asset; assets are resolved by
/// the host surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureShape {
    pub icon: bool,
}

impl Geometry for PictureShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let (key, fallback) = if self.icon { ("icon", "icon") } else { ("src", "image") };
        let source = view.props.text(key).filter(|s| !s.is_empty()).unwrap_or_else(|| fallback.to_string());
        vec![
            Primitive::rect(
                view.local_rect(),
                Style::filled("#f3f4f6").with_stroke(defaults::PAGE_STROKE, 1.0).dashed(),
            ),
            centered_label(view, source, defaults::PAGE_STROKE, 11.0),
        ]
    }
}

/// Progress bar, or slider when `slider` is set (adds a thumb).
#[derive(Debug, Clone, PartialEq)]
pub struct BarShape {
    pub slider: bool,
}

impl Geometry for BarShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let rect = view.local_rect();
        let ratio = view.domain().ratio(view.gauge_value());
        let r = rect.height / 2.0;
        let track_color = view
            .props
            .color("track_color")
            .map(str::to_string)
            .unwrap_or_else(|| view.background(defaults::GAUGE_TRACK));
        let mut out = vec![
            Primitive::Rect {
                rect,
                corner_radius: r,
                style: Style::filled(track_color),
            },
            Primitive::Rect {
                rect: Rect::new(0.0, 0.0, rect.width * ratio, rect.height),
                corner_radius: r,
                style: Style::filled(view.style.color.clone()),
            },
        ];
        if self.slider {
            let x = (rect.width * ratio).clamp(r, (rect.width - r).max(r));
            out.push(Primitive::Circle {
                center: dvec2(x, r),
                radius: r,
                style: Style::filled("#ffffff").with_stroke(defaults::STROKE, defaults::STROKE_WIDTH),
            });
        }
        out
    }
}

// ============================================================================
// Gauges
// ============================================================================

/// Vertical or horizontal gauge: track, range bands or gradient, value
/// marker and value label.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGaugeShape(pub Orientation);

impl LinearGaugeShape {
    fn track(&self, view: &ElementView<'_>) -> Rect {
        let size = view.size();
        match self.0 {
            Orientation::Vertical => {
                let w = size.x * defaults::LINEAR_TRACK;
                Rect::new((size.x - w) / 2.0, 0.0, w, size.y)
            }
            Orientation::Horizontal => {
                let h = size.y * defaults::LINEAR_TRACK;
                Rect::new(0.0, (size.y - h) / 2.0, size.x, h)
            }
        }
    }
}

impl Geometry for LinearGaugeShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let orientation = self.0;
        let track = self.track(view);
        let domain = view.domain();
        let value = view.gauge_value();
        let ranges = &view.element.ranges;
        let bg = view.background(defaults::GAUGE_TRACK);

        let mut out = Vec::new();
        if view.props.bool_or("use_gradient", false) {
            let direction = match orientation {
                Orientation::Vertical => GradientDirection::BottomToTop,
                Orientation::Horizontal => GradientDirection::LeftToRight,
            };
            let fill = Paint::Gradient(Gradient {
                direction,
                stops: gradient_stops(ranges, domain, &bg),
            });
            out.push(Primitive::rect(track, Style::default().with_fill(fill)));
        } else {
            out.push(Primitive::rect(track, Style::filled(bg)));
            for band in range_bands(ranges, domain) {
                out.push(Primitive::rect(
                    band_rect(&band, track, orientation),
                    Style::filled(band.color),
                ));
            }
        }
        out.push(Primitive::rect(
            track,
            Style::stroked(defaults::STROKE, defaults::STROKE_WIDTH),
        ));

        let marker_color = match view.matched {
            Some(_) => view.style.color.clone(),
            None => view.props.color("marker_color").unwrap_or(view.style.color.as_str()).to_string(),
        };
        let marker_style = Style::stroked(marker_color.clone(), 3.0);
        let text = view.formatted(value);
        match orientation {
            Orientation::Vertical => {
                let y = track.y + linear_marker(domain, value, track.height, orientation);
                out.push(Primitive::line(
                    dvec2(track.x - 4.0, y),
                    dvec2(track.x + track.width + 4.0, y),
                    marker_style,
                ));
                out.push(Primitive::Text(
                    Label::new(dvec2(track.x + track.width + 6.0, y), text, marker_color)
                        .size(11.0)
                        .anchor(TextAnchor::Start),
                ));
            }
            Orientation::Horizontal => {
                let x = track.x + linear_marker(domain, value, track.width, orientation);
                out.push(Primitive::line(
                    dvec2(x, track.y - 4.0),
                    dvec2(x, track.y + track.height + 4.0),
                    marker_style,
                ));
                out.push(Primitive::Text(
                    Label::new(dvec2(x, (track.y - 10.0).max(6.0)), text, marker_color).size(11.0),
                ));
            }
        }
        out
    }
}

/// Circular gauge: tapered track, range or value segments, needle, scale
/// labels and the value in the middle.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularGaugeShape;

impl Geometry for CircularGaugeShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let arc = ArcGauge::from_props(&view.props, view.size());
        let domain = view.domain();
        let value = view.gauge_value();
        let ratio = domain.ratio(value);
        let samples = view.ctx.arc_samples;

        let mut out = vec![Primitive::Polygon {
            points: arc.tapered_segment(0.0, 1.0, samples),
            style: Style::filled(view.background(defaults::GAUGE_TRACK)),
        }];

        let bands = range_bands(&view.element.ranges, domain);
        if bands.is_empty() {
            if ratio > 0.0 {
                out.push(Primitive::Polygon {
                    points: arc.tapered_segment(0.0, ratio, samples),
                    style: Style::filled(view.style.color.clone()),
                });
            }
        } else {
            for band in bands {
                out.push(Primitive::Polygon {
                    points: arc.tapered_segment(band.from, band.to, samples),
                    style: Style::filled(band.color),
                });
            }
        }

        let decimals = geometry::decimals(&view.props);
        for label in scale_labels(&view.props, domain, decimals) {
            let at = arc.label_position(domain.ratio(label.value), view.ctx.label_margin);
            out.push(Primitive::Text(
                Label::new(at, label.text, defaults::TEXT_COLOR).size(10.0),
            ));
        }

        let needle_color = view.props.color("needle_color").unwrap_or(defaults::STROKE).to_string();
        let free = (arc.radius - arc.max_thickness).max(0.0);
        let tip = polar(arc.center, free * defaults::NEEDLE_LENGTH, arc.needle_angle(domain, value));
        out.push(Primitive::line(arc.center, tip, Style::stroked(needle_color.clone(), 2.0)));
        out.push(Primitive::Circle {
            center: arc.center,
            radius: 4.0,
            style: Style::filled(needle_color),
        });
        out.push(Primitive::Text(
            Label::new(
                dvec2(arc.center.x, arc.center.y + arc.radius * 0.4),
                view.formatted(value),
                view.style.color.clone(),
            )
            .size((arc.radius * 0.2).max(8.0))
            .bold(),
        ));
        out
    }
}

// ============================================================================
// Charts
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartShape;

impl Geometry for BarChartShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let data = chart_data(view.props.array("data"));
        let values: Vec<f64> = data.iter().map(|d| d.value).collect();
        let domain = bar_domain(&values, view.props.num("y_min"), view.props.num("y_max"));
        let plot = plot_area(view.size());
        let divisions = view.props.num("divisions").map(|d| d.max(0.0).round() as usize);

        let mut out: Vec<Primitive> = axis_lines(plot).into();
        for t in ticks(domain, divisions) {
            out.push(tick_label(plot, y_for(domain, plot, t), fmt_num(t)));
        }
        let slot = geometry::slot_width(plot.width, data.len());
        let bars = bar_rects(&values, domain, plot, view.props.num("bar_thickness"));
        for (i, (datum, rect)) in data.iter().zip(bars).enumerate() {
            let color = datum.color.clone().unwrap_or_else(|| view.style.color.clone());
            out.push(Primitive::rect(rect, Style::filled(color)));
            if !datum.label.is_empty() {
                let x = plot.x + slot * (i as f64 + 0.5);
                out.push(Primitive::Text(
                    Label::new(dvec2(x, plot.y + plot.height + 10.0), datum.label.clone(), defaults::TEXT_COLOR)
                        .size(10.0),
                ));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartShape;

impl Geometry for LineChartShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let mode = view.props.text("mode").map(|m| LineMode::parse(&m)).unwrap_or_default();
        let data = chart_data(view.props.array("data"));
        let values: Vec<f64> = match mode {
            LineMode::State => data.iter().map(|d| if d.on { 1.0 } else { 0.0 }).collect(),
            _ => data.iter().map(|d| d.value).collect(),
        };
        let domain = line_domain(&values, view.props.num("y_min"), view.props.num("y_max"), mode);
        let plot = plot_area(view.size());

        let mut out: Vec<Primitive> = axis_lines(plot).into();
        if mode == LineMode::State {
            out.push(tick_label(plot, y_for(domain, plot, 0.0), "OFF"));
            out.push(tick_label(plot, y_for(domain, plot, 1.0), "ON"));
        } else {
            let divisions = view.props.num("divisions").map(|d| d.max(0.0).round() as usize);
            for t in ticks(domain, divisions) {
                out.push(tick_label(plot, y_for(domain, plot, t), fmt_num(t)));
            }
        }

        let points = line_points(&values, domain, plot);
        let style = Style::stroked(view.style.color.clone(), view.props.len_or("line_width", 2.0));
        out.push(match mode {
            LineMode::Linear => Primitive::Polyline { points, style },
            LineMode::Step | LineMode::State => Primitive::Polyline {
                points: step_points(&points),
                style,
            },
            LineMode::Spline => Primitive::Spline {
                points,
                tension: view.props.num_or("tension", defaults::LINE_TENSION),
                style,
            },
        });
        out
    }
}

/// Pie chart, or donut when `donut` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PieShape {
    pub donut: bool,
}

impl Geometry for PieShape {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        let size = view.size();
        let center = size / 2.0;
        let outer = (size.x.min(size.y) / 2.0 - 2.0).max(0.0);
        let inner = if self.donut {
            inner_radius(view.props.get("inner_radius"), outer, defaults::DONUT_INNER)
        } else {
            0.0
        };
        let data = chart_data(view.props.array("data"));
        let values: Vec<f64> = data.iter().map(|d| d.value).collect();
        let slices = pie_slices(&values, center, outer, inner);
        let show_labels = view.props.bool_or("show_labels", true);

        let mut out = Vec::with_capacity(slices.len() * 2);
        for slice in &slices {
            let datum = &data[slice.index];
            let color = datum
                .color
                .clone()
                .unwrap_or_else(|| defaults::PALETTE[slice.index % defaults::PALETTE.len()].to_string());
            out.push(Primitive::Wedge {
                center,
                inner_radius: inner,
                outer_radius: outer,
                start: slice.start,
                end: slice.end,
                style: Style::filled(color).with_stroke("#ffffff", 1.0),
            });
        }
        if show_labels {
            for slice in &slices {
                let datum = &data[slice.index];
                let text = if datum.label.is_empty() {
                    fmt_num(datum.value)
                } else {
                    datum.label.clone()
                };
                out.push(Primitive::Text(
                    Label::new(slice.label_anchor, text, defaults::TEXT_COLOR).size(11.0),
                ));
            }
        }
        out
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Drawn for element types this engine does not know: a dashed outline
/// labelled with the type name.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub type_name: String,
}

impl Geometry for Placeholder {
    fn primitives(&self, view: &ElementView<'_>) -> Vec<Primitive> {
        vec![
            Primitive::rect(
                view.local_rect(),
                Style::stroked(defaults::PLACEHOLDER, 1.0).dashed(),
            ),
            centered_label(view, self.type_name.clone(), defaults::PLACEHOLDER, 12.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveValueMap;
    use crate::model::Element;
    use crate::render::context::RenderContext;
    use crate::rules::{BlinkPhase, Operator, Rule, RuleSet};
    use crate::types::Degrees;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn draw(el: &Element) -> Vec<Primitive> {
        let values = LiveValueMap::default();
        let ctx = RenderContext::default();
        let view = ElementView::new(el, &values, BlinkPhase::Visible, &ctx);
        geometry_for(&el.kind).primitives(&view)
    }

    fn labels(prims: &[Primitive]) -> Vec<String> {
        prims.iter().filter_map(Primitive::as_text).map(|l| l.text.clone()).collect()
    }

    #[test]
    fn every_kind_draws_something() {
        for kind in ElementKind::ALL {
            let el = Element::new("e".into(), kind.clone(), 0.0, 0.0);
            assert!(!draw(&el).is_empty(), "{kind} drew nothing");
        }
    }

    #[test]
    fn geometry_is_deterministic() {
        for kind in ElementKind::ALL {
            let mut el = Element::new("e".into(), kind.clone(), 0.0, 0.0);
            el.set_prop("current_value", 42);
            assert_eq!(draw(&el), draw(&el));
        }
    }

    #[test]
    fn vertical_gauge_marker_and_label() {
        let mut el = Element::new("g".into(), ElementKind::VerticalGauge, 0.0, 0.0);
        el.height = 200.0;
        el.set_prop("min", 0);
        el.set_prop("max", 100);
        el.set_prop("current_value", 75);
        let prims = draw(&el);
        let marker = prims
            .iter()
            .find_map(|p| match p {
                Primitive::Line { from, .. } => Some(from.y),
                _ => None,
            })
            .unwrap();
        assert_eq!(marker, 50.0);
        assert_eq!(labels(&prims), vec!["75.0"]);
    }

    #[test]
    fn gradient_gauge_uses_gradient_fill() {
        let el: Element = serde_json::from_value(json!({
            "id": "g",
            "type": "horizontal_gauge",
            "use_gradient": true,
            "ranges": [{"start": 30, "end": 60, "color": "red"}]
        }))
        .unwrap();
        let prims = draw(&el);
        let Some(Primitive::Rect { style, .. }) = prims.first() else {
            panic!("expected track rect");
        };
        let Paint::Gradient(g) = &style.fill else {
            panic!("expected gradient fill");
        };
        assert_eq!(g.direction, GradientDirection::LeftToRight);
        assert_eq!(g.stops.len(), 2);
        assert_eq!(g.stops[0].offset, 0.3);
    }

    #[test]
    fn circular_gauge_track_starts_at_symmetric_angle() {
        let el = Element::new("c".into(), ElementKind::CircularGauge, 0.0, 0.0);
        let prims = draw(&el);
        let Some(Primitive::Polygon { points, .. }) = prims.first() else {
            panic!("expected track polygon");
        };
        let center = dvec2(80.0, 80.0);
        let expected = polar(center, 80.0, Degrees(120.0));
        assert_abs_diff_eq!(points[0].x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(points[0].y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn lamp_follows_state_unless_a_rule_colours_it() {
        let mut el = Element::new("l".into(), ElementKind::Lamp, 0.0, 0.0);
        el.set_prop("current_value", true);
        let fill = |prims: Vec<Primitive>| match &prims[0] {
            Primitive::Circle { style, .. } => style.fill.clone(),
            _ => Paint::None,
        };
        assert_eq!(fill(draw(&el)), Paint::color("#22c55e"));
        el.set_prop("current_value", false);
        assert_eq!(fill(draw(&el)), Paint::color("#6b7280"));

        el.convert_values = RuleSet::new(vec![Rule::new(Operator::Eq, false).with_color("#ff0000")]);
        assert_eq!(fill(draw(&el)), Paint::color("#ff0000"));
    }

    #[test]
    fn unknown_kind_draws_dashed_placeholder() {
        let el: Element = serde_json::from_value(json!({"id": "x", "type": "flux_capacitor"})).unwrap();
        let prims = draw(&el);
        assert!(prims[0].style().unwrap().dashed);
        assert_eq!(labels(&prims), vec!["flux_capacitor"]);
    }

    #[test]
    fn donut_slices_have_inner_radius() {
        let mut el = Element::new("d".into(), ElementKind::DonutChart, 0.0, 0.0);
        el.set_prop("data", json!([{"label": "a", "value": 1}, {"label": "b", "value": 3}]));
        let prims = draw(&el);
        let wedges: Vec<(f64, f64, Degrees)> = prims
            .iter()
            .filter_map(|p| match p {
                Primitive::Wedge {
                    inner_radius,
                    outer_radius,
                    end,
                    ..
                } => Some((*inner_radius, *outer_radius, *end)),
                _ => None,
            })
            .collect();
        assert_eq!(wedges.len(), 2);
        assert_eq!(wedges[0], (49.0, 98.0, Degrees(90.0)));
        assert_eq!(labels(&prims), vec!["a", "b"]);
    }

    #[test]
    fn state_chart_labels_on_off() {
        let mut el = Element::new("s".into(), ElementKind::LineChart, 0.0, 0.0);
        el.set_prop("mode", "state");
        el.set_prop("data", json!([{"value": true}, {"value": false}, {"value": "on"}]));
        let prims = draw(&el);
        assert_eq!(labels(&prims), vec!["OFF", "ON"]);
        let Some(Primitive::Polyline { points, .. }) = prims.last() else {
            panic!("expected step polyline");
        };
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn spline_mode_keeps_tension() {
        let mut el = Element::new("s".into(), ElementKind::LineChart, 0.0, 0.0);
        el.set_prop("mode", "spline");
        el.set_prop("tension", 0.3);
        let prims = draw(&el);
        assert!(matches!(prims.last(), Some(Primitive::Spline { tension, .. }) if *tension == 0.3));
    }

    #[test]
    fn bar_chart_tick_labels_default_to_three() {
        let mut el = Element::new("b".into(), ElementKind::BarChart, 0.0, 0.0);
        el.set_prop("data", json!([10, 40, 25]));
        let prims = draw(&el);
        assert_eq!(labels(&prims), vec!["0", "22", "44"]);
        let bars = prims
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
            .count();
        assert_eq!(bars, 3);
    }

    #[test]
    fn bound_text_placeholder() {
        let mut el = Element::new("t".into(), ElementKind::Text, 0.0, 0.0);
        el.data_binding_source = Some("tag.7".into());
        assert_eq!(labels(&draw(&el)), vec!["[Bound: tag.7]"]);
    }

    #[test]
    fn oversized_star_and_division_counts_are_bounded() {
        let mut star = Element::new("s".into(), ElementKind::Star, 0.0, 0.0);
        star.set_prop("points", 1e20);
        let Primitive::Polygon { points, .. } = &draw(&star)[0] else {
            panic!("star is not a polygon");
        };
        assert_eq!(points.len(), 128);

        for kind in [ElementKind::BarChart, ElementKind::LineChart] {
            let mut chart = Element::new("c".into(), kind, 0.0, 0.0);
            chart.set_prop("divisions", 1e20);
            chart.set_prop("data", json!([{"label": "a", "value": 5}]));
            let ticks = labels(&draw(&chart)).len();
            assert!(ticks <= 102, "{ticks} labels");
        }
    }
}
