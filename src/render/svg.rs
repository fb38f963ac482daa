//! SVG generation
//!
//! Serializes a [`DrawList`] into a standalone SVG document: gradients go
//! into `<defs>`, every draw item becomes a `<g>` carrying its transform,
//! splines become cubic Bézier paths and wedges arc paths.

use std::io;

use glam::DVec2;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::log;
use crate::types::{Degrees, polar};

use super::defaults;
use super::geometry::spline_segments;
use super::types::*;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Render a draw list as an SVG document.
pub fn to_svg(list: &DrawList) -> String {
    match write_document(list) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            log::warn!(%err, "svg serialization failed");
            String::new()
        }
    }
}

fn write_document(list: &DrawList) -> io::Result<Vec<u8>> {
    // The body is written first so every gradient is known before <defs>.
    let mut body = SvgWriter::new();
    for item in list.background.iter().chain(&list.items).chain(&list.overlay) {
        body.item(item)?;
    }

    let page = list.page;
    let mut doc = SvgWriter::new();
    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", SVG_NS));
    let view_box = [page.x, page.y, page.width, page.height].map(fmt_num).join(" ");
    svg.push_attribute(("viewBox", view_box.as_str()));
    num(&mut svg, "width", page.width);
    num(&mut svg, "height", page.height);
    doc.open(svg)?;
    if !body.gradients.is_empty() {
        doc.open(BytesStart::new("defs"))?;
        for (i, gradient) in body.gradients.iter().enumerate() {
            doc.gradient_def(i, gradient)?;
        }
        doc.close("defs")?;
    }
    doc.xml.get_mut().extend_from_slice(body.xml.get_ref());
    doc.close("svg")?;
    Ok(doc.xml.into_inner())
}

/// One element per line, no indentation.
struct SvgWriter {
    xml: Writer<Vec<u8>>,
    gradients: Vec<Gradient>,
}

impl SvgWriter {
    fn new() -> Self {
        Self {
            xml: Writer::new(Vec::new()),
            gradients: Vec::new(),
        }
    }

    fn open(&mut self, tag: BytesStart<'_>) -> io::Result<()> {
        self.xml.write_event(Event::Start(tag))?;
        self.newline()
    }

    fn empty(&mut self, tag: BytesStart<'_>) -> io::Result<()> {
        self.xml.write_event(Event::Empty(tag))?;
        self.newline()
    }

    fn close(&mut self, name: &str) -> io::Result<()> {
        self.xml.write_event(Event::End(BytesEnd::new(name)))?;
        self.newline()
    }

    fn newline(&mut self) -> io::Result<()> {
        self.xml.get_mut().push(b'\n');
        Ok(())
    }

    fn item(&mut self, item: &DrawItem) -> io::Result<()> {
        let mut g = BytesStart::new("g");
        if let Some(id) = &item.element_id {
            g.push_attribute(("data-id", id.as_str()));
        }
        let t = item.transform;
        if t.translate != DVec2::ZERO || t.rotation != Degrees::ZERO {
            let mut transform = format!("translate({} {})", fmt_num(t.translate.x), fmt_num(t.translate.y));
            if t.rotation != Degrees::ZERO {
                transform.push_str(&format!(" rotate({})", fmt_num(t.rotation.raw())));
            }
            g.push_attribute(("transform", transform.as_str()));
        }
        if t.opacity < 1.0 {
            num(&mut g, "opacity", t.opacity.max(0.0));
        }
        if !item.interactive {
            g.push_attribute(("pointer-events", "none"));
        }
        self.open(g)?;
        for primitive in &item.primitives {
            self.primitive(primitive)?;
        }
        self.close("g")
    }

    fn primitive(&mut self, primitive: &Primitive) -> io::Result<()> {
        let (mut tag, style) = match primitive {
            Primitive::Rect {
                rect,
                corner_radius,
                style,
            } => {
                let mut tag = BytesStart::new("rect");
                num(&mut tag, "x", rect.x);
                num(&mut tag, "y", rect.y);
                num(&mut tag, "width", rect.width.max(0.0));
                num(&mut tag, "height", rect.height.max(0.0));
                if *corner_radius > 0.0 {
                    num(&mut tag, "rx", *corner_radius);
                    num(&mut tag, "ry", *corner_radius);
                }
                (tag, style)
            }
            Primitive::Circle { center, radius, style } => {
                let mut tag = BytesStart::new("circle");
                num(&mut tag, "cx", center.x);
                num(&mut tag, "cy", center.y);
                num(&mut tag, "r", *radius);
                (tag, style)
            }
            Primitive::Ellipse { center, radii, style } => {
                let mut tag = BytesStart::new("ellipse");
                num(&mut tag, "cx", center.x);
                num(&mut tag, "cy", center.y);
                num(&mut tag, "rx", radii.x);
                num(&mut tag, "ry", radii.y);
                (tag, style)
            }
            Primitive::Line { from, to, style } => {
                let mut tag = BytesStart::new("line");
                num(&mut tag, "x1", from.x);
                num(&mut tag, "y1", from.y);
                num(&mut tag, "x2", to.x);
                num(&mut tag, "y2", to.y);
                (tag, style)
            }
            Primitive::Polyline { points, style } => {
                let mut tag = BytesStart::new("polyline");
                tag.push_attribute(("points", points_attr(points).as_str()));
                (tag, style)
            }
            Primitive::Polygon { points, style } => {
                let mut tag = BytesStart::new("polygon");
                tag.push_attribute(("points", points_attr(points).as_str()));
                (tag, style)
            }
            Primitive::Spline { points, tension, style } => {
                let mut tag = BytesStart::new("path");
                tag.push_attribute(("d", spline_path(points, *tension).as_str()));
                (tag, style)
            }
            Primitive::Wedge {
                center,
                inner_radius,
                outer_radius,
                start,
                end,
                style,
            } => {
                let mut tag = BytesStart::new("path");
                let d = wedge_path(*center, *inner_radius, *outer_radius, *start, *end);
                tag.push_attribute(("d", d.as_str()));
                (tag, style)
            }
            Primitive::Text(label) => return self.text(label),
        };
        self.style(&mut tag, style);
        self.empty(tag)
    }

    fn paint(&mut self, paint: &Paint) -> String {
        match paint {
            Paint::None => defaults::NONE.to_string(),
            Paint::Color(c) => c.clone(),
            Paint::Gradient(g) => {
                let id = self.gradients.len();
                self.gradients.push(g.clone());
                format!("url(#gradient-{id})")
            }
        }
    }

    fn style(&mut self, tag: &mut BytesStart<'_>, style: &Style) {
        let fill = self.paint(&style.fill);
        let stroke = self.paint(&style.stroke);
        tag.push_attribute(("fill", fill.as_str()));
        tag.push_attribute(("stroke", stroke.as_str()));
        if !style.stroke.is_none() {
            num(tag, "stroke-width", style.stroke_width);
            if style.dashed {
                let dash = fmt_num(defaults::DASH);
                tag.push_attribute(("stroke-dasharray", format!("{dash} {dash}").as_str()));
            }
        }
    }

    fn text(&mut self, label: &Label) -> io::Result<()> {
        let anchor = match label.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let mut tag = BytesStart::new("text");
        num(&mut tag, "x", label.position.x);
        num(&mut tag, "y", label.position.y);
        tag.push_attribute(("fill", label.color.as_str()));
        tag.push_attribute(("font-family", defaults::FONT_FAMILY));
        num(&mut tag, "font-size", label.font_size);
        tag.push_attribute(("text-anchor", anchor));
        tag.push_attribute(("dominant-baseline", "central"));
        if label.bold {
            tag.push_attribute(("font-weight", "bold"));
        }
        self.xml.write_event(Event::Start(tag))?;
        self.xml.write_event(Event::Text(BytesText::new(&label.text)))?;
        self.close("text")
    }

    fn gradient_def(&mut self, index: usize, gradient: &Gradient) -> io::Result<()> {
        let (x1, y1, x2, y2) = match gradient.direction {
            GradientDirection::LeftToRight => ("0", "0", "1", "0"),
            GradientDirection::BottomToTop => ("0", "1", "0", "0"),
        };
        let mut tag = BytesStart::new("linearGradient");
        tag.push_attribute(("id", format!("gradient-{index}").as_str()));
        tag.push_attribute(("x1", x1));
        tag.push_attribute(("y1", y1));
        tag.push_attribute(("x2", x2));
        tag.push_attribute(("y2", y2));
        self.open(tag)?;
        for stop in &gradient.stops {
            let mut tag = BytesStart::new("stop");
            num(&mut tag, "offset", stop.offset.clamp(0.0, 1.0));
            tag.push_attribute(("stop-color", stop.color.as_str()));
            self.empty(tag)?;
        }
        self.close("linearGradient")
    }
}

fn num(tag: &mut BytesStart<'_>, key: &str, value: f64) {
    tag.push_attribute((key, fmt_num(value).as_str()));
}

fn point(p: DVec2) -> String {
    format!("{},{}", fmt_num(p.x), fmt_num(p.y))
}

fn points_attr(points: &[DVec2]) -> String {
    points.iter().map(|p| point(*p)).collect::<Vec<_>>().join(" ")
}

/// Cardinal spline through `points` as cubic Bézier segments.
pub(crate) fn spline_path(points: &[DVec2], tension: f64) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M{}", point(*first));
    for (c1, c2, end) in spline_segments(points, tension) {
        d.push_str(&format!(" C{} {} {}", point(c1), point(c2), point(end)));
    }
    d
}

/// Annular sector (or pie slice when `inner` is 0) swept clockwise from
/// `start` to `end`. A full turn is split in two arcs since SVG cannot
/// draw an arc whose endpoints coincide.
pub(crate) fn wedge_path(center: DVec2, inner: f64, outer: f64, start: Degrees, end: Degrees) -> String {
    let sweep = (end - start).raw();
    if sweep >= 360.0 - 1e-9 {
        let mid = start + Degrees(180.0);
        let mut d = format!("M{}", point(polar(center, outer, start)));
        d.push_str(&arc_to(outer, false, true, polar(center, outer, mid)));
        d.push_str(&arc_to(outer, false, true, polar(center, outer, start)));
        d.push_str(" Z");
        if inner > 0.0 {
            d.push_str(&format!(" M{}", point(polar(center, inner, start))));
            d.push_str(&arc_to(inner, false, false, polar(center, inner, mid)));
            d.push_str(&arc_to(inner, false, false, polar(center, inner, start)));
            d.push_str(" Z");
        }
        return d;
    }

    let large = sweep > 180.0;
    let mut d = format!("M{}", point(polar(center, outer, start)));
    d.push_str(&arc_to(outer, large, true, polar(center, outer, end)));
    if inner > 0.0 {
        d.push_str(&format!(" L{}", point(polar(center, inner, end))));
        d.push_str(&arc_to(inner, large, false, polar(center, inner, start)));
    } else {
        d.push_str(&format!(" L{}", point(center)));
    }
    d.push_str(" Z");
    d
}

fn arc_to(radius: f64, large: bool, clockwise: bool, to: DVec2) -> String {
    format!(
        " A{r} {r} 0 {} {} {}",
        u8::from(large),
        u8::from(clockwise),
        point(to),
        r = fmt_num(radius)
    )
}

/// Format a number for SVG output: 6 significant figures, trailing zeros
/// trimmed. Trigonometric noise near zero prints as `0`.
pub(crate) fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, 6)
}

fn fmt_num_precision(value: f64, sig_figs: i32) -> String {
    if value.abs() < 1e-9 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;

    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
