//! Rendering context - per-frame settings and the merged render-time view
//! of one element

use glam::{DVec2, dvec2};
use serde_json::Value;

use crate::config::{EngineConfig, ViewOptions};
use crate::live::{LiveValueMap, resolve_value};
use crate::model::{Element, Props, coerce_number, is_truthy};
use crate::rules::{BlinkPhase, ResolvedStyle, Rule, bound_text, resolve_style};
use crate::types::{Domain, Rect};

use super::geometry::{decimals, format_value};

/// Settings of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub page: Rect,
    pub zoom: f64,
    pub show_grid: bool,
    /// Arc samples for a full circular-gauge sweep.
    pub arc_samples: usize,
    pub label_margin: f64,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(&EngineConfig::default(), &ViewOptions::default())
    }
}

impl RenderContext {
    pub fn new(config: &EngineConfig, view: &ViewOptions) -> Self {
        RenderContext {
            page: Rect::new(0.0, 0.0, config.page_width, config.page_height),
            zoom: if view.zoom.is_finite() && view.zoom > 0.0 { view.zoom } else { 1.0 },
            show_grid: config.show_grid && view.show_grid,
            arc_samples: config.arc_samples.max(1),
            label_margin: config.label_margin,
        }
    }
}

/// An element merged with its live value, matched rule and resolved style.
///
/// This is the only place live data meets element data; the element
/// record itself is never written.
#[derive(Debug, Clone)]
pub struct ElementView<'a> {
    pub element: &'a Element,
    pub props: Props<'a>,
    /// Live value for bound elements, `current_value` otherwise.
    pub value: Option<&'a Value>,
    pub matched: Option<&'a Rule>,
    pub style: ResolvedStyle,
    pub ctx: &'a RenderContext,
}

impl<'a> ElementView<'a> {
    pub fn new(
        element: &'a Element,
        values: &'a LiveValueMap,
        phase: BlinkPhase,
        ctx: &'a RenderContext,
    ) -> Self {
        let value = resolve_value(element, values);
        let matched = matched_rule(element, value).map(|(_, rule)| rule);
        ElementView {
            element,
            props: element.props(),
            value,
            matched,
            style: resolve_style(element, matched, phase),
            ctx,
        }
    }

    pub fn size(&self) -> DVec2 {
        dvec2(self.element.width, self.element.height)
    }

    /// The element's box in local coordinates.
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.element.width, self.element.height)
    }

    /// Value as a number, if it coerces.
    pub fn number(&self) -> Option<f64> {
        self.value.and_then(coerce_number)
    }

    /// `[min, max]` of gauge-like elements.
    pub fn domain(&self) -> Domain {
        Domain::new(self.props.num_or("min", 0.0), self.props.num_or("max", 100.0))
    }

    /// Value for ratio math; missing values sit at the domain minimum.
    pub fn gauge_value(&self) -> f64 {
        self.number().unwrap_or_else(|| self.domain().min)
    }

    /// On/off state of switches and lamps.
    pub fn is_on(&self) -> bool {
        self.value.map(is_truthy).unwrap_or(false)
    }

    pub fn formatted(&self, value: f64) -> String {
        let unit = self.props.text("unit").unwrap_or_default();
        format_value(value, decimals(&self.props), &unit)
    }

    /// Text shown by text-like elements.
    pub fn text(&self) -> String {
        bound_text(self.element, self.value, self.matched)
    }

    pub fn font_size(&self, default: f64) -> f64 {
        self.props.num("font_size").filter(|s| *s > 0.0).unwrap_or(default)
    }

    /// Background colour, or `fallback` when the kind has none.
    pub fn background(&self, fallback: &str) -> String {
        self.style.bg_color.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// First rule matching the element's current value. Elements without a
/// value never match.
pub fn matched_rule<'a>(element: &'a Element, value: Option<&Value>) -> Option<(usize, &'a Rule)> {
    element.convert_values.first_match(value?)
}
