//! Scene rendering
//!
//! This module is organized into submodules:
//! - `defaults`: Default colours, sizes and gauge/chart constants
//! - `types`: Draw-list types (Primitive, Style, Paint, DrawItem, DrawList)
//! - `context`: RenderContext and the merged per-element ElementView
//! - `geometry`: Pure gauge, chart and outline math
//! - `shapes`: One geometry type per element kind, dispatched by enum
//! - `svg`: SVG generation

pub mod context;
pub mod defaults;
pub mod geometry;
pub mod shapes;
pub mod svg;
pub mod types;

use std::collections::HashMap;
use std::time::Duration;

use glam::{DVec2, dvec2};

pub use context::{ElementView, RenderContext, matched_rule};
pub use shapes::{Geometry, ShapeGeometry, geometry_for};
pub use svg::to_svg;
pub use types::*;

use crate::config::{EngineConfig, ViewOptions};
use crate::live::{LiveValueMap, resolve_value};
use crate::log;
use crate::model::{Element, ElementId, ElementKind, Scene};
use crate::rules::{BlinkPhase, BlinkScheduler};
use crate::selection::{Modifiers, SceneEvents, SelectionController};
use crate::types::{Degrees, Rect};

/// Render every element of `scene` in z-order.
///
/// `phase` supplies the blink phase of each element; pass
/// `|_| BlinkPhase::Visible` for a static frame.
pub fn render_scene<F>(scene: &Scene, values: &LiveValueMap, ctx: &RenderContext, phase: F) -> DrawList
where
    F: Fn(&ElementId) -> BlinkPhase,
{
    let items = scene
        .iter()
        .map(|element| render_element(element, values, phase(&element.id), ctx))
        .collect();
    DrawList {
        page: ctx.page,
        background: background(ctx),
        items,
        overlay: Vec::new(),
    }
}

/// Draw one element: its kind's geometry, placed by its transform.
pub fn render_element(
    element: &Element,
    values: &LiveValueMap,
    phase: BlinkPhase,
    ctx: &RenderContext,
) -> DrawItem {
    if let ElementKind::Unknown(name) = &element.kind {
        log::debug!(id = %element.id, kind = %name, "drawing placeholder for unknown element type");
    }
    let view = ElementView::new(element, values, phase, ctx);
    DrawItem {
        element_id: Some(element.id.clone()),
        transform: transform_of(element),
        primitives: geometry_for(&element.kind).primitives(&view),
        interactive: true,
    }
}

fn transform_of(element: &Element) -> Transform {
    let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    Transform {
        translate: dvec2(finite(element.x, 0.0), finite(element.y, 0.0)),
        rotation: Degrees(finite(element.rotation, 0.0)),
        opacity: finite(element.opacity, 1.0).clamp(0.0, 1.0),
    }
}

/// Page boundary and, when enabled, the zoom-dependent grid.
fn background(ctx: &RenderContext) -> Vec<DrawItem> {
    let page = ctx.page;
    let mut layers = vec![DrawItem::decoration(vec![Primitive::rect(
        page,
        Style::filled(defaults::PAGE_FILL).with_stroke(defaults::PAGE_STROKE, defaults::STROKE_WIDTH),
    )])];

    if ctx.show_grid {
        let spacing = defaults::grid_spacing(ctx.zoom);
        let style = Style::stroked(defaults::GRID, 1.0 / ctx.zoom);
        let mut lines = Vec::new();
        let mut x = page.x + spacing;
        while x < page.x + page.width {
            lines.push(Primitive::line(dvec2(x, page.y), dvec2(x, page.y + page.height), style.clone()));
            x += spacing;
        }
        let mut y = page.y + spacing;
        while y < page.y + page.height {
            lines.push(Primitive::line(dvec2(page.x, y), dvec2(page.x + page.width, y), style.clone()));
            y += spacing;
        }
        layers.push(DrawItem::decoration(lines));
    }
    layers
}

/// Selection outlines in each element's own frame, plus the rubber band.
fn selection_overlay(scene: &Scene, selection: &SelectionController) -> Vec<DrawItem> {
    let outline = Style::stroked(defaults::SELECTION, defaults::STROKE_WIDTH);
    let mut overlay: Vec<DrawItem> = selection
        .selected()
        .filter_map(|id| scene.get(id))
        .map(|element| DrawItem {
            element_id: Some(element.id.clone()),
            transform: Transform {
                opacity: 1.0,
                ..transform_of(element)
            },
            primitives: vec![Primitive::rect(
                Rect::new(0.0, 0.0, element.width, element.height),
                outline.clone(),
            )],
            interactive: false,
        })
        .collect();

    if let Some(band) = selection.rubber_band_rect() {
        overlay.push(DrawItem::decoration(vec![Primitive::rect(band, outline.dashed())]));
    }
    overlay
}

/// A live canvas: the scene plus the state that outlives a single frame
/// (blink tasks and the selection).
#[derive(Debug, Clone)]
pub struct Canvas {
    scene: Scene,
    blink: BlinkScheduler,
    selection: SelectionController,
    config: EngineConfig,
}

impl Canvas {
    pub fn new(scene: Scene, config: EngineConfig) -> Self {
        Canvas {
            blink: BlinkScheduler::new(config.blink_period()),
            selection: SelectionController::new(config.paste_offset),
            scene,
            config,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn blink(&self) -> &BlinkScheduler {
        &self.blink
    }

    /// Render one frame at host time `now`.
    ///
    /// Blink tasks are reconciled against the rules matched by the current
    /// values first, so a rule that stopped matching is cancelled before
    /// anything is drawn.
    pub fn frame(&mut self, values: &LiveValueMap, view: &ViewOptions, now: Duration) -> DrawList {
        let ctx = RenderContext::new(&self.config, view);
        self.selection.set_zoom(ctx.zoom);

        let scene = &self.scene;
        self.blink.retain(|id| scene.contains(id));
        self.selection.prune(scene);

        let mut phases = HashMap::with_capacity(scene.len());
        for element in scene.iter() {
            let matched = matched_rule(element, resolve_value(element, values));
            phases.insert(element.id.clone(), self.blink.sync(&element.id, matched, now));
        }

        let mut list = render_scene(scene, values, &ctx, |id| {
            phases.get(id).copied().unwrap_or_default()
        });
        list.overlay = selection_overlay(scene, &self.selection);
        list
    }

    /// When the host should draw again for the next blink toggle.
    pub fn next_redraw(&self, now: Duration) -> Option<Duration> {
        self.blink.next_toggle(now)
    }

    /// Cancel every blink task. Call when the scene is torn down.
    pub fn teardown(&mut self) {
        log::debug!(tasks = self.blink.active_count(), "canvas teardown");
        self.blink.cancel_all();
    }

    pub fn click(&mut self, id: &ElementId, modifiers: Modifiers, events: &mut impl SceneEvents) {
        self.selection.click(id, modifiers, events);
    }

    pub fn pointer_down(&mut self, screen: DVec2, modifiers: Modifiers, events: &mut impl SceneEvents) {
        self.selection.pointer_down(&self.scene, screen, modifiers, events);
    }

    pub fn pointer_move(&mut self, screen: DVec2, events: &mut impl SceneEvents) {
        self.selection.pointer_move(&mut self.scene, screen, events);
    }

    pub fn pointer_up(&mut self, screen: DVec2, events: &mut impl SceneEvents) {
        self.selection.pointer_up(&mut self.scene, screen, events);
    }

    pub fn drop_element(&mut self, kind: ElementKind, screen: DVec2, events: &mut impl SceneEvents) -> ElementId {
        self.selection.drop_element(&mut self.scene, kind, screen, events)
    }

    pub fn delete_selected(&mut self, events: &mut impl SceneEvents) -> Vec<Element> {
        let removed = self.selection.delete_selected(&mut self.scene, events);
        for element in &removed {
            self.blink.cancel(&element.id);
        }
        removed
    }
}
