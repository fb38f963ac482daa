//! Canvas engine for industrial HMI screens.
//!
//! A scene is an ordered list of elements (shapes, controls, gauges,
//! charts). Each frame, element values are resolved from a polled live
//! source, conditional rules restyle them, per-kind geometry turns them
//! into primitives, and the result is a draw list (or an SVG document).

pub mod config;
pub mod errors;
pub mod live;
pub mod log;
pub mod model;
pub mod render;
pub mod rules;
pub mod selection;
pub mod types;

pub use config::{EngineConfig, ViewOptions};
pub use errors::{ConfigError, SceneError, SourceError};
pub use live::{Credential, LiveValueMap, LiveValueResolver, LiveValueSource, LiveValues, PointValue, PollTask, StaticSource};
pub use model::{Element, ElementId, ElementKind, Scene};
pub use render::{Canvas, DrawList, RenderContext, render_scene, to_svg};
pub use rules::{BlinkPhase, Operator, Rule, RuleSet};
pub use selection::{Modifiers, SceneEvents, SelectionController};

/// Render a scene document to SVG.
///
/// `values` is an optional live-value snapshot in the point-list format
/// (`[{"id": .., "value": ..}, ..]`). Blinking rules are drawn in their
/// visible phase.
pub fn render_scene_svg(scene: &str, values: Option<&str>) -> Result<String, miette::Report> {
    let scene = Scene::from_json(scene)?;
    let values = match values {
        Some(source) => LiveValueMap::from_points(StaticSource::from_json(source)?.points().to_vec()),
        None => LiveValueMap::default(),
    };
    let ctx = RenderContext::default();
    let list = render_scene(&scene, &values, &ctx, |_| BlinkPhase::Visible);
    Ok(to_svg(&list))
}
