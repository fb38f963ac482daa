//! Render one frame of a scene document to SVG on stdout.
//!
//! Usage: `hmi-render <scene.json> [values.json] [--config engine.json]`
//!
//! `values.json` is a point list (`[{"id": .., "value": ..}]`) standing in
//! for one poll of the live source. Set `RUST_LOG=debug` for tracing.

use std::time::Duration;

use hmi_scene::{Canvas, EngineConfig, LiveValueMap, Scene, StaticSource, ViewOptions, to_svg};
use miette::{Context, IntoDiagnostic};

fn main() -> miette::Result<()> {
    hmi_scene::log::init_stderr("warn");

    let mut positional = Vec::new();
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = Some(args.next().ok_or_else(|| miette::miette!("--config needs a path"))?);
        } else {
            positional.push(arg);
        }
    }
    let Some(scene_path) = positional.first() else {
        miette::bail!("usage: hmi-render <scene.json> [values.json] [--config engine.json]");
    };

    let config = match config_path {
        Some(path) => EngineConfig::from_json(&read(&path)?)?,
        None => EngineConfig::default(),
    };
    let scene = Scene::from_json(&read(scene_path)?)?;
    let values = match positional.get(1) {
        Some(path) => {
            let source = StaticSource::from_json(&read(path)?)?;
            LiveValueMap::from_points(source.points().to_vec())
        }
        None => LiveValueMap::default(),
    };

    let mut canvas = Canvas::new(scene, config);
    let list = canvas.frame(&values, &ViewOptions::default(), Duration::ZERO);
    canvas.teardown();
    print!("{}", to_svg(&list));
    Ok(())
}

fn read(path: &str) -> miette::Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {path}"))
}
