//! Data-driven scene tests.
//!
//! Each fixture under `tests/scenes/` is a JSON object:
//!
//! ```json
//! {
//!   "scene": [ ...element records... ],
//!   "values": [ {"id": .., "value": ..} ],
//!   "expect_contains": [ "...svg fragment..." ],
//!   "expect_absent": [ "...svg fragment..." ]
//! }
//! ```
//!
//! `values` and `expect_absent` are optional.

use datatest_stable::Utf8Path;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct Fixture {
    scene: Value,
    #[serde(default)]
    values: Option<Value>,
    #[serde(default)]
    expect_contains: Vec<String>,
    #[serde(default)]
    expect_absent: Vec<String>,
}

fn test_scene_file(path: &Utf8Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let fixture: Fixture = serde_json::from_str(&source)?;

    let scene = serde_json::to_string(&fixture.scene)?;
    let values = fixture.values.as_ref().map(serde_json::to_string).transpose()?;
    let svg = hmi_scene::render_scene_svg(&scene, values.as_deref())
        .map_err(|e| format!("{path}: render failed: {e:?}"))?;

    for needle in &fixture.expect_contains {
        if !svg.contains(needle.as_str()) {
            return Err(format!("{path}: expected SVG to contain {needle:?}\n{svg}").into());
        }
    }
    for needle in &fixture.expect_absent {
        if svg.contains(needle.as_str()) {
            return Err(format!("{path}: expected SVG not to contain {needle:?}\n{svg}").into());
        }
    }
    Ok(())
}

datatest_stable::harness! {
    { test = test_scene_file, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/scenes"), pattern = r"\.json$" },
}
