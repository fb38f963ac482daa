//! Engine configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config.

use std::time::Duration;

use serde::Deserialize;

use crate::errors::ConfigError;

/// Tunables shared by the resolver, the blink scheduler and the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Live-value poll period.
    pub poll_interval_ms: u64,
    /// Half period of a blinking rule (one toggle per period).
    pub blink_period_ms: u64,
    /// Samples taken along a full circular-gauge sweep.
    pub arc_samples: usize,
    pub page_width: f64,
    pub page_height: f64,
    pub show_grid: bool,
    /// Inward offset of circular-gauge labels beyond the local ring thickness.
    pub label_margin: f64,
    /// Offset applied to pasted and duplicated elements.
    pub paste_offset: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            blink_period_ms: 500,
            arc_samples: 64,
            page_width: 1920.0,
            page_height: 1080.0,
            show_grid: true,
            label_margin: 6.0,
            paste_offset: 20.0,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("poll_interval_ms", self.poll_interval_ms as f64)?;
        positive("blink_period_ms", self.blink_period_ms as f64)?;
        positive("page_width", self.page_width)?;
        positive("page_height", self.page_height)?;
        if !self.label_margin.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "label_margin",
                value: self.label_margin,
            });
        }
        if !self.paste_offset.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "paste_offset",
                value: self.paste_offset,
            });
        }
        if self.arc_samples < 2 {
            return Err(ConfigError::ArcSamples {
                samples: self.arc_samples,
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn blink_period(&self) -> Duration {
        Duration::from_millis(self.blink_period_ms)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

/// Per-frame view state supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub zoom: f64,
    pub show_grid: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            show_grid: true,
        }
    }
}
