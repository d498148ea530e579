//! Showcase configuration.
//!
//! Every field has a default, so `{}` is a complete configuration file.

use crate::animation::EasingType;
use crate::error::{Result, StackError};
use crate::scroll::SmoothScrollConfig;
use crate::stage::Viewport;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowcaseConfig {
    pub viewport: Viewport,
    pub layout: LayoutConfig,
    pub stack: StackConfig,
    pub scroll: SmoothScrollConfig,
    pub reveal: RevealConfig,
}

impl ShowcaseConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| StackError::Decode {
            what: "showcase config",
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Geometry of the headless page the showcase is laid out on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Content above the trigger region, in viewport heights.
    pub region_top_vh: f64,
    /// Content below the trigger region, in viewport heights.
    pub trailing_vh: f64,
    pub card_height_ratio: f32,
    pub card_width_ratio: f32,
    pub card_max_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            region_top_vh: 1.0,
            trailing_vh: 1.0,
            card_height_ratio: 0.7,
            card_width_ratio: 0.95,
            card_max_width: 1280.0,
        }
    }
}

/// A tween's easing and duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Motion {
    pub easing: EasingType,
    pub duration: f64,
}

/// Constants of the stacking timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackConfig {
    pub depth_base: i32,
    pub depth_step: i32,
    pub scale_step: f32,
    pub scale_floor: f32,
    /// Upward offset per stacked card, in px.
    pub offset_step: f32,
    pub entrance: Motion,
    pub settle: Motion,
    /// Gap between a card's entrance start and its settle label.
    pub settle_delay: f64,
    /// Gap between a settle label and the next card's entrance.
    pub next_entrance_delay: f64,
    pub scroll_per_card_vh: f64,
    pub scroll_base_vh: f64,
    pub pin_start: String,
    /// Seconds the playhead lags behind scroll progress.
    pub scrub_lag: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            depth_base: 100,
            depth_step: 5,
            scale_step: 0.05,
            scale_floor: 0.05,
            offset_step: 50.0,
            entrance: Motion {
                easing: EasingType::Power2Out,
                duration: 1.5,
            },
            settle: Motion {
                easing: EasingType::Power1InOut,
                duration: 1.3,
            },
            settle_delay: 1.2,
            next_entrance_delay: 0.8,
            scroll_per_card_vh: 120.0,
            scroll_base_vh: 100.0,
            pin_start: "top top".to_string(),
            scrub_lag: 0.8,
        }
    }
}

/// The backdrop's clip-circle reveal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub enabled: bool,
    pub from_radius: f32,
    pub to_radius: f32,
    pub easing: EasingType,
    pub start: String,
    pub end: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_radius: 0.0,
            to_radius: 150.0,
            easing: EasingType::Power2InOut,
            start: "top 80%".to_string(),
            end: "top 10%".to_string(),
        }
    }
}
