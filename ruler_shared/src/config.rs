//! Configuration system.
//!
//! Loads measuring configuration from JSON strings (file IO left to app).

use serde::{Deserialize, Serialize};

use crate::{
    geometry::CollinearTolerance,
    math::Vec3,
    units::{LengthUnit, MeasureMode},
};

/// Live preview behavior while a circle is still missing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CirclePreview {
    /// No live metric and no provisional connector until three samples exist.
    #[default]
    Suppress,
    /// Distance from the most recent sample to the live target, with a
    /// provisional connector.
    Chord,
}

/// Root configuration for a measuring session and its driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Mode the session starts in.
    #[serde(default)]
    pub mode: MeasureMode,
    /// Unit the session starts in.
    #[serde(default)]
    pub unit: LengthUnit,
    /// Driver frame rate.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// Up hint used when orienting connectors.
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Marker sphere radius in meters, sent as the marker scale.
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
    #[serde(default)]
    pub collinear: CollinearTolerance,
    #[serde(default)]
    pub circle_preview: CirclePreview,
}

fn default_frame_hz() -> u32 {
    60
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_marker_radius() -> f32 {
    0.015
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            mode: MeasureMode::default(),
            unit: LengthUnit::default(),
            frame_hz: default_frame_hz(),
            up: default_up(),
            marker_radius: default_marker_radius(),
            collinear: CollinearTolerance::default(),
            circle_preview: CirclePreview::default(),
        }
    }
}

impl MeasureConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
