//! Length units and measurement modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display unit for a meter-denominated metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Centimeters,
    Inches,
    Meters,
    Feet,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 4] = [
        LengthUnit::Centimeters,
        LengthUnit::Inches,
        LengthUnit::Meters,
        LengthUnit::Feet,
    ];

    /// Multiplier from meters.
    pub fn factor(self) -> f32 {
        match self {
            LengthUnit::Centimeters => 100.0,
            LengthUnit::Inches => 39.37,
            LengthUnit::Meters => 1.0,
            LengthUnit::Feet => 3.281,
        }
    }

    pub fn convert(self, meters: f32) -> f32 {
        meters * self.factor()
    }

    /// Suffix appended to formatted values.
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Centimeters => "cm",
            LengthUnit::Inches => "in",
            LengthUnit::Meters => "m",
            LengthUnit::Feet => "ft",
        }
    }

    /// Short label for the unit toggle.
    pub fn label(self) -> &'static str {
        match self {
            LengthUnit::Centimeters => "CM",
            LengthUnit::Inches => "IN",
            LengthUnit::Meters => "M",
            LengthUnit::Feet => "FT",
        }
    }

    /// CM -> IN -> M -> FT -> CM.
    pub fn next(self) -> Self {
        match self {
            LengthUnit::Centimeters => LengthUnit::Inches,
            LengthUnit::Inches => LengthUnit::Meters,
            LengthUnit::Meters => LengthUnit::Feet,
            LengthUnit::Feet => LengthUnit::Centimeters,
        }
    }

    /// Parses a suffix or label, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|u| u.is_named(s))
    }

    fn is_named(self, s: &str) -> bool {
        s.eq_ignore_ascii_case(self.suffix()) || s.eq_ignore_ascii_case(self.label())
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// What the session is measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeasureMode {
    /// Distance between two points.
    #[default]
    Line,
    /// Circle through three points.
    Circle,
}

impl MeasureMode {
    /// Samples needed before the measurement locks.
    pub fn required_points(self) -> usize {
        match self {
            MeasureMode::Line => 2,
            MeasureMode::Circle => 3,
        }
    }

    pub fn next(self) -> Self {
        match self {
            MeasureMode::Line => MeasureMode::Circle,
            MeasureMode::Circle => MeasureMode::Line,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasureMode::Line => "LINE",
            MeasureMode::Circle => "CIRCLE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Some(MeasureMode::Line),
            "circle" => Some(MeasureMode::Circle),
            _ => None,
        }
    }
}

impl fmt::Display for MeasureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
