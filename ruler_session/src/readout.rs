//! Text the host UI shows next to the reticle.

use std::fmt;

/// Guidance for the user's next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// No surface under the reticle.
    FindSurface,
    /// Surface found and nothing placed yet.
    TapToStart,
    /// Measurement in progress.
    PlaceNext { placed: usize, required: usize },
    /// Circle mode locked on three points in a line.
    Collinear,
    /// Measurement complete.
    ResetToMeasureAgain,
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::FindSurface => f.write_str("Find a surface"),
            Hint::TapToStart => f.write_str("Tap to start"),
            Hint::PlaceNext { placed, required } => {
                write!(f, "Place point {} of {}", placed + 1, required)
            }
            Hint::Collinear => f.write_str("Points are in a line"),
            Hint::ResetToMeasureAgain => f.write_str("Reset to measure again"),
        }
    }
}
