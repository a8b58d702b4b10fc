//! Geometry routines over world-space samples.
//!
//! - Point-to-point distance and midpoint.
//! - Circle through three points, with a configurable collinearity test.

use serde::{Deserialize, Serialize};

use crate::math::{Point3, Vec3};

/// Default collinearity threshold on the squared cross-product magnitude.
pub const COLLINEAR_EPSILON: f32 = 1e-5;

/// Euclidean distance in meters.
pub fn distance(a: Point3, b: Point3) -> f32 {
    a.distance(b)
}

pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    a.lerp(b, 0.5)
}

/// Circle through three points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleResult {
    pub center: Point3,
    /// Always non-negative.
    pub radius: f32,
}

impl CircleResult {
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    pub fn circumference(&self) -> f32 {
        std::f32::consts::TAU * self.radius
    }
}

/// How "nearly collinear" three points may be before no circle is reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "epsilon", rename_all = "snake_case")]
pub enum CollinearTolerance {
    /// `|e12 x e13|^2 < epsilon`, in squared square meters.
    Absolute(f32),
    /// `|e12 x e13|^2 < epsilon * |e12|^2 * |e13|^2`, i.e. the squared sine of
    /// the angle at the first point. Independent of the measurement scale.
    Relative(f32),
}

impl Default for CollinearTolerance {
    fn default() -> Self {
        CollinearTolerance::Absolute(COLLINEAR_EPSILON)
    }
}

impl CollinearTolerance {
    fn is_collinear(self, e12: Vec3, e13: Vec3, cross_sq: f32) -> bool {
        let threshold = match self {
            CollinearTolerance::Absolute(eps) => eps,
            CollinearTolerance::Relative(eps) => eps * e12.len_sq() * e13.len_sq(),
        };
        // NaN input must not slip through as a valid circle.
        !(cross_sq >= threshold) || cross_sq == 0.0
    }
}

/// Circle through `p1`, `p2` and `p3`, or `None` when they are collinear.
pub fn circle_from_three_points(p1: Point3, p2: Point3, p3: Point3) -> Option<CircleResult> {
    circle_from_three_points_with(p1, p2, p3, CollinearTolerance::default())
}

/// Same as [`circle_from_three_points`] with an explicit collinearity test.
pub fn circle_from_three_points_with(
    p1: Point3,
    p2: Point3,
    p3: Point3,
    tolerance: CollinearTolerance,
) -> Option<CircleResult> {
    let e12 = p2 - p1;
    let e13 = p3 - p1;
    let n = e12.cross(e13);
    let n_sq = n.len_sq();

    if tolerance.is_collinear(e12, e13, n_sq) {
        return None;
    }

    let d12_13 = e12.dot(e13);
    let a = e13.len_sq() * (e12.dot(e12) - d12_13);
    let b = e12.len_sq() * (e13.dot(e13) - d12_13);

    // `a` weights e12 and `b` weights e13: the solution of
    // (c - p1).e12 = |e12|^2 / 2 and (c - p1).e13 = |e13|^2 / 2.
    let center = p1 + (e12 * a + e13 * b) * (1.0 / (2.0 * n_sq));
    let radius = distance(center, p1);

    Some(CircleResult { center, radius })
}
