//! Math types.
//!
//! This module intentionally stays small and deterministic.
//! It avoids SIMD/unsafe and focuses on stable semantics. Every type here is
//! `Copy`, so per-frame math lives on the stack and needs no scratch buffers.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Squared-length threshold below which a direction is treated as undefined.
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// World-space position in meters.
pub type Point3 = Vec3;

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn len_sq(self) -> f32 {
        self.dot(self)
    }

    pub fn len(self) -> f32 {
        self.len_sq().sqrt()
    }

    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Returns the unit vector, or `None` when the length is (nearly) zero or
    /// not finite.
    pub fn try_normalize(self) -> Option<Self> {
        let len_sq = self.len_sq();
        if len_sq.is_finite() && len_sq >= DIRECTION_EPSILON {
            Some(self.scale(1.0 / len_sq.sqrt()))
        } else {
            None
        }
    }

    pub fn normalize_or_zero(self) -> Self {
        self.try_normalize().unwrap_or(Self::ZERO)
    }

    pub fn distance(self, rhs: Self) -> f32 {
        (rhs - self).len()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn lerp(self, to: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.z + (to.z - self.z) * t,
        )
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Rescales to unit length; degenerate input collapses to identity.
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n.is_finite() && n > f32::EPSILON {
            let inv = 1.0 / n;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Rotates a vector.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// Converts an orthonormal rotation matrix.
    ///
    /// Uses the trace when it is positive and otherwise the branch of the
    /// largest diagonal entry, which keeps precision and sign near 180°.
    pub fn from_mat3(m: Mat3) -> Self {
        let [right, up, back] = m.cols;
        let (m00, m11, m22) = (right.x, up.y, back.z);
        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new(
                (up.z - back.y) * s,
                (back.x - right.z) * s,
                (right.y - up.x) * s,
                0.25 / s,
            )
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            let inv = 1.0 / s;
            Self::new(
                0.25 * s,
                (up.x + right.y) * inv,
                (back.x + right.z) * inv,
                (up.z - back.y) * inv,
            )
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            let inv = 1.0 / s;
            Self::new(
                (up.x + right.y) * inv,
                0.25 * s,
                (back.y + up.z) * inv,
                (back.x - right.z) * inv,
            )
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            let inv = 1.0 / s;
            Self::new(
                (back.x + right.z) * inv,
                (back.y + up.z) * inv,
                0.25 * s,
                (right.y - up.x) * inv,
            )
        };

        q.normalized()
    }

    /// Rotation matrix whose columns are the rotated X, Y and Z axes.
    pub fn to_mat3(self) -> Mat3 {
        let Self { x, y, z, w } = self;
        Mat3::from_cols(
            Vec3::new(
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + w * z),
                2.0 * (x * z - w * y),
            ),
            Vec3::new(
                2.0 * (x * y - w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z + w * x),
            ),
            Vec3::new(
                2.0 * (x * z + w * y),
                2.0 * (y * z - w * x),
                1.0 - 2.0 * (x * x + y * y),
            ),
        )
    }

    /// Orientation whose local forward axis (-Z) points along `forward`.
    ///
    /// `up` is a hint for the roll; when it is parallel to `forward` a world
    /// axis is substituted. A zero-length `forward` yields identity. The
    /// result is always a finite unit quaternion.
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Self {
        let Some(forward) = forward.try_normalize() else {
            return Self::IDENTITY;
        };
        let back = -forward;

        let fallback = if up.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
        let right = [up, fallback, Vec3::X, Vec3::Y]
            .into_iter()
            .find_map(|candidate| candidate.cross(back).try_normalize());
        // At most one of X and Y can be parallel to `back`.
        let Some(right) = right else {
            return Self::IDENTITY;
        };

        let local_up = back.cross(right);
        Self::from_mat3(Mat3::from_cols(right, local_up, back))
    }
}

/// 3x3 matrix (column-major).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::from_cols(Vec3::X, Vec3::Y, Vec3::Z)
    }
}

impl Mat3 {
    pub const fn from_cols(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self { cols: [x, y, z] }
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c] = self.cols;
        a.dot(b.cross(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!(
            a.distance(b) < 1e-4,
            "expected {b:?}, got {a:?} (distance {})",
            a.distance(b)
        );
    }

    #[test]
    fn vec3_lerp_midpoint() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 4.0, 6.0);
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn vec3_cross_is_right_handed() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::Z), Vec3::X);
        assert_eq!(Vec3::Z.cross(Vec3::X), Vec3::Y);
    }

    #[test]
    fn vec3_normalize_rejects_zero_and_nan() {
        assert_eq!(Vec3::ZERO.try_normalize(), None);
        assert_eq!(Vec3::new(f32::NAN, 0.0, 1.0).try_normalize(), None);
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
        assert_vec_close(
            Vec3::new(0.0, 3.0, 4.0).normalize_or_zero(),
            Vec3::new(0.0, 0.6, 0.8),
        );
    }

    #[test]
    fn look_rotation_zero_forward_is_identity() {
        assert_eq!(Quat::look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
        assert_eq!(
            Quat::look_rotation(Vec3::new(1e-4, 0.0, 0.0), Vec3::Y),
            Quat::IDENTITY
        );
    }

    #[test]
    fn look_rotation_default_forward_is_identity() {
        let q = Quat::look_rotation(-Vec3::Z, Vec3::Y);
        assert!((q.dot(Quat::IDENTITY).abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_rotation_points_local_forward_along_direction() {
        let dirs = [
            Vec3::new(1.0, 0.5, 0.2),
            Vec3::X,
            -Vec3::X,
            Vec3::Z,
            Vec3::new(0.0, -0.2, 1.0),
            Vec3::new(-3.0, 2.0, -1.0),
        ];
        for dir in dirs {
            let q = Quat::look_rotation(dir, Vec3::Y);
            assert!((q.norm() - 1.0).abs() < 1e-5);
            assert_vec_close(q.rotate(-Vec3::Z), dir.normalize_or_zero());
        }
    }

    #[test]
    fn look_rotation_backward_uses_non_trace_branch() {
        // trace is -1 here, so the y-dominant branch must produce 180° about Y.
        let q = Quat::look_rotation(Vec3::Z, Vec3::Y);
        assert!(q.y.abs() > 0.999);
        assert!(q.w.abs() < 1e-4);
        assert_vec_close(q.rotate(-Vec3::Z), Vec3::Z);
    }

    #[test]
    fn look_rotation_with_parallel_up_keeps_basis_orthonormal() {
        for (forward, up) in [
            (Vec3::Y, Vec3::Y),
            (-Vec3::Y, Vec3::Y),
            (Vec3::Z, Vec3::Z),
            (Vec3::new(0.0, 0.0, -2.0), Vec3::Z),
        ] {
            let q = Quat::look_rotation(forward, up);
            let m = q.to_mat3();
            let [right, local_up, back] = m.cols;
            assert!(
                (right.len() - 1.0).abs() < 1e-5,
                "right axis not unit for {forward:?}"
            );
            assert!((local_up.len() - 1.0).abs() < 1e-5);
            assert!(right.dot(back).abs() < 1e-5);
            assert!((m.determinant() - 1.0).abs() < 1e-4);
            assert_vec_close(q.rotate(-Vec3::Z), forward.normalize_or_zero());
        }
    }

    #[test]
    fn look_rotation_never_returns_nan() {
        let q = Quat::look_rotation(Vec3::X, Vec3::new(f32::NAN, f32::NAN, f32::NAN));
        assert!([q.x, q.y, q.z, q.w].iter().all(|c| c.is_finite()));
        assert_vec_close(q.rotate(-Vec3::Z), Vec3::X);

        let q = Quat::look_rotation(Vec3::new(f32::INFINITY, 0.0, 0.0), Vec3::Y);
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn mat3_roundtrip_through_quat() {
        let q = Quat::new(0.1, 0.7, -0.2, 0.6).normalized();
        let back = Quat::from_mat3(q.to_mat3());
        assert!((q.dot(back).abs() - 1.0).abs() < 1e-5);
    }
}
