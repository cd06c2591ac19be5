//! 3-component vector type and operations.
//!
//! `Vec3` is a plain `Copy` value type. Every operation returns a new
//! vector; nothing here mutates its inputs. The only numeric guard lives
//! in [`Vec3::normalize`], which maps the zero vector to itself instead
//! of dividing by zero.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A vector in 3D graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate (the layer axis).
    pub z: f32,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm.
    #[inline]
    pub fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn magnitude_squared(self) -> f32 {
        self.dot(self)
    }

    /// Unit vector in the same direction.
    ///
    /// Returns the zero vector when the magnitude is zero, so callers in
    /// hot loops never have to special-case coincident points themselves.
    #[inline]
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            Vec3::ZERO
        } else {
            self.scale(1.0 / mag)
        }
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(a: Vec3, b: Vec3) -> f32 {
        (a - b).magnitude()
    }

    /// Squared distance between two points.
    ///
    /// Avoids the square root for range checks in pairwise loops.
    #[inline]
    pub fn distance_squared(a: Vec3, b: Vec3) -> f32 {
        (a - b).magnitude_squared()
    }

    /// Linear interpolation from `a` to `b` by factor `t`.
    #[inline]
    pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Self {
        a + (b - a).scale(t)
    }

    /// True when all three components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    #[inline]
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, other: Vec3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, other: Vec3) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, scalar: f32) -> Vec3 {
        self.scale(scalar)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_sub() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_scale() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(v.scale(2.0), Vec3::new(2.0, -4.0, 6.0));
        assert_eq!(v * 0.0, Vec3::ZERO);
    }

    #[test]
    fn test_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, -5.0, 6.0);
        assert_relative_eq!(a.dot(b), 12.0);
    }

    #[test]
    fn test_magnitude() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_relative_eq!(v.magnitude(), 5.0);
        assert_relative_eq!(v.magnitude_squared(), 25.0);
    }

    #[test]
    fn test_normalize() {
        let v = Vec3::new(0.0, 3.0, 4.0).normalize();
        assert_relative_eq!(v.magnitude(), 1.0);
        assert_relative_eq!(v.y, 0.6);
        assert_relative_eq!(v.z, 0.8);
    }

    #[test]
    fn test_normalize_zero_vector() {
        // Must not divide by zero or produce NaN
        let v = Vec3::ZERO.normalize();
        assert_eq!(v, Vec3::ZERO);
        assert!(v.is_finite());
    }

    #[test]
    fn test_distance_symmetry() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 7.0);

        assert_relative_eq!(Vec3::distance(a, b), Vec3::distance(b, a));
        assert_eq!(Vec3::distance(a, a), 0.0);
    }

    #[test]
    fn test_distance_squared_matches_distance() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(4.0, 4.0, 0.0);

        assert_relative_eq!(Vec3::distance_squared(a, b), 25.0);
        assert_relative_eq!(Vec3::distance(a, b).powi(2), Vec3::distance_squared(a, b));
    }

    #[test]
    fn test_lerp() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, -10.0, 4.0);

        assert_eq!(Vec3::lerp(a, b, 0.0), a);
        assert_eq!(Vec3::lerp(a, b, 1.0), b);
        assert_eq!(Vec3::lerp(a, b, 0.5), Vec3::new(5.0, -5.0, 2.0));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(2.0, 2.0, 2.0);
        let _ = a + b;
        let _ = a.normalize();
        let _ = Vec3::lerp(a, b, 0.5);

        assert_eq!(a, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(b, Vec3::new(2.0, 2.0, 2.0));
    }
}
