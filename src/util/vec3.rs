use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 3D vector for world-space positions and velocities
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.length()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    #[inline]
    pub fn distance_to(&self, other: Vec3) -> f32 {
        (*self - other).length()
    }

    /// Projection onto the ground plane (z = 0)
    pub fn flatten(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: 0.0,
        }
    }

    pub fn lerp(&self, other: Vec3, t: f32) -> Self {
        *self + (other - *self) * t
    }
}

/// Euclidean distance between two points. NaN inputs propagate.
#[inline]
pub fn distance(p: Vec3, q: Vec3) -> f32 {
    p.distance_to(q)
}

/// Euclidean norm of a vector. NaN inputs propagate.
#[inline]
pub fn magnitude(v: Vec3) -> f32 {
    v.magnitude()
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_magnitude() {
        let v = Vec3::new(2.0, 3.0, 6.0);
        assert!(approx_eq(v.length(), 7.0));
        assert!(approx_eq(v.length_sq(), 49.0));
        assert!(approx_eq(magnitude(v), 7.0));
    }

    #[test]
    fn test_magnitude_zero() {
        assert!(approx_eq(magnitude(Vec3::ZERO), 0.0));
    }

    #[test]
    fn test_distance() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(4.0, 5.0, 1.0);
        assert!(approx_eq(distance(a, b), 5.0));
        assert!(approx_eq(distance(b, a), distance(a, b)));
    }

    #[test]
    fn test_distance_nan_propagates() {
        let a = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(distance(a, Vec3::ZERO).is_nan());
        assert!(magnitude(a).is_nan());
    }

    #[test]
    fn test_normalize() {
        let n = Vec3::new(0.0, 3.0, 4.0).normalize();
        assert!(approx_eq(n.length(), 1.0));
        assert!(approx_eq(n.y, 0.6));
        assert!(approx_eq(n.z, 0.8));
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_flatten() {
        let v = Vec3::new(1.0, 2.0, 3.0).flatten();
        assert_eq!(v, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_lerp() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 20.0, 30.0);
        let mid = a.lerp(b, 0.5);
        assert!(approx_eq(mid.x, 5.0) && approx_eq(mid.y, 10.0) && approx_eq(mid.z, 15.0));
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
    }
}
