//! Three-component float vector used for coordinates and sizes.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A `(x, y, z)` triple of `f32`.
///
/// Layout properties store node positions as `Vec3f`; size properties store
/// `(width, height, depth)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A node position.
pub type Coord = Vec3f;
/// A node or edge size.
pub type Size = Vec3f;

impl Vec3f {
    pub const ZERO: Vec3f = Vec3f::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn components(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Lexicographic total order (IEEE `totalOrder` per component).
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.total_cmp(&other.z))
    }

    fn zip(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(f(self.x, rhs.x), f(self.y, rhs.y), f(self.z, rhs.z))
    }
}

impl Add for Vec3f {
    type Output = Vec3f;
    fn add(self, rhs: Self) -> Self { self.zip(rhs, |a, b| a + b) }
}

impl Sub for Vec3f {
    type Output = Vec3f;
    fn sub(self, rhs: Self) -> Self { self.zip(rhs, |a, b| a - b) }
}

/// Component-wise product.
impl Mul for Vec3f {
    type Output = Vec3f;
    fn mul(self, rhs: Self) -> Self { self.zip(rhs, |a, b| a * b) }
}

impl Mul<f32> for Vec3f {
    type Output = Vec3f;
    fn mul(self, k: f32) -> Self { Self::new(self.x * k, self.y * k, self.z * k) }
}

/// Component-wise quotient.
impl Div for Vec3f {
    type Output = Vec3f;
    fn div(self, rhs: Self) -> Self { self.zip(rhs, |a, b| a / b) }
}

impl fmt::Display for Vec3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl FromStr for Vec3f {
    type Err = ();

    /// Accepts `(x,y,z)` and `(x,y)`; a missing `z` is `0`.
    fn from_str(s: &str) -> Result<Self, ()> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or(())?;
        let parts = inner
            .split(',')
            .map(|p| p.trim().parse::<f32>().map_err(|_| ()))
            .collect::<Result<Vec<_>, ()>>()?;
        match parts.as_slice() {
            [x, y] => Ok(Self::new(*x, *y, 0.0)),
            [x, y, z] => Ok(Self::new(*x, *y, *z)),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let v = Vec3f::new(1.5, -2.0, 0.125);
        assert_eq!(v.to_string(), "(1.5,-2,0.125)");
        assert_eq!(v.to_string().parse::<Vec3f>(), Ok(v));
    }

    #[test]
    fn test_parse_two_components() {
        assert_eq!("( 3 , 4 )".parse::<Vec3f>(), Ok(Vec3f::new(3.0, 4.0, 0.0)));
        assert!("(1,2,3,4)".parse::<Vec3f>().is_err());
        assert!("1,2,3".parse::<Vec3f>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Vec3f::new(1.0, 2.0, 3.0);
        let b = Vec3f::new(2.0, 2.0, 2.0);
        assert_eq!(a + b, Vec3f::new(3.0, 4.0, 5.0));
        assert_eq!(a - b, Vec3f::new(-1.0, 0.0, 1.0));
        assert_eq!(a * b, Vec3f::new(2.0, 4.0, 6.0));
        assert_eq!(a / b, Vec3f::new(0.5, 1.0, 1.5));
        assert_eq!(a * 2.0, Vec3f::new(2.0, 4.0, 6.0));
    }
}
