//! Strongly-typed numeric primitives shared by geometry and selection.
//!
//! Coordinates are scene units with the y axis growing downward, angles are
//! degrees measured clockwise from the positive x axis (so 90° points at
//! the bottom of the screen).

use std::fmt;
use std::ops::{Add, Mul, Sub};

use glam::{DVec2, dvec2};

/// Angle in degrees
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    pub const ZERO: Degrees = Degrees(0.0);

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Unit vector pointing along this angle in screen space.
    #[inline]
    pub fn unit(self) -> DVec2 {
        let r = self.to_radians();
        dvec2(r.cos(), r.sin())
    }
}

impl Add for Degrees {
    type Output = Degrees;
    fn add(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Degrees;
    fn sub(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 - rhs.0)
    }
}

impl Mul<f64> for Degrees {
    type Output = Degrees;
    fn mul(self, rhs: f64) -> Degrees {
        Degrees(self.0 * rhs)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point on a circle of `radius` around `center` at `angle`.
#[inline]
pub fn polar(center: DVec2, radius: f64, angle: Degrees) -> DVec2 {
    center + angle.unit() * radius
}

/// A value domain `[min, max]` used to turn values into ratios.
///
/// Degenerate domains (`max <= min`) are widened to a span of 1 so ratio
/// math never divides by zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min } else { 0.0 };
        let max = if max.is_finite() && max > min { max } else { min + 1.0 };
        Domain { min, max }
    }

    #[inline]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the domain, clamped to `[0, 1]`.
    /// Non-finite values sit at the start of the domain.
    pub fn ratio(self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        (self.clamp(value) - self.min) / self.span()
    }

    /// Inverse of [`ratio`](Self::ratio).
    pub fn lerp(self, ratio: f64) -> f64 {
        self.min + ratio * self.span()
    }
}

/// Axis-aligned rectangle in scene units (top-left origin).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// Rectangle spanned by two arbitrary corners (drag start and end).
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn min(&self) -> DVec2 {
        dvec2(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> DVec2 {
        dvec2(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        dvec2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Full, boundary-inclusive containment of `other`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        let (a0, a1) = (self.min(), self.max());
        let (b0, b1) = (other.min(), other.max());
        b0.x >= a0.x && b1.x <= a1.x && b0.y >= a0.y && b1.y <= a1.y
    }

    pub fn contains_point(&self, p: DVec2) -> bool {
        let (a0, a1) = (self.min(), self.max());
        p.x >= a0.x && p.x <= a1.x && p.y >= a0.y && p.y <= a1.y
    }

    /// Shrink by `amount` on every side.
    pub fn inset(&self, amount: f64) -> Rect {
        let w = (self.width - amount * 2.0).max(0.0);
        let h = (self.height - amount * 2.0).max(0.0);
        Rect::new(self.x + amount, self.y + amount, w, h)
    }
}
