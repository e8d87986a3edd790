#![forbid(unsafe_code)]

//! Geometric primitives in floating-point scene units.
//!
//! Every coordinate space in panview (scene, viewport-local, content) uses
//! the same value types; which space a value lives in is a property of the
//! code handling it, not of the type.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A point (or displacement) in a 2D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when the point is read as a vector.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Manhattan length when the point is read as a vector.
    #[inline]
    #[must_use]
    pub fn manhattan_length(self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    /// Component-wise scale.
    #[inline]
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Linear interpolation between `self` and `other` at `t` in [0, 1].
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// True when both components are zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// True when both components are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for PointF {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for PointF {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for PointF {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for PointF {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for PointF {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for PointF {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeF {
    pub width: f64,
    pub height: f64,
}

impl SizeF {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions.
    #[inline]
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// True if either dimension is zero or negative.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Read the size as a displacement from the origin.
    #[inline]
    #[must_use]
    pub const fn to_point(self) -> PointF {
        PointF::new(self.width, self.height)
    }
}

/// An axis-aligned rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(size: SizeF) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> PointF {
        PointF::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> SizeF {
        SizeF::new(self.width, self.height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point lies inside the rectangle (right/bottom exclusive).
    #[inline]
    #[must_use]
    pub fn contains(&self, p: PointF) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Nearest point inside the rectangle (edges inclusive).
    #[must_use]
    pub fn clamp_point(&self, p: PointF) -> PointF {
        PointF::new(
            p.x.clamp(self.x, self.right().max(self.x)),
            p.y.clamp(self.y, self.bottom().max(self.y)),
        )
    }

    /// Move the rectangle by `delta`.
    #[inline]
    #[must_use]
    pub fn translated(&self, delta: PointF) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Scale position and size about the origin.
    #[inline]
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Intersection of two rectangles, or `None` if they do not overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Self::new(x, y, right - x, bottom - y))
    }
}
