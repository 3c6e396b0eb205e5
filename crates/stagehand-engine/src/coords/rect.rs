use super::{Affine2, Vec2};

/// Axis-aligned bounding box in stage space (+Y up).
///
/// After any valid initialization `left <= right` and `bottom <= top`. The
/// intersection of two disjoint rectangles violates that (an "impossible box");
/// check [`is_valid`](Self::is_valid) before trusting `width`/`height` of such a result.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rectangle {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Rectangle {
    #[inline]
    pub const fn from_bounds(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self { left, right, bottom, top }
    }

    /// Minimal AABB around `points`.
    ///
    /// Callers must not pass an empty slice. In release builds an empty slice
    /// yields an inverted box (`+inf`/`-inf` bounds) that intersects nothing.
    pub fn from_points_aabb(points: &[Vec2]) -> Self {
        debug_assert!(!points.is_empty(), "Rectangle::from_points_aabb called with no points");

        let mut r = Rectangle::from_bounds(
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::INFINITY,
            f32::NEG_INFINITY,
        );
        for p in points {
            r.left = r.left.min(p.x);
            r.right = r.right.max(p.x);
            r.bottom = r.bottom.min(p.y);
            r.top = r.top.max(p.y);
        }
        r
    }

    /// AABB of the unit square centered at the origin after transformation by `m`.
    ///
    /// Cheaper than transforming four corners: the half extents are the sums of
    /// the absolute projected basis vectors.
    pub fn from_model_matrix(m: &Affine2) -> Self {
        let half_x = (0.5 * m.a).abs() + (0.5 * m.c).abs();
        let half_y = (0.5 * m.b).abs() + (0.5 * m.d).abs();
        Rectangle::from_bounds(m.tx - half_x, m.tx + half_x, m.ty - half_y, m.ty + half_y)
    }

    /// Component-wise intersection. May produce an impossible box.
    #[inline]
    pub fn intersect(a: Rectangle, b: Rectangle) -> Rectangle {
        Rectangle::from_bounds(
            a.left.max(b.left),
            a.right.min(b.right),
            a.bottom.max(b.bottom),
            a.top.min(b.top),
        )
    }

    #[inline]
    pub fn union(a: Rectangle, b: Rectangle) -> Rectangle {
        Rectangle::from_bounds(
            a.left.min(b.left),
            a.right.max(b.right),
            a.bottom.min(b.bottom),
            a.top.max(b.top),
        )
    }

    /// Closed-interval overlap test on both axes (shared edges count).
    #[inline]
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top >= other.bottom
            && other.top >= self.bottom
    }

    #[inline]
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.left > self.left
            && other.right < self.right
            && other.top < self.top
            && other.bottom > self.bottom
    }

    /// Clips to the given bounds. A rectangle fully outside collapses onto the
    /// nearest edge, leaving zero width or height.
    pub fn clamp(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.left = self.left.max(left);
        self.right = self.right.min(right);
        self.bottom = self.bottom.max(bottom);
        self.top = self.top.min(top);

        self.left = self.left.min(right);
        self.right = self.right.max(left);
        self.bottom = self.bottom.min(top);
        self.top = self.top.max(bottom);
    }

    /// Pushes every edge outward to the nearest integer. Never shrinks.
    pub fn snap_to_int(&mut self) {
        self.left = self.left.floor();
        self.right = self.right.ceil();
        self.bottom = self.bottom.floor();
        self.top = self.top.ceil();
    }

    #[inline]
    pub fn snapped_to_int(mut self) -> Self {
        self.snap_to_int();
        self
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// `false` for impossible boxes (e.g. the intersection of disjoint rectangles).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.bottom <= self.top
    }
}
