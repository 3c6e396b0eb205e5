use super::Vec2;

/// 2D affine transform stored column-major, matching the layout GPU shaders expect.
///
/// A point maps as:
///
/// ```text
/// x' = a * x + c * y + tx
/// y' = b * x + d * y + ty
/// ```
///
/// `(a, b)` is the image of the X basis vector, `(c, d)` the image of the Y basis
/// vector and `(tx, ty)` the translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Returns the inverse transform, or `None` when the matrix is singular
    /// (e.g. a drawable scaled to zero on either axis).
    pub fn inverse(&self) -> Option<Affine2> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Affine2 {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn identity_maps_points_to_themselves() {
        let p = Vec2::new(3.5, -7.0);
        assert_eq!(Affine2::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn inverse_round_trips_points() {
        let m = Affine2::new(2.0, 1.0, -0.5, 3.0, 10.0, -4.0);
        let inv = m.inverse().unwrap();
        for p in [Vec2::new(0.0, 0.0), Vec2::new(12.0, -3.0), Vec2::new(-0.25, 99.0)] {
            assert!(approx(inv.transform_point(m.transform_point(p)), p));
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Affine2::new(0.0, 0.0, 0.0, 5.0, 1.0, 1.0);
        assert!(m.inverse().is_none());
    }
}
