use crate::coords::{Affine2, Vec2};

use super::Drawable;

impl Drawable {
    /// Rebuilds the model matrix from whichever sub-caches are stale.
    ///
    /// The matrix is `T(position) · R(270° − direction) · T(rotation offset) · S(skin scale)`,
    /// applied to the unit square centered at the origin. Direction 90 therefore
    /// maps to a half-turn, which together with the `u = 0.5 − x` texture flip
    /// displays the skin upright.
    fn calculate_transform(&mut self) {
        if self.rotation_dirty {
            let angle = (270.0 - self.direction).to_radians();
            let (sin, cos) = angle.sin_cos();
            self.rotation = (cos, sin);
            self.rotation_dirty = false;
        }

        if self.rotation_center_dirty {
            let center = self.skin_rotation_center;
            let size = self.skin_size;
            self.rotation_adjusted = Vec2::new(
                (center.x - size.x / 2.0) * self.scale.x / 100.0,
                -((center.y - size.y / 2.0) * self.scale.y / 100.0),
            );
            self.rotation_center_dirty = false;
        }

        if self.skin_scale_dirty {
            self.skin_scale = Vec2::new(
                self.scale.x * self.skin_size.x / 100.0,
                self.scale.y * self.skin_size.y / 100.0,
            );
            self.skin_scale_dirty = false;
        }

        let (cos, sin) = self.rotation;
        let s = self.skin_scale;
        let adj = self.rotation_adjusted;
        let pos = self.position;

        self.model = Affine2::new(
            s.x * cos,
            s.x * sin,
            s.y * -sin,
            s.y * cos,
            cos * adj.x - sin * adj.y + pos.x,
            sin * adj.x + cos * adj.y + pos.y,
        );
        self.transform_dirty = false;
    }

    /// Brings the model and inverse matrices up to date.
    pub fn update_matrix(&mut self) {
        if self.transform_dirty {
            self.calculate_transform();
        }
        if self.inverse_dirty {
            self.inverse = self.model.inverse();
            self.inverse_dirty = false;
        }
    }

    pub fn model_matrix(&mut self) -> Affine2 {
        if self.transform_dirty {
            self.calculate_transform();
        }
        self.model
    }

    /// Inverse of the model matrix; `None` while the drawable is degenerate
    /// (zero scale or zero-size skin).
    pub fn inverse_matrix(&mut self) -> Option<Affine2> {
        self.update_matrix();
        self.inverse
    }

    /// Inverse as of the last [`update_matrix`](Self::update_matrix), without recomputing.
    #[inline]
    pub fn cached_inverse(&self) -> Option<Affine2> {
        debug_assert!(!self.inverse_dirty, "inverse read while stale");
        self.inverse
    }
}
