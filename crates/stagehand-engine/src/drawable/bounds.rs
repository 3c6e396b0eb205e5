use crate::coords::{Rectangle, Vec2};

use super::Drawable;

/// Height of the slice below the top of the hull used to anchor speech bubbles.
const BUBBLE_SLICE: f32 = 8.0;

impl Drawable {
    /// Loose bounds: the skin's rectangle transformed by the model matrix.
    pub fn aabb(&mut self) -> Rectangle {
        Rectangle::from_model_matrix(&self.model_matrix())
    }

    /// Whether tight bounds need a fresh shape-space hull first.
    #[inline]
    pub fn needs_convex_hull_points(&self) -> bool {
        self.hull_dirty || self.hull.is_empty()
    }

    /// Stores a freshly computed shape-space hull, in skin pixels from the top-left.
    pub fn set_convex_hull_points(&mut self, points: Vec<Vec2>) {
        self.hull = points;
        self.hull_dirty = false;
        self.transformed_hull_dirty = true;
    }

    #[inline]
    pub fn convex_hull_points(&self) -> &[Vec2] {
        &self.hull
    }

    /// World-space hull, recomputed only when the transform or hull changed.
    fn transformed_hull_points(&mut self) -> &[Vec2] {
        if self.transformed_hull_dirty {
            let m = self.model_matrix();
            let size = self.skin_size;
            let half_x = 0.5 / size.x;
            let half_y = 0.5 / size.y;

            self.transformed_hull.clear();
            self.transformed_hull.extend(self.hull.iter().map(|p| {
                // Pixel centers in the unit square, x mirrored like the texture lookup.
                let local = Vec2::new(0.5 - p.x / size.x - half_x, p.y / size.y - 0.5 + half_y);
                m.transform_point(local)
            }));
            self.transformed_hull_dirty = false;
        }
        &self.transformed_hull
    }

    /// Tight bounds around the transformed hull.
    ///
    /// Returns `None` when the hull is stale or empty; see
    /// [`needs_convex_hull_points`](Self::needs_convex_hull_points).
    pub fn bounds(&mut self) -> Option<Rectangle> {
        if self.needs_convex_hull_points() {
            return None;
        }
        Some(Rectangle::from_points_aabb(self.transformed_hull_points()))
    }

    /// Tight bounds of the top slice of the hull only.
    ///
    /// `None` also when no point survives the slice, which happens once the
    /// transform produces non-finite coordinates.
    pub fn bounds_for_bubble(&mut self) -> Option<Rectangle> {
        if self.needs_convex_hull_points() {
            return None;
        }
        let points = self.transformed_hull_points();
        let max_y = points.iter().fold(f32::NEG_INFINITY, |acc, p| acc.max(p.y));
        let top: Vec<Vec2> = points
            .iter()
            .copied()
            .filter(|p| p.y > max_y - BUBBLE_SLICE)
            .collect();
        if top.is_empty() {
            return None;
        }
        Some(Rectangle::from_points_aabb(&top))
    }

    /// Tight bounds when the hull is already known, otherwise the AABB.
    ///
    /// Never computes the hull. Callers needing precision must supply it first.
    pub fn fast_bounds(&mut self) -> Rectangle {
        match self.bounds() {
            Some(b) => b,
            None => self.aabb(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::coords::{Rectangle, Vec2};
    use crate::drawable::Drawable;
    use crate::scene::DrawableId;
    use crate::skin::{Bitmap, BitmapSkin, SkinId};

    fn drawable(w: u32, h: u32) -> Drawable {
        let skin = BitmapSkin::with_bitmap(Bitmap::filled(w, h, [0, 0, 0, 255]), 1.0, None)
            .unwrap();
        let mut d = Drawable::new(DrawableId::new(1));
        d.set_skin(Some(SkinId::new(1)));
        d.sync_skin(Some(&skin));
        d
    }

    fn corners(w: f32, h: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(w - 1.0, 0.0),
            Vec2::new(w - 1.0, h - 1.0),
            Vec2::new(0.0, h - 1.0),
        ]
    }

    fn close(a: Rectangle, b: Rectangle) -> bool {
        (a.left - b.left).abs() < 1e-3
            && (a.right - b.right).abs() < 1e-3
            && (a.bottom - b.bottom).abs() < 1e-3
            && (a.top - b.top).abs() < 1e-3
    }

    #[test]
    fn aabb_covers_skin_rectangle() {
        let mut d = drawable(40, 20);
        d.update_position(Vec2::new(100.0, 50.0));
        assert!(close(d.aabb(), Rectangle::from_bounds(80.0, 120.0, 40.0, 60.0)));
    }

    #[test]
    fn aabb_of_rotated_square_grows() {
        let mut d = drawable(10, 10);
        d.update_direction(45.0);
        let half = 10.0 * core::f32::consts::SQRT_2 / 2.0;
        assert!(close(d.aabb(), Rectangle::from_bounds(-half, half, -half, half)));
    }

    #[test]
    fn fast_bounds_falls_back_to_aabb_without_hull() {
        let mut d = drawable(40, 20);
        assert!(d.needs_convex_hull_points());
        assert!(d.bounds().is_none());
        assert_eq!(d.fast_bounds(), d.aabb());
    }

    #[test]
    fn tight_bounds_use_pixel_centers() {
        let mut d = drawable(40, 20);
        d.set_convex_hull_points(corners(40.0, 20.0));
        // Pixel centers sit half a pixel inside the skin edge.
        let b = d.bounds().unwrap();
        assert!(close(b, Rectangle::from_bounds(-19.5, 19.5, -9.5, 9.5)), "{b:?}");
        assert_eq!(d.fast_bounds(), b);
    }

    #[test]
    fn tight_bounds_follow_translation_without_new_hull() {
        let mut d = drawable(40, 20);
        d.set_convex_hull_points(corners(40.0, 20.0));
        let _ = d.bounds();
        d.update_position(Vec2::new(10.0, 0.0));
        assert!(!d.needs_convex_hull_points());
        let b = d.bounds().unwrap();
        assert!(close(b, Rectangle::from_bounds(-9.5, 29.5, -9.5, 9.5)), "{b:?}");
    }

    #[test]
    fn hull_points_map_top_left_to_world_top_left() {
        let mut d = drawable(40, 20);
        d.set_convex_hull_points(vec![Vec2::new(0.0, 0.0)]);
        let b = d.bounds().unwrap();
        assert!((b.left + 19.5).abs() < 1e-3 && (b.top - 9.5).abs() < 1e-3, "{b:?}");
    }

    #[test]
    fn bubble_bounds_keep_top_slice() {
        let mut d = drawable(40, 40);
        d.set_convex_hull_points(corners(40.0, 40.0));
        let b = d.bounds_for_bubble().unwrap();
        // Only the two top corners (y = 19.5) survive the 8-unit slice.
        assert!((b.bottom - 19.5).abs() < 1e-3 && (b.top - 19.5).abs() < 1e-3, "{b:?}");
        assert!((b.width() - 39.0).abs() < 1e-3);
    }

    #[test]
    fn bubble_bounds_of_non_finite_transform_are_none() {
        let mut d = drawable(40, 40);
        d.set_convex_hull_points(corners(40.0, 40.0));
        d.update_position(Vec2::new(f32::NAN, f32::NAN));
        assert!(d.bounds_for_bubble().is_none());
    }

    #[test]
    fn hull_dirty_after_shape_change() {
        let mut d = drawable(40, 20);
        d.set_convex_hull_points(corners(40.0, 20.0));
        d.update_visible(false);
        assert!(d.needs_convex_hull_points());
        assert!(d.bounds_for_bubble().is_none());
    }
}
