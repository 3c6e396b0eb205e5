use crate::coords::Vec2;
use crate::effects::{transform_color, transform_point};
use crate::paint::Rgba8;
use crate::skin::{Silhouette, Skin};

use super::Drawable;

/// Local coordinates this close to zero snap to zero.
const FLOAT_EPSILON: f32 = 1e-6;

/// How point touch tests sample the silhouette.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TouchFilter {
    /// Never touching (no skin).
    #[default]
    Never,
    Nearest,
    /// Touching if any pixel of the bilinear neighborhood has alpha.
    Linear,
}

impl Drawable {
    /// Prepares the drawable for point queries: refreshes both matrices, the
    /// skin's silhouette and the touch filter.
    ///
    /// Point queries assume this ran after the last mutation; it is not
    /// re-checked per point so batches stay cheap.
    pub fn update_cpu_render_attributes(&mut self, skin: Option<&mut dyn Skin>) {
        self.update_matrix();
        self.filter = match skin {
            Some(skin) => {
                skin.update_silhouette();
                if skin.use_nearest(self.scale, self) {
                    TouchFilter::Nearest
                } else {
                    TouchFilter::Linear
                }
            }
            None => TouchFilter::Never,
        };
    }

    #[inline]
    pub fn touch_filter(&self) -> TouchFilter {
        self.filter
    }

    /// Maps a stage point to texture space (`[0, 1]²`, `(0, 0)` top-left),
    /// including shape-changing effects.
    ///
    /// Degenerate drawables map every point to NaN, which never touches.
    pub fn local_position(&self, point: Vec2) -> Vec2 {
        let Some(inv) = self.cached_inverse() else {
            return Vec2::splat(f32::NAN);
        };
        let p = inv.transform_point(point);
        let snap = |v: f32| if v.abs() < FLOAT_EPSILON { 0.0 } else { v };
        let local = Vec2::new(snap(0.5 - p.x), snap(p.y + 0.5));

        let inside = (0.0..1.0).contains(&local.x) && (0.0..1.0).contains(&local.y);
        if self.effects.enabled() != 0 && inside {
            return transform_point(&self.effects, self.skin_size, local);
        }
        local
    }

    /// Point touch test with the filter chosen by the last
    /// [`update_cpu_render_attributes`](Self::update_cpu_render_attributes).
    pub fn is_touching(&self, silhouette: &Silhouette, point: Vec2) -> bool {
        match self.filter {
            TouchFilter::Never => false,
            TouchFilter::Nearest => silhouette.is_touching_nearest(self.local_position(point)),
            TouchFilter::Linear => silhouette.is_touching_linear(self.local_position(point)),
        }
    }

    /// Skin color under a stage point after color effects.
    ///
    /// Effects outside `effect_mask` are skipped. Points off the skin are transparent.
    pub fn sample_color(&self, silhouette: &Silhouette, point: Vec2, effect_mask: u32) -> Rgba8 {
        let local = self.local_position(point);
        if local.x < 0.0 || local.y < 0.0 || local.x > 1.0 || local.y > 1.0 {
            return Rgba8::TRANSPARENT;
        }
        let color = silhouette.color_at_nearest(local);
        if self.effects.enabled() == 0 {
            return color;
        }
        transform_color(&self.effects, color, effect_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::scene::DrawableId;
    use crate::skin::{Bitmap, BitmapSkin, SkinId};

    /// 4x4 skin: left half red, right half transparent.
    fn half_skin() -> BitmapSkin {
        let mut px = Vec::new();
        for _y in 0..4 {
            for x in 0..4 {
                px.extend_from_slice(if x < 2 { &[255, 0, 0, 255] } else { &[0, 0, 0, 0] });
            }
        }
        BitmapSkin::with_bitmap(Bitmap::new(4, 4, px), 1.0, None).unwrap()
    }

    fn prepared(skin: &mut BitmapSkin, f: impl FnOnce(&mut Drawable)) -> Drawable {
        let mut d = Drawable::new(DrawableId::new(1));
        d.set_skin(Some(SkinId::new(1)));
        d.sync_skin(Some(&*skin));
        f(&mut d);
        d.update_cpu_render_attributes(Some(skin));
        d
    }

    // ── local position ────────────────────────────────────────────────────

    #[test]
    fn world_corners_map_to_texture_corners() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |_| {});
        let tr = d.local_position(Vec2::new(2.0, 2.0));
        assert!((tr.x - 1.0).abs() < 1e-6 && tr.y.abs() < 1e-6, "{tr:?}");
        let bl = d.local_position(Vec2::new(-2.0, -2.0));
        assert!(bl.x.abs() < 1e-6 && (bl.y - 1.0).abs() < 1e-6, "{bl:?}");
    }

    #[test]
    fn degenerate_drawable_maps_to_nan() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |d| d.update_scale(Vec2::new(0.0, 100.0)));
        assert!(d.local_position(Vec2::zero()).x.is_nan());
    }

    // ── touch ─────────────────────────────────────────────────────────────

    #[test]
    fn native_upright_drawable_uses_nearest() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |_| {});
        assert_eq!(d.touch_filter(), TouchFilter::Nearest);
        assert!(d.is_touching(skin.silhouette(), Vec2::new(-1.5, 0.0)));
        assert!(!d.is_touching(skin.silhouette(), Vec2::new(1.5, 0.0)));
    }

    #[test]
    fn rotated_or_distorted_drawables_use_linear() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |d| d.update_direction(45.0));
        assert_eq!(d.touch_filter(), TouchFilter::Linear);

        let d = prepared(&mut skin, |d| d.update_effect(Effect::Whirl, 10.0));
        assert_eq!(d.touch_filter(), TouchFilter::Linear);

        let d = prepared(&mut skin, |d| d.update_scale(Vec2::splat(200.0)));
        assert_eq!(d.touch_filter(), TouchFilter::Linear);
    }

    #[test]
    fn skinless_drawable_never_touches() {
        let skin = half_skin();
        let mut d = Drawable::new(DrawableId::new(1));
        d.update_cpu_render_attributes(None);
        assert_eq!(d.touch_filter(), TouchFilter::Never);
        assert!(!d.is_touching(skin.silhouette(), Vec2::zero()));
    }

    #[test]
    fn mirrored_drawable_touches_other_side() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |d| d.update_scale(Vec2::new(-100.0, 100.0)));
        assert!(!d.is_touching(skin.silhouette(), Vec2::new(-1.5, 0.0)));
        assert!(d.is_touching(skin.silhouette(), Vec2::new(1.5, 0.0)));
    }

    // ── color ─────────────────────────────────────────────────────────────

    #[test]
    fn sample_color_applies_effects_under_mask() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |d| d.update_effect(Effect::Ghost, 50.0));
        let p = Vec2::new(-1.5, 0.0);
        assert_eq!(d.sample_color(skin.silhouette(), p, u32::MAX).a, 128);
        assert_eq!(
            d.sample_color(skin.silhouette(), p, !Effect::Ghost.mask()),
            Rgba8::opaque(255, 0, 0)
        );
    }

    #[test]
    fn sample_color_off_skin_is_transparent() {
        let mut skin = half_skin();
        let d = prepared(&mut skin, |_| {});
        assert_eq!(d.sample_color(skin.silhouette(), Vec2::new(50.0, 0.0), u32::MAX), Rgba8::TRANSPARENT);
    }
}
