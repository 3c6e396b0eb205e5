//! Skins: the visual content a drawable displays.
//!
//! A skin owns its silhouette and reports its size and rotation center. Changes
//! are published through a monotonically increasing [`Skin::generation`]; drawables
//! remember the last generation they saw and recompute their caches when it moves.

mod bitmap;
mod silhouette;

pub use bitmap::{Bitmap, BitmapSkin};
pub use silhouette::{PixelSource, Silhouette};

use crate::coords::{Rectangle, Vec2};
use crate::drawable::Drawable;
use crate::effects::SHAPE_EFFECTS;

/// Stable skin handle. Never reused within a stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SkinId(u32);

impl SkinId {
    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Content source consumed by drawables.
pub trait Skin {
    /// Declared size in stage units.
    fn size(&self) -> Vec2;

    /// Rotation center in skin units, measured from the top-left corner.
    fn rotation_center(&self) -> Vec2;

    /// Monotonic change counter. Bumped whenever size, rotation center or pixels change.
    fn generation(&self) -> u64;

    /// Brings the silhouette up to date. Cheap when nothing changed.
    fn update_silhouette(&mut self);

    fn silhouette(&self) -> &Silhouette;

    /// Whether the skin takes part in touching queries at all.
    fn is_touchable(&self) -> bool {
        true
    }

    /// Whether touch tests against `drawable` should sample the nearest pixel
    /// instead of the bilinear neighborhood.
    ///
    /// Nearest sampling is only exact when the skin is drawn at native size,
    /// axis-aligned and undistorted.
    fn use_nearest(&self, scale: Vec2, drawable: &Drawable) -> bool {
        if drawable.effects().enabled() & SHAPE_EFFECTS != 0 {
            return false;
        }
        if drawable.direction() % 90.0 != 0.0 {
            return false;
        }
        let native = |s: f32| s.abs() > 99.0 && s.abs() < 101.0;
        native(scale.x) && native(scale.y)
    }

    /// Bounds used to keep `drawable` on stage.
    fn fence_bounds(&self, drawable: &mut Drawable) -> Rectangle {
        drawable.aabb()
    }

    /// Concrete access for registries that replace bitmap content in place.
    fn as_bitmap_mut(&mut self) -> Option<&mut BitmapSkin> {
        None
    }
}
