use crate::coords::Vec2;
use crate::effects::Effect;
use crate::paint::Rgb8;
use crate::scene::{DrawableId, ID_NONE};

use super::RenderLayer;

/// Effects applied when sampling the tester against a mask color. Ghost is
/// excluded so a faded sprite still matches its own colors.
pub const MASK_EFFECTS: u32 = !Effect::Ghost.mask();

/// Stage color at `point`: `candidates` (topmost first) composited
/// premultiplied-over onto an opaque background.
pub fn composite_color(candidates: &[RenderLayer<'_>], point: Vec2, background: Rgb8) -> Rgb8 {
    let mut dst = [0.0f32; 3];
    let mut blend_alpha = 1.0f32;

    for layer in candidates {
        if blend_alpha == 0.0 {
            break;
        }
        let c = layer
            .drawable
            .sample_color(layer.silhouette, point, u32::MAX);
        let alpha = c.a as f32 / 255.0;
        let rgb = [c.r, c.g, c.b];
        for (d, s) in dst.iter_mut().zip(rgb) {
            *d += s as f32 * alpha * blend_alpha;
        }
        blend_alpha *= 1.0 - alpha;
    }

    let bg = background.to_array();
    let out: [u8; 3] = core::array::from_fn(|i| {
        (dst[i] + blend_alpha * bg[i] as f32).round().clamp(0.0, 255.0) as u8
    });
    Rgb8::from(out)
}

/// Whether the tester shows `mask` at `point` (any alpha, exact RGB).
pub fn mask_passes(tester: &RenderLayer<'_>, point: Vec2, mask: Rgb8) -> bool {
    let c = tester
        .drawable
        .sample_color(tester.silhouette, point, MASK_EFFECTS);
    c.a > 0 && c.rgb() == mask
}

/// Topmost candidate touching `point`, or [`ID_NONE`].
pub fn topmost_touching(candidates: &[RenderLayer<'_>], point: Vec2) -> DrawableId {
    candidates
        .iter()
        .find(|layer| layer.is_touching(point))
        .map_or(ID_NONE, |layer| layer.drawable.id())
}
