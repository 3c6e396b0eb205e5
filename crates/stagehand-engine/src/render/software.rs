use crate::scene::color_from_id;

use super::{
    composite_color, mask_passes, topmost_touching, ColorQuery, OffscreenRenderer, PixelRegion,
    RenderLayer,
};

/// CPU emulation of the offscreen pipeline.
///
/// Renders the full region (no early exit) exactly as the GPU pass would:
/// tester footprint first, then background, then candidates composited on top.
/// Always available, so it backs the offscreen path when no adapter is wanted.
#[derive(Debug, Default)]
pub struct SoftwareRenderer {
    frames: u64,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of regions rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl OffscreenRenderer for SoftwareRenderer {
    fn name(&self) -> &'static str {
        "software"
    }

    fn render_color_query(&mut self, query: &ColorQuery<'_>) -> anyhow::Result<Vec<u8>> {
        self.frames += 1;
        let mut out = Vec::with_capacity(query.region.pixel_count() * 4);
        for point in query.region.points() {
            let drawn = match query.mask {
                Some(mask) => mask_passes(&query.tester, point, mask),
                None => query.tester.is_touching(point),
            };
            if drawn {
                let c = composite_color(query.candidates, point, query.background);
                out.extend_from_slice(&[c.r, c.g, c.b, 255]);
            } else {
                out.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
        Ok(out)
    }

    fn render_id_buffer(
        &mut self,
        region: PixelRegion,
        candidates: &[RenderLayer<'_>],
    ) -> anyhow::Result<Vec<u8>> {
        self.frames += 1;
        let mut out = Vec::with_capacity(region.pixel_count() * 4);
        for point in region.points() {
            let id = topmost_touching(candidates, point);
            if id.is_none() {
                out.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                let c = color_from_id(id);
                out.extend_from_slice(&[c.r, c.g, c.b, 255]);
            }
        }
        Ok(out)
    }
}
