use anyhow::ensure;

use super::{composite_color, mask_passes, ColorQuery, OffscreenRenderer};

/// One way of answering a [`ColorQuery`].
pub trait TouchingColorPath {
    fn name(&self) -> &'static str;

    fn is_touching_color(&mut self, query: &ColorQuery<'_>) -> anyhow::Result<bool>;
}

/// Pixel walk on the CPU. Stops at the first matching pixel.
#[derive(Debug, Default, Copy, Clone)]
pub struct CpuPath;

impl TouchingColorPath for CpuPath {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn is_touching_color(&mut self, query: &ColorQuery<'_>) -> anyhow::Result<bool> {
        for point in query.region.points() {
            let drawn = match query.mask {
                Some(mask) => mask_passes(&query.tester, point, mask),
                None => query.tester.is_touching(point),
            };
            if drawn && composite_color(query.candidates, point, query.background) == query.color {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Renders the whole region offscreen, then scans the readback.
pub struct OffscreenPath<'r> {
    renderer: &'r mut dyn OffscreenRenderer,
}

impl<'r> OffscreenPath<'r> {
    pub fn new(renderer: &'r mut dyn OffscreenRenderer) -> Self {
        Self { renderer }
    }
}

impl TouchingColorPath for OffscreenPath<'_> {
    fn name(&self) -> &'static str {
        self.renderer.name()
    }

    fn is_touching_color(&mut self, query: &ColorQuery<'_>) -> anyhow::Result<bool> {
        let pixels = self.renderer.render_color_query(query)?;
        ensure!(
            pixels.len() == query.region.pixel_count() * 4,
            "{} readback returned {} bytes for {} pixels",
            self.renderer.name(),
            pixels.len(),
            query.region.pixel_count()
        );

        let target = query.color.to_array();
        // Transparent pixels lie outside the tester's footprint.
        Ok(pixels
            .chunks_exact(4)
            .any(|px| px[3] != 0 && px[..3] == target))
    }
}
