use crate::coords::Vec2;
use crate::paint::Rgb8;
use crate::render::{composite_color, ColorQuery, CpuPath, OffscreenPath, PixelRegion, TouchingColorPath};
use crate::scene::DrawableId;

use super::touching::candidates_bounds;
use super::{prepare, render_layer, render_layers, Stage, UseGpuMode};

impl Stage {
    /// Visible drawables that can show anything, back to front.
    fn visible_draw_list(&self) -> Vec<DrawableId> {
        self.draw_list
            .ids()
            .iter()
            .copied()
            .filter(|&id| {
                self.drawables.get(id).is_some_and(|d| {
                    d.visible()
                        && d.effects().ghost_alpha() > 0.0
                        && d.skin().is_some_and(|s| self.skins.contains_key(&s))
                })
            })
            .collect()
    }

    /// Pixel budget above which color queries go offscreen.
    fn max_pixels_for_cpu(&self) -> f32 {
        match self.use_gpu {
            UseGpuMode::Automatic => self.max_pixels_for_cpu as f32,
            UseGpuMode::ForceCpu => f32::INFINITY,
            UseGpuMode::ForceGpu => 0.0,
        }
    }

    /// Whether `color` is visible on stage anywhere `id` draws.
    ///
    /// With `mask`, only pixels where `id` itself shows the mask color count
    /// (ghost ignored). Colors compare exactly, after effects.
    pub fn is_touching_color(&mut self, id: DrawableId, color: Rgb8, mask: Option<Rgb8>) -> bool {
        if !self.prepare_drawable(id) {
            log::warn!("is_touching_color: unknown drawable {id}");
            return false;
        }

        let visible = self.visible_draw_list();
        let candidates = self.candidates_touching(id, &visible);

        // The background spans the stage, so every pixel of the tester counts.
        let bounds = if color == self.background {
            self.touching_bounds(id)
        } else {
            candidates_bounds(&candidates)
        };
        let Some(bounds) = bounds else {
            return false;
        };

        let cost = bounds.width() * bounds.height() * (candidates.len() + 1) as f32;
        let offscreen = cost >= self.max_pixels_for_cpu();

        let Some(tester) = render_layer(&self.drawables, &self.skins, id) else {
            return false;
        };
        let ids: Vec<DrawableId> = candidates.iter().map(|c| c.id).collect();
        let layers = render_layers(&self.drawables, &self.skins, &ids);
        let query = ColorQuery {
            region: PixelRegion::from_rect(&bounds),
            tester,
            candidates: &layers,
            color,
            mask,
            background: self.background,
        };

        if offscreen {
            let mut path = OffscreenPath::new(&mut *self.offscreen);
            log::debug!("is_touching_color: {id} via {} ({cost} px)", path.name());
            match path.is_touching_color(&query) {
                Ok(hit) => return hit,
                Err(e) => log::warn!("is_touching_color: {} path failed, using cpu: {e:#}", path.name()),
            }
        }

        CpuPath.is_touching_color(&query).unwrap_or_else(|e| {
            log::error!("is_touching_color: cpu path failed: {e:#}");
            false
        })
    }

    /// Stage color at a point: visible drawables composited over the background.
    pub fn color_at(&mut self, point: Vec2) -> Rgb8 {
        let mut ids = self.visible_draw_list();
        for &id in &ids {
            if let Some(d) = self.drawables.get_mut(id) {
                prepare(d, &mut self.skins);
            }
        }
        ids.reverse();
        let layers = render_layers(&self.drawables, &self.skins, &ids);
        composite_color(&layers, point, self.background)
    }
}
