use crate::coords::Rectangle;
use crate::paint::Rgb8;
use crate::render::{PixelRegion, RenderLayer};
use crate::scene::{id_from_color, DrawableId, ID_NONE};

use super::{prepare, render_layer, render_layers, Stage, UseGpuMode};

/// Largest touch area, in stage pixels, a client touch maps to.
const MAX_TOUCH_SIZE: (f32, f32) = (3.0, 3.0);

/// A drawable whose bounds overlap the tester's.
#[derive(Debug, Copy, Clone)]
pub(super) struct Candidate {
    pub id: DrawableId,
    /// Overlap of the candidate's and the tester's bounds.
    pub intersection: Rectangle,
}

/// Union of the candidates' intersections. `None` without candidates.
pub(super) fn candidates_bounds(candidates: &[Candidate]) -> Option<Rectangle> {
    candidates
        .iter()
        .map(|c| c.intersection)
        .reduce(Rectangle::union)
}

impl Stage {
    /// The tester's bounds clipped to the stage and grown to whole pixels.
    ///
    /// `None` for skinless drawables and drawables entirely off stage. The
    /// drawable must be prepared.
    pub(super) fn touching_bounds(&mut self, id: DrawableId) -> Option<Rectangle> {
        let d = self.drawables.get_mut(id)?;
        d.skin().filter(|s| self.skins.contains_key(s))?;

        let mut bounds = d.fast_bounds();
        let b = self.bounds;
        bounds.clamp(b.x_left, b.x_right, b.y_bottom, b.y_top);
        bounds.snap_to_int();
        if bounds.width() == 0.0 || bounds.height() == 0.0 {
            return None;
        }
        Some(bounds)
    }

    /// Broad phase: drawables from `candidate_ids` (back to front) whose bounds
    /// overlap the tester's, returned topmost first and prepared for point queries.
    ///
    /// Skips the tester itself, unknown ids, invisible and skinless drawables,
    /// and skins that opt out of touching.
    pub(super) fn candidates_touching(
        &mut self,
        id: DrawableId,
        candidate_ids: &[DrawableId],
    ) -> Vec<Candidate> {
        let Some(bounds) = self.touching_bounds(id) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for &cid in candidate_ids.iter().rev() {
            if cid == id {
                continue;
            }
            let Some(d) = self.drawables.get_mut(cid) else { continue };
            let touchable = d
                .skin()
                .and_then(|s| self.skins.get(&s))
                .is_some_and(|s| s.is_touchable());
            if !touchable || !d.visible() {
                continue;
            }

            prepare(d, &mut self.skins);
            let candidate_bounds = d.fast_bounds().snapped_to_int();
            if bounds.intersects(&candidate_bounds) {
                out.push(Candidate {
                    id: cid,
                    intersection: Rectangle::intersect(bounds, candidate_bounds),
                });
            }
        }
        out
    }

    /// Whether any opaque pixel of `id` overlaps an opaque pixel of a candidate.
    ///
    /// `candidates` defaults to the whole draw list.
    pub fn is_touching_drawables(&mut self, id: DrawableId, candidates: Option<&[DrawableId]>) -> bool {
        if !self.prepare_drawable(id) {
            log::warn!("is_touching_drawables: unknown drawable {id}");
            return false;
        }
        let ids = match candidates {
            Some(c) => c.to_vec(),
            None => self.draw_list.ids().to_vec(),
        };
        let candidates = self.candidates_touching(id, &ids);
        let Some(region) = candidates_bounds(&candidates) else {
            return false;
        };

        let Some(tester) = render_layer(&self.drawables, &self.skins, id) else {
            return false;
        };
        let ids: Vec<DrawableId> = candidates.iter().map(|c| c.id).collect();
        let layers = render_layers(&self.drawables, &self.skins, &ids);

        PixelRegion::from_rect(&region)
            .points()
            .any(|p| tester.is_touching(p) && layers.iter().any(|l| l.is_touching(p)))
    }

    /// Maps a client-space touch (center plus size in client pixels) to the
    /// block of stage pixels it covers: at least 1x1, at most 3x3.
    pub fn client_to_stage_bounds(
        &self,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
    ) -> Rectangle {
        let native = self.native_size();
        let client = self.client_size();
        let rx = native.x / client.x;
        let ry = native.y / client.y;

        let w = (width.unwrap_or(1.0) * rx).round().clamp(1.0, MAX_TOUCH_SIZE.0);
        let h = (height.unwrap_or(1.0) * ry).round().clamp(1.0, MAX_TOUCH_SIZE.1);

        let sx = x * rx - (w - 1.0) / 2.0;
        // Client y grows downward.
        let sy = y * ry + (h - 1.0) / 2.0;
        let x_ofs = if w % 2.0 != 0.0 { 0.0 } else { -0.5 };
        let y_ofs = if h % 2.0 != 0.0 { 0.0 } else { -0.5 };

        let b = self.bounds;
        Rectangle::from_bounds(
            (b.x_left + sx + x_ofs).floor(),
            (b.x_left + sx + x_ofs + w - 1.0).floor(),
            (b.y_top - sy + y_ofs).ceil(),
            (b.y_top - sy + y_ofs + h - 1.0).ceil(),
        )
    }

    /// Whether `id` has an opaque pixel under a client-space touch.
    pub fn drawable_touching(
        &mut self,
        id: DrawableId,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
    ) -> bool {
        if !self.prepare_drawable(id) {
            log::warn!("drawable_touching: unknown drawable {id}");
            return false;
        }
        let bounds = self.client_to_stage_bounds(x, y, width, height);
        let Some(layer) = render_layer(&self.drawables, &self.skins, id) else {
            return false;
        };
        PixelRegion::from_rect(&bounds).points().any(|p| layer.is_touching(p))
    }

    /// Topmost drawable under a client-space touch, or [`ID_NONE`].
    ///
    /// Every stage pixel of the touch votes for the topmost drawable touching
    /// it; the drawable with most votes wins (ties go to the higher one).
    /// `candidates` (back to front) replaces the default set of visible,
    /// not fully ghosted drawables.
    pub fn pick(
        &mut self,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
        candidates: Option<&[DrawableId]>,
    ) -> DrawableId {
        let bounds = self.client_to_stage_bounds(x, y, width, height);
        let ids = match candidates {
            Some(c) => c.to_vec(),
            None => self.draw_list.ids().to_vec(),
        };
        let filter_hidden = candidates.is_none();

        let mut picked: Vec<DrawableId> = Vec::new();
        for id in ids.into_iter().rev() {
            let Some(d) = self.drawables.get_mut(id) else { continue };
            if filter_hidden && !(d.visible() && d.effects().ghost_alpha() > 0.0) {
                continue;
            }
            prepare(d, &mut self.skins);
            if bounds.intersects(&d.fast_bounds()) {
                picked.push(id);
            }
        }
        if picked.is_empty() {
            return ID_NONE;
        }

        let layers = render_layers(&self.drawables, &self.skins, &picked);
        let region = PixelRegion::from_rect(&bounds);

        let votes = if self.use_gpu == UseGpuMode::ForceGpu {
            match self.offscreen.render_id_buffer(region, &layers) {
                Ok(pixels) => id_buffer_votes(&pixels, &layers),
                Err(e) => {
                    log::warn!("pick: {} id buffer failed, using cpu: {e:#}", self.offscreen.name());
                    cpu_votes(region, &layers)
                }
            }
        } else {
            cpu_votes(region, &layers)
        };

        match elect(&votes) {
            Some(i) => layers[i].drawable.id(),
            None => ID_NONE,
        }
    }
}

/// Per-layer vote counts: each pixel votes for its topmost touching layer.
fn cpu_votes(region: PixelRegion, layers: &[RenderLayer<'_>]) -> Vec<u32> {
    let mut votes = vec![0; layers.len()];
    for p in region.points() {
        if let Some(i) = layers.iter().position(|l| l.is_touching(p)) {
            votes[i] += 1;
        }
    }
    votes
}

/// Same tally read from an encoded id buffer.
fn id_buffer_votes(pixels: &[u8], layers: &[RenderLayer<'_>]) -> Vec<u32> {
    let mut votes = vec![0; layers.len()];
    for px in pixels.chunks_exact(4) {
        if px[3] == 0 {
            continue;
        }
        let id = id_from_color(Rgb8::new(px[0], px[1], px[2]));
        if let Some(i) = layers.iter().position(|l| l.drawable.id() == id) {
            votes[i] += 1;
        }
    }
    votes
}

/// Index with the most votes. Earlier (higher) layers win ties; no votes, no winner.
fn elect(votes: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &n) in votes.iter().enumerate() {
        if n > best.map_or(0, |(_, m)| m) {
            best = Some((i, n));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::effects::Effect;
    use crate::stage::tests::{sprite, stage};

    // ── client mapping ────────────────────────────────────────────────────

    #[test]
    fn client_center_maps_to_stage_origin() {
        let s = stage();
        assert_eq!(
            s.client_to_stage_bounds(240.0, 180.0, None, None),
            Rectangle::from_bounds(0.0, 0.0, 0.0, 0.0)
        );
        assert_eq!(
            s.client_to_stage_bounds(0.0, 0.0, None, None),
            Rectangle::from_bounds(-240.0, -240.0, 180.0, 180.0)
        );
    }

    #[test]
    fn touch_size_is_clamped_to_three_pixels() {
        let s = stage();
        assert_eq!(
            s.client_to_stage_bounds(240.0, 180.0, Some(10.0), Some(3.0)),
            Rectangle::from_bounds(-1.0, 1.0, -1.0, 1.0)
        );
        // Even sizes lean toward the lower left.
        assert_eq!(
            s.client_to_stage_bounds(240.0, 180.0, Some(2.0), Some(2.0)),
            Rectangle::from_bounds(-1.0, 0.0, -1.0, 0.0)
        );
    }

    #[test]
    fn client_scale_is_applied() {
        let mut s = stage();
        s.resize_client(960.0, 720.0);
        assert_eq!(
            s.client_to_stage_bounds(100.0, 100.0, None, None),
            Rectangle::from_bounds(-190.0, -190.0, 130.0, 130.0)
        );
        // Four client pixels are two stage pixels.
        assert_eq!(
            s.client_to_stage_bounds(480.0, 360.0, Some(4.0), Some(4.0)),
            Rectangle::from_bounds(-1.0, 0.0, -1.0, 0.0)
        );
    }

    // ── touching drawables ────────────────────────────────────────────────

    #[test]
    fn stacked_drawables_touch_until_destroyed() {
        let mut s = stage();
        let b = sprite(&mut s, [0, 0, 255, 255], 10, 0.0, 0.0);
        let a = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);

        assert!(s.is_touching_drawables(a, Some(&[b])));
        assert!(s.is_touching_drawables(b, None));

        assert!(s.destroy_drawable(a, "sprite"));
        assert!(!s.is_touching_drawables(b, Some(&[a])));
        assert!(!s.is_touching_drawables(a, Some(&[b])));
    }

    #[test]
    fn separated_drawables_do_not_touch() {
        let mut s = stage();
        let a = sprite(&mut s, [255, 0, 0, 255], 10, -20.0, 0.0);
        let b = sprite(&mut s, [0, 0, 255, 255], 10, 20.0, 0.0);
        assert!(!s.is_touching_drawables(a, Some(&[b])));

        s.update_drawable_position(b, Vec2::new(-12.0, 3.0));
        assert!(s.is_touching_drawables(a, Some(&[b])));
    }

    #[test]
    fn transparent_skin_never_touches() {
        let mut s = stage();
        let clear = sprite(&mut s, [0, 0, 0, 0], 10, 0.0, 0.0);
        let solid = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);

        assert!(!s.is_touching_drawables(clear, None));
        assert!(!s.is_touching_drawables(solid, Some(&[clear])));
        for y in (150..=210).step_by(5) {
            for x in (210..=270).step_by(5) {
                assert!(!s.drawable_touching(clear, x as f32, y as f32, None, None));
            }
        }
        assert_eq!(s.pick(240.0, 180.0, None, None, Some(&[clear])), ID_NONE);
    }

    #[test]
    fn hidden_candidates_are_ignored() {
        let mut s = stage();
        let a = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);
        let b = sprite(&mut s, [0, 0, 255, 255], 10, 0.0, 0.0);
        s.update_drawable_visible(b, false);
        assert!(!s.is_touching_drawables(a, None));
    }

    #[test]
    fn off_stage_tester_touches_nothing() {
        let mut s = stage();
        let a = sprite(&mut s, [255, 0, 0, 255], 10, 400.0, 0.0);
        let b = sprite(&mut s, [0, 0, 255, 255], 10, 400.0, 0.0);
        assert!(!s.is_touching_drawables(a, Some(&[b])));
    }

    // ── drawable touching ─────────────────────────────────────────────────

    #[test]
    fn drawable_touching_uses_client_space() {
        let mut s = stage();
        let a = sprite(&mut s, [255, 0, 0, 255], 10, 100.0, 50.0);
        // Stage (100, 50) is client (340, 130).
        assert!(s.drawable_touching(a, 340.0, 130.0, None, None));
        assert!(!s.drawable_touching(a, 240.0, 180.0, None, None));
        assert!(!s.drawable_touching(DrawableId::new(77), 340.0, 130.0, None, None));
    }

    // ── pick ──────────────────────────────────────────────────────────────

    #[test]
    fn pick_on_empty_scene_is_none() {
        let mut s = stage();
        assert_eq!(s.pick(240.0, 180.0, None, None, None), ID_NONE);
        let a = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);
        assert_eq!(s.pick(240.0, 180.0, None, None, Some(&[])), ID_NONE);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), a);
    }

    #[test]
    fn pick_returns_topmost() {
        let mut s = stage();
        let below = sprite(&mut s, [0, 0, 255, 255], 20, 0.0, 0.0);
        let above = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), above);
        // Outside the small sprite only the big one is hit.
        assert_eq!(s.pick(248.0, 180.0, None, None, None), below);

        s.set_drawable_order(below, 1, "sprite", false, None);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), below);
    }

    #[test]
    fn pick_skips_hidden_and_ghosted_by_default() {
        let mut s = stage();
        let below = sprite(&mut s, [0, 0, 255, 255], 10, 0.0, 0.0);
        let above = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);

        s.update_drawable_effect(above, Effect::Ghost, 100.0);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), below);
        // An explicit candidate list overrides the filter.
        assert_eq!(s.pick(240.0, 180.0, None, None, Some(&[below, above])), above);

        s.update_drawable_visible(below, false);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), ID_NONE);
    }

    #[test]
    fn pick_majority_beats_topmost() {
        let mut s = stage();
        // 3x3 touch centered on stage (0, 0). The wide sprite covers all nine
        // pixels, the one above it only the column at x = 1.
        let wide = sprite(&mut s, [0, 0, 255, 255], 20, 0.0, 0.0);
        let top = sprite(&mut s, [255, 0, 0, 255], 10, 5.5, 0.0);

        assert_eq!(s.pick(240.0, 180.0, Some(3.0), Some(3.0), None), wide);
        assert_eq!(s.pick(241.0, 180.0, None, None, None), top);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), wide);
    }

    #[test]
    fn pick_through_id_buffer_agrees() {
        let mut s = stage();
        let below = sprite(&mut s, [0, 0, 255, 255], 20, 0.0, 0.0);
        let above = sprite(&mut s, [255, 0, 0, 255], 10, 0.0, 0.0);
        for &(x, y) in &[(240.0, 180.0), (248.0, 180.0), (300.0, 180.0), (236.0, 186.0)] {
            s.set_use_gpu_mode(UseGpuMode::ForceCpu);
            let cpu = s.pick(x, y, Some(3.0), Some(3.0), None);
            s.set_use_gpu_mode(UseGpuMode::ForceGpu);
            let offscreen = s.pick(x, y, Some(3.0), Some(3.0), None);
            assert_eq!(cpu, offscreen, "at ({x}, {y})");
        }
        s.set_use_gpu_mode(UseGpuMode::ForceGpu);
        assert_eq!(s.pick(240.0, 180.0, None, None, None), above);
        assert_eq!(s.pick(248.0, 180.0, None, None, None), below);
    }

    #[test]
    fn election_rules() {
        assert_eq!(elect(&[]), None);
        assert_eq!(elect(&[0, 0]), None);
        assert_eq!(elect(&[0, 1]), Some(1));
        assert_eq!(elect(&[2, 2]), Some(0));
        assert_eq!(elect(&[1, 5, 5]), Some(1));
    }
}
