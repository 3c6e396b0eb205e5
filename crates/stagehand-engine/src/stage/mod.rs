//! The stage: owner of skins, drawables and the draw list, and the entry point
//! for every geometric and visual query.
//!
//! Responsibilities:
//! - allocate drawables and keep them ordered within layer groups
//! - keep drawables in sync with the skins they reference (pull-based, by
//!   skin generation)
//! - answer bounds, touch, pick and color queries
//!
//! Unknown or destroyed ids are expected input: they log a warning and yield a
//! neutral answer (`None`, `false`, [`ID_NONE`](crate::scene::ID_NONE)).

mod color;
mod config;
mod error;
mod hull;
mod touching;

pub use config::{QueryBackend, StageBounds, StageConfig, UseGpuMode};
pub use error::StageError;

use std::collections::HashMap;

use anyhow::Context;

use crate::coords::{Rectangle, Vec2};
use crate::device::HeadlessGpu;
use crate::drawable::{Drawable, DrawableProperties};
use crate::effects::Effect;
use crate::paint::Rgb8;
use crate::render::{GpuRenderer, OffscreenRenderer, RenderLayer, SoftwareRenderer};
use crate::scene::{Arena, DrawList, DrawableId};
use crate::skin::{Bitmap, BitmapSkin, Skin, SkinId};

/// Half-width of the band along the stage edge a drawable may not fully leave.
const FENCE_WIDTH: f32 = 15.0;

type SkinMap = HashMap<SkinId, Box<dyn Skin>>;

/// Scene owner.
pub struct Stage {
    bounds: StageBounds,
    client_size: Option<Vec2>,
    background: Rgb8,
    use_gpu: UseGpuMode,
    max_pixels_for_cpu: u32,

    drawables: Arena<Drawable>,
    draw_list: DrawList,

    skins: SkinMap,
    next_skin_id: u32,

    offscreen: Box<dyn OffscreenRenderer>,
}

impl Stage {
    /// Builds a stage.
    ///
    /// Fails when the bounds or layer groups are invalid, or when the GPU
    /// backend is requested and no usable device exists.
    pub fn new(config: StageConfig) -> anyhow::Result<Self> {
        config.bounds.validate().context("invalid stage configuration")?;

        let mut draw_list = DrawList::new();
        draw_list
            .set_groups(&config.layer_groups)
            .context("invalid layer group ordering")?;

        let offscreen: Box<dyn OffscreenRenderer> = match config.backend {
            QueryBackend::Software => Box::new(SoftwareRenderer::new()),
            QueryBackend::Gpu(init) => {
                let gpu = HeadlessGpu::new_blocking(init)
                    .context("failed to initialize the GPU query backend")?;
                Box::new(GpuRenderer::new(gpu))
            }
        };

        log::debug!(
            "stage created: {:?}, {} layer groups, {} offscreen backend",
            config.bounds,
            config.layer_groups.len(),
            offscreen.name()
        );

        Ok(Self {
            bounds: config.bounds,
            client_size: config.client_size,
            background: config.background,
            use_gpu: config.use_gpu,
            max_pixels_for_cpu: config.max_pixels_for_cpu,
            drawables: Arena::new(),
            draw_list,
            skins: HashMap::new(),
            next_skin_id: 1,
            offscreen,
        })
    }

    // ── stage settings ────────────────────────────────────────────────────

    /// Redefines the layer groups, back to front. Only allowed while no drawables exist.
    pub fn set_layer_group_ordering<S: AsRef<str>>(&mut self, groups: &[S]) -> Result<(), StageError> {
        self.draw_list.set_groups(groups)
    }

    pub fn layer_groups(&self) -> impl Iterator<Item = &str> {
        self.draw_list.group_names()
    }

    pub fn set_stage_size(
        &mut self,
        x_left: f32,
        x_right: f32,
        y_bottom: f32,
        y_top: f32,
    ) -> Result<(), StageError> {
        let bounds = StageBounds::new(x_left, x_right, y_bottom, y_top);
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    #[inline]
    pub fn stage_bounds(&self) -> StageBounds {
        self.bounds
    }

    #[inline]
    pub fn native_size(&self) -> Vec2 {
        self.bounds.native_size()
    }

    /// Display size in client pixels. Defaults to the native size.
    pub fn client_size(&self) -> Vec2 {
        self.client_size.unwrap_or_else(|| self.native_size())
    }

    /// Records the display size used to map client coordinates onto the stage.
    pub fn resize_client(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            log::warn!("resize_client: ignoring non-positive size {width}x{height}");
            return;
        }
        self.client_size = Some(Vec2::new(width, height));
    }

    pub fn set_background_color(&mut self, color: Rgb8) {
        self.background = color;
    }

    #[inline]
    pub fn background_color(&self) -> Rgb8 {
        self.background
    }

    pub fn set_use_gpu_mode(&mut self, mode: UseGpuMode) {
        self.use_gpu = mode;
    }

    #[inline]
    pub fn use_gpu_mode(&self) -> UseGpuMode {
        self.use_gpu
    }

    /// Name of the renderer behind offscreen queries (`"software"` or `"gpu"`).
    pub fn offscreen_backend(&self) -> &'static str {
        self.offscreen.name()
    }

    // ── skins ─────────────────────────────────────────────────────────────

    /// Registers any skin implementation.
    pub fn create_skin(&mut self, skin: Box<dyn Skin>) -> SkinId {
        let id = SkinId::new(self.next_skin_id);
        self.next_skin_id += 1;
        self.skins.insert(id, skin);
        id
    }

    /// `rotation_center` is in bitmap pixels; `None` centers it.
    pub fn create_bitmap_skin(
        &mut self,
        bitmap: Bitmap,
        resolution: f32,
        rotation_center: Option<Vec2>,
    ) -> Result<SkinId, StageError> {
        let skin = BitmapSkin::with_bitmap(bitmap, resolution, rotation_center)?;
        Ok(self.create_skin(Box::new(skin)))
    }

    /// Replaces a bitmap skin's image. Drawables using it pick up the change on
    /// their next query.
    pub fn update_bitmap_skin(
        &mut self,
        id: SkinId,
        bitmap: Bitmap,
        resolution: f32,
        rotation_center: Option<Vec2>,
    ) -> Result<(), StageError> {
        let skin = self
            .skins
            .get_mut(&id)
            .and_then(|s| s.as_bitmap_mut())
            .ok_or(StageError::UnknownSkin(id))?;
        skin.set_bitmap(bitmap, resolution, rotation_center)
    }

    /// Removes a skin. Drawables showing it are left without a skin.
    pub fn destroy_skin(&mut self, id: SkinId) -> bool {
        if self.skins.remove(&id).is_none() {
            log::warn!("destroy_skin: unknown skin {}", id.get());
            return false;
        }
        for d in self.drawables.values_mut() {
            if d.skin() == Some(id) {
                d.set_skin(None);
            }
        }
        true
    }

    pub fn skin_size(&self, id: SkinId) -> Option<Vec2> {
        self.skins.get(&id).map(|s| s.size())
    }

    pub fn skin_rotation_center(&self, id: SkinId) -> Option<Vec2> {
        self.skins.get(&id).map(|s| s.rotation_center())
    }

    // ── drawables ─────────────────────────────────────────────────────────

    /// Creates a drawable on top of `group`.
    pub fn create_drawable(&mut self, group: &str) -> Result<DrawableId, StageError> {
        if self.draw_list.group_range(group).is_none() {
            return Err(StageError::UnknownLayerGroup(group.to_string()));
        }
        let id = self
            .drawables
            .insert_with(Drawable::new)
            .ok_or(StageError::IdSpaceExhausted)?;
        self.draw_list.insert(id, group)?;
        log::debug!("drawable {id} created in {group:?}");
        Ok(id)
    }

    /// Destroys a drawable. `group` must be the group it was created in.
    pub fn destroy_drawable(&mut self, id: DrawableId, group: &str) -> bool {
        if !self.draw_list.remove(id, group) {
            log::warn!("destroy_drawable: {id} is not in layer group {group:?}");
            return false;
        }
        self.drawables.remove(id);
        log::debug!("drawable {id} destroyed");
        true
    }

    /// Moves a drawable within its group. See [`DrawList::set_order`].
    pub fn set_drawable_order(
        &mut self,
        id: DrawableId,
        order: i64,
        group: &str,
        relative: bool,
        min_order: Option<usize>,
    ) -> Option<usize> {
        let result = self.draw_list.set_order(id, order, group, relative, min_order);
        if result.is_none() {
            log::warn!("set_drawable_order: {id} is not in layer group {group:?}");
        }
        result
    }

    /// Absolute index in the draw list, back to front.
    pub fn drawable_order(&self, id: DrawableId) -> Option<usize> {
        self.draw_list.order_of(id)
    }

    /// All drawable ids, back to front.
    pub fn draw_list(&self) -> &[DrawableId] {
        self.draw_list.ids()
    }

    pub fn drawable(&self, id: DrawableId) -> Option<&Drawable> {
        self.drawables.get(id)
    }

    fn with_drawable(&mut self, id: DrawableId, op: &str, f: impl FnOnce(&mut Drawable)) {
        match self.drawables.get_mut(id) {
            Some(d) => f(d),
            None => log::warn!("{op}: unknown drawable {id}"),
        }
    }

    pub fn update_drawable_skin(&mut self, id: DrawableId, skin: Option<SkinId>) -> Result<(), StageError> {
        if let Some(s) = skin {
            if !self.skins.contains_key(&s) {
                return Err(StageError::UnknownSkin(s));
            }
        }
        self.with_drawable(id, "update_drawable_skin", |d| d.set_skin(skin));
        Ok(())
    }

    pub fn update_drawable_position(&mut self, id: DrawableId, position: Vec2) {
        self.with_drawable(id, "update_drawable_position", |d| d.update_position(position));
    }

    pub fn update_drawable_direction(&mut self, id: DrawableId, direction: f32) {
        self.with_drawable(id, "update_drawable_direction", |d| d.update_direction(direction));
    }

    pub fn update_drawable_scale(&mut self, id: DrawableId, scale: Vec2) {
        self.with_drawable(id, "update_drawable_scale", |d| d.update_scale(scale));
    }

    pub fn update_drawable_direction_scale(
        &mut self,
        id: DrawableId,
        direction: Option<f32>,
        scale: Option<Vec2>,
    ) {
        self.with_drawable(id, "update_drawable_direction_scale", |d| {
            d.update_direction_scale(direction, scale)
        });
    }

    pub fn update_drawable_visible(&mut self, id: DrawableId, visible: bool) {
        self.with_drawable(id, "update_drawable_visible", |d| d.update_visible(visible));
    }

    pub fn update_drawable_effect(&mut self, id: DrawableId, effect: Effect, value: f32) {
        self.with_drawable(id, "update_drawable_effect", |d| d.update_effect(effect, value));
    }

    pub fn update_drawable_properties(&mut self, id: DrawableId, props: &DrawableProperties) {
        self.with_drawable(id, "update_drawable_properties", |d| d.update_properties(props));
    }

    // ── geometry ──────────────────────────────────────────────────────────

    /// Size of the drawable's skin as of now.
    pub fn current_skin_size(&mut self, id: DrawableId) -> Option<Vec2> {
        let Some(d) = self.drawables.get_mut(id) else {
            log::warn!("current_skin_size: unknown drawable {id}");
            return None;
        };
        sync_skin(d, &self.skins);
        Some(d.skin_size())
    }

    /// Tight bounds, computing the convex hull if needed.
    pub fn get_bounds(&mut self, id: DrawableId) -> Option<Rectangle> {
        let Some(d) = self.drawables.get_mut(id) else {
            log::warn!("get_bounds: unknown drawable {id}");
            return None;
        };
        prepare(d, &mut self.skins);
        ensure_convex_hull(d, &self.skins);
        Some(d.fast_bounds())
    }

    /// Bounds of the top of the drawable, for anchoring speech bubbles.
    ///
    /// Falls back to the AABB when the drawable has no opaque pixels.
    pub fn get_bounds_for_bubble(&mut self, id: DrawableId) -> Option<Rectangle> {
        let Some(d) = self.drawables.get_mut(id) else {
            log::warn!("get_bounds_for_bubble: unknown drawable {id}");
            return None;
        };
        prepare(d, &mut self.skins);
        ensure_convex_hull(d, &self.skins);
        Some(d.bounds_for_bubble().unwrap_or_else(|| d.aabb()))
    }

    /// Loose bounds from the skin rectangle alone.
    pub fn get_aabb(&mut self, id: DrawableId) -> Option<Rectangle> {
        let Some(d) = self.drawables.get_mut(id) else {
            log::warn!("get_aabb: unknown drawable {id}");
            return None;
        };
        sync_skin(d, &self.skins);
        Some(d.aabb())
    }

    /// Adjusts a proposed position so the drawable keeps a sliver on stage.
    ///
    /// The fence is [`FENCE_WIDTH`] inside each edge, reduced for drawables
    /// smaller than twice that.
    pub fn get_fenced_position(&mut self, id: DrawableId, position: Vec2) -> Vec2 {
        let Some(d) = self.drawables.get_mut(id) else {
            log::warn!("get_fenced_position: unknown drawable {id}");
            return position;
        };
        sync_skin(d, &self.skins);

        let current = d.position();
        let dx = position.x - current.x;
        let dy = position.y - current.y;
        let aabb = match d.skin().and_then(|s| self.skins.get(&s)) {
            Some(skin) => skin.fence_bounds(d),
            None => d.aabb(),
        };
        let inset = (aabb.width().min(aabb.height()) / 2.0).floor();

        let half = self.native_size() / 2.0;
        let mut out = position;
        let sx = half.x - FENCE_WIDTH.min(inset);
        if aabb.right + dx < -sx {
            out.x = (current.x - (sx + aabb.right)).ceil();
        } else if aabb.left + dx > sx {
            out.x = (current.x + (sx - aabb.left)).floor();
        }
        let sy = half.y - FENCE_WIDTH.min(inset);
        if aabb.top + dy < -sy {
            out.y = (current.y - (sy + aabb.top)).ceil();
        } else if aabb.bottom + dy > sy {
            out.y = (current.y + (sy - aabb.bottom)).floor();
        }
        out
    }

    /// Syncs and prepares one drawable for point queries. `false` if unknown.
    fn prepare_drawable(&mut self, id: DrawableId) -> bool {
        match self.drawables.get_mut(id) {
            Some(d) => {
                prepare(d, &mut self.skins);
                true
            }
            None => false,
        }
    }
}

/// Pulls the skin's current size and rotation center into the drawable.
fn sync_skin(drawable: &mut Drawable, skins: &SkinMap) {
    let skin = drawable.skin().and_then(|id| skins.get(&id));
    drawable.sync_skin(skin.map(|s| &**s));
}

/// Syncs the drawable, then refreshes its matrices, the skin silhouette and the
/// touch filter. Required before any point query.
fn prepare(drawable: &mut Drawable, skins: &mut SkinMap) {
    match drawable.skin().and_then(|id| skins.get_mut(&id)) {
        Some(skin) => {
            drawable.sync_skin(Some(&**skin));
            drawable.update_cpu_render_attributes(Some(&mut **skin));
        }
        None => {
            drawable.sync_skin(None);
            drawable.update_cpu_render_attributes(None);
        }
    }
}

/// Recomputes the shape-space hull if it is stale. The drawable must be prepared.
fn ensure_convex_hull(drawable: &mut Drawable, skins: &SkinMap) {
    if !drawable.needs_convex_hull_points() {
        return;
    }
    let points = match drawable.skin().and_then(|id| skins.get(&id)) {
        Some(skin) => hull::convex_hull_points(drawable, skin.silhouette()),
        None => Vec::new(),
    };
    drawable.set_convex_hull_points(points);
}

/// Pairs a prepared drawable with its skin's silhouette. Skinless drawables have no layer.
fn render_layer<'a>(
    drawables: &'a Arena<Drawable>,
    skins: &'a SkinMap,
    id: DrawableId,
) -> Option<RenderLayer<'a>> {
    let d = drawables.get(id)?;
    let skin = skins.get(&d.skin()?)?;
    Some(RenderLayer::new(d, skin.silhouette()))
}

fn render_layers<'a>(
    drawables: &'a Arena<Drawable>,
    skins: &'a SkinMap,
    ids: &[DrawableId],
) -> Vec<RenderLayer<'a>> {
    ids.iter()
        .filter_map(|&id| render_layer(drawables, skins, id))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scene::ID_NONE;

    pub(crate) fn stage() -> Stage {
        Stage::new(StageConfig::with_layer_groups(&["background", "sprite"])).unwrap()
    }

    /// Opaque `size` x `size` sprite at `(x, y)` in the sprite group.
    pub(crate) fn sprite(stage: &mut Stage, rgba: [u8; 4], size: u32, x: f32, y: f32) -> DrawableId {
        let skin = stage
            .create_bitmap_skin(Bitmap::filled(size, size, rgba), 1.0, None)
            .unwrap();
        let id = stage.create_drawable("sprite").unwrap();
        stage.update_drawable_skin(id, Some(skin)).unwrap();
        stage.update_drawable_position(id, Vec2::new(x, y));
        id
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn rejects_invalid_configuration() {
        let mut config = StageConfig::default();
        config.bounds = StageBounds::new(1.0, -1.0, 0.0, 1.0);
        assert!(Stage::new(config).is_err());

        let dup = StageConfig::with_layer_groups(&["a", "a"]);
        let err = Stage::new(dup).err().unwrap();
        assert_eq!(
            err.root_cause().downcast_ref::<StageError>(),
            Some(&StageError::DuplicateLayerGroup("a".into()))
        );
    }

    #[test]
    fn stage_size_and_client_size() {
        let mut s = stage();
        assert_eq!(s.native_size(), Vec2::new(480.0, 360.0));
        assert_eq!(s.client_size(), Vec2::new(480.0, 360.0));
        assert_eq!(s.offscreen_backend(), "software");

        s.set_stage_size(-100.0, 100.0, -50.0, 50.0).unwrap();
        assert_eq!(s.native_size(), Vec2::new(200.0, 100.0));
        assert!(s.set_stage_size(0.0, 0.0, 0.0, 1.0).is_err());
        assert_eq!(s.native_size(), Vec2::new(200.0, 100.0));

        s.resize_client(400.0, 200.0);
        s.resize_client(0.0, 10.0);
        assert_eq!(s.client_size(), Vec2::new(400.0, 200.0));
    }

    // ── draw list ─────────────────────────────────────────────────────────

    #[test]
    fn ids_are_never_reused() {
        let mut s = stage();
        let a = s.create_drawable("sprite").unwrap();
        assert!(s.destroy_drawable(a, "sprite"));
        let b = s.create_drawable("sprite").unwrap();
        assert_ne!(a, b);
        assert!(!a.is_none() && !b.is_none());
    }

    #[test]
    fn groups_keep_their_slots() {
        let mut s = stage();
        let sprite = s.create_drawable("sprite").unwrap();
        let backdrop = s.create_drawable("background").unwrap();
        assert_eq!(s.draw_list(), &[backdrop, sprite]);
        assert_eq!(s.drawable_order(sprite), Some(1));

        assert_eq!(
            s.create_drawable("pen"),
            Err(StageError::UnknownLayerGroup("pen".into()))
        );
        assert_eq!(s.set_layer_group_ordering(&["x"]), Err(StageError::LayerGroupsInUse));
    }

    #[test]
    fn destroy_requires_matching_group() {
        let mut s = stage();
        let a = s.create_drawable("sprite").unwrap();
        assert!(!s.destroy_drawable(a, "background"));
        assert!(s.drawable(a).is_some());
        assert!(s.destroy_drawable(a, "sprite"));
        assert!(!s.destroy_drawable(a, "sprite"));
        assert!(s.drawable(a).is_none());
    }

    #[test]
    fn reorder_within_group() {
        let mut s = stage();
        let backdrop = s.create_drawable("background").unwrap();
        let a = s.create_drawable("sprite").unwrap();
        let b = s.create_drawable("sprite").unwrap();
        let c = s.create_drawable("sprite").unwrap();

        // Orders are absolute draw-list indices, past the background group.
        assert_eq!(s.set_drawable_order(c, 0, "sprite", false, None), Some(1));
        assert_eq!(s.draw_list(), &[backdrop, c, a, b]);
        assert_eq!(s.set_drawable_order(c, 1, "sprite", true, None), Some(2));
        assert_eq!(s.draw_list(), &[backdrop, a, c, b]);
        assert_eq!(s.set_drawable_order(a, 0, "background", false, None), None);
        assert_eq!(s.draw_list(), &[backdrop, a, c, b]);
    }

    #[test]
    fn reorder_result_agrees_with_drawable_order() {
        let mut s = stage();
        let _backdrop = s.create_drawable("background").unwrap();
        let a = s.create_drawable("sprite").unwrap();
        let b = s.create_drawable("sprite").unwrap();

        let got = s.set_drawable_order(b, 0, "sprite", false, None);
        assert_eq!(got, Some(1));
        assert_eq!(got, s.drawable_order(b));

        // A floor past the end of the group does not send `a` to the top.
        assert_eq!(s.drawable_order(a), Some(2));
        let got = s.set_drawable_order(a, 0, "sprite", false, Some(10));
        assert_eq!(got, Some(1));
        assert_eq!(got, s.drawable_order(a));
    }

    // ── skins ─────────────────────────────────────────────────────────────

    #[test]
    fn skin_updates_reach_drawables() {
        let mut s = stage();
        let skin = s
            .create_bitmap_skin(Bitmap::filled(4, 2, [0, 0, 0, 255]), 1.0, None)
            .unwrap();
        let id = s.create_drawable("sprite").unwrap();
        s.update_drawable_skin(id, Some(skin)).unwrap();
        assert_eq!(s.current_skin_size(id), Some(Vec2::new(4.0, 2.0)));

        s.update_bitmap_skin(skin, Bitmap::filled(8, 6, [0, 0, 0, 255]), 2.0, None)
            .unwrap();
        assert_eq!(s.skin_size(skin), Some(Vec2::new(4.0, 3.0)));
        assert_eq!(s.skin_rotation_center(skin), Some(Vec2::new(2.0, 1.5)));
        assert_eq!(s.current_skin_size(id), Some(Vec2::new(4.0, 3.0)));

        assert!(s.destroy_skin(skin));
        assert!(!s.destroy_skin(skin));
        assert_eq!(s.current_skin_size(id), Some(Vec2::zero()));
        assert_eq!(
            s.update_drawable_skin(id, Some(skin)),
            Err(StageError::UnknownSkin(skin))
        );
    }

    #[test]
    fn invalid_bitmap_is_rejected() {
        let mut s = stage();
        let err = s.create_bitmap_skin(Bitmap::new(2, 2, vec![0; 3]), 1.0, None);
        assert_eq!(err, Err(StageError::InvalidBitmap { width: 2, height: 2, len: 3 }));
    }

    // ── bounds ────────────────────────────────────────────────────────────

    #[test]
    fn bounds_tighten_around_opaque_pixels() {
        let mut s = stage();
        // 4x20 skin, only the left half opaque. Taller than the bubble slice.
        let mut px = Vec::new();
        for _y in 0..20 {
            for x in 0..4 {
                px.extend_from_slice(if x < 2 { &[0, 0, 0, 255] } else { &[0, 0, 0, 0] });
            }
        }
        let skin = s.create_bitmap_skin(Bitmap::new(4, 20, px), 1.0, None).unwrap();
        let id = s.create_drawable("sprite").unwrap();
        s.update_drawable_skin(id, Some(skin)).unwrap();

        let aabb = s.get_aabb(id).unwrap();
        assert!((aabb.left + 2.0).abs() < 1e-3 && (aabb.top - 10.0).abs() < 1e-3, "{aabb:?}");

        let tight = s.get_bounds(id).unwrap();
        assert!(tight.width() < aabb.width(), "{tight:?}");
        assert!(aabb.contains(&tight));

        let bubble = s.get_bounds_for_bubble(id).unwrap();
        assert_eq!(Rectangle::union(tight, bubble), tight);
        assert!(bubble.bottom > tight.bottom, "{bubble:?} {tight:?}");
    }

    #[test]
    fn bubble_bounds_survive_non_finite_position() {
        let mut s = stage();
        let id = sprite(&mut s, [0, 0, 0, 255], 10, 0.0, 0.0);
        s.update_drawable_position(id, Vec2::new(f32::NAN, f32::NAN));
        // Falls back to the AABB instead of panicking.
        assert!(s.get_bounds_for_bubble(id).is_some());
    }

    #[test]
    fn unknown_ids_answer_neutrally() {
        let mut s = stage();
        let ghost = DrawableId::new(999);
        assert_eq!(s.get_bounds(ghost), None);
        assert_eq!(s.get_aabb(ghost), None);
        assert_eq!(s.drawable_order(ghost), None);
        assert_eq!(s.get_fenced_position(ghost, Vec2::new(1.0, 2.0)), Vec2::new(1.0, 2.0));
        s.update_drawable_position(ghost, Vec2::zero());
        assert_eq!(s.pick(240.0, 180.0, None, None, None), ID_NONE);
    }

    // ── fencing ───────────────────────────────────────────────────────────

    #[test]
    fn fence_keeps_a_sliver_on_stage() {
        let mut s = stage();
        let id = sprite(&mut s, [0, 0, 0, 255], 40, 0.0, 0.0);

        // Far right: the left edge may go no further than 15 inside the right edge.
        let p = s.get_fenced_position(id, Vec2::new(1000.0, 0.0));
        assert_eq!(p, Vec2::new(245.0, 0.0));

        let p = s.get_fenced_position(id, Vec2::new(0.0, -1000.0));
        assert_eq!(p, Vec2::new(0.0, -185.0));

        let p = s.get_fenced_position(id, Vec2::new(100.0, 50.0));
        assert_eq!(p, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn small_drawables_use_a_smaller_fence() {
        let mut s = stage();
        let id = sprite(&mut s, [0, 0, 0, 255], 10, 0.0, 0.0);
        // inset = floor(10 / 2) = 5, so sx = 235 and the left edge (-5) stops there.
        let p = s.get_fenced_position(id, Vec2::new(1000.0, 0.0));
        assert_eq!(p, Vec2::new(240.0, 0.0));
    }

    #[test]
    fn fence_uses_half_the_native_size() {
        let mut s = stage();
        s.set_stage_size(0.0, 480.0, 0.0, 360.0).unwrap();
        let id = sprite(&mut s, [0, 0, 0, 255], 40, 0.0, 0.0);
        // Same 480x360 stage, so the same limits as the centered one.
        assert_eq!(s.get_fenced_position(id, Vec2::new(1000.0, 0.0)), Vec2::new(245.0, 0.0));
        assert_eq!(s.get_fenced_position(id, Vec2::new(0.0, -1000.0)), Vec2::new(0.0, -185.0));
    }
}
