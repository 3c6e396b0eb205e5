//! Drawables: positioned, scaled, rotated instances of a skin.
//!
//! A drawable keeps its transform inputs plus a set of derived caches (model
//! matrix, inverse, shape-space hull, world-space hull). Setters mark exactly the
//! caches that depend on the changed input; queries recompute exactly the stale
//! caches they read, in dependency order:
//!
//! ```text
//! position ─┐
//! direction ┼─> model matrix ─┬─> inverse matrix
//! scale ────┘                 └─> world hull ─> bounds
//! skin, shape effects, visibility ─> shape hull ─┘
//! ```

mod bounds;
mod sample;
mod transform;

pub use sample::TouchFilter;

use crate::coords::{Affine2, Vec2};
use crate::effects::{Effect, EffectValues};
use crate::scene::DrawableId;
use crate::skin::{Skin, SkinId};

/// Batched property update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawableProperties {
    pub position: Option<Vec2>,
    pub direction: Option<f32>,
    /// Percentages, 100 = native size.
    pub scale: Option<Vec2>,
    pub visible: Option<bool>,
    /// Effect values, applied in order.
    pub effects: Vec<(Effect, f32)>,
}

impl DrawableProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Vec2::new(x, y));
        self
    }

    pub fn direction(mut self, direction: f32) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Some(Vec2::new(x, y));
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn effect(mut self, effect: Effect, value: f32) -> Self {
        self.effects.push((effect, value));
        self
    }
}

/// One object on the stage.
#[derive(Debug, Clone)]
pub struct Drawable {
    id: DrawableId,

    skin: Option<SkinId>,
    /// Generation of the skin last copied into this drawable; `None` forces a resync.
    seen_generation: Option<u64>,
    skin_size: Vec2,
    skin_rotation_center: Vec2,

    position: Vec2,
    scale: Vec2,
    direction: f32,
    visible: bool,
    effects: EffectValues,

    // ── caches ──
    transform_dirty: bool,
    rotation_dirty: bool,
    rotation_center_dirty: bool,
    skin_scale_dirty: bool,
    inverse_dirty: bool,
    hull_dirty: bool,
    transformed_hull_dirty: bool,

    /// `(cos, sin)` of the rotation angle.
    rotation: (f32, f32),
    rotation_adjusted: Vec2,
    skin_scale: Vec2,
    model: Affine2,
    inverse: Option<Affine2>,
    hull: Vec<Vec2>,
    transformed_hull: Vec<Vec2>,

    filter: TouchFilter,
}

impl Drawable {
    pub fn new(id: DrawableId) -> Self {
        Self {
            id,
            skin: None,
            seen_generation: None,
            skin_size: Vec2::zero(),
            skin_rotation_center: Vec2::zero(),
            position: Vec2::zero(),
            scale: Vec2::splat(100.0),
            direction: 90.0,
            visible: true,
            effects: EffectValues::default(),
            transform_dirty: true,
            rotation_dirty: true,
            rotation_center_dirty: true,
            skin_scale_dirty: true,
            inverse_dirty: true,
            hull_dirty: true,
            transformed_hull_dirty: true,
            rotation: (1.0, 0.0),
            rotation_adjusted: Vec2::zero(),
            skin_scale: Vec2::zero(),
            model: Affine2::IDENTITY,
            inverse: None,
            hull: Vec::new(),
            transformed_hull: Vec::new(),
            filter: TouchFilter::Never,
        }
    }

    #[inline]
    pub fn id(&self) -> DrawableId {
        self.id
    }

    #[inline]
    pub fn skin(&self) -> Option<SkinId> {
        self.skin
    }

    /// Declared size of the current skin, as last synced.
    #[inline]
    pub fn skin_size(&self) -> Vec2 {
        self.skin_size
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    #[inline]
    pub fn direction(&self) -> f32 {
        self.direction
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn effects(&self) -> &EffectValues {
        &self.effects
    }

    // ── skin ──────────────────────────────────────────────────────────────

    /// Points the drawable at another skin. The new skin's state is picked up
    /// by the next [`sync_skin`](Self::sync_skin).
    pub fn set_skin(&mut self, skin: Option<SkinId>) {
        if self.skin == skin {
            return;
        }
        self.skin = skin;
        self.seen_generation = None;
        self.skin_altered();
    }

    /// Pulls size and rotation center from `skin` if it changed since the last sync.
    ///
    /// `skin` must be the skin this drawable references (or `None` if it has none).
    pub fn sync_skin(&mut self, skin: Option<&dyn Skin>) {
        let generation = skin.map(|s| s.generation());
        if self.seen_generation.is_some() && self.seen_generation == generation {
            return;
        }
        self.seen_generation = generation;
        match skin {
            Some(s) => {
                self.skin_size = s.size();
                self.skin_rotation_center = s.rotation_center();
            }
            None => {
                self.skin_size = Vec2::zero();
                self.skin_rotation_center = Vec2::zero();
            }
        }
        self.skin_altered();
    }

    fn skin_altered(&mut self) {
        self.rotation_center_dirty = true;
        self.skin_scale_dirty = true;
        self.set_convex_hull_dirty();
        self.set_transform_dirty();
    }

    // ── setters ───────────────────────────────────────────────────────────

    pub fn update_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.set_transform_dirty();
        }
    }

    pub fn update_direction(&mut self, direction: f32) {
        if self.direction != direction {
            self.direction = direction;
            self.rotation_dirty = true;
            self.set_transform_dirty();
        }
    }

    pub fn update_scale(&mut self, scale: Vec2) {
        if self.scale != scale {
            self.scale = scale;
            self.rotation_center_dirty = true;
            self.skin_scale_dirty = true;
            self.set_transform_dirty();
        }
    }

    pub fn update_direction_scale(&mut self, direction: Option<f32>, scale: Option<Vec2>) {
        if let Some(d) = direction {
            self.update_direction(d);
        }
        if let Some(s) = scale {
            self.update_scale(s);
        }
    }

    pub fn update_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.set_convex_hull_dirty();
        }
    }

    pub fn update_effect(&mut self, effect: Effect, value: f32) {
        if self.effects.set(effect, value) && effect.changes_shape() {
            self.set_convex_hull_dirty();
        }
    }

    pub fn update_properties(&mut self, props: &DrawableProperties) {
        if let Some(p) = props.position {
            self.update_position(p);
        }
        self.update_direction_scale(props.direction, props.scale);
        if let Some(v) = props.visible {
            self.update_visible(v);
        }
        for &(effect, value) in &props.effects {
            self.update_effect(effect, value);
        }
    }

    fn set_transform_dirty(&mut self) {
        self.transform_dirty = true;
        self.inverse_dirty = true;
        self.transformed_hull_dirty = true;
    }

    fn set_convex_hull_dirty(&mut self) {
        self.hull_dirty = true;
        self.transformed_hull_dirty = true;
    }
}
