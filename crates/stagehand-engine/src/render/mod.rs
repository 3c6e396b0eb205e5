//! Color and id queries over a region of the stage.
//!
//! A color query asks whether a target color is visible anywhere the tester
//! drawable draws (or, with a mask, anywhere the tester shows the mask color).
//! It can be answered two ways behind one [`TouchingColorPath`] contract:
//!
//! - [`CpuPath`] walks pixels and stops at the first match.
//! - [`OffscreenPath`] renders the whole region through an [`OffscreenRenderer`]
//!   (software emulation or a wgpu compute pass), reads it back and scans it.
//!
//! Both sample the same integer stage points and composite with the same
//! premultiplied-over rule, so they answer identically.
//!
//! Convention:
//! - regions are inclusive integer stage rectangles (+Y up)
//! - readback buffers are RGBA8, row-major, bottom row first
//! - candidates are ordered topmost first

mod composite;
mod gpu;
mod path;
mod software;

pub use composite::{composite_color, mask_passes, topmost_touching, MASK_EFFECTS};
pub use gpu::GpuRenderer;
pub use path::{CpuPath, OffscreenPath, TouchingColorPath};
pub use software::SoftwareRenderer;

use crate::coords::{Rectangle, Vec2};
use crate::drawable::Drawable;
use crate::paint::Rgb8;
use crate::skin::Silhouette;

/// A prepared drawable paired with the silhouette it samples.
#[derive(Debug, Copy, Clone)]
pub struct RenderLayer<'a> {
    pub drawable: &'a Drawable,
    pub silhouette: &'a Silhouette,
}

impl<'a> RenderLayer<'a> {
    #[inline]
    pub fn new(drawable: &'a Drawable, silhouette: &'a Silhouette) -> Self {
        Self { drawable, silhouette }
    }

    #[inline]
    pub fn is_touching(&self, point: Vec2) -> bool {
        self.drawable.is_touching(self.silhouette, point)
    }
}

/// Inclusive block of integer stage pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelRegion {
    pub left: i32,
    pub bottom: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Every integer point of an (already snapped) rectangle, edges included.
    pub fn from_rect(r: &Rectangle) -> Self {
        let left = r.left.floor() as i32;
        let bottom = r.bottom.floor() as i32;
        let right = r.right.floor() as i32;
        let top = r.top.floor() as i32;
        Self {
            left,
            bottom,
            width: (right - left + 1).max(0) as u32,
            height: (top - bottom + 1).max(0) as u32,
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Stage points in readback order: rows bottom to top, left to right.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| {
                Vec2::new((self.left + col as i32) as f32, (self.bottom + row as i32) as f32)
            })
        })
    }
}

/// One "is this color visible where the tester draws" question.
#[derive(Debug, Copy, Clone)]
pub struct ColorQuery<'a> {
    pub region: PixelRegion,
    pub tester: RenderLayer<'a>,
    /// Drawables that may cover the region, topmost first.
    pub candidates: &'a [RenderLayer<'a>],
    pub color: Rgb8,
    /// Restrict the test to pixels where the tester shows this color.
    pub mask: Option<Rgb8>,
    pub background: Rgb8,
}

/// Renders query regions into RGBA8 buffers.
pub trait OffscreenRenderer {
    fn name(&self) -> &'static str;

    /// Composited candidates over the background, restricted to the tester's
    /// (masked) footprint. Pixels outside it read back as `(0, 0, 0, 0)`.
    fn render_color_query(&mut self, query: &ColorQuery<'_>) -> anyhow::Result<Vec<u8>>;

    /// Encoded id (see [`crate::scene::color_from_id`]) of the topmost touching
    /// candidate per pixel; `(0, 0, 0, 0)` where nothing touches.
    fn render_id_buffer(
        &mut self,
        region: PixelRegion,
        candidates: &[RenderLayer<'_>],
    ) -> anyhow::Result<Vec<u8>>;
}
