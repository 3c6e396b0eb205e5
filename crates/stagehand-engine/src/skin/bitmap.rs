use crate::coords::Vec2;
use crate::stage::StageError;

use super::{PixelSource, Silhouette, Skin};

/// Owned RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Whether `pixels` stores premultiplied color.
    pub premultiplied: bool,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels, premultiplied: false }
    }

    /// A `width` x `height` bitmap filled with one straight-alpha color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self::new(width, height, pixels)
    }

    pub fn premultiplied(mut self) -> Self {
        self.premultiplied = true;
        self
    }

    fn validate(&self) -> Result<(), StageError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.pixels.len() != expected {
            return Err(StageError::InvalidBitmap {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// Skin backed by a raster image.
///
/// The declared size is the bitmap size divided by its resolution, so a 2x
/// bitmap occupies the same stage area as its 1x counterpart.
#[derive(Debug)]
pub struct BitmapSkin {
    bitmap: Bitmap,
    resolution: f32,
    size: Vec2,
    rotation_center: Vec2,
    generation: u64,

    silhouette: Silhouette,
    silhouette_dirty: bool,
}

impl BitmapSkin {
    /// Creates an empty (zero-size) skin.
    pub fn new() -> Self {
        Self {
            bitmap: Bitmap::default(),
            resolution: 1.0,
            size: Vec2::zero(),
            rotation_center: Vec2::zero(),
            generation: 0,
            silhouette: Silhouette::new(),
            silhouette_dirty: false,
        }
    }

    pub fn with_bitmap(
        bitmap: Bitmap,
        resolution: f32,
        rotation_center: Option<Vec2>,
    ) -> Result<Self, StageError> {
        let mut skin = Self::new();
        skin.set_bitmap(bitmap, resolution, rotation_center)?;
        Ok(skin)
    }

    /// Replaces the image.
    ///
    /// `rotation_center` is in bitmap pixels from the top-left corner and
    /// defaults to the bitmap center. On error the skin is left unchanged.
    pub fn set_bitmap(
        &mut self,
        bitmap: Bitmap,
        resolution: f32,
        rotation_center: Option<Vec2>,
    ) -> Result<(), StageError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(StageError::InvalidResolution(resolution));
        }
        bitmap.validate()?;

        let texture = Vec2::new(bitmap.width as f32, bitmap.height as f32);
        let center = rotation_center.unwrap_or(texture / 2.0);

        self.size = texture / resolution;
        self.rotation_center = center / resolution;
        self.resolution = resolution;
        self.bitmap = bitmap;
        self.silhouette_dirty = true;
        self.generation += 1;

        log::debug!(
            "bitmap skin set: {}x{} @{} (generation {})",
            self.bitmap.width,
            self.bitmap.height,
            resolution,
            self.generation
        );
        Ok(())
    }

    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    #[inline]
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }
}

impl Default for BitmapSkin {
    fn default() -> Self {
        Self::new()
    }
}

impl Skin for BitmapSkin {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn rotation_center(&self) -> Vec2 {
        self.rotation_center
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn update_silhouette(&mut self) {
        if !self.silhouette_dirty {
            return;
        }
        let b = &self.bitmap;
        self.silhouette
            .update(PixelSource::new(b.width, b.height, &b.pixels), b.premultiplied);
        self.silhouette_dirty = false;
    }

    fn silhouette(&self) -> &Silhouette {
        &self.silhouette
    }

    fn as_bitmap_mut(&mut self) -> Option<&mut BitmapSkin> {
        Some(self)
    }
}
