use crate::coords::Vec2;
use crate::device::GpuInit;
use crate::paint::Rgb8;

use super::StageError;

/// Stage rectangle in stage units (+Y up).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StageBounds {
    pub x_left: f32,
    pub x_right: f32,
    pub y_bottom: f32,
    pub y_top: f32,
}

impl StageBounds {
    pub const fn new(x_left: f32, x_right: f32, y_bottom: f32, y_top: f32) -> Self {
        Self { x_left, x_right, y_bottom, y_top }
    }

    /// `(width, height)` of the stage.
    #[inline]
    pub fn native_size(&self) -> Vec2 {
        Vec2::new(self.x_right - self.x_left, self.y_top - self.y_bottom)
    }

    /// Finite, with positive width and height.
    pub fn validate(&self) -> Result<(), StageError> {
        let finite = [self.x_left, self.x_right, self.y_bottom, self.y_top]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.x_right <= self.x_left || self.y_top <= self.y_bottom {
            return Err(StageError::InvalidStageBounds(*self));
        }
        Ok(())
    }
}

impl Default for StageBounds {
    fn default() -> Self {
        Self::new(-240.0, 240.0, -180.0, 180.0)
    }
}

/// Which path answers color queries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum UseGpuMode {
    /// Offscreen once the region is large enough to amortize the readback.
    #[default]
    Automatic,
    ForceCpu,
    ForceGpu,
}

/// Offscreen renderer behind the "GPU" side of color and pick queries.
#[derive(Debug, Clone, Default)]
pub enum QueryBackend {
    /// CPU emulation of the offscreen pass. Always available.
    #[default]
    Software,
    /// wgpu compute pass on a headless device.
    Gpu(GpuInit),
}

/// Stage construction parameters.
///
/// Everything here can also be changed after construction, except the backend.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub bounds: StageBounds,

    /// Display size in client pixels used to map pick coordinates.
    /// `None` means the display matches the native stage size.
    pub client_size: Option<Vec2>,

    pub background: Rgb8,

    /// Layer group names, bottom to top.
    pub layer_groups: Vec<String>,

    pub use_gpu: UseGpuMode,

    /// Pixel budget (`region area * (candidates + 1)`) below which color
    /// queries stay on the CPU in [`UseGpuMode::Automatic`].
    pub max_pixels_for_cpu: u32,

    pub backend: QueryBackend,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            bounds: StageBounds::default(),
            client_size: None,
            background: Rgb8::WHITE,
            layer_groups: Vec::new(),
            use_gpu: UseGpuMode::Automatic,
            max_pixels_for_cpu: 40_000,
            backend: QueryBackend::Software,
        }
    }
}

impl StageConfig {
    /// Default configuration with the given layer groups.
    pub fn with_layer_groups<S: AsRef<str>>(groups: &[S]) -> Self {
        Self {
            layer_groups: groups.iter().map(|g| g.as_ref().to_owned()).collect(),
            ..Self::default()
        }
    }
}
