use core::fmt;

use crate::skin::SkinId;

use super::StageBounds;

/// Recoverable stage failures.
///
/// Unknown drawable ids are not errors: queries answer them with a neutral value.
#[derive(Debug, Clone, PartialEq)]
pub enum StageError {
    /// No layer group with this name.
    UnknownLayerGroup(String),
    /// The same name appears twice in a group ordering.
    DuplicateLayerGroup(String),
    /// Groups can only be redefined while the draw list is empty.
    LayerGroupsInUse,
    UnknownSkin(SkinId),
    /// Pixel buffer length does not match `width * height * 4`.
    InvalidBitmap { width: u32, height: u32, len: usize },
    /// Bitmap resolution must be finite and positive.
    InvalidResolution(f32),
    InvalidStageBounds(StageBounds),
    /// Every drawable id has been handed out.
    IdSpaceExhausted,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::UnknownLayerGroup(name) => write!(f, "unknown layer group {name:?}"),
            StageError::DuplicateLayerGroup(name) => {
                write!(f, "layer group {name:?} listed more than once")
            }
            StageError::LayerGroupsInUse => {
                f.write_str("layer groups cannot change while drawables exist")
            }
            StageError::UnknownSkin(id) => write!(f, "unknown skin {}", id.get()),
            StageError::InvalidBitmap { width, height, len } => write!(
                f,
                "bitmap {width}x{height} needs {} bytes, got {len}",
                *width as usize * *height as usize * 4
            ),
            StageError::InvalidResolution(r) => write!(f, "invalid bitmap resolution {r}"),
            StageError::InvalidStageBounds(b) => write!(
                f,
                "invalid stage bounds: x {}..{}, y {}..{}",
                b.x_left, b.x_right, b.y_bottom, b.y_top
            ),
            StageError::IdSpaceExhausted => f.write_str("drawable id space exhausted"),
        }
    }
}

impl std::error::Error for StageError {}
