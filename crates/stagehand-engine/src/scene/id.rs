use core::fmt;

use crate::paint::Rgb8;

/// Drawable handle.
///
/// Ids are allocated from a monotonic counter starting at 1 and never reused,
/// so a stale id can never alias a newer drawable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DrawableId(u32);

/// Reserved "no drawable" sentinel. Encodes to black.
pub const ID_NONE: DrawableId = DrawableId(0);

/// Largest id representable in an RGB triple.
pub const MAX_ID: u32 = (1 << 24) - 1;

impl DrawableId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == ID_NONE.0
    }
}

impl fmt::Display for DrawableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Encodes an id as a color for id-buffer readback. Low byte goes to red.
///
/// Ids above [`MAX_ID`] are truncated to 24 bits.
#[inline]
pub const fn color_from_id(id: DrawableId) -> Rgb8 {
    let v = id.0;
    Rgb8::new(v as u8, (v >> 8) as u8, (v >> 16) as u8)
}

/// Inverse of [`color_from_id`].
#[inline]
pub const fn id_from_color(c: Rgb8) -> DrawableId {
    DrawableId(c.r as u32 | (c.g as u32) << 8 | (c.b as u32) << 16)
}
