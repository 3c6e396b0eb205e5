//! Coordinate and geometry types shared by drawables, skins and stage queries.
//!
//! Canonical stage space:
//! - stage units (the "native" stage is 480x360 by default)
//! - origin at the stage center
//! - +X right, +Y up
//!
//! Texture space is `[0, 1]²` with `v = 0` on the top row of a skin's pixels.

mod affine;
mod rect;
mod vec2;

pub use affine::Affine2;
pub use rect::Rectangle;
pub use vec2::Vec2;
