//! Stagehand engine crate.
//!
//! Collision and color queries over a stage of 2D sprites: drawables placed,
//! rotated, scaled and distorted by effects, sampled through per-skin
//! silhouettes. Color queries run either as a CPU pixel walk or through an
//! offscreen renderer (software or wgpu compute).
//!
//! [`stage::Stage`] is the entry point.

pub mod coords;
pub mod device;
pub mod drawable;
pub mod effects;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod skin;
pub mod stage;

pub use scene::DrawableId;
pub use skin::{Bitmap, SkinId};
pub use stage::{Stage, StageConfig, StageError};
