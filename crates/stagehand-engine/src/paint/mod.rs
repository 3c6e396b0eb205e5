//! Color model shared by silhouettes, effects and stage queries.
//!
//! Scope:
//! - 8-bit straight-alpha RGBA samples (what silhouettes store)
//! - 8-bit RGB query colors
//! - RGB <-> HSV conversion used by the color effect

pub mod color;
pub mod hsv;

pub use color::{Rgb8, Rgba8};
pub use hsv::{hsv_to_rgb, rgb_to_hsv};
