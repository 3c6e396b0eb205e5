//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - exposing them to the offscreen query renderer

mod gpu;

pub use gpu::{GpuInit, HeadlessGpu};
