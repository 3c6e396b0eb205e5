//! Scene bookkeeping: drawable ids, their storage and the layered draw order.
//!
//! Responsibilities:
//! - allocate drawable ids (monotonic, never reused)
//! - keep the global back-to-front order partitioned into named layer groups
//! - encode ids as colors for id-buffer readback

mod arena;
mod id;
mod list;

pub use arena::Arena;
pub use id::{color_from_id, id_from_color, DrawableId, ID_NONE, MAX_ID};
pub use list::DrawList;
