//! Software rendering
//!
//! The field is rasterized into a plain RGB8 buffer. Windowing and image
//! output are left to whoever embeds the simulation; the buffer exists so
//! screenshots can be taken from the simulation thread.

pub mod frame;
pub mod shapes;

pub use frame::{FrameBuffer, Screenshot};
