//! Indexed-color 2D renderer.
//!
//! Pictures and font glyphs are packed into an atlas of 8-bit palette
//! indices. Each frame, drawing calls are recorded into a [`DrawQueue`] and
//! flushed through a [`RenderBackend`]: the queue is drawn into an indexed
//! canvas, which is then blitted to the window through the [`Palette`].

mod assets;
mod command;
mod error;
mod font;
mod frame;
mod gpu_buffer;
mod layout;
mod palette;
mod picture;
mod queue;
mod renderer;
mod screen;
mod wgpu_backend;
pub use assets::*;
pub use command::*;
pub use error::*;
pub use font::*;
pub use frame::*;
pub use gpu_buffer::*;
pub use layout::*;
pub use palette::*;
pub use picture::*;
pub use queue::*;
pub use renderer::*;
pub use screen::*;
pub use wgpu_backend::*;

pub use lib_atlas::{Atlas, PackError};

/// Width and height of an atlas bin unless configured otherwise.
pub const DEFAULT_BIN_SIZE: i16 = 1024;
