//! ASCII Video
//!
//! Decoding and rendering of the compressed ASCII-video container.
//!
//! - [`Decoder`]: parses a container and owns the frame buffer
//! - [`Renderer`]: turns the buffer into ANSI text or color runs
//! - [`library`]: loads clips from disk or the built-in backdrop

pub mod base93;
mod decoder;
pub mod library;
mod renderer;

pub use decoder::{Cell, CellUpdate, DecodeError, Decoder, Frame, Run};
pub use library::Clip;
pub use renderer::{ColorRun, RenderMode, Renderer, RESET};
