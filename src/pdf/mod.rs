//! The PDF writer adapter (C9): the only layer that touches `lopdf`,
//! `allsorts`, or the `image` crate directly.

pub mod font_loader;
pub mod image_loader;
pub mod writer;

pub use writer::{LopdfWriter, PdfSink};
