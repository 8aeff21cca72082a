//! Aetherboard Render Library
//!
//! Renderer abstraction for Aetherboard. The built-in implementation records
//! a [`DisplayList`] that the CPU rasterizer replays for PNG export.

mod display_list;
mod minimap;
mod raster;
mod renderer;
mod text;

pub use display_list::{DisplayList, DrawCommand};
pub use minimap::minimap_display_list;
pub use raster::{PngExporter, Pixmap, rasterize};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use text::TextShaper;
