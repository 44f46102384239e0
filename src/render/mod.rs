//! CPU compositing surfaces and the slide renderer.

pub mod slide;
pub mod surface;

pub use slide::{OverlayLayer, RenderedSlide, SlideVisual, place_illustration, render_slide};
pub use surface::Surface;
