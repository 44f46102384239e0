#![forbid(unsafe_code)]

pub mod collab;
pub mod core;
pub mod encode;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod script;
pub mod text;
pub mod timeline;

pub use core::{Canvas, Rgba8};
pub use error::{SlidecastError, SlidecastResult};
pub use pipeline::{Collaborators, PipelineConfig, PipelineReport};
pub use script::{CourseScript, StyleSheet};
