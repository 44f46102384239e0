//! Timed clips, transition specs, and the right-to-left timeline reduction.

pub mod clip;
pub mod frames;
pub mod reduce;
pub mod transition;

pub use clip::TimedClip;
pub use frames::FrameServer;
pub use reduce::{Timeline, reduce};
pub use transition::{SlideDir, Transition};
