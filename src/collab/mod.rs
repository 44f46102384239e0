//! External collaborator boundaries.
//!
//! Speech synthesis, illustration generation, and snippet/chart rasterization
//! are black boxes behind traits. The command-backed implementations spawn
//! caller-configured argv templates, keeping the heavy tooling out of process.

pub mod chart;
pub mod illustration;
pub mod process;
pub mod snippet;
pub mod speech;

pub use chart::{ChartRasterizer, CommandChartRasterizer};
pub use illustration::{CommandIllustrationGenerator, IllustrationGenerator};
pub use snippet::{
    CommandSnippetRasterizer, LexerTag, SnippetKind, SnippetRasterizer, SnippetRequest,
};
pub use speech::{CommandSynthesizer, NarrationTake, SpeechSynthesizer, VoiceSpec};
