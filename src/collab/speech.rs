use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::collab::process::run_template;
use crate::error::{SlidecastError, SlidecastResult};

/// Immutable per-call voice selection, passed explicitly into every
/// synthesis request rather than held as shared mutable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceSpec {
    pub voice: String,
    pub language: String,
}

impl Default for VoiceSpec {
    fn default() -> Self {
        Self {
            voice: "en-IN-ArjunNeural".to_string(),
            language: "en-IN".to_string(),
        }
    }
}

/// A synthesized narration asset and its measured duration.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationTake {
    pub audio_path: PathBuf,
    pub duration_secs: f64,
}

/// Speech synthesis boundary. Failure is fatal for the run; no retries.
pub trait SpeechSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceSpec,
        out_path: &Path,
    ) -> SlidecastResult<NarrationTake>;
}

/// Synthesizer backed by an external command template.
///
/// The template is an argv list with `{text}`, `{voice}`, `{language}`, and
/// `{out}` placeholders. Duration is probed from the produced file with
/// `ffprobe` after the command succeeds.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    argv: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceSpec,
        out_path: &Path,
    ) -> SlidecastResult<NarrationTake> {
        let out = out_path.to_string_lossy().into_owned();
        run_template(
            &self.argv,
            &[
                ("text", text),
                ("voice", &voice.voice),
                ("language", &voice.language),
                ("out", &out),
            ],
        )
        .map_err(|e| SlidecastError::synthesis(e.to_string()))?;

        if !out_path.exists() {
            return Err(SlidecastError::synthesis(format!(
                "synthesis command produced no file at '{}'",
                out_path.display()
            )));
        }

        let duration_secs = probe_audio_duration(out_path)?;
        Ok(NarrationTake {
            audio_path: out_path.to_path_buf(),
            duration_secs,
        })
    }
}

/// Read a media file's duration in seconds via `ffprobe`.
pub fn probe_audio_duration(path: &Path) -> SlidecastResult<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            SlidecastError::synthesis(format!(
                "failed to spawn ffprobe (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SlidecastError::synthesis(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            stderr.trim()
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = text.trim().parse().map_err(|_| {
        SlidecastError::synthesis(format!(
            "ffprobe returned unparsable duration '{}' for '{}'",
            text.trim(),
            path.display()
        ))
    })?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(SlidecastError::synthesis(format!(
            "narration duration must be > 0, got {duration}"
        )));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_synthesizer_reports_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_1.mp3");
        let synth = CommandSynthesizer::new(vec!["true".to_string()]);
        let err = synth
            .synthesize("hi", &VoiceSpec::default(), &out)
            .unwrap_err();
        assert!(err.to_string().contains("produced no file"));
    }
}
