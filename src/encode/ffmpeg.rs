//! Streams raw frames to a system `ffmpeg` process and muxes in the
//! concatenated narration audio.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::error::{SlidecastError, SlidecastResult};

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Writes an ffmpeg concat-demuxer list for the narration tracks, in slide
/// order. Paths are absolutized so the list works regardless of ffmpeg's
/// working directory.
fn write_concat_list(audio_paths: &[PathBuf], list_path: &Path) -> SlidecastResult<()> {
    let mut body = String::new();
    for path in audio_paths {
        let abs = std::fs::canonicalize(path).map_err(|e| {
            SlidecastError::encode(format!(
                "narration track '{}' is not readable: {e}",
                path.display()
            ))
        })?;
        let escaped = abs.to_string_lossy().replace('\'', "'\\''");
        body.push_str(&format!("file '{escaped}'\n"));
    }
    std::fs::write(list_path, body).map_err(|e| {
        SlidecastError::encode(format!(
            "failed to write audio list '{}': {e}",
            list_path.display()
        ))
    })
}

pub struct FfmpegSink {
    cfg: SinkConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegSink {
    /// Spawn ffmpeg reading rawvideo from stdin. When `audio_paths` is
    /// non-empty a concat list is written next to the output and muxed in as
    /// an AAC track; otherwise the result is silent.
    pub fn new(cfg: SinkConfig, audio_paths: &[PathBuf]) -> SlidecastResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(SlidecastError::encode(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(SlidecastError::encode(
                "ffmpeg is required for MP4 output, but was not found on PATH",
            ));
        }

        // System ffmpeg over `ffmpeg-next`: no native dev header/lib
        // requirements at build time.
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        if audio_paths.is_empty() {
            cmd.arg("-an");
        } else {
            let list_path = cfg.out_path.with_extension("audio.txt");
            write_concat_list(audio_paths, &list_path)?;
            cmd.args(["-f", "concat", "-safe", "0", "-i"])
                .arg(&list_path)
                .args(["-map", "0:v", "-map", "1:a", "-c:a", "aac"]);
        }

        cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            SlidecastError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SlidecastError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }
}

impl FrameSink for FfmpegSink {
    fn push_frame(&mut self, rgba: &[u8]) -> SlidecastResult<()> {
        if rgba.len() != self.cfg.frame_bytes() {
            return Err(SlidecastError::encode(format!(
                "frame size mismatch: got {} bytes, expected {} ({}x{}x4)",
                rgba.len(),
                self.cfg.frame_bytes(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SlidecastError::encode("ffmpeg sink is already finalized"));
        };

        stdin.write_all(rgba).map_err(|e| {
            SlidecastError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn finish(&mut self) -> SlidecastResult<()> {
        drop(self.stdin.take());

        // Drain stderr before waiting so a chatty ffmpeg cannot block on a
        // full pipe.
        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            use std::io::Read as _;
            let _ = pipe.read_to_string(&mut stderr);
        }

        let status = self
            .child
            .wait()
            .map_err(|e| SlidecastError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !status.success() {
            return Err(SlidecastError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        let list_path = self.cfg.out_path.with_extension("audio.txt");
        if list_path.exists() {
            let _ = std::fs::remove_file(&list_path);
        }

        Ok(())
    }
}
