//! End-to-end pipeline coverage with in-process collaborator fakes: layout,
//! render, narration binding, the transition fold, and frame sampling into an
//! in-memory sink. No ffmpeg, no network.

use std::path::Path;

use slidecast::collab::{
    ChartRasterizer, NarrationTake, SnippetRasterizer, SnippetRequest, SpeechSynthesizer,
    VoiceSpec,
};
use slidecast::core::Rgba8;
use slidecast::encode::{InMemorySink, SinkConfig};
use slidecast::pipeline::{
    Collaborators, PipelineConfig, build_clips, encode_timeline, requested_transitions,
};
use slidecast::script::{ChartSpec, ChartStyle, StyleConfig, StyleSheet, TextStyle};
use slidecast::text::{GlyphRaster, TextMeasure, TextPatch};
use slidecast::timeline::{FrameServer, reduce};
use slidecast::{Canvas, CourseScript, SlidecastError, SlidecastResult};

/// Fixed-advance fake font: every char is an opaque 8x10 cell.
struct CellFont;

impl TextMeasure for CellFont {
    fn text_width(&mut self, text: &str, _font_size: f32) -> SlidecastResult<f32> {
        Ok(text.chars().count() as f32 * 8.0)
    }
}

impl GlyphRaster for CellFont {
    fn raster_line(
        &mut self,
        text: &str,
        _size_px: f32,
        color: Rgba8,
    ) -> SlidecastResult<TextPatch> {
        let width = (text.chars().count() as u32 * 8).max(1);
        let height = 10;
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color.to_array());
        }
        Ok(TextPatch {
            width,
            height,
            rgba8_premul: data,
        })
    }
}

/// Speech fake: writes a stub file and reports a fixed duration per call.
struct FixedSpeech {
    secs: f64,
}

impl SpeechSynthesizer for FixedSpeech {
    fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceSpec,
        out_path: &Path,
    ) -> SlidecastResult<NarrationTake> {
        std::fs::write(out_path, b"stub-audio")
            .map_err(|e| SlidecastError::synthesis(e.to_string()))?;
        Ok(NarrationTake {
            audio_path: out_path.to_path_buf(),
            duration_secs: self.secs,
        })
    }
}

struct NoSnippets;

impl SnippetRasterizer for NoSnippets {
    fn rasterize(&self, _request: &SnippetRequest, _out_path: &Path) -> SlidecastResult<()> {
        Err(SlidecastError::asset("snippet rasterizer not available"))
    }
}

struct NoCharts;

impl ChartRasterizer for NoCharts {
    fn rasterize(
        &self,
        _spec: &ChartSpec,
        _style: &ChartStyle,
        _out_path: &Path,
    ) -> SlidecastResult<()> {
        Err(SlidecastError::asset("chart rasterizer not available"))
    }
}

fn styles() -> StyleSheet {
    let mut sheet = StyleSheet::default();
    let config = StyleConfig {
        title: Some(TextStyle::default()),
        content: Some(TextStyle::default()),
        points: Some(TextStyle::default()),
        ..StyleConfig::default()
    };
    sheet.insert("content_slide", config);
    sheet
}

fn script() -> CourseScript {
    serde_json::from_value(serde_json::json!({
        "slides": [
            {
                "slideNumber": 1,
                "type": "content_slide",
                "title": "Intro",
                "content": "Welcome to the course.",
                "voiceover": "Hello and welcome.",
                "transition": "dissolve"
            },
            {
                "slideNumber": 2,
                "type": "content_slide",
                "content": "Second slide body."
            }
        ]
    }))
    .unwrap()
}

fn config(tmp: &Path) -> PipelineConfig {
    PipelineConfig {
        canvas: Canvas {
            width: 64,
            height: 48,
        },
        ..PipelineConfig::new(tmp.join("out.mp4"), tmp.join("assets"))
    }
}

#[test]
fn pipeline_produces_one_clip_per_slide() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(tmp.path());
    std::fs::create_dir_all(&cfg.assets_dir).unwrap();

    let speech = FixedSpeech { secs: 2.0 };
    let collab = Collaborators {
        speech: &speech,
        snippets: &NoSnippets,
        charts: &NoCharts,
        illustrations: None,
    };

    let script = script();
    script.validate().unwrap();
    let clips = build_clips(&script, &styles(), &cfg, &collab, &mut CellFont).unwrap();

    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].slide_number, 1);
    assert!((clips[0].duration_secs - 2.0).abs() < 1e-9);
    assert!(clips[0].audio_path.exists());
    // Composited stills land next to the narration tracks.
    assert!(cfg.assets_dir.join("slide_1.png").exists());
    assert!(cfg.assets_dir.join("slide_2.png").exists());
}

#[test]
fn encoded_frame_count_matches_narration_runtime() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(tmp.path());
    std::fs::create_dir_all(&cfg.assets_dir).unwrap();

    let speech = FixedSpeech { secs: 1.5 };
    let collab = Collaborators {
        speech: &speech,
        snippets: &NoSnippets,
        charts: &NoCharts,
        illustrations: None,
    };

    let script = script();
    let clips = build_clips(&script, &styles(), &cfg, &collab, &mut CellFont).unwrap();
    let transitions = requested_transitions(&script);
    let timeline = reduce(clips, &transitions, cfg.transition_secs);
    // Audio is never overlapped: two 1.5s narrations give a 3.0s video.
    assert!((timeline.total_secs - 3.0).abs() < 1e-9);

    let server = FrameServer::new(timeline, cfg.canvas, cfg.background, None);
    let sink_cfg = SinkConfig::new(&cfg.out_path, cfg.canvas.width, cfg.canvas.height, cfg.fps);
    let mut sink = InMemorySink::new(&sink_cfg);
    let frames = encode_timeline(&server, cfg.fps, &mut sink).unwrap();

    assert_eq!(frames, 72);
    assert_eq!(sink.frames.len(), 72);
    assert!(sink.finished);

    // First frame: white slide flattened to opaque white.
    let first = &sink.frames[0];
    assert_eq!(&first[..4], &[255, 255, 255, 255]);
    assert_eq!(first.len(), (64 * 48 * 4) as usize);
}

#[test]
fn slides_render_over_configured_background() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config(tmp.path());
    std::fs::create_dir_all(&cfg.assets_dir).unwrap();

    let bg_path = tmp.path().join("background.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 255, 0, 255]))
        .save(&bg_path)
        .unwrap();
    cfg.background_image = Some(bg_path);

    let speech = FixedSpeech { secs: 1.0 };
    let collab = Collaborators {
        speech: &speech,
        snippets: &NoSnippets,
        charts: &NoCharts,
        illustrations: None,
    };

    let clips = build_clips(&script(), &styles(), &cfg, &collab, &mut CellFont).unwrap();

    // Text sits inside the content margins, so the top-left corner of every
    // slide shows the background image.
    for clip in &clips {
        let still = clip.visual.composited();
        assert_eq!(&still.data()[..4], &[0, 255, 0, 255]);
    }
}

#[test]
fn missing_narration_text_fails_with_slide_number() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(tmp.path());
    std::fs::create_dir_all(&cfg.assets_dir).unwrap();

    let script: CourseScript = serde_json::from_value(serde_json::json!({
        "slides": [
            { "slideNumber": 1, "type": "content_slide", "title": "No body" }
        ]
    }))
    .unwrap();

    let speech = FixedSpeech { secs: 1.0 };
    let collab = Collaborators {
        speech: &speech,
        snippets: &NoSnippets,
        charts: &NoCharts,
        illustrations: None,
    };

    let err = build_clips(&script, &styles(), &cfg, &collab, &mut CellFont).unwrap_err();
    assert!(err.to_string().contains("slide 1"));
}
