//! End-to-end orchestration: course script in, narrated MP4 out.
//!
//! Slides are processed strictly in order, one at a time: layout, render,
//! narration, clip assembly. Any failure aborts the run with the slide number
//! and stage attached.

use std::path::{Path, PathBuf};

use crate::collab::chart::ChartRasterizer;
use crate::collab::illustration::IllustrationGenerator;
use crate::collab::snippet::SnippetRasterizer;
use crate::collab::speech::{SpeechSynthesizer, VoiceSpec};
use crate::core::{Canvas, Rgba8, sanitize_text};
use crate::encode::{FPS, FfmpegSink, FrameSink, SinkConfig};
use crate::error::{SlidecastError, SlidecastResult};
use crate::layout::engine::layout_slide;
use crate::render::slide::SlideVisual;
use crate::render::{Surface, place_illustration, render_slide};
use crate::script::{CourseScript, SlideType, StyleSheet};
use crate::text::font::GlyphRaster;
use crate::timeline::{FrameServer, TimedClip, Transition, reduce};

/// External services the pipeline delegates to.
pub struct Collaborators<'a> {
    pub speech: &'a dyn SpeechSynthesizer,
    pub snippets: &'a dyn SnippetRasterizer,
    pub charts: &'a dyn ChartRasterizer,
    pub illustrations: Option<&'a dyn IllustrationGenerator>,
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub canvas: Canvas,
    pub voice: VoiceSpec,
    pub assets_dir: PathBuf,
    pub out_path: PathBuf,
    pub transition_secs: f64,
    pub fps: u32,
    pub background: Rgba8,
    /// Image drawn behind every slide and transition instead of the solid
    /// background color.
    pub background_image: Option<PathBuf>,
    /// Leave intermediate narration/snippet/chart assets on disk after a
    /// successful encode.
    pub keep_assets: bool,
}

impl PipelineConfig {
    pub fn new(out_path: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            canvas: Canvas::default(),
            voice: VoiceSpec::default(),
            assets_dir: assets_dir.into(),
            out_path: out_path.into(),
            transition_secs: Transition::DEFAULT_SECS,
            fps: FPS,
            background: Rgba8::BLACK,
            background_image: None,
            keep_assets: false,
        }
    }
}

/// What a finished run produced.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub out_path: PathBuf,
    pub slides: usize,
    pub frames: u64,
    pub duration_secs: f64,
}

/// Transition requested at each clip boundary: a slide's `transition` field
/// names the effect into its successor, defaulting to a leftward wipe. The
/// final slide's field has no boundary to govern and is ignored.
pub fn requested_transitions(script: &CourseScript) -> Vec<Transition> {
    script
        .slides
        .windows(2)
        .map(|pair| Transition::from_request(pair[0].transition.as_deref()))
        .collect()
}

/// Decode and canvas-fit the configured background image, if any.
pub fn load_backdrop(cfg: &PipelineConfig) -> SlidecastResult<Option<Surface>> {
    match &cfg.background_image {
        Some(path) => {
            let image = Surface::decode_path(path)?;
            Ok(Some(image.scaled_to(cfg.canvas.width, cfg.canvas.height)?))
        }
        None => Ok(None),
    }
}

/// Build one timed clip per slide: layout, render, narrate, bind.
#[tracing::instrument(skip_all)]
pub fn build_clips<F: GlyphRaster>(
    script: &CourseScript,
    styles: &StyleSheet,
    cfg: &PipelineConfig,
    collab: &Collaborators<'_>,
    font: &mut F,
) -> SlidecastResult<Vec<TimedClip>> {
    let backdrop = load_backdrop(cfg)?;
    let mut clips = Vec::with_capacity(script.slides.len());

    for slide in &script.slides {
        let n = slide.slide_number;
        let config = styles
            .config_for(slide.slide_type)
            .map_err(|e| e.at_slide(n, "style"))?;

        let blocks = layout_slide(
            slide,
            config,
            cfg.canvas,
            font,
            collab.snippets,
            collab.charts,
            &cfg.assets_dir,
        )
        .map_err(|e| e.at_slide(n, "layout"))?;

        let illustration = match (&slide.image_prompt, collab.illustrations) {
            (Some(prompt), Some(generator)) => {
                let path = cfg.assets_dir.join(format!("illustration_{n}.png"));
                // Skip generation when the asset already exists so re-runs
                // reuse cached images.
                if !path.exists() {
                    generator
                        .generate(
                            prompt,
                            slide.image_ratio.as_deref().unwrap_or("16:9"),
                            n,
                            &path,
                        )
                        .map_err(|e| e.at_slide(n, "illustration"))?;
                }
                Some(path)
            }
            _ => None,
        };

        // On a title slide the illustration becomes the base layer, so the
        // text is rendered on a transparent surface instead of white. All
        // other slides sit on the backdrop image when one is configured.
        let transparent;
        let text_background = if illustration.is_some() && slide.slide_type == SlideType::Title {
            transparent = Surface::new(cfg.canvas.width, cfg.canvas.height);
            Some(&transparent)
        } else {
            backdrop.as_ref()
        };
        let rendered = render_slide(&blocks, cfg.canvas, text_background, font)
            .map_err(|e| e.at_slide(n, "render"))?;

        let visual = match &illustration {
            Some(path) => place_illustration(slide, config, rendered, path, cfg.canvas)
                .map_err(|e| e.at_slide(n, "illustration"))?,
            None => SlideVisual {
                base: rendered.surface,
                overlay: None,
            },
        };

        let still_path = cfg.assets_dir.join(format!("slide_{n}.png"));
        image::save_buffer_with_format(
            &still_path,
            &visual.composited().flatten_onto(cfg.background, 1.0),
            cfg.canvas.width,
            cfg.canvas.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            SlidecastError::asset(format!(
                "failed to write still '{}': {e}",
                still_path.display()
            ))
            .at_slide(n, "render")
        })?;

        let narration = sanitize_text(&slide.narration_text());
        if narration.trim().is_empty() {
            return Err(SlidecastError::input(format!(
                "slide {n} has no narration text (voiceover or content required)"
            )));
        }
        let audio_path = cfg.assets_dir.join(format!("audio_{n}.mp3"));
        let take = collab
            .speech
            .synthesize(&narration, &cfg.voice, &audio_path)
            .map_err(|e| e.at_slide(n, "narration"))?;

        clips.push(TimedClip::assemble(
            n,
            slide.slide_type,
            visual,
            take.audio_path,
            take.duration_secs,
        )?);
    }

    Ok(clips)
}

/// Sample every frame of the timeline into the sink at a constant rate.
pub fn encode_timeline(
    server: &FrameServer,
    fps: u32,
    sink: &mut dyn FrameSink,
) -> SlidecastResult<u64> {
    let frames = server.total_frames(fps);
    for i in 0..frames {
        let t = i as f64 / f64::from(fps);
        sink.push_frame(&server.frame_at(t))?;
    }
    sink.finish()?;
    Ok(frames)
}

/// Run the whole pipeline and encode through ffmpeg.
#[tracing::instrument(skip_all, fields(out = %cfg.out_path.display()))]
pub fn run<F: GlyphRaster>(
    script: &CourseScript,
    styles: &StyleSheet,
    cfg: &PipelineConfig,
    collab: &Collaborators<'_>,
    font: &mut F,
) -> SlidecastResult<PipelineReport> {
    script.validate()?;
    std::fs::create_dir_all(&cfg.assets_dir).map_err(|e| {
        SlidecastError::asset(format!(
            "failed to create assets directory '{}': {e}",
            cfg.assets_dir.display()
        ))
    })?;

    let clips = build_clips(script, styles, cfg, collab, font)?;
    let transitions = requested_transitions(script);
    let timeline = reduce(clips, &transitions, cfg.transition_secs);

    let audio_paths: Vec<PathBuf> = timeline
        .clips
        .iter()
        .map(|clip| clip.audio_path.clone())
        .collect();
    let duration_secs = timeline.total_secs;
    let slides = timeline.clips.len();

    let server = FrameServer::new(timeline, cfg.canvas, cfg.background, load_backdrop(cfg)?);
    let sink_cfg = SinkConfig::new(&cfg.out_path, cfg.canvas.width, cfg.canvas.height, cfg.fps);
    let mut sink = FfmpegSink::new(sink_cfg, &audio_paths)?;
    let frames = encode_timeline(&server, cfg.fps, &mut sink)?;

    if !cfg.keep_assets {
        cleanup_assets(&cfg.assets_dir);
    }

    Ok(PipelineReport {
        out_path: cfg.out_path.clone(),
        slides,
        frames,
        duration_secs,
    })
}

/// Delete per-run intermediates (narration, stills, snippet and chart
/// rasters). Illustrations stay so later runs can reuse them; failures are
/// ignored.
fn cleanup_assets(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy().into_owned();
        if name.starts_with("audio_")
            || name.starts_with("slide_")
            || name.starts_with("snippet_")
            || name.starts_with("chart_")
        {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}
