use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use slidecast::collab::{
    ChartRasterizer, CommandChartRasterizer, CommandIllustrationGenerator,
    CommandSnippetRasterizer, CommandSynthesizer, SnippetRasterizer,
};
use slidecast::script::{ChartSpec, ChartStyle};
use slidecast::text::FontEngine;
use slidecast::{
    Canvas, Collaborators, CourseScript, PipelineConfig, SlidecastError, SlidecastResult,
    StyleSheet,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one slide as a PNG still (no narration, no ffmpeg).
    Frame(FrameArgs),
    /// Render the narrated MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Course script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Style sheet JSON.
    #[arg(long)]
    style: PathBuf,

    /// TrueType/OpenType font used for slide text.
    #[arg(long)]
    font: PathBuf,

    /// Directory for intermediate assets (narration, snippets, charts,
    /// illustrations).
    #[arg(long, default_value = "assets")]
    assets_dir: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Background image drawn behind slides and transitions. Defaults to a
    /// solid background when omitted.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Command template rasterizing code/formula snippets. Placeholders:
    /// {text} {lexer} {style} {font_size} {out}.
    #[arg(long)]
    snippet_cmd: Option<String>,

    /// Command template rasterizing charts. Placeholders: {spec} {style}
    /// {out}.
    #[arg(long)]
    chart_cmd: Option<String>,

    /// Command template generating illustrations. Placeholders: {prompt}
    /// {ratio} {slide} {out}.
    #[arg(long)]
    illustration_cmd: Option<String>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Slide number to render.
    #[arg(long)]
    slide: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Command template synthesizing narration audio. Placeholders: {text}
    /// {voice} {language} {out}.
    #[arg(long)]
    tts_cmd: String,

    /// Narration voice name.
    #[arg(long, default_value = "en-IN-ArjunNeural")]
    voice: String,

    /// Narration language tag.
    #[arg(long, default_value = "en-IN")]
    language: String,

    /// Transition overlap in seconds.
    #[arg(long, default_value_t = 1.7)]
    transition_secs: f64,

    /// Output frame rate.
    #[arg(long, default_value_t = 24)]
    fps: u32,

    /// Keep intermediate assets after a successful encode.
    #[arg(long)]
    keep_assets: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

/// Split a command template into argv on whitespace. Placeholders are
/// substituted per-argument at run time, so spaces inside substituted values
/// never re-split.
fn split_template(template: &str) -> anyhow::Result<Vec<String>> {
    let argv: Vec<String> = template.split_whitespace().map(String::from).collect();
    anyhow::ensure!(!argv.is_empty(), "command template is empty");
    Ok(argv)
}

/// Placeholder for collaborator commands the caller did not configure.
/// Slides that never need the collaborator run fine; slides that do fail
/// with a pointer at the missing flag.
struct Unconfigured(&'static str);

impl SnippetRasterizer for Unconfigured {
    fn rasterize(
        &self,
        _request: &slidecast::collab::SnippetRequest,
        _out_path: &Path,
    ) -> SlidecastResult<()> {
        Err(SlidecastError::asset(format!(
            "this script needs a snippet rasterizer; pass {}",
            self.0
        )))
    }
}

impl ChartRasterizer for Unconfigured {
    fn rasterize(
        &self,
        _spec: &ChartSpec,
        _style: &ChartStyle,
        _out_path: &Path,
    ) -> SlidecastResult<()> {
        Err(SlidecastError::asset(format!(
            "this script needs a chart rasterizer; pass {}",
            self.0
        )))
    }
}

struct LoadedCollaborators {
    snippets: Option<CommandSnippetRasterizer>,
    charts: Option<CommandChartRasterizer>,
    illustrations: Option<CommandIllustrationGenerator>,
}

impl LoadedCollaborators {
    fn from_args(common: &CommonArgs) -> anyhow::Result<Self> {
        let snippets = common
            .snippet_cmd
            .as_deref()
            .map(split_template)
            .transpose()
            .context("--snippet-cmd")?
            .map(CommandSnippetRasterizer::new);
        let charts = common
            .chart_cmd
            .as_deref()
            .map(split_template)
            .transpose()
            .context("--chart-cmd")?
            .map(CommandChartRasterizer::new);
        let illustrations = common
            .illustration_cmd
            .as_deref()
            .map(split_template)
            .transpose()
            .context("--illustration-cmd")?
            .map(CommandIllustrationGenerator::new);
        Ok(Self {
            snippets,
            charts,
            illustrations,
        })
    }
}

fn load_inputs(common: &CommonArgs) -> anyhow::Result<(CourseScript, StyleSheet, FontEngine)> {
    let script = CourseScript::from_path(&common.script)?;
    script.validate()?;
    let styles = StyleSheet::from_path(&common.style)?;
    let font = FontEngine::from_font_path(&common.font)?;
    Ok((script, styles, font))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (script, styles, mut font) = load_inputs(&args.common)?;
    let canvas = Canvas::new(args.common.width, args.common.height)?;

    let slide = script
        .slides
        .iter()
        .find(|s| s.slide_number == args.slide)
        .with_context(|| format!("script has no slide {}", args.slide))?;
    let config = styles.config_for(slide.slide_type)?;

    let loaded = LoadedCollaborators::from_args(&args.common)?;
    let snippet_fallback = Unconfigured("--snippet-cmd");
    let chart_fallback = Unconfigured("--chart-cmd");
    let snippets: &dyn SnippetRasterizer = match &loaded.snippets {
        Some(s) => s,
        None => &snippet_fallback,
    };
    let charts: &dyn ChartRasterizer = match &loaded.charts {
        Some(c) => c,
        None => &chart_fallback,
    };

    std::fs::create_dir_all(&args.common.assets_dir).with_context(|| {
        format!(
            "create assets dir '{}'",
            args.common.assets_dir.display()
        )
    })?;

    let blocks = slidecast::layout::layout_slide(
        slide,
        config,
        canvas,
        &mut font,
        snippets,
        charts,
        &args.common.assets_dir,
    )?;
    let backdrop = args
        .common
        .background
        .as_deref()
        .map(|path| -> anyhow::Result<_> {
            let image = slidecast::render::Surface::decode_path(path)?;
            Ok(image.scaled_to(canvas.width, canvas.height)?)
        })
        .transpose()?;
    let rendered =
        slidecast::render::render_slide(&blocks, canvas, backdrop.as_ref(), &mut font)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let opaque = rendered.surface.flatten_onto(slidecast::Rgba8::WHITE, 1.0);
    image::save_buffer_with_format(
        &args.out,
        &opaque,
        canvas.width,
        canvas.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (script, styles, mut font) = load_inputs(&args.common)?;

    let mut cfg = PipelineConfig::new(&args.out, &args.common.assets_dir);
    cfg.canvas = Canvas::new(args.common.width, args.common.height)?;
    cfg.voice.voice = args.voice;
    cfg.voice.language = args.language;
    cfg.transition_secs = args.transition_secs;
    cfg.fps = args.fps;
    cfg.background_image = args.common.background.clone();
    cfg.keep_assets = args.keep_assets;

    let speech =
        CommandSynthesizer::new(split_template(&args.tts_cmd).context("--tts-cmd")?);
    let loaded = LoadedCollaborators::from_args(&args.common)?;
    let snippet_fallback = Unconfigured("--snippet-cmd");
    let chart_fallback = Unconfigured("--chart-cmd");

    let collab = Collaborators {
        speech: &speech,
        snippets: match &loaded.snippets {
            Some(s) => s,
            None => &snippet_fallback,
        },
        charts: match &loaded.charts {
            Some(c) => c,
            None => &chart_fallback,
        },
        illustrations: loaded
            .illustrations
            .as_ref()
            .map(|g| g as &dyn slidecast::collab::IllustrationGenerator),
    };

    let report = slidecast::pipeline::run(&script, &styles, &cfg, &collab, &mut font)?;

    eprintln!(
        "wrote {} ({} slides, {} frames, {:.2}s)",
        report.out_path.display(),
        report.slides,
        report.frames,
        report.duration_secs
    );
    Ok(())
}
