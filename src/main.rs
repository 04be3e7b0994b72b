// src/main.rs
//! Headless demo: renders a synthetic spectrum through the engine and
//! writes the final frame to a PNG.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tiny_skia::Pixmap;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wavescope::engine::{RenderContext, SurfaceRenderer};
use wavescope::frame::FpsLimiter;
use wavescope::spectrum::SyntheticSource;
use wavescope::{FrameResult, RenderQuality, RenderStyle, RendererFactory};

#[derive(Parser, Debug)]
#[command(name = "wavescope", about = "Audio-spectrum rendering engine demo")]
struct Args {
    /// Visual style: bars, radial, wave, matrix, orbit, afterglow, marquee
    #[arg(short, long, default_value = "bars")]
    style: String,

    /// Quality tier: low, medium, high
    #[arg(short, long, default_value = "medium")]
    quality: String,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 300)]
    frames: u32,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 450)]
    height: u32,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Requested bar count
    #[arg(long, default_value_t = 64)]
    bars: usize,

    /// Requested bar spacing in pixels
    #[arg(long, default_value_t = 2.0)]
    spacing: f32,

    /// Palette name: default, ember, mono
    #[arg(long, default_value = "default")]
    palette: String,

    /// Stamp the FPS readout onto the frames
    #[arg(long)]
    perf: bool,

    /// Where to write the final frame
    #[arg(short, long, default_value = "wavescope.png")]
    out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let style = RenderStyle::from_name(&args.style)
        .with_context(|| format!("unknown style `{}`", args.style))?;
    let quality = RenderQuality::from_name(&args.quality)
        .with_context(|| format!("unknown quality `{}`", args.quality))?;

    let factory = Arc::new(RendererFactory::new());
    let mut surface = SurfaceRenderer::new(factory.clone());
    let mut limiter = FpsLimiter::new(args.fps);
    let source = SyntheticSource::new(256);
    let mut canvas =
        Pixmap::new(args.width, args.height).context("canvas dimensions must be nonzero")?;

    info!(%style, ?quality, frames = args.frames, "rendering");
    let mut rendered = 0u32;
    while rendered < args.frames {
        let now = Instant::now();
        if !limiter.should_render(now) {
            std::thread::sleep(limiter.sleep_hint(now));
            continue;
        }
        let ctx = RenderContext {
            is_recording: true,
            is_overlay_active: false,
            show_performance_info: args.perf,
            style,
            quality,
            bar_count: args.bars,
            bar_spacing: args.spacing,
            palette: &args.palette,
            source: &source,
        };
        match surface.render_frame(&mut canvas, &ctx)? {
            FrameResult::Rendered | FrameResult::Replayed => rendered += 1,
            other => info!(?other, "frame did not render"),
        }
    }

    if let Some(snapshot) = surface.perf_snapshot() {
        info!(
            fps = format!("{:.1}", snapshot.fps),
            avg_ms = format!("{:.2}", snapshot.avg_frame_ms),
            worst_ms = format!("{:.2}", snapshot.worst_frame_ms),
            "render statistics"
        );
    }

    canvas
        .save_png(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    info!(path = %args.out.display(), "wrote final frame");
    factory.dispose();
    Ok(())
}
