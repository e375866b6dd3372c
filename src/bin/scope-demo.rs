use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use scopetrace_core::config::EngineConfig;
use scopetrace_core::trace::renderer::encode_wav;
use scopetrace_core::trace::{OutputFeeder, ScopeEngine, VectorSurface};
use tracing_subscriber::EnvFilter;

/// Draw a spinning test pattern on an X-Y oscilloscope through the sound card.
#[derive(Debug, Parser)]
#[command(name = "scope-demo", version)]
struct Args {
    /// JSON engine config; command line values override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output sample rate in Hz (0 = 44100).
    #[arg(long)]
    sample_rate: Option<i32>,

    /// Audio buffer size in frames (0 = 1024).
    #[arg(long)]
    buffer: Option<i32>,

    /// Orientation bitmask: 1 mirror X, 2 mirror Y, 4 swap axes.
    #[arg(long)]
    mode: Option<u32>,

    /// Pictures submitted per second.
    #[arg(long, default_value_t = 20)]
    fps: u32,

    /// How long to run, in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Render the output to a WAV file instead of opening the sound card.
    #[arg(long)]
    wav: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.sample_rate.is_some() || args.buffer.is_some() {
        let host = EngineConfig::from_host(
            args.sample_rate.unwrap_or(config.sample_rate as i32),
            args.buffer.unwrap_or(config.buffer_size as i32),
        );
        config.sample_rate = host.sample_rate;
        config.buffer_size = host.buffer_size;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let fps = args.fps.max(1);
    let ticks = (args.seconds * fps as f64).ceil() as u64;
    let (mut engine, feeder) = ScopeEngine::initialize(config.clone());
    engine.set_scale(-1.0, 1.0, 1.0, -1.0, 100.0);

    match args.wav {
        Some(path) => render_offline(&mut engine, feeder, fps, ticks, &path),
        None => play(&mut engine, feeder, &config, fps, ticks),
    }
}

fn render_offline(
    engine: &mut ScopeEngine,
    mut feeder: OutputFeeder,
    fps: u32,
    ticks: u64,
    path: &Path,
) -> anyhow::Result<()> {
    let sample_rate = engine.sample_rate();
    let pairs_per_tick = pairs_per_tick(sample_rate, fps)?;
    let mut pcm = vec![0i16; pairs_per_tick * 2 * ticks as usize];

    for (tick, chunk) in pcm.chunks_mut(pairs_per_tick * 2).enumerate() {
        draw_pattern(engine, tick as f64 / fps as f64);
        engine.flip(true);
        feeder.pull_samples(chunk);
    }

    std::fs::write(path, encode_wav(&pcm, sample_rate, 2))
        .with_context(|| format!("write wav '{}'", path.display()))?;
    let metrics = engine.metrics_snapshot();
    tracing::info!(
        path = %path.display(),
        frames = metrics.committed_frames,
        dropped = metrics.dropped_frames,
        refresh_hz = engine.refresh_rate(),
        "wrote wav"
    );
    Ok(())
}

#[cfg(feature = "device")]
fn play(
    engine: &mut ScopeEngine,
    feeder: OutputFeeder,
    config: &EngineConfig,
    fps: u32,
    ticks: u64,
) -> anyhow::Result<()> {
    use std::time::Duration;

    use scopetrace_core::output::ScopeOutput;

    let output = ScopeOutput::start(feeder, config, |err| {
        tracing::error!(%err, "output stream error");
    })
    .context("couldn't open audio")?;
    tracing::info!(
        sample_rate = output.sample_rate(),
        buffer_size = output.buffer_size(),
        "audio output started"
    );

    let tick = Duration::from_secs_f64(1.0 / fps as f64);
    for n in 0..ticks {
        draw_pattern(engine, n as f64 / fps as f64);
        engine.flip(true);
        if n % fps as u64 == 0 {
            let m = engine.metrics_snapshot();
            tracing::info!(
                refresh_hz = engine.refresh_rate(),
                activated = m.activated_frames,
                dropped = m.dropped_frames,
                "playing"
            );
        }
        std::thread::sleep(tick);
    }
    Ok(())
}

#[cfg(not(feature = "device"))]
fn play(
    _engine: &mut ScopeEngine,
    _feeder: OutputFeeder,
    _config: &EngineConfig,
    _fps: u32,
    _ticks: u64,
) -> anyhow::Result<()> {
    anyhow::bail!("built without the `device` feature; use --wav to render to a file")
}

/// Sample pairs rendered per submitted picture.
fn pairs_per_tick(sample_rate: u32, fps: u32) -> anyhow::Result<usize> {
    if fps == 0 || fps > sample_rate {
        anyhow::bail!("--fps {fps} must be between 1 and the sample rate ({sample_rate} Hz)");
    }
    Ok((sample_rate / fps) as usize)
}

/// A rotating square around a pulsing dot.
fn draw_pattern(surface: &mut impl VectorSurface, t: f64) {
    let angle = t * PI / 2.0;
    let corners: Vec<(f64, f64)> = (0..4)
        .map(|i| {
            let a = angle + i as f64 * PI / 2.0;
            (0.7 * a.cos(), 0.7 * a.sin())
        })
        .collect();

    surface.move_to(corners[0].0, corners[0].1);
    for &(x, y) in corners.iter().skip(1).chain(corners.iter().take(1)) {
        surface.line_to(x, y, 1.0);
    }

    surface.move_to(0.0, 0.0);
    surface.line_to(0.0, 0.0, 1.0 + (t * 4.0).sin().abs());
}
