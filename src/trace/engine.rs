//! Scope engine — the drawing API.
//!
//! Draw calls build a stroke list; `flip` renders it to PCM and stages it for
//! the output feeder. Everything here runs on the producer side; the only
//! state shared with the audio callback is the scheduler's staged slot.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::ScopeError;

use super::frame::RenderedFrame;
use super::orientation::Orientation;
use super::renderer::{self, RenderReport};
use super::scale::Scale;
use super::scheduler::{FrameScheduler, OutputFeeder, SchedulerMetricsSnapshot, frame_channel};
use super::stroke::StrokeList;

/// The vector drawing contract shared by every display backend.
pub trait VectorSurface {
    /// Set the logical coordinates of the screen edges and the weight scale.
    fn set_scale(&mut self, left: f64, right: f64, top: f64, bottom: f64, weight: f64);

    /// Move the beam to `(x, y)` as fast as possible.
    fn move_to(&mut self, x: f64, y: f64);

    /// Draw a line from the previous point to `(x, y)` with the given brightness.
    fn line_to(&mut self, x: f64, y: f64, weight: f64);

    /// Show what has been drawn. With `clear`, start the next picture empty.
    fn flip(&mut self, clear: bool);

    /// Set orientation from a bitmask: 1 mirror X, 2 mirror Y, 4 swap axes.
    fn set_mode(&mut self, mode: u32);

    /// Refresh rate of the last submitted picture in Hz.
    fn refresh_rate(&self) -> f64;
}

pub struct ScopeEngine {
    config: EngineConfig,
    scale: Scale,
    orientation: Orientation,
    strokes: StrokeList,
    scheduler: FrameScheduler,
    refresh_rate: f64,
}

impl ScopeEngine {
    /// Create an engine and the feeder the audio callback drains.
    ///
    /// The feeder starts on a short silent frame so output can begin before
    /// the first flip.
    pub fn initialize(config: EngineConfig) -> (Self, OutputFeeder) {
        let config = config.normalized();
        let blank = RenderedFrame::blank(config.blank_frame_pairs());
        let (scheduler, feeder) = frame_channel(blank);

        tracing::debug!(
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            max_points = config.max_points,
            "scope engine initialized"
        );

        let engine = ScopeEngine {
            scale: config.scale,
            orientation: Orientation::from_mode(config.mode),
            strokes: StrokeList::with_capacity(config.max_points),
            scheduler,
            refresh_rate: 0.0,
            config,
        };
        (engine, feeder)
    }

    /// Engine for host-supplied sample rate and buffer size; zero or negative
    /// values pick 44100 Hz and 1024 frames.
    pub fn with_host(sample_rate: i32, buffer_size: i32) -> (Self, OutputFeeder) {
        Self::initialize(EngineConfig::from_host(sample_rate, buffer_size))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn strokes(&self) -> &StrokeList {
        &self.strokes
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn metrics_snapshot(&self) -> SchedulerMetricsSnapshot {
        self.scheduler.metrics_snapshot()
    }

    /// Render the current picture without submitting it.
    pub fn render(&self) -> RenderReport {
        renderer::render(
            self.strokes.points(),
            self.orientation,
            self.config.sample_rate,
        )
    }

    /// Render the current picture and stage it for playback. Returns the
    /// frame's sequence number.
    pub fn submit(&mut self, clear: bool) -> u64 {
        let report = self.render();
        self.refresh_rate = report.refresh_rate;

        if self.strokes.truncated() > 0 {
            tracing::debug!(
                kept = self.strokes.len(),
                dropped = self.strokes.truncated(),
                "picture exceeded the point capacity"
            );
        }

        let pairs = report.frame.pairs();
        let sequence = self.scheduler.commit(report.frame);
        tracing::trace!(sequence, pairs, refresh_hz = self.refresh_rate, "frame staged");

        if clear {
            self.strokes.clear();
        }
        sequence
    }

    /// Write the current picture, looped `loops` times, to a WAV file.
    pub fn dump_wav(&self, path: impl AsRef<Path>, loops: usize) -> Result<(), ScopeError> {
        let path = path.as_ref();
        let report = self.render();
        let wav = renderer::frame_to_wav(&report.frame, self.config.sample_rate, loops);
        std::fs::write(path, wav).map_err(|source| ScopeError::DumpIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl VectorSurface for ScopeEngine {
    fn set_scale(&mut self, left: f64, right: f64, top: f64, bottom: f64, weight: f64) {
        self.scale = Scale::new(left, right, top, bottom, weight);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.strokes.move_to(&self.scale, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64, weight: f64) {
        self.strokes.line_to(&self.scale, x, y, weight);
    }

    fn flip(&mut self, clear: bool) {
        self.submit(clear);
    }

    fn set_mode(&mut self, mode: u32) {
        self.orientation = Orientation::from_mode(mode);
    }

    fn refresh_rate(&self) -> f64 {
        self.refresh_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::orientation::{MIRROR_X, SWAP_AXES};

    fn engine() -> (ScopeEngine, OutputFeeder) {
        ScopeEngine::with_host(44100, 1024)
    }

    fn drain_pairs(feeder: &mut OutputFeeder, pairs: usize) -> Vec<i16> {
        let mut out = vec![0i16; pairs * 2];
        feeder.pull_samples(&mut out);
        out
    }

    #[test]
    fn starts_on_blank_frame() {
        let (engine, feeder) = engine();
        assert_eq!(feeder.active().pairs(), 512);
        assert!(feeder.active().samples().iter().all(|&s| s == 0));
        assert_eq!(engine.refresh_rate(), 0.0);
        assert_eq!(engine.sample_rate(), 44100);
    }

    #[test]
    fn diagonal_line_end_to_end() {
        let (mut engine, mut feeder) = engine();
        engine.set_scale(0.0, 1000.0, 0.0, 1000.0, 100.0);
        engine.move_to(0.0, 0.0);
        engine.line_to(1000.0, 1000.0, 1.0);
        let sequence = engine.submit(true);

        assert!(engine.strokes().is_empty());
        assert_eq!(engine.scheduler().staged_sequence(), Some(sequence));
        assert!((engine.refresh_rate() - 44100.0 / 142.0).abs() < 1e-9);

        // skip the blank start-up frame
        drain_pairs(&mut feeder, 512);
        let frame = drain_pairs(&mut feeder, 142);
        assert_eq!(feeder.active().sequence(), sequence);
        assert_eq!(feeder.active().pairs(), 142);

        // default orientation: left = Y, right = inverted X
        assert_eq!(&frame[0..2], &[-32768, 32767]);

        // the last pair sits one step short of (65535, 65535)
        let step = 65535.0 / 142.0;
        let last_y = frame[282] as f64 + 32768.0;
        let last_x = 32767.0 - frame[283] as f64;
        assert!((65535.0 - last_y - step).abs() <= 1.0, "last y {last_y}");
        assert!((65535.0 - last_x - step).abs() <= 1.0, "last x {last_x}");
    }

    #[test]
    fn flip_without_clear_accumulates() {
        let (mut engine, _feeder) = engine();
        engine.move_to(0.0, 0.0);
        engine.line_to(500.0, 0.0, 1.0);
        engine.flip(false);
        let first = engine.render().frame.pairs();

        engine.line_to(500.0, 500.0, 1.0);
        engine.flip(false);
        assert_eq!(engine.strokes().len(), 3);
        assert!(engine.render().frame.pairs() > first);
    }

    #[test]
    fn dwell_after_move() {
        let (mut engine, _feeder) = engine();
        for w in [0.0, 0.5, 1.0, 4.0] {
            engine.move_to(250.0, 250.0);
            engine.line_to(250.0, 250.0, w);
            let p = engine.strokes().points()[1];
            assert!(p.weight >= 1);
            assert_eq!(p.weight, (w * 0.05 * 100.0_f64).max(1.0) as u16);
            engine.flip(true);
        }
    }

    #[test]
    fn two_quick_flips_only_second_plays() {
        let (mut engine, mut feeder) = engine();
        engine.move_to(0.0, 0.0);
        engine.line_to(1000.0, 0.0, 1.0);
        let first = engine.submit(true);

        engine.move_to(0.0, 1000.0);
        engine.line_to(1000.0, 1000.0, 1.0);
        let second = engine.submit(true);

        assert_eq!(engine.scheduler().staged_sequence(), Some(second));
        drain_pairs(&mut feeder, 4096);
        assert_eq!(feeder.active().sequence(), second);
        assert_ne!(feeder.active().sequence(), first);
        assert_eq!(engine.metrics_snapshot().dropped_frames, 1);
    }

    #[test]
    fn modes_change_samples() {
        let (mut engine, _feeder) = engine();
        engine.move_to(100.0, 200.0);
        engine.line_to(900.0, 600.0, 1.0);
        let base = engine.render().frame;

        engine.set_mode(MIRROR_X);
        assert_ne!(engine.render().frame, base);
        engine.set_mode(0);
        assert_eq!(engine.render().frame, base);

        engine.set_mode(SWAP_AXES);
        let swapped = engine.render().frame;
        let flipped: Vec<i16> = swapped.samples().chunks(2).flat_map(|p| [p[1], p[0]]).collect();
        assert_eq!(flipped.as_slice(), base.samples());
    }

    #[test]
    fn empty_flip_goes_silent() {
        let (mut engine, mut feeder) = engine();
        engine.flip(true);
        assert_eq!(engine.refresh_rate(), 0.0);
        drain_pairs(&mut feeder, 512);
        assert!(drain_pairs(&mut feeder, 64).iter().all(|&s| s == 0));
        assert!(feeder.active().is_empty());
    }

    #[test]
    fn zero_config_values_fall_back_to_defaults() {
        let config = EngineConfig {
            sample_rate: 0,
            buffer_size: 0,
            ..Default::default()
        };
        let (mut engine, feeder) = ScopeEngine::initialize(config);
        assert_eq!(engine.sample_rate(), 44100);
        assert_eq!(engine.config().buffer_size, 1024);
        assert_eq!(feeder.active().pairs(), 512);

        engine.move_to(0.0, 0.0);
        engine.line_to(1000.0, 1000.0, 1.0);
        engine.flip(true);
        assert!((engine.refresh_rate() - 44100.0 / 142.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_from_config() {
        let config = EngineConfig {
            max_points: 2,
            ..Default::default()
        };
        let (mut engine, _feeder) = ScopeEngine::initialize(config);
        engine.move_to(0.0, 0.0);
        engine.line_to(10.0, 10.0, 1.0);
        engine.line_to(20.0, 20.0, 1.0);
        assert_eq!(engine.strokes().len(), 2);
        assert_eq!(engine.strokes().truncated(), 1);
        engine.flip(true);
        assert_eq!(engine.strokes().truncated(), 0);
    }

    #[test]
    fn wav_dump_to_disk() {
        let (mut engine, _feeder) = engine();
        engine.move_to(0.0, 0.0);
        engine.line_to(1000.0, 0.0, 1.0);
        let path = std::env::temp_dir().join(format!("scopetrace-{}.wav", std::process::id()));
        engine.dump_wav(&path, 2).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(bytes.len(), 44 + 101 * 4 * 2);
    }
}
