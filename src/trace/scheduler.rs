//! Frame scheduler — single-slot hand-off between the drawing side and the
//! audio callback.
//!
//! The producer (`FrameScheduler`) stages at most one frame. The consumer
//! (`OutputFeeder`) loops its active frame and, each time it reaches the end,
//! takes the staged frame if there is one. A newer commit replaces an older
//! staged frame that never played.
//!
//! The consumer side never blocks, allocates or logs. Frames it retires are
//! sent back to the producer to be freed there.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::Serialize;

use super::frame::RenderedFrame;

/// Retired frames that can wait for the producer before the feeder frees one
/// itself.
const RETIRE_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerMetricsSnapshot {
    /// Frames handed to `commit`.
    pub committed_frames: u64,
    /// Staged frames replaced before they ever played.
    pub dropped_frames: u64,
    /// Staged frames that became active.
    pub activated_frames: u64,
    /// Frame boundaries where no new frame was staged and the active one looped.
    pub repeated_frames: u64,
    /// Bytes delivered by `pull`.
    pub pulled_bytes: u64,
    /// Bytes filled with silence because the active frame was empty.
    pub silent_bytes: u64,
    /// Retired frames the feeder had to free on its own thread.
    pub retire_overflows: u64,
}

#[derive(Debug, Default)]
struct SchedulerMetrics {
    committed_frames: AtomicU64,
    dropped_frames: AtomicU64,
    activated_frames: AtomicU64,
    repeated_frames: AtomicU64,
    pulled_bytes: AtomicU64,
    silent_bytes: AtomicU64,
    retire_overflows: AtomicU64,
}

impl SchedulerMetrics {
    fn snapshot(&self) -> SchedulerMetricsSnapshot {
        SchedulerMetricsSnapshot {
            committed_frames: self.committed_frames.load(Ordering::Relaxed),
            dropped_frames: self.dropped_frames.load(Ordering::Relaxed),
            activated_frames: self.activated_frames.load(Ordering::Relaxed),
            repeated_frames: self.repeated_frames.load(Ordering::Relaxed),
            pulled_bytes: self.pulled_bytes.load(Ordering::Relaxed),
            silent_bytes: self.silent_bytes.load(Ordering::Relaxed),
            retire_overflows: self.retire_overflows.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct Shared {
    staged: ArcSwapOption<RenderedFrame>,
    /// Sequence of the frame the feeder is playing.
    active_sequence: AtomicU64,
    metrics: SchedulerMetrics,
}

/// Producer half: stages rendered frames.
#[derive(Debug)]
pub struct FrameScheduler {
    shared: Arc<Shared>,
    retired: Receiver<Arc<RenderedFrame>>,
    next_sequence: u64,
}

/// Consumer half: drains the active frame into audio buffers.
#[derive(Debug)]
pub struct OutputFeeder {
    shared: Arc<Shared>,
    retire: Sender<Arc<RenderedFrame>>,
    active: Arc<RenderedFrame>,
    /// Byte position inside `active`.
    pos: usize,
}

/// Create a connected scheduler/feeder pair with `initial` as the active frame.
pub fn frame_channel(initial: RenderedFrame) -> (FrameScheduler, OutputFeeder) {
    let shared = Arc::new(Shared::default());
    let (retire, retired) = crossbeam_channel::bounded(RETIRE_CAPACITY);

    let scheduler = FrameScheduler {
        shared: Arc::clone(&shared),
        retired,
        next_sequence: 1,
    };
    let feeder = OutputFeeder {
        shared,
        retire,
        active: Arc::new(initial.with_sequence(0)),
        pos: 0,
    };
    (scheduler, feeder)
}

impl FrameScheduler {
    /// Stage `frame` as the next picture to play. Returns its sequence number.
    ///
    /// Any frame still waiting in the staged slot is dropped.
    pub fn commit(&mut self, frame: RenderedFrame) -> u64 {
        self.collect_retired();

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let frame = Arc::new(frame.with_sequence(sequence));
        let metrics = &self.shared.metrics;
        SchedulerMetrics::bump(&metrics.committed_frames, 1);

        if let Some(old) = self.shared.staged.swap(Some(frame)) {
            SchedulerMetrics::bump(&metrics.dropped_frames, 1);
            tracing::debug!(
                dropped = old.sequence(),
                replaced_by = sequence,
                pairs = old.pairs(),
                "staged frame never played; replaced by a newer one"
            );
        }
        sequence
    }

    /// Sequence number of the frame waiting in the staged slot.
    pub fn staged_sequence(&self) -> Option<u64> {
        self.shared.staged.load_full().map(|f| f.sequence())
    }

    pub fn has_staged(&self) -> bool {
        self.shared.staged.load().is_some()
    }

    /// Sequence number of the frame the feeder is currently playing.
    pub fn active_sequence(&self) -> u64 {
        self.shared.active_sequence.load(Ordering::Acquire)
    }

    pub fn metrics_snapshot(&self) -> SchedulerMetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Free frames the feeder has finished with.
    pub fn collect_retired(&self) -> usize {
        self.retired.try_iter().count()
    }
}

impl OutputFeeder {
    /// Fill `out` with native-endian PCM bytes, looping the active frame and
    /// switching to the staged frame at frame boundaries.
    pub fn pull(&mut self, out: &mut [u8]) {
        let mut done = 0;

        while done < out.len() {
            if self.active.is_empty() {
                if self.take_staged() {
                    continue;
                }
                out[done..].fill(0);
                let silent = (out.len() - done) as u64;
                SchedulerMetrics::bump(&self.shared.metrics.silent_bytes, silent);
                break;
            }

            let copied = self.active.copy_bytes(self.pos, &mut out[done..]);
            done += copied;
            self.pos += copied;

            if self.pos >= self.active.byte_len() {
                self.pos = 0;
                if !self.take_staged() {
                    SchedulerMetrics::bump(&self.shared.metrics.repeated_frames, 1);
                }
            }
        }

        SchedulerMetrics::bump(&self.shared.metrics.pulled_bytes, out.len() as u64);
    }

    /// Fill `out` with interleaved i16 samples.
    pub fn pull_samples(&mut self, out: &mut [i16]) {
        let mut scratch = [0u8; 512];
        for chunk in out.chunks_mut(scratch.len() / 2) {
            let bytes = &mut scratch[..chunk.len() * 2];
            self.pull(bytes);
            for (slot, b) in chunk.iter_mut().zip(bytes.chunks_exact(2)) {
                *slot = i16::from_ne_bytes([b[0], b[1]]);
            }
        }
    }

    /// Fill `out` with interleaved samples converted to `[-1.0, 1.0)`.
    pub fn pull_f32(&mut self, out: &mut [f32]) {
        let mut scratch = [0i16; 256];
        for chunk in out.chunks_mut(scratch.len()) {
            let pcm = &mut scratch[..chunk.len()];
            self.pull_samples(pcm);
            for (slot, &s) in chunk.iter_mut().zip(pcm.iter()) {
                *slot = s as f32 / 32768.0;
            }
        }
    }

    /// Fill `out` with interleaved offset-binary u16 samples.
    pub fn pull_u16(&mut self, out: &mut [u16]) {
        let mut scratch = [0i16; 256];
        for chunk in out.chunks_mut(scratch.len()) {
            let pcm = &mut scratch[..chunk.len()];
            self.pull_samples(pcm);
            for (slot, &s) in chunk.iter_mut().zip(pcm.iter()) {
                *slot = (s as i32 + 32768) as u16;
            }
        }
    }

    pub fn active(&self) -> &RenderedFrame {
        &self.active
    }

    /// Byte position inside the active frame.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn metrics_snapshot(&self) -> SchedulerMetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn take_staged(&mut self) -> bool {
        let Some(next) = self.shared.staged.swap(None) else {
            return false;
        };
        self.shared
            .active_sequence
            .store(next.sequence(), Ordering::Release);
        SchedulerMetrics::bump(&self.shared.metrics.activated_frames, 1);

        let old = std::mem::replace(&mut self.active, next);
        match self.retire.try_send(old) {
            Ok(()) => {}
            Err(TrySendError::Full(old)) | Err(TrySendError::Disconnected(old)) => {
                SchedulerMetrics::bump(&self.shared.metrics.retire_overflows, 1);
                drop(old);
            }
        }
        true
    }
}
