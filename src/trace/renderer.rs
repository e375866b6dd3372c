//! Waveform renderer — turns a stroke list into beam-motion PCM.
//!
//! Every segment is walked in `weight + 1` equal steps; each step emits one
//! stereo pair holding the beam position. The time spent on a segment is what
//! makes it bright on the scope.

use super::frame::RenderedFrame;
use super::orientation::Orientation;
use super::stroke::StrokePoint;

/// Result of rendering one stroke list.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub frame: RenderedFrame,
    /// Pairs the frame was sized for.
    pub expected_pairs: usize,
    /// Pairs actually written by the segment walk.
    pub written_pairs: usize,
    /// Times per second the picture repeats at the given sample rate.
    /// 0.0 for an empty frame.
    pub refresh_rate: f64,
}

impl RenderReport {
    pub fn mismatch(&self) -> bool {
        self.expected_pairs != self.written_pairs
    }
}

/// Pairs needed for `points`: the sum of `weight + 1` over every point after
/// the first.
pub fn frame_pairs(points: &[StrokePoint]) -> usize {
    points.iter().skip(1).map(|p| p.weight as usize + 1).sum()
}

/// Render `points` into a frame.
pub fn render(points: &[StrokePoint], orientation: Orientation, sample_rate: u32) -> RenderReport {
    let expected_pairs = frame_pairs(points);
    let mut samples: Vec<i16> = Vec::with_capacity(expected_pairs * 2);

    for seg in points.windows(2) {
        let (from, to) = (seg[0], seg[1]);
        let steps = to.weight as u32 + 1;

        let mut x = from.x as f64;
        let mut y = from.y as f64;
        let dx = (to.x as f64 - x) / steps as f64;
        let dy = (to.y as f64 - y) / steps as f64;

        for _ in 0..steps {
            samples.extend_from_slice(&orientation.channel_pair(x as u16, y as u16));
            x += dx;
            y += dy;
        }
    }

    let written_pairs = samples.len() / 2;
    if written_pairs != expected_pairs {
        tracing::warn!(
            expected_pairs,
            written_pairs,
            "rendered sample count does not match the computed frame size"
        );
    }

    let refresh_rate = if written_pairs == 0 {
        0.0
    } else {
        sample_rate as f64 / written_pairs as f64
    };

    RenderReport {
        frame: RenderedFrame::from_samples(samples),
        expected_pairs,
        written_pairs,
        refresh_rate,
    }
}

/// Encode `loops` back-to-back copies of a frame as a 16-bit stereo WAV.
pub fn frame_to_wav(frame: &RenderedFrame, sample_rate: u32, loops: usize) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(frame.samples().len() * loops);
    for _ in 0..loops {
        pcm.extend_from_slice(frame.samples());
    }
    encode_wav(&pcm, sample_rate, 2)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
