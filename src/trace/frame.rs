//! Rendered frame — one finished picture as interleaved stereo PCM.

/// Bytes per interleaved stereo pair of 16-bit samples.
pub const BYTES_PER_PAIR: usize = 4;

/// An immutable buffer of interleaved (left, right) i16 samples.
///
/// Produced once by the renderer and never mutated afterwards. `sequence` is
/// assigned when the frame is committed to the scheduler, so the feeder can
/// report which picture it is playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    samples: Box<[i16]>,
    sequence: u64,
}

impl RenderedFrame {
    /// Wrap interleaved samples. A trailing odd sample is discarded.
    pub fn from_samples(mut samples: Vec<i16>) -> Self {
        samples.truncate(samples.len() & !1);
        RenderedFrame {
            samples: samples.into_boxed_slice(),
            sequence: 0,
        }
    }

    /// A frame of `pairs` centred (zero) samples.
    pub fn blank(pairs: usize) -> Self {
        Self::from_samples(vec![0; pairs * 2])
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of stereo sample pairs.
    pub fn pairs(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn byte_len(&self) -> usize {
        self.samples.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Copy native-endian bytes starting at byte `offset` into `out`.
    /// Copies `min(out.len(), byte_len - offset)` bytes and returns that count.
    pub fn copy_bytes(&self, offset: usize, out: &mut [u8]) -> usize {
        let end = self.byte_len().min(offset + out.len());
        if offset >= end {
            return 0;
        }
        let mut written = 0;
        let mut pos = offset;

        // leading half sample
        if pos % 2 == 1 {
            out[written] = self.samples[pos / 2].to_ne_bytes()[1];
            written += 1;
            pos += 1;
        }
        while pos + 2 <= end {
            let bytes = self.samples[pos / 2].to_ne_bytes();
            out[written] = bytes[0];
            out[written + 1] = bytes[1];
            written += 2;
            pos += 2;
        }
        // trailing half sample
        if pos < end {
            out[written] = self.samples[pos / 2].to_ne_bytes()[0];
            written += 1;
        }
        written
    }
}
