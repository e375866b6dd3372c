//! Picture orientation flags.

use serde::{Deserialize, Serialize};

pub const MIRROR_X: u32 = 1;
pub const MIRROR_Y: u32 = 2;
pub const SWAP_AXES: u32 = 4;

/// How device coordinates become left/right channel samples.
///
/// The default orientation inverts X but not Y; this matches the wiring the
/// output format was defined against (left channel = vertical deflection,
/// right channel = horizontal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orientation {
    pub mirror_x: bool,
    pub mirror_y: bool,
    pub swap_axes: bool,
}

impl Orientation {
    /// Decode a mode bitmask: bit 0 mirror X, bit 1 mirror Y, bit 2 swap axes.
    /// Higher bits are ignored.
    pub fn from_mode(mode: u32) -> Self {
        Orientation {
            mirror_x: mode & MIRROR_X != 0,
            mirror_y: mode & MIRROR_Y != 0,
            swap_axes: mode & SWAP_AXES != 0,
        }
    }

    pub fn mode(&self) -> u32 {
        let mut mode = 0;
        if self.mirror_x {
            mode |= MIRROR_X;
        }
        if self.mirror_y {
            mode |= MIRROR_Y;
        }
        if self.swap_axes {
            mode |= SWAP_AXES;
        }
        mode
    }

    /// Signed sample for a device X coordinate.
    #[inline]
    pub fn x_sample(&self, x: u16) -> i16 {
        if self.mirror_x {
            centered(x)
        } else {
            centered(u16::MAX - x)
        }
    }

    /// Signed sample for a device Y coordinate. Inverted only when mirrored.
    #[inline]
    pub fn y_sample(&self, y: u16) -> i16 {
        if self.mirror_y {
            centered(u16::MAX - y)
        } else {
            centered(y)
        }
    }

    /// Interleaved (left, right) pair for a device point.
    #[inline]
    pub fn channel_pair(&self, x: u16, y: u16) -> [i16; 2] {
        let sx = self.x_sample(x);
        let sy = self.y_sample(y);
        if self.swap_axes { [sx, sy] } else { [sy, sx] }
    }
}

#[inline]
fn centered(v: u16) -> i16 {
    (v as i32 - 32768) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_bits_round_trip() {
        for mode in 0..8 {
            assert_eq!(Orientation::from_mode(mode).mode(), mode);
        }
        assert_eq!(Orientation::from_mode(0xF8), Orientation::default());
    }

    #[test]
    fn default_inverts_x_only() {
        let o = Orientation::default();
        assert_eq!(o.x_sample(0), 32767);
        assert_eq!(o.x_sample(65535), -32768);
        assert_eq!(o.y_sample(0), -32768);
        assert_eq!(o.y_sample(65535), 32767);
    }

    #[test]
    fn mirrors_flip_each_axis() {
        let o = Orientation::from_mode(MIRROR_X | MIRROR_Y);
        assert_eq!(o.x_sample(0), -32768);
        assert_eq!(o.y_sample(0), 32767);
    }

    #[test]
    fn left_channel_is_vertical_by_default() {
        let o = Orientation::default();
        assert_eq!(o.channel_pair(0, 65535), [32767, 32767]);
        assert_eq!(o.channel_pair(65535, 0), [-32768, -32768]);

        let swapped = Orientation::from_mode(SWAP_AXES);
        assert_eq!(swapped.channel_pair(100, 200), {
            let [l, r] = o.channel_pair(100, 200);
            [r, l]
        });
    }
}
