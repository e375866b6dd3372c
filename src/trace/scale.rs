//! Scale mapper — logical drawing coordinates to the 16-bit device square.

use serde::{Deserialize, Serialize};

/// Largest device coordinate on either axis.
pub const DEVICE_MAX: f64 = 65535.0;

/// Device coordinate used for a flattened (degenerate) axis.
pub const DEVICE_MID: f64 = 32768.0;

/// Logical-to-device mapping plus the global weight multiplier.
///
/// `left`/`right` are the logical X values at the device's 0 and 65535 edges,
/// `top`/`bottom` likewise for Y. Passing `left > right` inverts the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    /// Sample steps spent on a full-width line of weight 1.0.
    pub weight: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Scale {
            left: 0.0,
            right: 1000.0,
            top: 0.0,
            bottom: 1000.0,
            weight: 100.0,
        }
    }
}

impl Scale {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64, weight: f64) -> Self {
        Scale {
            left,
            right,
            top,
            bottom,
            weight,
        }
    }

    /// Map a logical point into device space. The result is not clamped.
    pub fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            map_axis(x, self.left, self.right),
            map_axis(y, self.top, self.bottom),
        )
    }

    /// Map a logical point and clamp it onto the device square.
    pub fn map_clamped(&self, x: f64, y: f64) -> (f64, f64) {
        let (x, y) = self.map(x, y);
        (clamp_device(x), clamp_device(y))
    }
}

fn map_axis(v: f64, lo: f64, hi: f64) -> f64 {
    if lo == hi {
        DEVICE_MID
    } else {
        (v - lo) / (hi - lo) * DEVICE_MAX
    }
}

fn clamp_device(v: f64) -> f64 {
    if v < 0.0 {
        0.0
    } else if v > DEVICE_MAX {
        DEVICE_MAX
    } else {
        v
    }
}
