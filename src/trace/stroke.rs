//! Stroke list — the in-progress picture as an ordered list of device points.

use super::scale::{DEVICE_MAX, Scale};

/// Default maximum number of points per picture.
pub const MAX_POINTS: usize = 4096;

/// Normalized segment length below which a line counts as a dwell on one point.
pub const DWELL_THRESHOLD: f64 = 0.00002;

/// Normalized length substituted for a dwell so it still lights a bright dot.
pub const DWELL_LENGTH: f64 = 5.0 / 100.0;

/// One point of a stroke list.
///
/// `weight` is the number of sample steps spent travelling *to* this point
/// from the previous one. The first point of a list is the start position and
/// always has weight 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokePoint {
    pub x: u16,
    pub y: u16,
    pub weight: u16,
}

/// A bounded, ordered sequence of points.
///
/// Appends past capacity are dropped silently; `truncated()` reports how many
/// were lost since the last clear.
#[derive(Debug, Clone)]
pub struct StrokeList {
    points: Vec<StrokePoint>,
    capacity: usize,
    truncated: usize,
}

impl StrokeList {
    pub fn new() -> Self {
        Self::with_capacity(MAX_POINTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StrokeList {
            points: Vec::with_capacity(capacity),
            capacity,
            truncated: 0,
        }
    }

    /// Move the pen without a deliberate line. The beam still travels, so a
    /// dim trace remains; see `line_to`.
    pub fn move_to(&mut self, scale: &Scale, x: f64, y: f64) {
        self.line_to(scale, x, y, 0.0);
    }

    /// Append a line from the previous point to `(x, y)`.
    ///
    /// `weight` is the brightness, conventionally in `[0, 1]`. The stored
    /// step count is `weight * length * scale.weight`, at least 1.
    pub fn line_to(&mut self, scale: &Scale, x: f64, y: f64, weight: f64) {
        if self.is_full() {
            self.truncated += 1;
            return;
        }

        let (x, y) = scale.map_clamped(x, y);

        let steps = match self.points.last() {
            Some(prev) => {
                let dx = prev.x as f64 - x;
                let dy = prev.y as f64 - y;
                let mut length = (dx * dx + dy * dy).sqrt() / DEVICE_MAX;
                if length < DWELL_THRESHOLD {
                    length = DWELL_LENGTH;
                }
                (weight * length * scale.weight).max(1.0)
            }
            None => 0.0,
        };

        self.points.push(StrokePoint {
            x: x as u16,
            y: y as u16,
            weight: steps as u16,
        });
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.truncated = 0;
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    /// Appends dropped because the list was full.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Sample pairs a render of this list will produce.
    pub fn sample_pairs(&self) -> usize {
        self.points
            .iter()
            .skip(1)
            .map(|p| p.weight as usize + 1)
            .sum()
    }
}

impl Default for StrokeList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> Scale {
        Scale::new(0.0, 1000.0, 0.0, 1000.0, 100.0)
    }

    #[test]
    fn first_point_is_a_move() {
        let mut list = StrokeList::new();
        list.line_to(&scale(), 500.0, 500.0, 1.0);
        assert_eq!(list.points()[0].weight, 0);
    }

    #[test]
    fn diagonal_weight() {
        let mut list = StrokeList::new();
        list.move_to(&scale(), 0.0, 0.0);
        list.line_to(&scale(), 1000.0, 1000.0, 1.0);
        let p = list.points()[1];
        assert_eq!((p.x, p.y), (65535, 65535));
        // sqrt(2) * 100 = 141.42
        assert_eq!(p.weight, 141);
        assert_eq!(list.sample_pairs(), 142);
    }

    #[test]
    fn dwell_uses_minimum_length() {
        for &w in &[0.0, 0.1, 1.0, 2.5, 10.0] {
            let mut list = StrokeList::new();
            list.move_to(&scale(), 300.0, 700.0);
            list.line_to(&scale(), 300.0, 700.0, w);
            let expected = (w * DWELL_LENGTH * 100.0).max(1.0) as u16;
            assert_eq!(list.points()[1].weight, expected, "weight {w}");
            assert!(list.points()[1].weight >= 1);
        }
    }

    #[test]
    fn move_to_still_takes_one_step() {
        let mut list = StrokeList::new();
        list.move_to(&scale(), 0.0, 0.0);
        list.move_to(&scale(), 1000.0, 0.0);
        assert_eq!(list.points()[1].weight, 1);
    }

    #[test]
    fn weight_saturates_at_u16() {
        let mut list = StrokeList::new();
        list.move_to(&scale(), 0.0, 0.0);
        list.line_to(&scale(), 1000.0, 0.0, 1e9);
        assert_eq!(list.points()[1].weight, u16::MAX);
    }

    #[test]
    fn overflow_is_silent_and_counted() {
        let mut list = StrokeList::with_capacity(3);
        for i in 0..5 {
            list.line_to(&scale(), i as f64 * 100.0, 0.0, 1.0);
        }
        assert_eq!(list.len(), 3);
        assert_eq!(list.truncated(), 2);
        assert_eq!(list.points()[2].x, (200.0 / 1000.0 * 65535.0) as u16);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.truncated(), 0);
    }

    #[test]
    fn clamped_coordinates() {
        let mut list = StrokeList::new();
        list.move_to(&scale(), -10.0, 5000.0);
        assert_eq!((list.points()[0].x, list.points()[0].y), (0, 65535));
    }
}
