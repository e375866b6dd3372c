//! Engine configuration — audio format, point capacity, initial scale and mode.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScopeError;
use crate::trace::scale::Scale;
use crate::trace::stroke::MAX_POINTS;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_BUFFER_SIZE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output sample rate in Hz. Must be one the sound card supports.
    pub sample_rate: u32,
    /// Audio callback buffer size in sample frames.
    pub buffer_size: u32,
    /// Points a picture may hold before further draw calls are ignored.
    pub max_points: usize,
    pub scale: Scale,
    /// Orientation bitmask, see `Orientation::from_mode`.
    pub mode: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_points: MAX_POINTS,
            scale: Scale::default(),
            mode: 0,
        }
    }
}

impl EngineConfig {
    /// Config from host-supplied values; zero or negative picks the default.
    pub fn from_host(sample_rate: i32, buffer_size: i32) -> Self {
        EngineConfig {
            sample_rate: if sample_rate <= 0 {
                DEFAULT_SAMPLE_RATE
            } else {
                sample_rate as u32
            },
            buffer_size: if buffer_size <= 0 {
                DEFAULT_BUFFER_SIZE
            } else {
                buffer_size as u32
            },
            ..Default::default()
        }
    }

    /// Replace a zero sample rate or buffer size with the default.
    pub fn normalized(mut self) -> Self {
        if self.sample_rate == 0 {
            self.sample_rate = DEFAULT_SAMPLE_RATE;
        }
        if self.buffer_size == 0 {
            self.buffer_size = DEFAULT_BUFFER_SIZE;
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ScopeError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn to_json(&self) -> Result<String, ScopeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScopeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScopeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Sample pairs in the silent frame played before the first flip.
    pub fn blank_frame_pairs(&self) -> usize {
        self.buffer_size as usize / 4 * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_defaults() {
        let c = EngineConfig::from_host(0, -5);
        assert_eq!(c.sample_rate, 44100);
        assert_eq!(c.buffer_size, 1024);

        let c = EngineConfig::from_host(48000, 512);
        assert_eq!(c.sample_rate, 48000);
        assert_eq!(c.buffer_size, 512);
        assert_eq!(c.blank_frame_pairs(), 256);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = EngineConfig::from_json(r#"{ "sample_rate": 96000, "mode": 5 }"#).unwrap();
        assert_eq!(c.sample_rate, 96000);
        assert_eq!(c.mode, 5);
        assert_eq!(c.buffer_size, 1024);
        assert_eq!(c.max_points, 4096);
        assert_eq!(c.scale, Scale::default());
    }

    #[test]
    fn json_round_trip() {
        let mut c = EngineConfig::default();
        c.scale = Scale::new(-1.0, 1.0, 1.0, -1.0, 60.0);
        let back = EngineConfig::from_json(&c.to_json().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn zero_rate_and_buffer_in_json_use_defaults() {
        let c = EngineConfig::from_json(r#"{ "sample_rate": 0, "buffer_size": 0 }"#).unwrap();
        assert_eq!(c.sample_rate, 44100);
        assert_eq!(c.buffer_size, 1024);
        assert_eq!(c.blank_frame_pairs(), 512);
    }

    #[test]
    fn bad_json_is_an_error() {
        let err = EngineConfig::from_json("{ sample_rate: }").unwrap_err();
        assert!(matches!(err, ScopeError::ConfigParse(_)));
    }

    #[test]
    fn missing_file() {
        let err = EngineConfig::load("/nonexistent/scope.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scope.json"));
    }
}
