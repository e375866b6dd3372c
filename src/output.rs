//! Sound card output — drives an `OutputFeeder` from a cpal stream.

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::trace::scheduler::OutputFeeder;

/// The scope needs one channel per deflection axis.
const CHANNELS: u16 = 2;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no default output device")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to play output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported output sample format: {0}")]
    SampleFormat(String),
}

/// A running output stream. Playback stops when this is dropped.
pub struct ScopeOutput {
    _stream: cpal::Stream,
    sample_rate: u32,
    buffer_size: u32,
}

impl ScopeOutput {
    /// Open the default output device at the configured rate and buffer size
    /// and start feeding it.
    ///
    /// The requested rate must be supported by the device; otherwise stream
    /// creation fails and the error is returned.
    pub fn start<F>(
        mut feeder: OutputFeeder,
        config: &EngineConfig,
        on_error: F,
    ) -> Result<Self, OutputError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;
        let sample_format = device.default_output_config()?.sample_format();

        let stream_config = cpal::StreamConfig {
            channels: CHANNELS,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };
        let on_error = Arc::new(on_error);
        let timeout = Some(Duration::from_millis(200));

        let stream = match sample_format {
            cpal::SampleFormat::I16 => {
                let on_error = Arc::clone(&on_error);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _| feeder.pull_samples(data),
                    move |err| (on_error)(err.to_string()),
                    timeout,
                )?
            }
            cpal::SampleFormat::F32 => {
                let on_error = Arc::clone(&on_error);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _| feeder.pull_f32(data),
                    move |err| (on_error)(err.to_string()),
                    timeout,
                )?
            }
            cpal::SampleFormat::U16 => {
                let on_error = Arc::clone(&on_error);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [u16], _| feeder.pull_u16(data),
                    move |err| (on_error)(err.to_string()),
                    timeout,
                )?
            }
            other => return Err(OutputError::SampleFormat(format!("{other:?}"))),
        };

        stream.play()?;
        tracing::info!(
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            format = ?sample_format,
            "scope output started"
        );

        Ok(ScopeOutput {
            _stream: stream,
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }
}
