//! Vector tracing core — stroke lists in, looping stereo PCM out.
//!
//! The left channel drives the scope's vertical input and the right channel
//! the horizontal input (in the default orientation). The beam never blanks,
//! so moves between shapes leave a dim trace; the longer the jump, the dimmer.

pub mod engine;
pub mod frame;
pub mod orientation;
pub mod renderer;
pub mod scale;
pub mod scheduler;
pub mod stroke;

pub use engine::{ScopeEngine, VectorSurface};
pub use frame::RenderedFrame;
pub use orientation::Orientation;
pub use scale::Scale;
pub use scheduler::{FrameScheduler, OutputFeeder, SchedulerMetricsSnapshot};
pub use stroke::{StrokeList, StrokePoint};
