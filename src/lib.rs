pub mod config;
pub mod error;
#[cfg(feature = "device")]
pub mod output;
pub mod trace;

use crate::config::EngineConfig;
use crate::trace::{OutputFeeder, ScopeEngine, VectorSurface};
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the scopetrace-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed engine for an AudioWorklet host.
///
/// Both halves live in one object here: draw calls come from the main thread
/// via messages, and `fill` is called from the worklet's `process`.
#[wasm_bindgen]
pub struct WasmScope {
    engine: ScopeEngine,
    feeder: OutputFeeder,
    interleaved: Vec<f32>,
}

#[wasm_bindgen]
impl WasmScope {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: i32, buffer_size: i32) -> WasmScope {
        Self::from_engine(ScopeEngine::with_host(sample_rate, buffer_size))
    }

    /// Build from a JSON `EngineConfig`.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: &str) -> Result<WasmScope, JsValue> {
        let config = EngineConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(Self::from_engine(ScopeEngine::initialize(config)))
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, left: f64, right: f64, top: f64, bottom: f64, weight: f64) {
        self.engine.set_scale(left, right, top, bottom, weight);
    }

    #[wasm_bindgen(js_name = moveTo)]
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.engine.move_to(x, y);
    }

    #[wasm_bindgen(js_name = lineTo)]
    pub fn line_to(&mut self, x: f64, y: f64, weight: f64) {
        self.engine.line_to(x, y, weight);
    }

    pub fn flip(&mut self, clear: bool) {
        self.engine.flip(clear);
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: u32) {
        self.engine.set_mode(mode);
    }

    #[wasm_bindgen(js_name = refreshRate)]
    pub fn refresh_rate(&self) -> f64 {
        self.engine.refresh_rate()
    }

    #[wasm_bindgen(js_name = sampleRate)]
    pub fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }

    /// Fill planar left/right output buffers from the feeder.
    pub fn fill(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        if self.interleaved.len() < frames * 2 {
            self.interleaved.resize(frames * 2, 0.0);
        }
        let interleaved = &mut self.interleaved[..frames * 2];
        self.feeder.pull_f32(interleaved);
        for (i, pair) in interleaved.chunks_exact(2).enumerate() {
            left[i] = pair[0];
            right[i] = pair[1];
        }
    }

    /// Scheduler counters as a plain JS object.
    pub fn metrics(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.engine.metrics_snapshot())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }
}

impl WasmScope {
    fn from_engine((engine, feeder): (ScopeEngine, OutputFeeder)) -> Self {
        WasmScope {
            engine,
            feeder,
            interleaved: Vec::new(),
        }
    }
}
