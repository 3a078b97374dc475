//! Engine Adapter - 合成引擎实现

mod fake_engine;
mod http_engine;
pub mod wav;

pub use fake_engine::{FakeEngineConfig, FakeEngineLoader, FakeSynthesisEngine};
pub use http_engine::{HttpEngineConfig, HttpEngineLoader, HttpSynthesisEngine};
