//! Synthesis Context - 合成限界上下文

mod value_objects;

pub use value_objects::{normalize_wav_path, AudioSamples, WAV_SUFFIX};
