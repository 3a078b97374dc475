//! Fake Synthesis Engine - 用于测试和空跑的合成引擎
//!
//! 不加载模型，按文本长度生成固定频率的正弦音

use std::path::Path;

use crate::application::ports::{EngineError, EngineLoaderPort, EngineSpec, SynthesisEnginePort};
use crate::domain::synthesis::AudioSamples;

use super::wav::write_wav;

/// Fake 引擎配置
#[derive(Debug, Clone)]
pub struct FakeEngineConfig {
    pub sample_rate: u32,
    /// 每个字符对应的音频时长（毫秒）
    pub ms_per_char: u32,
    /// 正弦音频率（Hz）
    pub frequency: f32,
}

impl Default for FakeEngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            ms_per_char: 60,
            frequency: 220.0,
        }
    }
}

/// Fake 引擎加载器
///
/// 只检查权重与配置文件存在，不解析内容
#[derive(Debug, Clone, Default)]
pub struct FakeEngineLoader {
    config: FakeEngineConfig,
}

impl FakeEngineLoader {
    pub fn new(config: FakeEngineConfig) -> Self {
        Self { config }
    }
}

impl EngineLoaderPort for FakeEngineLoader {
    fn load(&self, spec: EngineSpec) -> Result<Box<dyn SynthesisEnginePort>, EngineError> {
        for path in [&spec.model_path, &spec.config_path] {
            if !path.is_file() {
                return Err(EngineError::LoadFailed(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
        }

        tracing::info!(
            model = %spec.model_path.display(),
            multi_speaker = spec.speakers_file.is_some(),
            multi_language = spec.language_ids_file.is_some(),
            "FakeSynthesisEngine loaded"
        );

        Ok(Box::new(FakeSynthesisEngine {
            config: self.config.clone(),
        }))
    }
}

/// Fake 合成引擎
pub struct FakeSynthesisEngine {
    config: FakeEngineConfig,
}

impl FakeSynthesisEngine {
    pub fn new(config: FakeEngineConfig) -> Self {
        Self { config }
    }
}

impl SynthesisEnginePort for FakeSynthesisEngine {
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&str>,
        language: Option<&str>,
    ) -> Result<AudioSamples, EngineError> {
        tracing::debug!(
            text_len = text.len(),
            speaker = ?speaker,
            language = ?language,
            "FakeSynthesisEngine: generating tone"
        );

        let sample_rate = self.config.sample_rate;
        let duration_ms = text.chars().count() as u64 * self.config.ms_per_char as u64;
        let count = (duration_ms * sample_rate as u64 / 1000) as usize;
        let step = 2.0 * std::f32::consts::PI * self.config.frequency / sample_rate as f32;
        let pcm = (0..count).map(|i| (i as f32 * step).sin() * 0.3).collect();

        Ok(AudioSamples::new(pcm, sample_rate))
    }

    fn persist(&self, samples: &AudioSamples, path: &Path) -> Result<(), EngineError> {
        write_wav(path, samples)
    }
}
