//! Synthesis Engine Port - 合成引擎抽象
//!
//! 引擎本身（文本规范化、声学模型、声码器）是外部能力，
//! 这里只定义加载与调用的接口，具体实现在 infrastructure/adapters/engine

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::synthesis::AudioSamples;

/// 引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model load failed: {0}")]
    LoadFailed(String),

    #[error("Audio write failed: {0}")]
    WriteFailed(String),
}

/// 引擎实例化参数
///
/// `config` 是修补后的配置文档，`config_path` 指向已写回磁盘的同一份内容
#[derive(Debug, Clone, Serialize)]
pub struct EngineSpec {
    pub model_path: PathBuf,
    pub config_path: PathBuf,
    pub config: serde_json::Value,
    pub speakers_file: Option<PathBuf>,
    pub language_ids_file: Option<PathBuf>,
    pub vocoder_path: Option<PathBuf>,
    pub vocoder_config_path: Option<PathBuf>,
    pub use_cuda: bool,
}

/// 已加载的引擎句柄
///
/// 由一个 SynthesisOrchestrator 独占
pub trait SynthesisEnginePort: Send {
    /// 文本合成
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&str>,
        language: Option<&str>,
    ) -> Result<AudioSamples, EngineError>;

    /// 保存音频到文件
    fn persist(&self, samples: &AudioSamples, path: &Path) -> Result<(), EngineError>;
}

/// 引擎加载器
pub trait EngineLoaderPort: Send + Sync {
    fn load(&self, spec: EngineSpec) -> Result<Box<dyn SynthesisEnginePort>, EngineError>;
}
