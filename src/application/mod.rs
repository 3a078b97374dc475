//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（ModelRegistry、EngineLoader、SynthesisEngine、SpeakerTable）
//! - commands: 模型包获取/准备命令与合成命令及其处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{AcquireBundleHandler, PrepareBundleHandler, SynthesisOrchestrator},
    AcquireBundleCommand, PrepareBundleCommand, PreparedBundle, SynthesisResult,
    SynthesizeCommand, ACQUIRE_MAX_RETRIES, DEFAULT_OUTPUT_PATH,
};

pub use error::{ApplicationError, Stage};

pub use ports::{
    fetch_with_retries, EngineError, EngineLoaderPort, EngineSpec, ModelRegistryPort,
    RegistryError, SpeakerTableError, SpeakerTablePort, SynthesisEnginePort,
};
