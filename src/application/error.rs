//! 应用层错误定义
//!
//! 每种错误对应一个失败阶段：获取、加载、合成、保存

use thiserror::Error;

use crate::domain::bundle::BundleError;

/// 失败阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    Acquisition,
    BundleLoad,
    Synthesis,
    Persistence,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Acquisition => "acquisition",
            Stage::BundleLoad => "bundle load",
            Stage::Synthesis => "synthesis",
            Stage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求参数无效
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 模型仓库重试耗尽或下载结果不是有效模型包
    #[error("Acquisition error: {0}")]
    AcquisitionError(String),

    /// 必需文件缺失、配置无法解析或引擎实例化失败
    #[error("Bundle load error: {0}")]
    BundleLoadError(String),

    /// 引擎合成失败
    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    /// 引擎保存音频失败
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

impl ApplicationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::AcquisitionError(message.into())
    }

    pub fn bundle_load(message: impl Into<String>) -> Self {
        Self::BundleLoadError(message.into())
    }

    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::SynthesisError(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceError(message.into())
    }

    /// 出错的阶段
    pub fn stage(&self) -> Stage {
        match self {
            Self::ValidationError(_) => Stage::Validation,
            Self::AcquisitionError(_) => Stage::Acquisition,
            Self::BundleLoadError(_) => Stage::BundleLoad,
            Self::SynthesisError(_) => Stage::Synthesis,
            Self::PersistenceError(_) => Stage::Persistence,
        }
    }
}

impl From<BundleError> for ApplicationError {
    fn from(err: BundleError) -> Self {
        Self::BundleLoadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_errors_map_to_load_stage() {
        let err: ApplicationError = BundleError::MissingArtifact("b/model.pth".into()).into();
        assert_eq!(err.stage(), Stage::BundleLoad);
        assert!(err.to_string().contains("b/model.pth"));
    }

    #[test]
    fn test_message_names_stage() {
        assert!(ApplicationError::persistence("disk full")
            .to_string()
            .starts_with("Persistence error"));
        assert_eq!(Stage::BundleLoad.to_string(), "bundle load");
    }
}
