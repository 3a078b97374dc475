//! Bundle Commands - 模型包相关命令

use std::path::PathBuf;

use crate::application::ports::SynthesisEnginePort;
use crate::domain::bundle::{BundleLocation, CapabilitySet};

/// 获取模型包时的固定重试次数
pub const ACQUIRE_MAX_RETRIES: u32 = 3;

/// 从模型仓库获取模型包
#[derive(Debug, Clone)]
pub struct AcquireBundleCommand {
    /// 仓库来源（本地目录或 HTTP 地址）
    pub source: String,
    /// 下载目标目录
    pub destination: PathBuf,
    pub model_name: String,
}

/// 准备本地模型包：修补配置并加载引擎
#[derive(Debug, Clone)]
pub struct PrepareBundleCommand {
    pub location: BundleLocation,
}

/// 准备结果
pub struct PreparedBundle {
    pub engine: Box<dyn SynthesisEnginePort>,
    pub capabilities: CapabilitySet,
}

impl std::fmt::Debug for PreparedBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedBundle")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
