//! Model Registry Port - 模型仓库抽象
//!
//! 下载并校验模型包，具体实现在 infrastructure/adapters/registry

use std::path::{Path, PathBuf};
use thiserror::Error;

/// 模型仓库错误
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// Model Registry Port
///
/// 约定：相同参数重复调用是幂等的；内部最多尝试 `max_retries` 次，耗尽后返回错误
pub trait ModelRegistryPort: Send + Sync {
    /// 将 `source` 中名为 `model_name` 的模型包下载到 `destination`，返回本地目录
    fn fetch(
        &self,
        source: &str,
        destination: &Path,
        model_name: &str,
        max_retries: u32,
    ) -> Result<PathBuf, RegistryError>;
}

/// 按次数重试一个下载尝试
///
/// `max_retries` 是总尝试次数（至少一次）。闭包收到从 1 开始的尝试序号。
pub fn fetch_with_retries<T, F>(max_retries: u32, mut attempt: F) -> Result<T, RegistryError>
where
    F: FnMut(u32) -> Result<T, RegistryError>,
{
    let attempts = max_retries.max(1);
    let mut last_error = String::new();

    for n in 1..=attempts {
        match attempt(n) {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(attempt = n, max_attempts = attempts, error = %e, "Fetch attempt failed");
                last_error = e.to_string();
            }
        }
    }

    Err(RegistryError::RetriesExhausted {
        attempts,
        last_error,
    })
}
