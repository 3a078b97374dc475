//! Speaker Table Port - 说话人表读取

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeakerTableError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Unpickling failed: {0}")]
    UnpickleError(String),

    #[error("Unexpected speaker table layout: {0}")]
    UnexpectedLayout(String),
}

/// Speaker Table Port
pub trait SpeakerTablePort: Send + Sync {
    /// 说话人 ID 列表，保持表中出现顺序
    fn speaker_ids(&self, path: &Path) -> Result<Vec<String>, SpeakerTableError>;
}
