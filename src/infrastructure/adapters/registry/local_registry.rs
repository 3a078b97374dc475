//! Local Model Registry - 本地目录模型仓库
//!
//! 来源是一个目录，其中 `<model_name>/` 下的文件被复制到目标目录

use std::fs;
use std::path::{Path, PathBuf};

use crate::application::ports::{fetch_with_retries, ModelRegistryPort, RegistryError};

/// 本地目录模型仓库
#[derive(Debug, Clone, Default)]
pub struct LocalModelRegistry;

impl LocalModelRegistry {
    pub fn new() -> Self {
        Self
    }

    fn copy_bundle(source_dir: &Path, destination: &Path) -> Result<usize, RegistryError> {
        if !source_dir.is_dir() {
            return Err(RegistryError::NotFound(source_dir.display().to_string()));
        }

        fs::create_dir_all(destination).map_err(|e| RegistryError::IoError(e.to_string()))?;

        let mut copied = 0;
        let entries = fs::read_dir(source_dir).map_err(|e| RegistryError::IoError(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| RegistryError::IoError(e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let target = destination.join(entry.file_name());
            fs::copy(&path, &target).map_err(|e| {
                RegistryError::IoError(format!("copy {} failed: {}", path.display(), e))
            })?;
            copied += 1;
        }
        Ok(copied)
    }
}

impl ModelRegistryPort for LocalModelRegistry {
    fn fetch(
        &self,
        source: &str,
        destination: &Path,
        model_name: &str,
        max_retries: u32,
    ) -> Result<PathBuf, RegistryError> {
        let source_dir = Path::new(source).join(model_name);

        let copied = fetch_with_retries(max_retries, |attempt| {
            tracing::debug!(attempt, source = %source_dir.display(), "Copying model bundle");
            Self::copy_bundle(&source_dir, destination)
        })?;

        tracing::info!(
            source = %source_dir.display(),
            destination = %destination.display(),
            files = copied,
            "Model bundle copied"
        );
        Ok(destination.to_path_buf())
    }
}
