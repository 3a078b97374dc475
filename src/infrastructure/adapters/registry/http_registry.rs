//! HTTP Model Registry - 通过 HTTP 下载并校验模型包
//!
//! 仓库布局:
//! GET {source}/{model_name}/manifest.json
//!   {"files": [{"name": "model.pth", "md5": "..."}, ...]}
//! GET {source}/{model_name}/{file}
//!
//! 每次尝试下载清单中的全部文件并校验 MD5，任一失败则整次尝试重来。
//! 目标目录中已存在且 MD5 匹配的文件会被跳过。

use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::ports::{fetch_with_retries, ModelRegistryPort, RegistryError};

const MANIFEST_FILE: &str = "manifest.json";

/// 模型包清单
#[derive(Debug, Clone, Deserialize)]
pub struct BundleManifest {
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub md5: String,
}

impl BundleManifest {
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let manifest: Self = serde_json::from_str(text)
            .map_err(|e| RegistryError::InvalidManifest(e.to_string()))?;

        if manifest.files.is_empty() {
            return Err(RegistryError::InvalidManifest("no files listed".into()));
        }
        for entry in &manifest.files {
            let name = entry.name.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(RegistryError::InvalidManifest(format!(
                    "illegal file name: {:?}",
                    entry.name
                )));
            }
        }
        Ok(manifest)
    }
}

/// 十六进制 MD5
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// HTTP 仓库配置
#[derive(Debug, Clone)]
pub struct HttpRegistryConfig {
    /// 单个请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for HttpRegistryConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

/// HTTP 模型仓库
pub struct HttpModelRegistry {
    client: Client,
}

impl HttpModelRegistry {
    pub fn new(config: HttpRegistryConfig) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistryError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RegistryError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(RegistryError::NetworkError(format!("HTTP {} for {}", status, url)));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RegistryError::NetworkError(e.to_string()))
    }

    fn download_all(&self, base_url: &str, destination: &Path) -> Result<usize, RegistryError> {
        let manifest_bytes = self.get_bytes(&format!("{}/{}", base_url, MANIFEST_FILE))?;
        let manifest = BundleManifest::parse(&String::from_utf8_lossy(&manifest_bytes))?;

        fs::create_dir_all(destination).map_err(|e| RegistryError::IoError(e.to_string()))?;

        let mut downloaded = 0;
        for entry in &manifest.files {
            let target = destination.join(&entry.name);
            if is_up_to_date(&target, &entry.md5) {
                tracing::debug!(file = %entry.name, "Already present, skipping");
                continue;
            }

            let data = self.get_bytes(&format!("{}/{}", base_url, entry.name))?;
            let actual = md5_hex(&data);
            if !actual.eq_ignore_ascii_case(&entry.md5) {
                return Err(RegistryError::ChecksumMismatch {
                    file: entry.name.clone(),
                    expected: entry.md5.clone(),
                    actual,
                });
            }

            fs::write(&target, &data).map_err(|e| RegistryError::IoError(e.to_string()))?;
            tracing::debug!(file = %entry.name, bytes = data.len(), "Downloaded");
            downloaded += 1;
        }
        Ok(downloaded)
    }
}

fn is_up_to_date(path: &Path, expected_md5: &str) -> bool {
    fs::read(path)
        .map(|data| md5_hex(&data).eq_ignore_ascii_case(expected_md5))
        .unwrap_or(false)
}

impl ModelRegistryPort for HttpModelRegistry {
    fn fetch(
        &self,
        source: &str,
        destination: &Path,
        model_name: &str,
        max_retries: u32,
    ) -> Result<PathBuf, RegistryError> {
        let base_url = format!("{}/{}", source.trim_end_matches('/'), model_name);

        let downloaded = fetch_with_retries(max_retries, |attempt| {
            tracing::debug!(attempt, url = %base_url, "Downloading model bundle");
            self.download_all(&base_url, destination)
        })?;

        tracing::info!(
            url = %base_url,
            destination = %destination.display(),
            downloaded,
            "Model bundle downloaded"
        );
        Ok(destination.to_path_buf())
    }
}
