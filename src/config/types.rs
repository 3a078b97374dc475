//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 模型包配置
    #[serde(default)]
    pub bundle: BundleConfig,

    /// 模型仓库配置
    #[serde(default)]
    pub registry: RegistryConfig,

    /// 推理引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 模型包配置
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    /// 本地模型包目录
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// 模型名称（从仓库获取时使用）
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

fn default_local_path() -> PathBuf {
    PathBuf::from("models/tts")
}

fn default_model_name() -> String {
    "tts".to_string()
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            local_path: default_local_path(),
            model_name: default_model_name(),
        }
    }
}

/// 模型仓库配置
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// 仓库来源：HTTP(S) 地址或本地目录；为空则不获取，直接使用本地模型包
    #[serde(default)]
    pub source: Option<String>,

    /// 下载超时时间（秒）
    #[serde(default = "default_registry_timeout")]
    pub timeout_secs: u64,
}

fn default_registry_timeout() -> u64 {
    300
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            source: None,
            timeout_secs: default_registry_timeout(),
        }
    }
}

impl RegistryConfig {
    /// 来源是否为 HTTP 地址
    pub fn is_remote(&self) -> bool {
        self.source
            .as_deref()
            .map_or(false, |s| s.starts_with("http://") || s.starts_with("https://"))
    }
}

/// 推理引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// 推理服务基础 URL
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// 使用 Fake 引擎（不连接推理服务）
    #[serde(default)]
    pub fake: bool,
}

fn default_engine_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_engine_timeout() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            timeout_secs: default_engine_timeout(),
            fake: false,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 是否保存为 WAV 文件
    #[serde(default = "default_save_file")]
    pub save_file: bool,

    /// 输出文件路径
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

fn default_save_file() -> bool {
    true
}

fn default_file_path() -> String {
    "output.wav".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_file: default_save_file(),
            file_path: default_file_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
