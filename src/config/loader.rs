//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["voxbundle", "voxbundle.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXBUNDLE_`，层级分隔符 `__`）
/// 2. 配置文件（voxbundle.toml 或 voxbundle.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXBUNDLE_BUNDLE__LOCAL_PATH=/data/models/vits`
/// - `VOXBUNDLE_ENGINE__URL=http://gpu-box:8000`
/// - `VOXBUNDLE_REGISTRY__SOURCE=https://models.example.com`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("bundle.local_path", "models/tts")?
        .set_default("bundle.model_name", "tts")?
        .set_default("registry.timeout_secs", 300)?
        .set_default("engine.url", "http://localhost:8000")?
        .set_default("engine.timeout_secs", 120)?
        .set_default("engine.fake", false)?
        .set_default("output.save_file", true)?
        .set_default("output.file_path", "output.wav")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VOXBUNDLE_ENGINE__URL=http://gpu-box:8000
    builder = builder.add_source(
        Environment::with_prefix("VOXBUNDLE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.bundle.local_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Bundle local path cannot be empty".to_string(),
        ));
    }

    if config.registry.source.is_some() && config.bundle.model_name.is_empty() {
        return Err(ConfigError::ValidationError(
            "Model name is required when a registry source is set".to_string(),
        ));
    }

    if !config.engine.fake && config.engine.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Engine URL cannot be empty".to_string(),
        ));
    }

    if config.output.save_file && config.output.file_path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Output file path cannot be empty when saving".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Bundle: {}", config.bundle.local_path.display());
    tracing::info!("Model Name: {}", config.bundle.model_name);
    match &config.registry.source {
        Some(source) => tracing::info!("Registry Source: {}", source),
        None => tracing::info!("Registry Source: <none, using local bundle>"),
    }
    if config.engine.fake {
        tracing::info!("Engine: fake");
    } else {
        tracing::info!("Engine URL: {}", config.engine.url);
        tracing::info!("Engine Timeout: {}s", config.engine.timeout_secs);
    }
    tracing::info!("Save File: {}", config.output.save_file);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
