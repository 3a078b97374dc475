//! Bundle Context - 模型包限界上下文
//!
//! 职责:
//! - 模型包文件布局
//! - 可选辅助文件探测
//! - 配置文档修补
//! - 能力集推导

mod config_document;
mod errors;
mod value_objects;

pub use config_document::{
    ConfigDocument, LANGUAGE_IDS_FILE_KEY, MODEL_ARGS_KEY, SPEAKERS_FILE_KEY,
};
pub use errors::BundleError;
pub use value_objects::{
    ArtifactProbe, BundleLocation, CapabilitySet, CONFIG_FILE, LANGUAGE_IDS_FILE, SPEAKERS_FILE,
    WEIGHTS_FILE,
};
