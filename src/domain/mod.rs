//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Bundle Context: 模型包布局、辅助文件探测、配置修补
//! - Synthesis Context: 合成音频与输出路径规则

pub mod bundle;
pub mod synthesis;
