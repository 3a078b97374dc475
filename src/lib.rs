//! voxbundle - VITS 系列语音合成模型包加载与推理编排
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Bundle Context: 模型包布局、辅助文件探测、配置修补、能力集
//! - Synthesis Context: 合成音频、输出路径规则
//!
//! 应用层 (application/):
//! - Ports: 端口定义（ModelRegistry, EngineLoader, SynthesisEngine, SpeakerTable）
//! - Commands: 获取/准备模型包，合成编排
//!
//! 基础设施层 (infrastructure/):
//! - Registry: 本地目录 / HTTP 模型仓库
//! - Engine: HTTP 推理服务客户端、Fake 引擎、WAV 编解码
//! - Speakers: speakers.pth 读取

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
