//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod model_registry;
mod speaker_table;
mod synthesis_engine;

pub use model_registry::{fetch_with_retries, ModelRegistryPort, RegistryError};
pub use speaker_table::{SpeakerTableError, SpeakerTablePort};
pub use synthesis_engine::{EngineError, EngineLoaderPort, EngineSpec, SynthesisEnginePort};
