//! Application Commands
//!
//! 模型包获取/准备命令与合成命令

mod bundle_commands;
pub mod handlers;
mod synthesis_commands;

pub use bundle_commands::{
    AcquireBundleCommand, PrepareBundleCommand, PreparedBundle, ACQUIRE_MAX_RETRIES,
};
pub use synthesis_commands::{SynthesisResult, SynthesizeCommand, DEFAULT_OUTPUT_PATH};
