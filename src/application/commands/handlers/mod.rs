//! Command Handlers

mod bundle_handlers;
mod synthesis_handlers;

pub use bundle_handlers::{AcquireBundleHandler, PrepareBundleHandler};
pub use synthesis_handlers::SynthesisOrchestrator;
