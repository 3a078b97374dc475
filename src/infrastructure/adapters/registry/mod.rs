//! Registry Adapter - 模型仓库实现

mod http_registry;
mod local_registry;

pub use http_registry::{md5_hex, BundleManifest, HttpModelRegistry, HttpRegistryConfig, ManifestEntry};
pub use local_registry::LocalModelRegistry;
