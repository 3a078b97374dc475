//! Bundle Context - 配置文档
//!
//! 模型配置（config.json）的内存表示。辅助文件引用必须内联写入配置，
//! 顶层与 `model_args` 中各保存一份。

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{ArtifactProbe, BundleError};

pub const SPEAKERS_FILE_KEY: &str = "speakers_file";
pub const LANGUAGE_IDS_FILE_KEY: &str = "language_ids_file";
pub const MODEL_ARGS_KEY: &str = "model_args";

/// 配置文档
///
/// 顶层必须是 JSON 对象，键顺序在读写之间保持不变
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
    /// 来源路径，用于错误信息
    source: PathBuf,
}

impl ConfigDocument {
    /// 从 JSON 文本解析，`source` 仅用于错误信息
    pub fn parse(text: &str, source: &Path) -> Result<Self, BundleError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BundleError::invalid_document(source, e.to_string()))?;
        match value {
            Value::Object(root) => Ok(Self {
                root,
                source: source.to_path_buf(),
            }),
            _ => Err(BundleError::invalid_document(
                source,
                "top level is not a JSON object",
            )),
        }
    }

    /// 从磁盘读取
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let text = std::fs::read_to_string(path).map_err(|e| BundleError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// 根据探测结果写入辅助文件引用
    ///
    /// 引用值为模型包目录与文件名拼接后的路径，不加 `./` 前缀。
    /// 一次性计算全部修改，返回文档是否发生变化。
    /// 缺失的辅助文件不会移除已有引用。
    pub fn apply_probe(&mut self, probe: &ArtifactProbe) -> Result<bool, BundleError> {
        let mut changed = false;
        if let Some(path) = probe.language_ids_file() {
            changed |= self.set_reference(LANGUAGE_IDS_FILE_KEY, path)?;
        }
        if let Some(path) = probe.speakers_file() {
            changed |= self.set_reference(SPEAKERS_FILE_KEY, path)?;
        }
        Ok(changed)
    }

    fn set_reference(&mut self, key: &str, path: &Path) -> Result<bool, BundleError> {
        let value = Value::String(path.display().to_string());
        let source = &self.source;

        let model_args = self
            .root
            .entry(MODEL_ARGS_KEY)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                BundleError::invalid_document(
                    source,
                    format!("`{MODEL_ARGS_KEY}` is not a JSON object"),
                )
            })?;

        let mut changed = false;
        if model_args.get(key) != Some(&value) {
            model_args.insert(key.to_string(), value.clone());
            changed = true;
        }
        if self.root.get(key) != Some(&value) {
            self.root.insert(key.to_string(), value);
            changed = true;
        }
        Ok(changed)
    }

    /// 顶层键值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// `model_args` 中的键值
    pub fn model_arg(&self, key: &str) -> Option<&Value> {
        self.root.get(MODEL_ARGS_KEY)?.get(key)
    }

    /// 4 空格缩进的 JSON 文本
    pub fn to_pretty_string(&self) -> Result<String, BundleError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.root
            .serialize(&mut ser)
            .map_err(|e| BundleError::invalid_document(&self.source, e.to_string()))?;
        String::from_utf8(buf)
            .map_err(|e| BundleError::invalid_document(&self.source, e.to_string()))
    }

    /// 写回磁盘：先写同目录临时文件，再原子重命名
    pub fn write_atomic(&self, path: &Path) -> Result<(), BundleError> {
        let text = self.to_pretty_string()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BundleError::io(dir, e))?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| BundleError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| BundleError::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| BundleError::io(path, e.error))?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "Config document written");
        Ok(())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}
