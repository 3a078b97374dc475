//! Bundle Context - Value Objects

use std::path::{Path, PathBuf};

use super::BundleError;

/// 模型权重文件名
pub const WEIGHTS_FILE: &str = "model.pth";
/// 配置文档文件名
pub const CONFIG_FILE: &str = "config.json";
/// 说话人表文件名（可选）
pub const SPEAKERS_FILE: &str = "speakers.pth";
/// 语言 ID 表文件名（可选）
pub const LANGUAGE_IDS_FILE: &str = "language_ids.json";

/// 模型包位置
///
/// 指向包含权重、配置以及可选辅助表的目录，由调用方持有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLocation(PathBuf);

impl BundleLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn weights_path(&self) -> PathBuf {
        self.0.join(WEIGHTS_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.0.join(CONFIG_FILE)
    }

    pub fn speakers_path(&self) -> PathBuf {
        self.0.join(SPEAKERS_FILE)
    }

    pub fn language_ids_path(&self) -> PathBuf {
        self.0.join(LANGUAGE_IDS_FILE)
    }

    /// 检查必需的权重和配置文件是否存在
    pub fn check_required(&self) -> Result<(), BundleError> {
        for path in [self.weights_path(), self.config_path()] {
            if !path.is_file() {
                return Err(BundleError::MissingArtifact(path.display().to_string()));
            }
        }
        Ok(())
    }

    /// 探测可选辅助文件
    ///
    /// 每次调用都重新检查文件系统，缺失的文件总是记为 None
    pub fn probe(&self) -> ArtifactProbe {
        let present = |path: PathBuf| if path.is_file() { Some(path) } else { None };
        ArtifactProbe {
            speakers_file: present(self.speakers_path()),
            language_ids_file: present(self.language_ids_path()),
        }
    }
}

impl std::fmt::Display for BundleLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// 辅助文件探测结果（不可变）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactProbe {
    speakers_file: Option<PathBuf>,
    language_ids_file: Option<PathBuf>,
}

impl ArtifactProbe {
    pub fn new(speakers_file: Option<PathBuf>, language_ids_file: Option<PathBuf>) -> Self {
        Self {
            speakers_file,
            language_ids_file,
        }
    }

    pub fn speakers_file(&self) -> Option<&Path> {
        self.speakers_file.as_deref()
    }

    pub fn language_ids_file(&self) -> Option<&Path> {
        self.language_ids_file.as_deref()
    }

    pub fn has_speakers(&self) -> bool {
        self.speakers_file.is_some()
    }

    pub fn has_language(&self) -> bool {
        self.language_ids_file.is_some()
    }
}

/// 模型包能力集
///
/// 不变量:
/// - has_speakers 当且仅当说话人表文件存在
/// - speaker_ids 保持说话人表中的出现顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    has_speakers: bool,
    speaker_ids: Vec<String>,
    has_language: bool,
}

impl CapabilitySet {
    pub fn new(probe: &ArtifactProbe, speaker_ids: Vec<String>) -> Self {
        let has_speakers = probe.has_speakers();
        Self {
            has_speakers,
            speaker_ids: if has_speakers { speaker_ids } else { Vec::new() },
            has_language: probe.has_language(),
        }
    }

    pub fn has_speakers(&self) -> bool {
        self.has_speakers
    }

    pub fn has_language(&self) -> bool {
        self.has_language
    }

    pub fn speaker_ids(&self) -> &[String] {
        &self.speaker_ids
    }

    pub fn knows_speaker(&self, speaker: &str) -> bool {
        self.speaker_ids.iter().any(|id| id == speaker)
    }

    /// 解析实际传给引擎的说话人
    ///
    /// 单说话人模型包忽略调用方请求的说话人
    pub fn resolve_speaker<'a>(&self, requested: Option<&'a str>) -> Option<&'a str> {
        if self.has_speakers {
            requested
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_layout_paths() {
        let location = BundleLocation::new("models/vits");
        assert_eq!(location.weights_path(), PathBuf::from("models/vits/model.pth"));
        assert_eq!(location.config_path(), PathBuf::from("models/vits/config.json"));
        assert_eq!(location.speakers_path(), PathBuf::from("models/vits/speakers.pth"));
        assert_eq!(
            location.language_ids_path(),
            PathBuf::from("models/vits/language_ids.json")
        );
    }

    #[test]
    fn test_check_required_reports_missing_weights() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();

        let err = BundleLocation::new(dir.path()).check_required().unwrap_err();
        assert!(matches!(err, BundleError::MissingArtifact(path) if path.ends_with(WEIGHTS_FILE)));
    }

    #[test]
    fn test_probe_tracks_each_artifact_independently() {
        let dir = tempdir().unwrap();
        let location = BundleLocation::new(dir.path());
        assert_eq!(location.probe(), ArtifactProbe::default());

        fs::write(dir.path().join(LANGUAGE_IDS_FILE), "{}").unwrap();
        let probe = location.probe();
        assert!(probe.has_language());
        assert!(!probe.has_speakers());

        fs::remove_file(dir.path().join(LANGUAGE_IDS_FILE)).unwrap();
        assert!(!location.probe().has_language());
    }

    #[test]
    fn test_speaker_forced_absent_without_capability() {
        let caps = CapabilitySet::new(&ArtifactProbe::default(), vec!["ignored".into()]);
        assert!(!caps.has_speakers());
        assert!(caps.speaker_ids().is_empty());
        assert_eq!(caps.resolve_speaker(Some("alice")), None);
    }

    #[test]
    fn test_speaker_passes_through_unvalidated() {
        let probe = ArtifactProbe::new(Some(PathBuf::from("b/speakers.pth")), None);
        let caps = CapabilitySet::new(&probe, vec!["alice".into(), "bob".into()]);
        assert_eq!(caps.resolve_speaker(Some("carol")), Some("carol"));
        assert_eq!(caps.resolve_speaker(None), None);
        assert!(caps.knows_speaker("bob"));
        assert!(!caps.knows_speaker("carol"));
    }
}
