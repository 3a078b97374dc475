//! Bundle Command Handlers

use std::path::Path;
use std::sync::Arc;

use crate::application::commands::bundle_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    EngineLoaderPort, EngineSpec, ModelRegistryPort, SpeakerTablePort,
};
use crate::domain::bundle::{BundleLocation, CapabilitySet, ConfigDocument};

/// AcquireBundle Handler - 从模型仓库获取模型包
pub struct AcquireBundleHandler {
    registry: Arc<dyn ModelRegistryPort>,
}

impl AcquireBundleHandler {
    pub fn new(registry: Arc<dyn ModelRegistryPort>) -> Self {
        Self { registry }
    }

    pub fn handle(&self, cmd: AcquireBundleCommand) -> Result<BundleLocation, ApplicationError> {
        tracing::info!(
            source = %cmd.source,
            destination = %cmd.destination.display(),
            model_name = %cmd.model_name,
            max_retries = ACQUIRE_MAX_RETRIES,
            "Acquiring model bundle"
        );

        let path = self
            .registry
            .fetch(
                &cmd.source,
                &cmd.destination,
                &cmd.model_name,
                ACQUIRE_MAX_RETRIES,
            )
            .map_err(|e| {
                ApplicationError::acquisition(format!(
                    "failed to fetch `{}` from {}: {}",
                    cmd.model_name, cmd.source, e
                ))
            })?;

        let location = BundleLocation::new(path);
        location.check_required().map_err(|e| {
            ApplicationError::acquisition(format!("fetched bundle is not usable: {}", e))
        })?;

        tracing::info!(bundle = %location, "Model bundle acquired");
        Ok(location)
    }
}

/// PrepareBundle Handler - 修补配置文档并实例化引擎
///
/// 流程：探测辅助文件 → 一次性修补配置 → 读取说话人表 → 加载引擎
pub struct PrepareBundleHandler {
    engine_loader: Arc<dyn EngineLoaderPort>,
    speaker_table: Arc<dyn SpeakerTablePort>,
}

impl PrepareBundleHandler {
    pub fn new(
        engine_loader: Arc<dyn EngineLoaderPort>,
        speaker_table: Arc<dyn SpeakerTablePort>,
    ) -> Self {
        Self {
            engine_loader,
            speaker_table,
        }
    }

    pub fn handle(&self, cmd: PrepareBundleCommand) -> Result<PreparedBundle, ApplicationError> {
        let location = cmd.location;
        location.check_required()?;

        let probe = location.probe();
        tracing::info!(
            bundle = %location,
            speakers_file = ?probe.speakers_file(),
            language_ids_file = ?probe.language_ids_file(),
            "Probed auxiliary artifacts"
        );

        let config_path = location.config_path();
        let mut document = ConfigDocument::load(&config_path)?;
        if document.apply_probe(&probe)? {
            document.write_atomic(&config_path)?;
            tracing::info!(path = %config_path.display(), "Config document patched");
        } else {
            tracing::debug!(path = %config_path.display(), "Config document already up to date");
        }

        let speaker_ids = match probe.speakers_file() {
            Some(path) => self.read_speaker_ids(path)?,
            None => Vec::new(),
        };
        let capabilities = CapabilitySet::new(&probe, speaker_ids);

        let spec = EngineSpec {
            model_path: location.weights_path(),
            config_path,
            config: document.into_value(),
            speakers_file: probe.speakers_file().map(Path::to_path_buf),
            language_ids_file: probe.language_ids_file().map(Path::to_path_buf),
            vocoder_path: None,
            vocoder_config_path: None,
            use_cuda: false,
        };

        let engine = self.engine_loader.load(spec).map_err(|e| {
            ApplicationError::bundle_load(format!("engine instantiation failed: {}", e))
        })?;

        tracing::info!(
            bundle = %location,
            has_speakers = capabilities.has_speakers(),
            speaker_count = capabilities.speaker_ids().len(),
            has_language = capabilities.has_language(),
            "Model bundle prepared"
        );

        Ok(PreparedBundle {
            engine,
            capabilities,
        })
    }

    fn read_speaker_ids(&self, path: &Path) -> Result<Vec<String>, ApplicationError> {
        self.speaker_table.speaker_ids(path).map_err(|e| {
            ApplicationError::bundle_load(format!(
                "failed to read speaker table {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::Stage;
    use crate::application::ports::{
        fetch_with_retries, EngineError, RegistryError, SpeakerTableError, SynthesisEnginePort,
    };
    use crate::domain::bundle::{
        CONFIG_FILE, LANGUAGE_IDS_FILE, LANGUAGE_IDS_FILE_KEY, SPEAKERS_FILE, SPEAKERS_FILE_KEY,
        WEIGHTS_FILE,
    };
    use crate::domain::synthesis::AudioSamples;
    use crate::infrastructure::adapters::speakers::fixtures;
    use crate::infrastructure::adapters::PthSpeakerTable;
    use serde_json::Value;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    const CONFIG: &str = r#"{
    "model": "vits",
    "model_args": {
        "num_chars": 131
    }
}"#;

    struct NullEngine;

    impl SynthesisEnginePort for NullEngine {
        fn synthesize(
            &self,
            _text: &str,
            _speaker: Option<&str>,
            _language: Option<&str>,
        ) -> Result<AudioSamples, EngineError> {
            Ok(AudioSamples::new(Vec::new(), 22050))
        }

        fn persist(&self, _samples: &AudioSamples, _path: &Path) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLoader {
        specs: Mutex<Vec<EngineSpec>>,
        fail: bool,
    }

    impl EngineLoaderPort for RecordingLoader {
        fn load(&self, spec: EngineSpec) -> Result<Box<dyn SynthesisEnginePort>, EngineError> {
            self.specs.lock().unwrap().push(spec);
            if self.fail {
                return Err(EngineError::LoadFailed("corrupt checkpoint".into()));
            }
            Ok(Box::new(NullEngine))
        }
    }

    struct StubSpeakerTable(Result<Vec<String>, String>);

    impl SpeakerTablePort for StubSpeakerTable {
        fn speaker_ids(&self, _path: &Path) -> Result<Vec<String>, SpeakerTableError> {
            self.0.clone().map_err(SpeakerTableError::UnpickleError)
        }
    }

    fn bundle_dir(speakers: bool, language: bool) -> TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(WEIGHTS_FILE), b"weights").unwrap();
        fs::write(dir.path().join(CONFIG_FILE), CONFIG).unwrap();
        if speakers {
            fs::write(dir.path().join(SPEAKERS_FILE), b"pth").unwrap();
        }
        if language {
            fs::write(dir.path().join(LANGUAGE_IDS_FILE), r#"{"en": 0}"#).unwrap();
        }
        dir
    }

    fn handler(loader: Arc<RecordingLoader>, speakers: &[&str]) -> PrepareBundleHandler {
        let ids = speakers.iter().map(|s| s.to_string()).collect();
        PrepareBundleHandler::new(loader, Arc::new(StubSpeakerTable(Ok(ids))))
    }

    fn prepare(handler: &PrepareBundleHandler, dir: &Path) -> Result<PreparedBundle, ApplicationError> {
        handler.handle(PrepareBundleCommand {
            location: BundleLocation::new(dir),
        })
    }

    fn read_config(dir: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(dir.join(CONFIG_FILE)).unwrap()).unwrap()
    }

    #[test]
    fn test_no_auxiliary_artifacts_leaves_config_untouched() {
        let dir = bundle_dir(false, false);
        let loader = Arc::new(RecordingLoader::default());

        let prepared = prepare(&handler(loader.clone(), &[]), dir.path()).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(), CONFIG);
        assert!(!prepared.capabilities.has_speakers());
        assert!(!prepared.capabilities.has_language());

        let specs = loader.specs.lock().unwrap();
        let spec = &specs[0];
        assert_eq!(spec.model_path, dir.path().join(WEIGHTS_FILE));
        assert_eq!(spec.speakers_file, None);
        assert_eq!(spec.language_ids_file, None);
        assert_eq!(spec.vocoder_path, None);
        assert!(!spec.use_cuda);
    }

    #[test]
    fn test_speakers_only_patches_speaker_references() {
        let dir = bundle_dir(true, false);
        let loader = Arc::new(RecordingLoader::default());

        let prepared = prepare(&handler(loader.clone(), &["zoe", "adam", "mia"]), dir.path()).unwrap();

        let expected = dir.path().join(SPEAKERS_FILE).display().to_string();
        let config = read_config(dir.path());
        assert_eq!(config[SPEAKERS_FILE_KEY], Value::from(expected.clone()));
        assert_eq!(config["model_args"][SPEAKERS_FILE_KEY], Value::from(expected));
        assert!(config.get(LANGUAGE_IDS_FILE_KEY).is_none());
        assert!(config["model_args"].get(LANGUAGE_IDS_FILE_KEY).is_none());
        assert_eq!(config["model_args"]["num_chars"], Value::from(131));

        assert!(prepared.capabilities.has_speakers());
        assert!(!prepared.capabilities.has_language());
        assert_eq!(prepared.capabilities.speaker_ids(), ["zoe", "adam", "mia"]);

        let specs = loader.specs.lock().unwrap();
        assert_eq!(specs[0].speakers_file, Some(dir.path().join(SPEAKERS_FILE)));
        assert_eq!(specs[0].config, config);
    }

    #[test]
    fn test_speaker_ids_follow_speakers_pth_order() {
        let dir = bundle_dir(false, false);
        let speakers = dir.path().join(SPEAKERS_FILE);
        fixtures::write_speakers_pth(&speakers, &["zoe", "adam", "mia", "liam"]);

        let handler = PrepareBundleHandler::new(
            Arc::new(RecordingLoader::default()),
            Arc::new(PthSpeakerTable::new()),
        );
        let prepared = prepare(&handler, dir.path()).unwrap();

        assert!(prepared.capabilities.has_speakers());
        assert_eq!(
            prepared.capabilities.speaker_ids(),
            ["zoe", "adam", "mia", "liam"]
        );
    }

    #[test]
    fn test_both_artifacts_patch_both_references() {
        let dir = bundle_dir(true, true);
        let prepared = prepare(
            &handler(Arc::new(RecordingLoader::default()), &["alice"]),
            dir.path(),
        )
        .unwrap();

        let config = read_config(dir.path());
        for key in [SPEAKERS_FILE_KEY, LANGUAGE_IDS_FILE_KEY] {
            assert!(config[key].is_string(), "top-level {key}");
            assert_eq!(config[key], config["model_args"][key]);
        }
        assert!(prepared.capabilities.has_speakers());
        assert!(prepared.capabilities.has_language());
    }

    #[test]
    fn test_language_only_sets_language_capability() {
        let dir = bundle_dir(false, true);
        let loader = Arc::new(RecordingLoader::default());
        let prepared = prepare(&handler(loader.clone(), &[]), dir.path()).unwrap();

        assert!(prepared.capabilities.has_language());
        assert!(!prepared.capabilities.has_speakers());
        assert!(prepared.capabilities.speaker_ids().is_empty());
        assert_eq!(
            loader.specs.lock().unwrap()[0].language_ids_file,
            Some(dir.path().join(LANGUAGE_IDS_FILE))
        );
    }

    #[test]
    fn test_preparing_twice_is_idempotent() {
        let dir = bundle_dir(true, true);
        let handler = handler(Arc::new(RecordingLoader::default()), &["alice"]);

        prepare(&handler, dir.path()).unwrap();
        let first = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        prepare(&handler, dir.path()).unwrap();
        let second = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_removed_language_file_drops_capability() {
        let dir = bundle_dir(false, true);
        let loader = Arc::new(RecordingLoader::default());
        let handler = handler(loader.clone(), &[]);

        prepare(&handler, dir.path()).unwrap();
        fs::remove_file(dir.path().join(LANGUAGE_IDS_FILE)).unwrap();
        let prepared = prepare(&handler, dir.path()).unwrap();

        assert!(!prepared.capabilities.has_language());
        assert_eq!(loader.specs.lock().unwrap()[1].language_ids_file, None);
    }

    #[test]
    fn test_missing_weights_is_load_error() {
        let dir = bundle_dir(false, false);
        fs::remove_file(dir.path().join(WEIGHTS_FILE)).unwrap();

        let err = prepare(&handler(Arc::new(RecordingLoader::default()), &[]), dir.path()).unwrap_err();
        assert_eq!(err.stage(), Stage::BundleLoad);
    }

    #[test]
    fn test_unparseable_config_is_load_error() {
        let dir = bundle_dir(true, false);
        fs::write(dir.path().join(CONFIG_FILE), "{ broken").unwrap();

        let loader = Arc::new(RecordingLoader::default());
        let err = prepare(&handler(loader.clone(), &[]), dir.path()).unwrap_err();
        assert_eq!(err.stage(), Stage::BundleLoad);
        assert!(loader.specs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_engine_failure_is_load_error() {
        let dir = bundle_dir(false, false);
        let loader = Arc::new(RecordingLoader {
            fail: true,
            ..Default::default()
        });

        let err = prepare(&handler(loader, &[]), dir.path()).unwrap_err();
        assert_eq!(err.stage(), Stage::BundleLoad);
        assert!(err.to_string().contains("corrupt checkpoint"));
    }

    #[test]
    fn test_unreadable_speaker_table_is_load_error() {
        let dir = bundle_dir(true, false);
        let handler = PrepareBundleHandler::new(
            Arc::new(RecordingLoader::default()),
            Arc::new(StubSpeakerTable(Err("bad opcode".into()))),
        );

        let err = prepare(&handler, dir.path()).unwrap_err();
        assert_eq!(err.stage(), Stage::BundleLoad);
        assert!(err.to_string().contains("bad opcode"));
    }

    /// 每次尝试都计数；前 `failures` 次失败，之后写入一个模型包
    struct FlakyRegistry {
        failures: u32,
        attempts: AtomicU32,
        write_config: bool,
    }

    impl FlakyRegistry {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                attempts: AtomicU32::new(0),
                write_config: true,
            }
        }
    }

    impl ModelRegistryPort for FlakyRegistry {
        fn fetch(
            &self,
            _source: &str,
            destination: &Path,
            _model_name: &str,
            max_retries: u32,
        ) -> Result<PathBuf, RegistryError> {
            fetch_with_retries(max_retries, |_| {
                let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= self.failures {
                    return Err(RegistryError::NetworkError("connection reset".into()));
                }
                fs::create_dir_all(destination).map_err(|e| RegistryError::IoError(e.to_string()))?;
                fs::write(destination.join(WEIGHTS_FILE), b"weights")
                    .map_err(|e| RegistryError::IoError(e.to_string()))?;
                if self.write_config {
                    fs::write(destination.join(CONFIG_FILE), CONFIG)
                        .map_err(|e| RegistryError::IoError(e.to_string()))?;
                }
                Ok(destination.to_path_buf())
            })
        }
    }

    fn acquire_cmd(dir: &Path) -> AcquireBundleCommand {
        AcquireBundleCommand {
            source: "registry://models".into(),
            destination: dir.join("vits"),
            model_name: "vits".into(),
        }
    }

    #[test]
    fn test_acquire_succeeds_within_budget() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(FlakyRegistry::new(2));

        let location = AcquireBundleHandler::new(registry.clone())
            .handle(acquire_cmd(dir.path()))
            .unwrap();

        assert_eq!(location.path(), dir.path().join("vits"));
        assert_eq!(registry.attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_acquire_fails_after_three_attempts() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(FlakyRegistry::new(u32::MAX));

        let err = AcquireBundleHandler::new(registry.clone())
            .handle(acquire_cmd(dir.path()))
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Acquisition);
        assert_eq!(registry.attempts.load(Ordering::SeqCst), ACQUIRE_MAX_RETRIES);
    }

    #[test]
    fn test_acquire_rejects_incomplete_bundle() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(FlakyRegistry {
            write_config: false,
            ..FlakyRegistry::new(0)
        });

        let err = AcquireBundleHandler::new(registry)
            .handle(acquire_cmd(dir.path()))
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Acquisition);
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
