//! Synthesis Orchestrator - 合成请求的校验与分发

use std::path::Path;

use crate::application::commands::bundle_commands::PreparedBundle;
use crate::application::commands::synthesis_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::SynthesisEnginePort;
use crate::domain::bundle::CapabilitySet;
use crate::domain::synthesis::normalize_wav_path;

/// Synthesis Orchestrator
///
/// 独占一个已加载的引擎句柄。每次调用直接返回结果，不保留上一次的输出。
/// 合成与保存都只尝试一次，不做重试。
pub struct SynthesisOrchestrator {
    engine: Box<dyn SynthesisEnginePort>,
    capabilities: CapabilitySet,
}

impl SynthesisOrchestrator {
    pub fn new(prepared: PreparedBundle) -> Self {
        Self {
            engine: prepared.engine,
            capabilities: prepared.capabilities,
        }
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn speaker_ids(&self) -> &[String] {
        self.capabilities.speaker_ids()
    }

    pub fn synthesize(&self, cmd: SynthesizeCommand) -> Result<SynthesisResult, ApplicationError> {
        if cmd.text.is_empty() {
            return Err(ApplicationError::validation("text must not be empty"));
        }

        let speaker = self.capabilities.resolve_speaker(cmd.speaker.as_deref());
        let language = cmd.language.as_deref();

        if cmd.speaker.is_some() && speaker.is_none() {
            tracing::debug!(
                requested = ?cmd.speaker,
                "Bundle has no speaker table, ignoring requested speaker"
            );
        }
        // 不在已知列表中的说话人交给引擎判断
        if let Some(id) = speaker {
            if !self.capabilities.knows_speaker(id) {
                tracing::warn!(speaker = %id, "Requested speaker is not in the speaker table");
            }
        }

        tracing::debug!(
            text_len = cmd.text.len(),
            speaker = ?speaker,
            language = ?language,
            "Dispatching synthesis"
        );

        let samples = self
            .engine
            .synthesize(&cmd.text, speaker, language)
            .map_err(|e| ApplicationError::synthesis(e.to_string()))?;

        tracing::info!(
            samples = samples.len(),
            sample_rate = samples.sample_rate,
            duration_ms = samples.duration_ms(),
            "Synthesis completed"
        );

        if !cmd.save {
            return Ok(SynthesisResult {
                samples,
                output_path: None,
            });
        }

        let output_path = normalize_wav_path(&cmd.output_path);
        self.engine
            .persist(&samples, Path::new(&output_path))
            .map_err(|e| {
                ApplicationError::persistence(format!("failed to save {}: {}", output_path, e))
            })?;

        tracing::info!(path = %output_path, "Audio saved");

        Ok(SynthesisResult {
            samples,
            output_path: Some(output_path),
        })
    }
}
