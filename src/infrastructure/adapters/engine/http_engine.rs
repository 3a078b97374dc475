//! HTTP Synthesis Engine - 调用外部推理服务
//!
//! 外部推理服务 API:
//! POST {base_url}/api/tts/load
//!   Request: EngineSpec (JSON)
//!   Response: {"model_id": "..."}
//! POST {base_url}/api/tts/synthesize
//!   Request: {"model_id": "...", "text": "...", "speaker": null, "language": null}
//!   Response: audio/wav binary

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::application::ports::{EngineError, EngineLoaderPort, EngineSpec, SynthesisEnginePort};
use crate::domain::synthesis::AudioSamples;

use super::wav::{decode_wav, write_wav};

#[derive(Debug, Deserialize)]
struct LoadResponse {
    model_id: String,
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    model_id: &'a str,
    text: &'a str,
    speaker: Option<&'a str>,
    language: Option<&'a str>,
}

/// HTTP 引擎配置
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// 推理服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpEngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/tts/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn map_request_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_connect() {
        EngineError::NetworkError(format!("Cannot connect to inference service: {}", e))
    } else {
        EngineError::NetworkError(e.to_string())
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().unwrap_or_default();
    Err(EngineError::ServiceError(format!("HTTP {}: {}", status, error_text)))
}

/// HTTP 引擎加载器
pub struct HttpEngineLoader {
    client: Client,
    config: HttpEngineConfig,
}

impl HttpEngineLoader {
    pub fn new(config: HttpEngineConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

impl EngineLoaderPort for HttpEngineLoader {
    fn load(&self, spec: EngineSpec) -> Result<Box<dyn SynthesisEnginePort>, EngineError> {
        let url = self.config.endpoint("load");
        tracing::debug!(
            url = %url,
            model = %spec.model_path.display(),
            "Sending engine load request"
        );

        let response = self
            .client
            .post(&url)
            .json(&spec)
            .send()
            .map_err(map_request_error)?;

        let loaded: LoadResponse = check_status(response)
            .map_err(|e| EngineError::LoadFailed(e.to_string()))?
            .json()
            .map_err(|e| EngineError::InvalidResponse(format!("Bad load response: {}", e)))?;

        tracing::info!(model_id = %loaded.model_id, "Inference service loaded model");

        Ok(Box::new(HttpSynthesisEngine {
            client: self.client.clone(),
            config: self.config.clone(),
            model_id: loaded.model_id,
        }))
    }
}

/// HTTP 合成引擎句柄
pub struct HttpSynthesisEngine {
    client: Client,
    config: HttpEngineConfig,
    model_id: String,
}

impl HttpSynthesisEngine {
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl SynthesisEnginePort for HttpSynthesisEngine {
    fn synthesize(
        &self,
        text: &str,
        speaker: Option<&str>,
        language: Option<&str>,
    ) -> Result<AudioSamples, EngineError> {
        let request = SynthesizeRequest {
            model_id: &self.model_id,
            text,
            speaker,
            language,
        };

        let response = self
            .client
            .post(self.config.endpoint("synthesize"))
            .json(&request)
            .send()
            .map_err(map_request_error)?;

        let audio_data = check_status(response)?
            .bytes()
            .map_err(|e| EngineError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

        tracing::debug!(audio_size = audio_data.len(), "Received synthesized audio");
        decode_wav(&audio_data)
    }

    fn persist(&self, samples: &AudioSamples, path: &Path) -> Result<(), EngineError> {
        write_wav(path, samples)
    }
}
