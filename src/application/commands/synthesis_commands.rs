//! Synthesis Commands - 合成请求与结果

use crate::domain::synthesis::AudioSamples;

/// 默认输出文件
pub const DEFAULT_OUTPUT_PATH: &str = "output.wav";

/// 合成请求，每次调用构造，用完即弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizeCommand {
    pub text: String,
    pub speaker: Option<String>,
    pub language: Option<String>,
    /// 是否保存为 WAV 文件
    pub save: bool,
    pub output_path: String,
}

impl SynthesizeCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: None,
            language: None,
            save: true,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn save_to(mut self, output_path: impl Into<String>) -> Self {
        self.save = true;
        self.output_path = output_path.into();
        self
    }

    pub fn without_saving(mut self) -> Self {
        self.save = false;
        self
    }
}

/// 合成结果
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    pub samples: AudioSamples,
    /// 仅在请求保存时存在，已规范化为 `.wav` 后缀
    pub output_path: Option<String>,
}
