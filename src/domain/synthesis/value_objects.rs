//! Synthesis Context - Value Objects

/// 保存音频时强制使用的后缀（区分大小写）
pub const WAV_SUFFIX: &str = ".wav";

/// 合成得到的音频
///
/// 单声道 f32 PCM，取值范围 [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    pub pcm: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSamples {
    pub fn new(pcm: Vec<f32>, sample_rate: u32) -> Self {
        Self { pcm, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    /// 音频时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.pcm.len() as u64 * 1000 / self.sample_rate as u64
    }
}

/// 规范化输出路径：不以 `.wav` 结尾时追加后缀
pub fn normalize_wav_path(path: &str) -> String {
    if path.ends_with(WAV_SUFFIX) {
        path.to_string()
    } else {
        format!("{path}{WAV_SUFFIX}")
    }
}
