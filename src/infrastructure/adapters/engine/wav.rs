//! WAV 编解码
//!
//! - 解码：symphonia，多声道混为单声道
//! - 编码：hound，16-bit PCM 单声道

use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::EngineError;
use crate::domain::synthesis::AudioSamples;

/// 将样本写入 16-bit PCM WAV 文件
pub fn write_wav(path: &Path, samples: &AudioSamples) -> Result<(), EngineError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: samples.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| EngineError::WriteFailed(e.to_string()))?;

    for &sample in &samples.pcm {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| EngineError::WriteFailed(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| EngineError::WriteFailed(e.to_string()))?;

    tracing::debug!(
        path = %path.display(),
        samples = samples.len(),
        sample_rate = samples.sample_rate,
        "WAV written"
    );
    Ok(())
}

/// 解码 WAV 字节流为单声道 f32 样本
pub fn decode_wav(data: &[u8]) -> Result<AudioSamples, EngineError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| EngineError::InvalidResponse(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| EngineError::InvalidResponse("No audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| EngineError::InvalidResponse("Unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| EngineError::InvalidResponse(format!("Decoder creation failed: {}", e)))?;

    let track_id = track.id;
    let mut pcm: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(EngineError::InvalidResponse(format!(
                    "Packet read error: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| EngineError::InvalidResponse(format!("Decode error: {}", e)))?;

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let interleaved = &sample_buf.samples()[..num_frames * channels];
        pcm.extend(
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    Ok(AudioSamples::new(pcm, sample_rate))
}
