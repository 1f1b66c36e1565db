//! WAV Transcoder - 基于 symphonia 的音频编解码器
//!
//! 支持：
//! - WAV / MP3 解码为内存缓冲区
//! - 缓冲区编码为 16 位 PCM WAV

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioFormat, AudioTranscoderPort, TranscodeError};
use crate::domain::AudioBuffer;

/// WAV 转码器
///
/// 解码交给 symphonia（按内容探测容器），编码只输出 WAV
#[derive(Debug, Default)]
pub struct WavTranscoder;

impl WavTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// 使用 symphonia 解码为交错 f32 PCM
    fn decode_to_pcm(
        &self,
        data: &[u8],
        hint_format: Option<AudioFormat>,
    ) -> Result<AudioBuffer, TranscodeError> {
        if data.is_empty() {
            return Err(TranscodeError::InvalidInput("Empty audio data".to_string()));
        }

        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        if let Some(format) = hint_format {
            hint.with_extension(format.extension());
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TranscodeError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| TranscodeError::DecodingError("No audio track found".to_string()))?;

        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| TranscodeError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();
        let track_id = track.id;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => {
                    return Err(TranscodeError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(TranscodeError::DecodingError(format!("Decode failed: {}", e)));
                }
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count() as u16);

            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        let sample_rate = sample_rate
            .ok_or_else(|| TranscodeError::DecodingError("Unknown sample rate".to_string()))?;
        let channels = channels
            .ok_or_else(|| TranscodeError::DecodingError("Unknown channel count".to_string()))?;

        Ok(AudioBuffer::new(samples, sample_rate, channels))
    }
}

impl AudioTranscoderPort for WavTranscoder {
    fn decode(&self, data: &[u8], hint: Option<AudioFormat>) -> Result<AudioBuffer, TranscodeError> {
        let buffer = self.decode_to_pcm(data, hint)?;
        tracing::debug!(
            sample_rate = buffer.sample_rate(),
            channels = buffer.channels(),
            duration_ms = buffer.duration_ms(),
            "Audio decoded"
        );
        Ok(buffer)
    }

    fn encode(&self, buffer: &AudioBuffer, format: AudioFormat) -> Result<Vec<u8>, TranscodeError> {
        match format {
            AudioFormat::Wav => Ok(buffer.to_wav_bytes()),
            // 没有 MP3 编码器
            AudioFormat::Mp3 => Err(TranscodeError::UnsupportedFormat(format.to_string())),
        }
    }

    fn supports_format(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Wav => true,
            AudioFormat::Mp3 => false,
        }
    }
}
