//! 音频缓冲区
//!
//! 内存中的 PCM 音频（交错 f32 样本），支持静音生成、拼接和 WAV 编码

use std::ops::{Add, AddAssign};

/// WAV 输出位深度
const WAV_BITS_PER_SAMPLE: u16 = 16;

/// 内存音频缓冲区
///
/// 样本按声道交错存储，取值范围 [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// 生成指定时长的静音
    pub fn silence(duration_ms: u64, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let frames = (sample_rate as u64 * duration_ms / 1000) as usize;
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    /// 从原始 PCM（有符号 16 位小端）构建
    pub fn from_pcm_s16le(data: &[u8], sample_rate: u32, channels: u16) -> Self {
        let samples = data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect();
        Self::new(samples, sample_rate, channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 每声道样本数
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// 追加另一段音频，必要时先转换为当前的采样率和声道数
    pub fn append(&mut self, other: &AudioBuffer) {
        if other.sample_rate == self.sample_rate && other.channels == self.channels {
            self.samples.extend_from_slice(&other.samples);
        } else {
            let converted = other.converted(self.sample_rate, self.channels);
            self.samples.extend_from_slice(&converted.samples);
        }
    }

    /// 转换为目标采样率和声道数
    pub fn converted(&self, sample_rate: u32, channels: u16) -> AudioBuffer {
        let channels = channels.max(1);
        let remixed = remix(&self.samples, self.channels, channels);
        let resampled = resample(&remixed, self.sample_rate, sample_rate, channels);
        AudioBuffer::new(resampled, sample_rate, channels)
    }

    /// 编码为 16 位 PCM WAV
    pub fn to_wav_bytes(&self) -> Vec<u8> {
        let num_channels = self.channels;
        let sample_rate = self.sample_rate;
        let bytes_per_sample = WAV_BITS_PER_SAMPLE / 8;
        let byte_rate = sample_rate * num_channels as u32 * bytes_per_sample as u32;
        let block_align = num_channels * bytes_per_sample;

        let data_size = self.samples.len() * bytes_per_sample as usize;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&WAV_BITS_PER_SAMPLE.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());

        for &sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            wav.extend_from_slice(&value.to_le_bytes());
        }

        wav
    }
}

impl AddAssign<&AudioBuffer> for AudioBuffer {
    fn add_assign(&mut self, rhs: &AudioBuffer) {
        self.append(rhs);
    }
}

impl Add<&AudioBuffer> for AudioBuffer {
    type Output = AudioBuffer;

    fn add(mut self, rhs: &AudioBuffer) -> AudioBuffer {
        self.append(rhs);
        self
    }
}

/// 声道转换：单声道复制到各声道，多声道取平均
fn remix(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }

    let from = from as usize;
    let to = to as usize;
    samples
        .chunks(from)
        .flat_map(|frame| {
            let mean = frame.iter().sum::<f32>() / frame.len() as f32;
            std::iter::repeat(mean).take(to)
        })
        .collect()
}

/// 简单线性重采样
fn resample(samples: &[f32], from_rate: u32, to_rate: u32, channels: u16) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let channel_count = channels as usize;
    let frame_count = samples.len() / channel_count;
    if frame_count == 0 {
        return Vec::new();
    }
    let new_frame_count = (frame_count as f64 * ratio) as usize;
    let mut resampled = Vec::with_capacity(new_frame_count * channel_count);

    for i in 0..new_frame_count {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        for ch in 0..channel_count {
            let idx0 = src_idx * channel_count + ch;
            let idx1 = ((src_idx + 1).min(frame_count - 1)) * channel_count + ch;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            // 线性插值
            resampled.push(s0 + (s1 - s0) * frac as f32);
        }
    }

    resampled
}
