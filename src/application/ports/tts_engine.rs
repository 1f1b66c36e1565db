//! TTS Engine Port - 语音合成引擎抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use super::AudioFormat;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    /// 服务端限流（HTTP 429），可退避重试
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl TtsError {
    /// 是否为限流
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TtsError::RateLimited(_))
    }
}

/// 合成输出格式
///
/// 使用服务端的格式标识：`pcm_<采样率>` 或 `mp3_<采样率>_<比特率>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisFormat {
    /// 原始 PCM（有符号 16 位小端，单声道）
    Pcm { sample_rate: u32 },
    Mp3 { sample_rate: u32, bitrate_kbps: u32 },
}

impl SynthesisFormat {
    /// 落盘的音频格式：PCM 封装为 WAV，MP3 原样保存
    pub fn artifact_format(&self) -> AudioFormat {
        match self {
            SynthesisFormat::Pcm { .. } => AudioFormat::Wav,
            SynthesisFormat::Mp3 { .. } => AudioFormat::Mp3,
        }
    }
}

impl Default for SynthesisFormat {
    fn default() -> Self {
        SynthesisFormat::Pcm { sample_rate: 24000 }
    }
}

impl std::fmt::Display for SynthesisFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisFormat::Pcm { sample_rate } => write!(f, "pcm_{}", sample_rate),
            SynthesisFormat::Mp3 {
                sample_rate,
                bitrate_kbps,
            } => write!(f, "mp3_{}_{}", sample_rate, bitrate_kbps),
        }
    }
}

impl std::str::FromStr for SynthesisFormat {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || TtsError::UnsupportedFormat(s.to_string());
        let lowered = s.trim().to_lowercase();
        let fields: Vec<&str> = lowered.split('_').collect();
        match fields.as_slice() {
            ["pcm", rate] => Ok(SynthesisFormat::Pcm {
                sample_rate: rate.parse().map_err(|_| unsupported())?,
            }),
            ["mp3", rate, kbps] => Ok(SynthesisFormat::Mp3 {
                sample_rate: rate.parse().map_err(|_| unsupported())?,
                bitrate_kbps: kbps.parse().map_err(|_| unsupported())?,
            }),
            _ => Err(unsupported()),
        }
    }
}

/// TTS 合成请求
#[derive(Debug, Clone)]
pub struct InferRequest {
    /// 要合成的文本内容
    pub text: String,
    /// 音色 ID
    pub voice_id: String,
    /// 模型 ID
    pub model_id: String,
    /// 输出格式
    pub format: SynthesisFormat,
}

/// TTS 合成响应
#[derive(Debug, Clone)]
pub struct InferResponse {
    /// 原始音频数据
    pub audio_data: Vec<u8>,
    /// `audio_data` 的实际格式
    pub format: SynthesisFormat,
}

/// TTS Engine Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 执行语音合成
    async fn infer(&self, request: InferRequest) -> Result<InferResponse, TtsError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!(
            "pcm_24000".parse::<SynthesisFormat>().unwrap(),
            SynthesisFormat::Pcm { sample_rate: 24000 }
        );
        assert_eq!(
            "mp3_44100_128".parse::<SynthesisFormat>().unwrap(),
            SynthesisFormat::Mp3 {
                sample_rate: 44100,
                bitrate_kbps: 128
            }
        );
        assert!("ulaw_8000".parse::<SynthesisFormat>().is_err());
        assert!("pcm_fast".parse::<SynthesisFormat>().is_err());
        assert!("mp3_44100".parse::<SynthesisFormat>().is_err());
    }

    #[test]
    fn test_display_round_trips_service_identifier() {
        let format = SynthesisFormat::Mp3 {
            sample_rate: 22050,
            bitrate_kbps: 32,
        };
        assert_eq!(format.to_string(), "mp3_22050_32");
        assert_eq!(SynthesisFormat::default().to_string(), "pcm_24000");
    }

    #[test]
    fn test_artifact_format() {
        assert_eq!(SynthesisFormat::default().artifact_format(), AudioFormat::Wav);
        assert_eq!(
            "mp3_44100_128".parse::<SynthesisFormat>().unwrap().artifact_format(),
            AudioFormat::Mp3
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(TtsError::RateLimited("slow down".into()).is_rate_limited());
        assert!(!TtsError::ServiceError {
            status: 401,
            message: "quota".into()
        }
        .is_rate_limited());
        assert!(!TtsError::Timeout.is_rate_limited());
    }
}
