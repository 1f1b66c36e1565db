//! Audio Transcoder Port - 音频编解码抽象
//!
//! 解码已保存的音频为内存缓冲区，并把缓冲区编码为目标格式

use thiserror::Error;

use crate::domain::AudioBuffer;

/// 编解码错误
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// 音频文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
}

impl AudioFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Audio Transcoder Port
///
/// 音频容器的抽象接口
pub trait AudioTranscoderPort: Send + Sync {
    /// 解码音频数据
    ///
    /// # Arguments
    /// * `data` - 完整的音频文件内容
    /// * `hint` - 已知的容器格式，用于加速探测
    fn decode(&self, data: &[u8], hint: Option<AudioFormat>) -> Result<AudioBuffer, TranscodeError>;

    /// 编码为目标格式
    fn encode(&self, buffer: &AudioBuffer, format: AudioFormat) -> Result<Vec<u8>, TranscodeError>;

    /// 是否支持编码为指定格式
    fn supports_format(&self, format: AudioFormat) -> bool;
}
