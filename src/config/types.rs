//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::commands::DEFAULT_GAP_MS;
use crate::application::ports::{SynthesisFormat, TtsError};
use crate::domain::backoff::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES};
use crate::domain::BackoffPolicy;
use crate::infrastructure::adapters::DEFAULT_BASE_URL;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 路径配置
    #[serde(default)]
    pub paths: PathsConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 限流重试配置
    #[serde(default)]
    pub retry: RetryConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 路径配置
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// 项目根目录，包含 markdown/ 与 output/
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// 合成服务提供方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// ElevenLabs REST 接口
    #[default]
    ElevenLabs,
    /// 离线静音合成，无需凭据
    Fake,
}

impl std::fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtsProvider::ElevenLabs => write!(f, "elevenlabs"),
            TtsProvider::Fake => write!(f, "fake"),
        }
    }
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub provider: TtsProvider,

    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// API Key（ElevenLabs 必需）
    #[serde(default)]
    pub api_key: Option<String>,

    /// 音色 ID（ElevenLabs 必需）
    #[serde(default)]
    pub voice_id: Option<String>,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// 服务端输出格式：`pcm_<采样率>` 或 `mp3_<采样率>_<比特率>`
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_output_format() -> String {
    SynthesisFormat::default().to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProvider::default(),
            url: default_tts_url(),
            api_key: None,
            voice_id: None,
            model_id: default_model_id(),
            output_format: default_output_format(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

impl TtsConfig {
    /// 解析输出格式
    pub fn synthesis_format(&self) -> Result<SynthesisFormat, TtsError> {
        self.output_format.parse()
    }
}

/// 限流重试配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 最大重试次数（不含首次尝试）
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 初始退避（秒）
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_secs: u64,

    /// 退避上限（秒）
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_initial_backoff() -> u64 {
    DEFAULT_INITIAL_DELAY.as_secs()
}

fn default_max_backoff() -> u64 {
    DEFAULT_MAX_DELAY.as_secs()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_secs: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl RetryConfig {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.max_retries,
            Duration::from_secs(self.initial_backoff_secs),
            Duration::from_secs(self.max_backoff_secs),
        )
    }
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 合并音轨中段间静音（毫秒）
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
}

fn default_gap_ms() -> u64 {
    DEFAULT_GAP_MS
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            gap_ms: default_gap_ms(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.paths.root, PathBuf::from("."));
        assert_eq!(config.tts.provider, TtsProvider::ElevenLabs);
        assert_eq!(config.tts.url, "https://api.elevenlabs.io");
        assert_eq!(config.tts.model_id, "eleven_multilingual_v2");
        assert_eq!(config.tts.output_format, "pcm_24000");
        assert_eq!(config.audio.gap_ms, 1000);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_default_backoff_policy() {
        let policy = RetryConfig::default().backoff_policy();
        assert_eq!(policy, BackoffPolicy::default());
        assert_eq!(policy.max_total_wait(), Duration::from_secs(1500));
    }

    #[test]
    fn test_synthesis_format() {
        let mut config = TtsConfig::default();
        assert_eq!(
            config.synthesis_format().unwrap(),
            SynthesisFormat::Pcm { sample_rate: 24000 }
        );
        config.output_format = "ogg".to_string();
        assert!(config.synthesis_format().is_err());
    }
}
