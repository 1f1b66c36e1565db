//! Fake TTS Client - 离线 TTS 客户端
//!
//! 不调用外部服务，按文本长度返回静音 PCM；可预置失败序列用于测试重试

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::application::ports::{
    InferRequest, InferResponse, SynthesisFormat, TtsEnginePort, TtsError,
};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每个字符对应的音频时长（毫秒）
    pub ms_per_char: u64,
    /// 最短音频时长（毫秒）
    pub min_duration_ms: u64,
    /// 模拟推理延迟（毫秒），0 表示不等待
    pub latency_ms: u64,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            ms_per_char: 60,
            min_duration_ms: 500,
            latency_ms: 0,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    /// 预置的失败，按调用顺序依次返回
    failures: Mutex<VecDeque<TtsError>>,
    calls: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self {
            config,
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 预置失败序列：前 N 次调用依次返回这些错误，之后正常合成
    pub fn with_failures(config: FakeTtsClientConfig, failures: Vec<TtsError>) -> Self {
        Self {
            config,
            failures: Mutex::new(failures.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 已收到的请求数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn duration_ms(&self, text: &str) -> u64 {
        (text.chars().count() as u64 * self.config.ms_per_char).max(self.config.min_duration_ms)
    }
}

impl Default for FakeTtsClient {
    fn default() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn infer(&self, request: InferRequest) -> Result<InferResponse, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(err) = self.failures.lock().await.pop_front() {
            tracing::debug!(error = %err, "FakeTtsClient: returning scripted failure");
            return Err(err);
        }

        let sample_rate = match request.format {
            SynthesisFormat::Pcm { sample_rate } => sample_rate,
            SynthesisFormat::Mp3 { .. } => {
                return Err(TtsError::UnsupportedFormat(request.format.to_string()));
            }
        };

        let duration_ms = self.duration_ms(&request.text);
        let frames = (sample_rate as u64 * duration_ms / 1000) as usize;
        // 单声道 s16le 静音即全零字节
        let audio_data = vec![0u8; frames * 2];

        tracing::debug!(
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            duration_ms,
            "FakeTtsClient: returning silent audio"
        );

        Ok(InferResponse {
            audio_data,
            format: request.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, format: SynthesisFormat) -> InferRequest {
        InferRequest {
            text: text.to_string(),
            voice_id: "v".to_string(),
            model_id: "m".to_string(),
            format,
        }
    }

    #[tokio::test]
    async fn test_returns_pcm_sized_by_text() {
        let client = FakeTtsClient::new(FakeTtsClientConfig {
            ms_per_char: 100,
            min_duration_ms: 0,
            latency_ms: 0,
        });
        let response = client
            .infer(request("abcde", SynthesisFormat::Pcm { sample_rate: 16000 }))
            .await
            .unwrap();
        // 5 字符 × 100ms = 0.5s，16kHz 单声道 16 位
        assert_eq!(response.audio_data.len(), 8000 * 2);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failures_then_success() {
        let client = FakeTtsClient::with_failures(
            FakeTtsClientConfig::default(),
            vec![TtsError::RateLimited("slow".into()), TtsError::Timeout],
        );
        let format = SynthesisFormat::default();

        assert!(client.infer(request("a", format)).await.unwrap_err().is_rate_limited());
        assert!(matches!(
            client.infer(request("a", format)).await,
            Err(TtsError::Timeout)
        ));
        assert!(client.infer(request("a", format)).await.is_ok());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mp3_not_supported() {
        let client = FakeTtsClient::default();
        let format = SynthesisFormat::Mp3 {
            sample_rate: 44100,
            bitrate_kbps: 128,
        };
        assert!(matches!(
            client.infer(request("a", format)).await,
            Err(TtsError::UnsupportedFormat(_))
        ));
    }
}
