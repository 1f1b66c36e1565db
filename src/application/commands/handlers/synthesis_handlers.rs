//! Synthesis Command Handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::{
    SectionOutcome, SectionResult, SynthesisReport, SynthesizeSections,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    InferRequest, InferResponse, SynthesisFormat, TtsEnginePort, TtsError, WorkspaceError,
    WorkspacePort,
};
use crate::domain::{AttemptResult, AudioBuffer, BackoffPolicy, DocumentName, RetryFailure, RetryState};

/// 合成成功时的统计
struct Synthesized {
    response: InferResponse,
    attempts: u32,
    backoff: Duration,
}

// ============================================================================
// SynthesizeSections
// ============================================================================

/// SynthesizeSections Handler - 为每个 Section 生成分段音频
///
/// 已存在的分段音频视为完成，不会再次请求；限流按 [`BackoffPolicy`] 退避重试，
/// 其他错误只让当前 Section 失败
pub struct SynthesizeSectionsHandler {
    workspace: Arc<dyn WorkspacePort>,
    tts_engine: Arc<dyn TtsEnginePort>,
    policy: BackoffPolicy,
}

impl SynthesizeSectionsHandler {
    pub fn new(
        workspace: Arc<dyn WorkspacePort>,
        tts_engine: Arc<dyn TtsEnginePort>,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            workspace,
            tts_engine,
            policy,
        }
    }

    pub async fn handle(&self, command: SynthesizeSections) -> Result<SynthesisReport, ApplicationError> {
        let mut report = SynthesisReport::default();

        let documents = match self.workspace.list_segmented_documents().await {
            Ok(documents) => documents,
            Err(WorkspaceError::DirectoryNotFound(dir)) => {
                tracing::warn!(dir = %dir, "No segmented documents, nothing to synthesize");
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };

        for document in documents {
            let section_files = match self.workspace.list_section_files(&document).await {
                Ok(files) => files,
                Err(e) => {
                    tracing::error!(document = %document, error = %e, "Cannot list sections");
                    report.failed_documents.push((document, e.to_string()));
                    continue;
                }
            };

            tracing::info!(
                document = %document,
                sections = section_files.len(),
                "Synthesizing document"
            );

            for section_file in section_files {
                let result = self.generate_audio(&command, &document, section_file).await;
                report.sections.push(result);
            }
        }

        Ok(report)
    }

    /// 处理单个 Section，所有错误都折叠进 [`SectionOutcome`]
    async fn generate_audio(
        &self,
        command: &SynthesizeSections,
        document: &DocumentName,
        section_file: PathBuf,
    ) -> SectionResult {
        let stem = section_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let artifact = self
            .workspace
            .artifact_path(document, &stem, command.format.artifact_format());

        let outcome = self
            .section_outcome(command, &section_file, &artifact)
            .await;

        match &outcome {
            SectionOutcome::Generated { attempts, backoff } => tracing::info!(
                document = %document,
                section = %stem,
                attempts,
                backoff_secs = backoff.as_secs(),
                "Section audio generated"
            ),
            SectionOutcome::SkippedExisting => {
                tracing::info!(document = %document, section = %stem, "Audio exists, skipping")
            }
            SectionOutcome::SkippedEmpty => {
                tracing::warn!(document = %document, section = %stem, "Empty section, skipping")
            }
            SectionOutcome::Failed { reason } => tracing::error!(
                document = %document,
                section = %stem,
                reason = %reason,
                "Section audio failed"
            ),
        }

        SectionResult {
            document: document.clone(),
            section_file,
            artifact,
            outcome,
        }
    }

    async fn section_outcome(
        &self,
        command: &SynthesizeSections,
        section_file: &Path,
        artifact: &Path,
    ) -> SectionOutcome {
        if self.workspace.exists(artifact).await {
            return SectionOutcome::SkippedExisting;
        }

        let text = match self.workspace.read_text(section_file).await {
            Ok(text) => text,
            Err(e) => {
                return SectionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return SectionOutcome::SkippedEmpty;
        }

        let request = InferRequest {
            text: text.to_string(),
            voice_id: command.voice_id.clone(),
            model_id: command.model_id.clone(),
            format: command.format,
        };

        let synthesized = match self.synthesize_with_backoff(request).await {
            Ok(synthesized) => synthesized,
            Err(RetryFailure::Rejected(e)) => {
                return SectionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(RetryFailure::Exhausted { attempts, last }) => {
                return SectionOutcome::Failed {
                    reason: format!("rate limited after {} attempts: {}", attempts, last),
                }
            }
        };

        let data = artifact_bytes(synthesized.response);
        if let Err(e) = self.workspace.write_atomic(artifact, &data).await {
            return SectionOutcome::Failed {
                reason: e.to_string(),
            };
        }

        SectionOutcome::Generated {
            attempts: synthesized.attempts,
            backoff: synthesized.backoff,
        }
    }

    /// 驱动退避状态机直到成功或失败
    async fn synthesize_with_backoff(
        &self,
        request: InferRequest,
    ) -> Result<Synthesized, RetryFailure<TtsError>> {
        let mut state = self.policy.start();
        let mut attempts = 0;
        let mut backoff = Duration::ZERO;

        loop {
            state = match state {
                RetryState::Attempting { attempt, delay } => {
                    attempts = attempt;
                    let result = match self.tts_engine.infer(request.clone()).await {
                        Ok(response) => AttemptResult::Success(response),
                        Err(e) if e.is_rate_limited() => AttemptResult::RateLimited(e),
                        Err(e) => AttemptResult::Failed(e),
                    };
                    self.policy.after_attempt(attempt, delay, result)
                }
                RetryState::Backoff { attempt, delay } => {
                    tracing::warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    backoff += delay;
                    self.policy.after_backoff(attempt, delay)
                }
                RetryState::Succeeded(response) => {
                    return Ok(Synthesized {
                        response,
                        attempts,
                        backoff,
                    })
                }
                RetryState::Failed(failure) => return Err(failure),
            };
        }
    }
}

/// 原始 PCM 包装为 WAV，其余格式原样保存
fn artifact_bytes(response: InferResponse) -> Vec<u8> {
    match response.format {
        SynthesisFormat::Pcm { sample_rate } => {
            AudioBuffer::from_pcm_s16le(&response.audio_data, sample_rate, 1).to_wav_bytes()
        }
        SynthesisFormat::Mp3 { .. } => response.audio_data,
    }
}
