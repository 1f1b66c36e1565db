//! Combine Command Handlers

use std::path::Path;
use std::sync::Arc;

use crate::application::commands::{ArtifactOutcome, CombineReport, CombineTracks, TrackResult};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioTranscoderPort, TranscodeError, WorkspaceError, WorkspacePort,
};
use crate::domain::{AudioBuffer, DocumentName};

/// CombineTracks Handler - 按 Section 顺序拼接分段音频，段间插入静音
pub struct CombineTracksHandler {
    workspace: Arc<dyn WorkspacePort>,
    transcoder: Arc<dyn AudioTranscoderPort>,
}

impl CombineTracksHandler {
    pub fn new(workspace: Arc<dyn WorkspacePort>, transcoder: Arc<dyn AudioTranscoderPort>) -> Self {
        Self {
            workspace,
            transcoder,
        }
    }

    pub async fn handle(&self, command: CombineTracks) -> Result<CombineReport, ApplicationError> {
        let mut report = CombineReport::default();

        if !self.transcoder.supports_format(command.track_format) {
            return Err(TranscodeError::UnsupportedFormat(command.track_format.to_string()).into());
        }

        let documents = match self.workspace.list_audio_documents().await {
            Ok(documents) => documents,
            Err(WorkspaceError::DirectoryNotFound(dir)) => {
                tracing::warn!(dir = %dir, "No audio directory, nothing to combine");
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };

        for document in documents {
            match self.combine_document(&command, &document).await {
                Ok(track) => report.tracks.push(track),
                Err(e) => {
                    tracing::error!(document = %document, error = %e, "Cannot combine document");
                    report.failed_documents.push((document, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn combine_document(
        &self,
        command: &CombineTracks,
        document: &DocumentName,
    ) -> Result<TrackResult, ApplicationError> {
        let mut artifacts = self
            .workspace
            .list_artifacts(document, command.artifact_format)
            .await?;
        // section_NNN 零填充，文件名顺序即 Section 顺序
        artifacts.sort();

        let mut combined: Option<AudioBuffer> = None;
        let mut outcomes = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            let clip = match self.load_clip(command, &artifact).await {
                Ok(clip) => clip,
                Err(e) => {
                    tracing::warn!(artifact = %artifact.display(), error = %e, "Skipping artifact");
                    outcomes.push((artifact, ArtifactOutcome::Skipped { reason: e.to_string() }));
                    continue;
                }
            };

            match combined.as_mut() {
                Some(track) => {
                    let gap = AudioBuffer::silence(command.gap_ms, track.sample_rate(), track.channels());
                    *track += &gap;
                    *track += &clip;
                }
                None => combined = Some(clip),
            }
            outcomes.push((artifact, ArtifactOutcome::Appended));
        }

        let Some(track) = combined else {
            tracing::warn!(document = %document, "No decodable audio, track not written");
            return Ok(TrackResult {
                document: document.clone(),
                track: None,
                duration_ms: 0,
                artifacts: outcomes,
            });
        };

        let data = self.transcoder.encode(&track, command.track_format)?;
        let path = self
            .workspace
            .combined_track_path(document, command.track_format);
        self.workspace.write_atomic(&path, &data).await?;

        tracing::info!(
            document = %document,
            path = %path.display(),
            duration_ms = track.duration_ms(),
            "Combined track written"
        );

        Ok(TrackResult {
            document: document.clone(),
            track: Some(path),
            duration_ms: track.duration_ms(),
            artifacts: outcomes,
        })
    }

    async fn load_clip(
        &self,
        command: &CombineTracks,
        artifact: &Path,
    ) -> Result<AudioBuffer, ApplicationError> {
        let data = self.workspace.read_bytes(artifact).await?;
        let clip = self
            .transcoder
            .decode(&data, Some(command.artifact_format))?;
        Ok(clip)
    }
}
