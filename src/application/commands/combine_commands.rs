//! Combine Commands

use std::path::PathBuf;

use crate::application::ports::AudioFormat;
use crate::domain::DocumentName;

/// 默认段间静音（毫秒）
pub const DEFAULT_GAP_MS: u64 = 1000;

/// 将每个文档的分段音频合并为一条音轨
#[derive(Debug, Clone)]
pub struct CombineTracks {
    /// 分段音频的格式（决定参与合并的文件扩展名）
    pub artifact_format: AudioFormat,
    /// 合并音轨的输出格式
    pub track_format: AudioFormat,
    /// 段间静音（毫秒）
    pub gap_ms: u64,
}

impl Default for CombineTracks {
    fn default() -> Self {
        Self {
            artifact_format: AudioFormat::Wav,
            track_format: AudioFormat::Wav,
            gap_ms: DEFAULT_GAP_MS,
        }
    }
}

/// 单个分段音频的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Appended,
    Skipped { reason: String },
}

/// 单个文档的合并结果
#[derive(Debug, Clone)]
pub struct TrackResult {
    pub document: DocumentName,
    /// 写出的合并音轨；没有可解码的分段音频时为 None
    pub track: Option<PathBuf>,
    pub duration_ms: u64,
    pub artifacts: Vec<(PathBuf, ArtifactOutcome)>,
}

/// 合并报告
#[derive(Debug, Clone, Default)]
pub struct CombineReport {
    pub tracks: Vec<TrackResult>,
    pub failed_documents: Vec<(DocumentName, String)>,
}

impl CombineReport {
    pub fn written(&self) -> usize {
        self.tracks.iter().filter(|t| t.track.is_some()).count()
    }

    pub fn skipped_artifacts(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| t.artifacts.iter())
            .filter(|(_, outcome)| matches!(outcome, ArtifactOutcome::Skipped { .. }))
            .count()
    }
}
