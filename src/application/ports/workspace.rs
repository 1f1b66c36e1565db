//! Workspace Port - 工作目录抽象
//!
//! 文件系统同时承担持久化和断点续传：
//!
//! ```text
//! <root>/markdown/<document>.md                           输入文档
//! <root>/output/markdown/<document>/section_NNN.md        分段结果
//! <root>/output/audio/<document>/section_NNN.<ext>        分段音频
//! <root>/output/audio/<document>.<ext>                    合并音轨
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::AudioFormat;
use crate::domain::{DocumentName, Section};

/// 工作目录错误
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("IO error at {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Invalid UTF-8 in {0}")]
    InvalidEncoding(String),
}

impl WorkspaceError {
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Workspace Port
#[async_trait]
pub trait WorkspacePort: Send + Sync {
    /// 输入文档（`*.md`），按文件名排序
    async fn list_documents(&self) -> Result<Vec<PathBuf>, WorkspaceError>;

    /// 读取 UTF-8 文本
    async fn read_text(&self, path: &Path) -> Result<String, WorkspaceError>;

    /// 读取二进制内容
    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, WorkspaceError>;

    /// 创建文档的分段目录
    async fn prepare_sections_dir(&self, document: &DocumentName) -> Result<PathBuf, WorkspaceError>;

    /// 写入一个 Section 文件
    async fn write_section(
        &self,
        document: &DocumentName,
        section: &Section,
    ) -> Result<PathBuf, WorkspaceError>;

    /// 已分段的文档，按名称排序
    async fn list_segmented_documents(&self) -> Result<Vec<DocumentName>, WorkspaceError>;

    /// 文档的 Section 文件，按文件名排序
    async fn list_section_files(&self, document: &DocumentName) -> Result<Vec<PathBuf>, WorkspaceError>;

    /// Section 对应的分段音频路径（`section_file_stem` 为 `section_NNN`）
    fn artifact_path(
        &self,
        document: &DocumentName,
        section_file_stem: &str,
        format: AudioFormat,
    ) -> PathBuf;

    /// 文档的合并音轨路径
    fn combined_track_path(&self, document: &DocumentName, format: AudioFormat) -> PathBuf;

    /// 路径是否已存在（完成标记）
    async fn exists(&self, path: &Path) -> bool;

    /// 原子写入：先写临时文件再重命名，必要时创建父目录
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), WorkspaceError>;

    /// 含分段音频的文档，按名称排序
    async fn list_audio_documents(&self) -> Result<Vec<DocumentName>, WorkspaceError>;

    /// 文档的分段音频，按文件名排序
    async fn list_artifacts(
        &self,
        document: &DocumentName,
        format: AudioFormat,
    ) -> Result<Vec<PathBuf>, WorkspaceError>;

    /// 删除整个输出目录，返回是否实际删除
    async fn reset_output(&self) -> Result<bool, WorkspaceError>;
}
