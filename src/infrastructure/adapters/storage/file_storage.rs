//! File Storage - 文件系统工作目录实现
//!
//! 实现 WorkspacePort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{AudioFormat, WorkspaceError, WorkspacePort};
use crate::domain::{DocumentName, Section, SECTION_FILE_PREFIX};

/// 输入文档目录
const MARKDOWN_DIR: &str = "markdown";
/// 输出根目录
const OUTPUT_DIR: &str = "output";
/// 输出中的音频目录
const AUDIO_DIR: &str = "audio";
/// 文档与 Section 文件扩展名
const MARKDOWN_EXT: &str = "md";

/// 文件系统工作目录
pub struct FileWorkspace {
    /// 项目根目录
    root: PathBuf,
}

impl FileWorkspace {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// 获取项目根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/markdown`
    pub fn input_dir(&self) -> PathBuf {
        self.root.join(MARKDOWN_DIR)
    }

    /// `<root>/output`
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// `<root>/output/markdown`
    pub fn sections_root(&self) -> PathBuf {
        self.output_dir().join(MARKDOWN_DIR)
    }

    /// `<root>/output/audio`
    pub fn audio_root(&self) -> PathBuf {
        self.output_dir().join(AUDIO_DIR)
    }

    fn sections_dir(&self, document: &DocumentName) -> PathBuf {
        self.sections_root().join(document.as_str())
    }

    fn audio_dir(&self, document: &DocumentName) -> PathBuf {
        self.audio_root().join(document.as_str())
    }

    /// 列出目录下指定扩展名的文件，按文件名排序
    async fn list_files(&self, dir: &Path, ext: &str) -> Result<Vec<PathBuf>, WorkspaceError> {
        let mut files = Vec::new();
        let mut entries = read_dir(dir).await?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::io(dir, e))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && path.extension().map_or(false, |e| e == ext) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// 列出子目录作为文档名，按名称排序
    async fn list_document_dirs(&self, dir: &Path) -> Result<Vec<DocumentName>, WorkspaceError> {
        let mut documents = Vec::new();
        let mut entries = read_dir(dir).await?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::io(dir, e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            // 目录名即文档名，不能再按扩展名截断
            let dir_name = entry.file_name().to_string_lossy().to_string();
            match DocumentName::new(dir_name) {
                Ok(name) => documents.push(name),
                Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "Ignoring directory"),
            }
        }

        documents.sort();
        Ok(documents)
    }
}

async fn read_dir(dir: &Path) -> Result<fs::ReadDir, WorkspaceError> {
    fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WorkspaceError::DirectoryNotFound(dir.display().to_string())
        } else {
            WorkspaceError::io(dir, e)
        }
    })
}

#[async_trait]
impl WorkspacePort for FileWorkspace {
    async fn list_documents(&self) -> Result<Vec<PathBuf>, WorkspaceError> {
        self.list_files(&self.input_dir(), MARKDOWN_EXT).await
    }

    async fn read_text(&self, path: &Path) -> Result<String, WorkspaceError> {
        let bytes = self.read_bytes(path).await?;
        String::from_utf8(bytes).map_err(|_| WorkspaceError::InvalidEncoding(path.display().to_string()))
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, WorkspaceError> {
        fs::read(path).await.map_err(|e| WorkspaceError::io(path, e))
    }

    async fn prepare_sections_dir(&self, document: &DocumentName) -> Result<PathBuf, WorkspaceError> {
        let dir = self.sections_dir(document);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| WorkspaceError::io(&dir, e))?;

        // 清除上一次分段留下的 Section，避免文档变短后残留
        for stale in self.list_files(&dir, MARKDOWN_EXT).await? {
            let is_section = stale
                .file_name()
                .map_or(false, |n| n.to_string_lossy().starts_with(SECTION_FILE_PREFIX));
            if is_section {
                fs::remove_file(&stale)
                    .await
                    .map_err(|e| WorkspaceError::io(&stale, e))?;
                tracing::debug!(path = %stale.display(), "Stale section removed");
            }
        }

        Ok(dir)
    }

    async fn write_section(
        &self,
        document: &DocumentName,
        section: &Section,
    ) -> Result<PathBuf, WorkspaceError> {
        let path = self
            .sections_dir(document)
            .join(format!("{}.{}", section.file_stem(), MARKDOWN_EXT));
        self.write_atomic(&path, section.content().as_bytes()).await?;
        Ok(path)
    }

    async fn list_segmented_documents(&self) -> Result<Vec<DocumentName>, WorkspaceError> {
        self.list_document_dirs(&self.sections_root()).await
    }

    async fn list_section_files(&self, document: &DocumentName) -> Result<Vec<PathBuf>, WorkspaceError> {
        self.list_files(&self.sections_dir(document), MARKDOWN_EXT).await
    }

    fn artifact_path(
        &self,
        document: &DocumentName,
        section_file_stem: &str,
        format: AudioFormat,
    ) -> PathBuf {
        self.audio_dir(document)
            .join(format!("{}.{}", section_file_stem, format.extension()))
    }

    fn combined_track_path(&self, document: &DocumentName, format: AudioFormat) -> PathBuf {
        self.audio_root()
            .join(format!("{}.{}", document.as_str(), format.extension()))
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), WorkspaceError> {
        let parent = path
            .parent()
            .ok_or_else(|| WorkspaceError::io(path, "path has no parent directory"))?;

        // 确保目录存在
        fs::create_dir_all(parent)
            .await
            .map_err(|e| WorkspaceError::io(parent, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        fs::write(&tmp_path, data)
            .await
            .map_err(|e| WorkspaceError::io(&tmp_path, e))?;

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(WorkspaceError::io(path, e));
        }

        tracing::debug!(path = %path.display(), size = data.len(), "File written");
        Ok(())
    }

    async fn list_audio_documents(&self) -> Result<Vec<DocumentName>, WorkspaceError> {
        self.list_document_dirs(&self.audio_root()).await
    }

    async fn list_artifacts(
        &self,
        document: &DocumentName,
        format: AudioFormat,
    ) -> Result<Vec<PathBuf>, WorkspaceError> {
        self.list_files(&self.audio_dir(document), format.extension())
            .await
    }

    async fn reset_output(&self) -> Result<bool, WorkspaceError> {
        let output = self.output_dir();
        if !self.exists(&output).await {
            return Ok(false);
        }

        fs::remove_dir_all(&output)
            .await
            .map_err(|e| WorkspaceError::io(&output, e))?;

        tracing::info!(path = %output.display(), "Output directory removed");
        Ok(true)
    }
}
