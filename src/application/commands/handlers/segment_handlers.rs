//! Segment Command Handlers

use std::path::Path;
use std::sync::Arc;

use crate::application::commands::{SegmentDocuments, SegmentFailure, SegmentReport, SegmentedDocument};
use crate::application::error::ApplicationError;
use crate::application::ports::{WorkspaceError, WorkspacePort};
use crate::domain::{segment_document, DocumentName};

/// SegmentDocuments Handler - 把输入文档切分为 Section 文件
pub struct SegmentDocumentsHandler {
    workspace: Arc<dyn WorkspacePort>,
}

impl SegmentDocumentsHandler {
    pub fn new(workspace: Arc<dyn WorkspacePort>) -> Self {
        Self { workspace }
    }

    /// 逐个处理输入文档；单个文档失败只记录并跳过
    pub async fn handle(&self, _command: SegmentDocuments) -> Result<SegmentReport, ApplicationError> {
        let mut report = SegmentReport::default();

        let sources = match self.workspace.list_documents().await {
            Ok(sources) => sources,
            Err(WorkspaceError::DirectoryNotFound(dir)) => {
                tracing::warn!(dir = %dir, "Input directory not found, nothing to segment");
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };

        for source in sources {
            match self.segment_one(&source).await {
                Ok(segmented) => {
                    tracing::info!(
                        document = %segmented.document,
                        sections = segmented.section_count,
                        "Document segmented"
                    );
                    report.segmented.push(segmented);
                }
                Err(e) => {
                    tracing::error!(source = %source.display(), error = %e, "Skipping document");
                    report.failed.push(SegmentFailure {
                        source,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn segment_one(&self, source: &Path) -> Result<SegmentedDocument, ApplicationError> {
        let document = DocumentName::from_path(source)?;
        let text = self.workspace.read_text(source).await?;

        let sections_dir = self.workspace.prepare_sections_dir(&document).await?;
        let sections = segment_document(&text);

        for section in &sections {
            self.workspace.write_section(&document, section).await?;
        }

        Ok(SegmentedDocument {
            document,
            sections_dir,
            section_count: sections.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::FileWorkspace;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, Arc<FileWorkspace>) {
        let temp = TempDir::new().unwrap();
        let workspace = Arc::new(FileWorkspace::new(temp.path()));
        std::fs::create_dir_all(workspace.input_dir()).unwrap();
        for (name, content) in files {
            std::fs::write(workspace.input_dir().join(name), content).unwrap();
        }
        (temp, workspace)
    }

    #[tokio::test]
    async fn test_segments_documents_into_section_files() {
        let (_temp, workspace) = setup(&[(
            "essay.md",
            "# Title\n\nPara one.\n\n- item a\n- item b\n\nThe end \u{2014} really.",
        )]);
        let handler = SegmentDocumentsHandler::new(workspace.clone());

        let report = handler.handle(SegmentDocuments).await.unwrap();
        assert_eq!(report.segmented.len(), 1);
        assert_eq!(report.total_sections(), 4);

        let dir = workspace.sections_root().join("essay");
        assert_eq!(std::fs::read_to_string(dir.join("section_001.md")).unwrap(), "Title");
        assert_eq!(std::fs::read_to_string(dir.join("section_002.md")).unwrap(), "Para one.");
        assert_eq!(
            std::fs::read_to_string(dir.join("section_003.md")).unwrap(),
            "- item a\n- item b"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("section_004.md")).unwrap(),
            "The end.  really."
        );
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped() {
        let (_temp, workspace) = setup(&[("b_good.md", "Fine.")]);
        std::fs::write(workspace.input_dir().join("a_bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let handler = SegmentDocumentsHandler::new(workspace.clone());

        let report = handler.handle(SegmentDocuments).await.unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].source.ends_with("a_bad.md"));
        assert_eq!(report.segmented.len(), 1);
        assert_eq!(report.segmented[0].document.as_str(), "b_good");
        assert!(workspace
            .sections_root()
            .join("b_good/section_001.md")
            .exists());
    }

    #[tokio::test]
    async fn test_missing_input_dir_yields_empty_report() {
        let temp = TempDir::new().unwrap();
        let handler = SegmentDocumentsHandler::new(Arc::new(FileWorkspace::new(temp.path())));
        let report = handler.handle(SegmentDocuments).await.unwrap();
        assert!(report.segmented.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_gets_directory_but_no_sections() {
        let (_temp, workspace) = setup(&[("blank.md", "\n\n   \n")]);
        let handler = SegmentDocumentsHandler::new(workspace.clone());

        let report = handler.handle(SegmentDocuments).await.unwrap();
        assert_eq!(report.segmented[0].section_count, 0);
        let dir = workspace.sections_root().join("blank");
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_resegmenting_shorter_document_drops_stale_sections() {
        let (_temp, workspace) = setup(&[("essay.md", "One.\n\nTwo.\n\nThree.")]);
        let handler = SegmentDocumentsHandler::new(workspace.clone());
        handler.handle(SegmentDocuments).await.unwrap();

        std::fs::write(workspace.input_dir().join("essay.md"), "Only one now.").unwrap();
        let report = handler.handle(SegmentDocuments).await.unwrap();
        assert_eq!(report.total_sections(), 1);

        let dir = workspace.sections_root().join("essay");
        let mut names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["section_001.md"]);
        assert_eq!(
            std::fs::read_to_string(dir.join("section_001.md")).unwrap(),
            "Only one now."
        );
    }
}
