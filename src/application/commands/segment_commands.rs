//! Segment Commands

use std::path::PathBuf;

use crate::domain::DocumentName;

/// 对所有输入文档分段
#[derive(Debug, Clone, Default)]
pub struct SegmentDocuments;

/// 分段成功的文档
#[derive(Debug, Clone)]
pub struct SegmentedDocument {
    pub document: DocumentName,
    pub sections_dir: PathBuf,
    pub section_count: usize,
}

/// 被跳过的文档
#[derive(Debug, Clone)]
pub struct SegmentFailure {
    pub source: PathBuf,
    pub reason: String,
}

/// 分段报告
#[derive(Debug, Clone, Default)]
pub struct SegmentReport {
    pub segmented: Vec<SegmentedDocument>,
    pub failed: Vec<SegmentFailure>,
}

impl SegmentReport {
    pub fn total_sections(&self) -> usize {
        self.segmented.iter().map(|d| d.section_count).sum()
    }
}
