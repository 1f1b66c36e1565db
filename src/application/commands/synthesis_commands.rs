//! Synthesis Commands

use std::path::PathBuf;
use std::time::Duration;

use crate::application::ports::SynthesisFormat;
use crate::domain::DocumentName;

/// 为所有 Section 生成分段音频
#[derive(Debug, Clone)]
pub struct SynthesizeSections {
    pub voice_id: String,
    pub model_id: String,
    pub format: SynthesisFormat,
}

/// 单个 Section 的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// 已生成
    Generated {
        /// 总尝试次数（含首次）
        attempts: u32,
        /// 限流退避累计等待
        backoff: Duration,
    },
    /// 分段音频已存在
    SkippedExisting,
    /// Section 文本为空
    SkippedEmpty,
    Failed { reason: String },
}

/// 单个 Section 的记录
#[derive(Debug, Clone)]
pub struct SectionResult {
    pub document: DocumentName,
    pub section_file: PathBuf,
    pub artifact: PathBuf,
    pub outcome: SectionOutcome,
}

/// 合成报告
#[derive(Debug, Clone, Default)]
pub struct SynthesisReport {
    pub sections: Vec<SectionResult>,
    /// 无法列出 Section 的文档
    pub failed_documents: Vec<(DocumentName, String)>,
}

impl SynthesisReport {
    pub fn generated(&self) -> usize {
        self.count(|o| matches!(o, SectionOutcome::Generated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                SectionOutcome::SkippedExisting | SectionOutcome::SkippedEmpty
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SectionOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&SectionOutcome) -> bool) -> usize {
        self.sections.iter().filter(|s| predicate(&s.outcome)).count()
    }
}
