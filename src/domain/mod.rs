//! Domain Layer - 领域层
//!
//! - Document Context: 文档与 Section
//! - 文本分割器: Markdown 规范化与分段
//! - 音频缓冲区: 静音生成、拼接、WAV 编码
//! - 限流退避: 合成重试状态机

pub mod audio;
pub mod backoff;
pub mod document;

mod text_segmenter;

pub use audio::AudioBuffer;
pub use backoff::{AttemptResult, BackoffPolicy, RetryFailure, RetryState};
pub use document::{DocumentError, DocumentName, Section, SECTION_FILE_PREFIX};
pub use text_segmenter::{normalize_text, segment_document};
