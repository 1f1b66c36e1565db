//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::application::ports::{TranscodeError, TtsError, WorkspaceError};
use crate::domain::DocumentError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 文档错误
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// 工作目录错误
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// 外部合成服务错误
    #[error("TTS error: {0}")]
    Tts(#[from] TtsError),

    /// 编解码错误
    #[error("Transcode error: {0}")]
    Transcode(#[from] TranscodeError),
}
