//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、AudioTranscoder、Workspace）
//! - commands: 流水线各阶段的命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    // Segment
    SegmentDocuments,
    SegmentReport,
    // Synthesis
    SectionOutcome,
    SynthesisReport,
    SynthesizeSections,
    // Combine
    CombineReport,
    CombineTracks,
    // Workspace
    ResetOutput,
    ResetOutputResponse,
    // Handlers
    handlers::{
        CombineTracksHandler, ResetOutputHandler, SegmentDocumentsHandler, SynthesizeSectionsHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio transcoder
    AudioFormat,
    AudioTranscoderPort,
    TranscodeError,
    // TTS engine
    InferRequest,
    InferResponse,
    SynthesisFormat,
    TtsEnginePort,
    TtsError,
    // Workspace
    WorkspaceError,
    WorkspacePort,
};
