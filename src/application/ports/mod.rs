//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_transcoder;
mod tts_engine;
mod workspace;

pub use audio_transcoder::{AudioFormat, AudioTranscoderPort, TranscodeError};
pub use tts_engine::{InferRequest, InferResponse, SynthesisFormat, TtsEnginePort, TtsError};
pub use workspace::{WorkspaceError, WorkspacePort};
