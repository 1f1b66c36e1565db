//! Narrator - Markdown 文档转有声朗读
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Document Context: 文档名与 Section
//! - 文本分割器、音频缓冲区、限流退避状态机
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, AudioTranscoder, Workspace）
//! - Commands: 分段、合成、合并、重置四个命令及处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: ElevenLabs / Fake TTS Client, WAV Transcoder, File Workspace

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config_from, AppConfig};
