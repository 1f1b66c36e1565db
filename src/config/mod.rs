//! Configuration Module
//!
//! 提供应用配置管理功能，支持多层级配置来源：
//! - 命令行参数与凭据环境变量（最高优先级）
//! - `NARRATOR_` 前缀环境变量
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）

mod loader;
mod types;

pub use loader::{
    load_config_from, print_config, validate_config, ConfigError, ConfigOverrides,
};
pub use types::{AppConfig, AudioConfig, LogConfig, PathsConfig, RetryConfig, TtsConfig, TtsProvider};
