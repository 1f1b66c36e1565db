//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行参数
//! 2. 凭据环境变量（`ELEVENLABS_API_KEY` / `ELEVENLABS_VOICE_ID`）
//! 3. 环境变量（前缀 `NARRATOR_`）
//! 4. 配置文件（narrator.toml）
//! 5. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{AppConfig, TtsProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["narrator", "narrator.local"];

/// 凭据环境变量
const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
const VOICE_ID_ENV: &str = "ELEVENLABS_VOICE_ID";

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub voice_id: Option<String>,
    pub api_key: Option<String>,
}

/// 从指定来源加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
/// - `default_root` - 未配置 `paths.root` 时使用的项目根目录
/// - `overrides` - 命令行覆盖项
///
/// # 环境变量示例
/// - `NARRATOR_PATHS__ROOT=/data/essays`
/// - `NARRATOR_TTS__PROVIDER=fake`
/// - `NARRATOR_RETRY__MAX_RETRIES=3`
pub fn load_config_from(
    config_path: Option<&Path>,
    default_root: &Path,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("paths.root", default_root.to_string_lossy().to_string())?
        .set_default("tts.provider", "elevenlabs")?
        .set_default("tts.url", "https://api.elevenlabs.io")?
        .set_default("tts.model_id", "eleven_multilingual_v2")?
        .set_default("tts.output_format", "pcm_24000")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("retry.max_retries", 5)?
        .set_default("retry.initial_backoff_secs", 60)?
        .set_default("retry.max_backoff_secs", 600)?
        .set_default("audio.gap_ms", 1000)?
        .set_default("log.level", "info")?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量，例如 NARRATOR_TTS__MODEL_ID=eleven_turbo_v2
    builder = builder.add_source(
        Environment::with_prefix("NARRATOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 凭据环境变量，再由命令行覆盖
    builder = builder
        .set_override_option("tts.api_key", non_empty_env(API_KEY_ENV))?
        .set_override_option("tts.voice_id", non_empty_env(VOICE_ID_ENV))?
        .set_override_option(
            "paths.root",
            overrides
                .root
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        )?
        .set_override_option("tts.api_key", overrides.api_key.clone())?
        .set_override_option("tts.voice_id", overrides.voice_id.clone())?;

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config, false)?;

    Ok(app_config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 验证配置有效性
///
/// `synthesizing` 为 true 时额外检查合成所需的凭据
pub fn validate_config(config: &AppConfig, synthesizing: bool) -> Result<(), ConfigError> {
    if config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.retry.initial_backoff_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Initial backoff must be greater than 0".to_string(),
        ));
    }

    if config.retry.initial_backoff_secs > config.retry.max_backoff_secs {
        return Err(ConfigError::ValidationError(format!(
            "Initial backoff ({}s) exceeds max backoff ({}s)",
            config.retry.initial_backoff_secs, config.retry.max_backoff_secs
        )));
    }

    config
        .tts
        .synthesis_format()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    if synthesizing && config.tts.provider == TtsProvider::ElevenLabs {
        if is_missing(&config.tts.api_key) {
            return Err(ConfigError::ValidationError(format!(
                "API key is required (set {} or --api-key)",
                API_KEY_ENV
            )));
        }
        if is_missing(&config.tts.voice_id) {
            return Err(ConfigError::ValidationError(format!(
                "Voice ID is required (set {} or --voice-id)",
                VOICE_ID_ENV
            )));
        }
    }

    Ok(())
}

fn is_missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// 隐藏密钥，只保留前 4 个字符
fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}****", prefix)
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Project Root: {}", config.paths.root.display());
    tracing::info!("TTS Provider: {}", config.tts.provider);
    if config.tts.provider == TtsProvider::ElevenLabs {
        tracing::info!("TTS URL: {}", config.tts.url);
        tracing::info!(
            "TTS API Key: {}",
            config
                .tts
                .api_key
                .as_deref()
                .map(mask_secret)
                .unwrap_or_else(|| "<unset>".to_string())
        );
    }
    tracing::info!(
        "TTS Voice: {}",
        config.tts.voice_id.as_deref().unwrap_or("<unset>")
    );
    tracing::info!("TTS Model: {}", config.tts.model_id);
    tracing::info!("TTS Output Format: {}", config.tts.output_format);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!(
        "Retry: {} retries, backoff {}s..{}s",
        config.retry.max_retries,
        config.retry.initial_backoff_secs,
        config.retry.max_backoff_secs
    );
    tracing::info!("Section Gap: {}ms", config.audio.gap_ms);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_synthesis_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.tts.api_key = Some("sk_test".to_string());
        config.tts.voice_id = Some("voice".to_string());
        config
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        assert!(validate_config(&AppConfig::default(), false).is_ok());
        assert!(validate_config(&valid_synthesis_config(), true).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_tts_url() {
        let mut config = AppConfig::default();
        config.tts.url = String::new();
        assert!(validate_config(&config, false).is_err());
    }

    #[test]
    fn test_validation_error_for_backoff_bounds() {
        let mut config = AppConfig::default();
        config.retry.initial_backoff_secs = 0;
        assert!(validate_config(&config, false).is_err());

        config.retry.initial_backoff_secs = 700;
        assert!(validate_config(&config, false).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_output_format() {
        let mut config = AppConfig::default();
        config.tts.output_format = "flac_44100".to_string();
        assert!(validate_config(&config, false).is_err());
    }

    #[test]
    fn test_credentials_required_only_when_synthesizing() {
        let mut config = valid_synthesis_config();
        config.tts.api_key = Some("  ".to_string());
        assert!(validate_config(&config, false).is_ok());
        assert!(validate_config(&config, true).is_err());

        let mut config = valid_synthesis_config();
        config.tts.voice_id = None;
        assert!(validate_config(&config, true).is_err());

        config.tts.provider = TtsProvider::Fake;
        config.tts.api_key = None;
        assert!(validate_config(&config, true).is_ok());
    }

    #[test]
    fn test_load_from_file_with_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("narrator.toml");
        std::fs::write(
            &path,
            r#"
[tts]
provider = "fake"
model_id = "eleven_turbo_v2"
voice_id = "from_file"

[retry]
max_retries = 2

[audio]
gap_ms = 250
"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            root: Some(PathBuf::from("/tmp/essays")),
            voice_id: Some("from_cli".to_string()),
            api_key: Some("sk_cli".to_string()),
        };
        let config = load_config_from(Some(&path), temp.path(), &overrides).unwrap();

        assert_eq!(config.paths.root, PathBuf::from("/tmp/essays"));
        assert_eq!(config.tts.provider, TtsProvider::Fake);
        assert_eq!(config.tts.model_id, "eleven_turbo_v2");
        assert_eq!(config.tts.voice_id.as_deref(), Some("from_cli"));
        assert_eq!(config.tts.api_key.as_deref(), Some("sk_cli"));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.initial_backoff_secs, 60);
        assert_eq!(config.audio.gap_ms, 250);
    }

    #[test]
    fn test_default_root_used_without_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("narrator.toml");
        std::fs::write(&path, "").unwrap();

        let config =
            load_config_from(Some(&path), temp.path(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.paths.root, temp.path());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk_1234567890"), "sk_1****");
        assert_eq!(mask_secret("abc"), "****");
    }
}
