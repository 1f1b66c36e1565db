//! Narrator - Markdown 文档转有声朗读
//!
//! 流水线：
//! - 分段: markdown/<doc>.md -> output/markdown/<doc>/section_NNN.md
//! - 合成: 每个 Section -> output/audio/<doc>/section_NNN.wav
//! - 合并: 分段音频 + 段间静音 -> output/audio/<doc>.wav

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgGroup, Parser};

use narrator::application::{
    CombineTracks, CombineTracksHandler, ResetOutput, ResetOutputHandler, SegmentDocuments,
    SegmentDocumentsHandler, SynthesizeSections, SynthesizeSectionsHandler, TtsEnginePort,
};
use narrator::config::{
    load_config_from, print_config, validate_config, AppConfig, ConfigOverrides, TtsProvider,
};
use narrator::infrastructure::adapters::{
    FakeTtsClient, FileWorkspace, HttpTtsClient, HttpTtsClientConfig, WavTranscoder,
};

/// 将 Markdown 文档转换为 ElevenLabs 朗读音频
#[derive(Parser, Debug)]
#[command(name = "narrator", version)]
#[command(about = "Convert Markdown files to narrated audio using the ElevenLabs API")]
#[command(group(
    ArgGroup::new("mode")
        .args(["markdown_only", "audio_only", "combine_only"])
        .multiple(false)
))]
struct Cli {
    /// Voice ID to use. Defaults to ELEVENLABS_VOICE_ID
    #[arg(long)]
    voice_id: Option<String>,

    /// API key for ElevenLabs. Defaults to ELEVENLABS_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Delete all previous output before running (may incur new API costs)
    #[arg(long)]
    reset: bool,

    /// Only split the Markdown documents into sections
    #[arg(long)]
    markdown_only: bool,

    /// Only synthesize audio for existing sections
    #[arg(long)]
    audio_only: bool,

    /// Only combine existing section audio into tracks
    #[arg(long)]
    combine_only: bool,

    /// Project root containing markdown/ (defaults to the directory of .env)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "NARRATOR_CONFIG")]
    config: Option<PathBuf>,
}

/// 本次运行要执行的阶段
#[derive(Debug, Clone, Copy)]
struct Phases {
    segment: bool,
    synthesize: bool,
    combine: bool,
}

impl Cli {
    fn phases(&self) -> Phases {
        Phases {
            segment: !self.audio_only && !self.combine_only,
            synthesize: !self.markdown_only && !self.combine_only,
            combine: !self.markdown_only && !self.audio_only,
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            voice_id: self.voice_id.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let phases = cli.phases();

    // .env 所在目录作为默认项目根目录
    let default_root = match dotenvy::dotenv() {
        Ok(env_path) => env_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        Err(_) => PathBuf::from("."),
    };

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let config = load_config_from(cli.config.as_deref(), &default_root, &cli.overrides())
        .context("Failed to load config")?;
    validate_config(&config, phases.synthesize).context("Invalid configuration")?;

    // 初始化日志
    let log_filter = format!("{},narrator={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Narrator - Markdown to audio");
    print_config(&config);

    let workspace = Arc::new(FileWorkspace::new(&config.paths.root));

    if cli.reset {
        ResetOutputHandler::new(workspace.clone())
            .handle(ResetOutput)
            .await
            .context("Failed to reset output directory")?;
    }

    if phases.segment {
        let report = SegmentDocumentsHandler::new(workspace.clone())
            .handle(SegmentDocuments)
            .await?;
        tracing::info!(
            documents = report.segmented.len(),
            sections = report.total_sections(),
            failed = report.failed.len(),
            "Segmentation finished"
        );
    }

    let format = config
        .tts
        .synthesis_format()
        .context("Invalid TTS output format")?;

    if phases.synthesize {
        let tts_engine = build_tts_engine(&config)?;
        if !tts_engine.health_check().await {
            tracing::warn!("TTS health check failed, continuing anyway");
        }

        let command = SynthesizeSections {
            voice_id: config.tts.voice_id.clone().unwrap_or_default(),
            model_id: config.tts.model_id.clone(),
            format,
        };
        let report = SynthesizeSectionsHandler::new(
            workspace.clone(),
            tts_engine,
            config.retry.backoff_policy(),
        )
        .handle(command)
        .await?;
        tracing::info!(
            generated = report.generated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Synthesis finished"
        );
    }

    if phases.combine {
        let command = CombineTracks {
            artifact_format: format.artifact_format(),
            gap_ms: config.audio.gap_ms,
            ..Default::default()
        };
        let report = CombineTracksHandler::new(workspace.clone(), Arc::new(WavTranscoder::new()))
            .handle(command)
            .await?;
        tracing::info!(
            tracks = report.written(),
            skipped_artifacts = report.skipped_artifacts(),
            failed_documents = report.failed_documents.len(),
            "Combine finished"
        );
    }

    Ok(())
}

/// 按配置创建合成引擎
fn build_tts_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    match config.tts.provider {
        TtsProvider::ElevenLabs => {
            let tts_config = HttpTtsClientConfig::new(
                config.tts.url.clone(),
                config.tts.api_key.clone().unwrap_or_default(),
            )
            .with_timeout(config.tts.timeout_secs);
            Ok(Arc::new(HttpTtsClient::new(tts_config)?))
        }
        TtsProvider::Fake => Ok(Arc::new(FakeTtsClient::default())),
    }
}
