//! voxbundle - 命令行入口
//!
//! 获取（可选）→ 准备模型包 → 合成

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser};

use voxbundle::application::{
    AcquireBundleCommand, AcquireBundleHandler, EngineLoaderPort, ModelRegistryPort,
    PrepareBundleCommand, PrepareBundleHandler, SynthesisOrchestrator, SynthesizeCommand,
};
use voxbundle::config::{load_config_from_path, print_config, AppConfig, LogConfig};
use voxbundle::domain::bundle::BundleLocation;
use voxbundle::infrastructure::adapters::{
    FakeEngineLoader, HttpEngineConfig, HttpEngineLoader, HttpModelRegistry, HttpRegistryConfig,
    LocalModelRegistry, PthSpeakerTable,
};

/// Text-to-speech CLI for VITS-based model bundles
#[derive(Debug, Parser)]
#[command(name = "voxbundle", version)]
struct Cli {
    /// Input text to be synthesized
    #[arg(long, required_unless_present = "list_speakers")]
    text: Option<String>,

    /// Path to the local model bundle
    #[arg(long)]
    local_path: Option<PathBuf>,

    /// The speaker voice to use
    #[arg(long)]
    speaker: Option<String>,

    /// The language the text is in
    #[arg(long)]
    language: Option<String>,

    /// Whether to save the output as a WAV file
    #[arg(long, action = ArgAction::Set)]
    save_file: Option<bool>,

    /// File path to save the generated audio
    #[arg(long)]
    file_path: Option<String>,

    /// Model registry to fetch the bundle from (URL or directory)
    #[arg(long)]
    source: Option<String>,

    /// Model name inside the registry
    #[arg(long)]
    model_name: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the built-in fake engine instead of the inference service
    #[arg(long)]
    fake_engine: bool,

    /// Print the bundle's speaker ids and exit
    #[arg(long)]
    list_speakers: bool,
}

impl Cli {
    /// 命令行参数覆盖配置文件
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.local_path {
            config.bundle.local_path = path.clone();
        }
        if let Some(name) = &self.model_name {
            config.bundle.model_name = name.clone();
        }
        if let Some(source) = &self.source {
            config.registry.source = Some(source.clone());
        }
        if let Some(save) = self.save_file {
            config.output.save_file = save;
        }
        if let Some(path) = &self.file_path {
            config.output.file_path = path.clone();
        }
        if self.fake_engine {
            config.engine.fake = true;
        }
    }
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},voxbundle={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let mut config =
        load_config_from_path(cli.config.as_deref()).context("Failed to load config")?;
    cli.apply_overrides(&mut config);

    init_tracing(&config.log);
    print_config(&config);

    let mut location = BundleLocation::new(&config.bundle.local_path);

    if let Some(source) = config.registry.source.clone() {
        let registry: Arc<dyn ModelRegistryPort> = if config.registry.is_remote() {
            Arc::new(HttpModelRegistry::new(HttpRegistryConfig {
                timeout_secs: config.registry.timeout_secs,
            })?)
        } else {
            Arc::new(LocalModelRegistry::new())
        };

        location = AcquireBundleHandler::new(registry).handle(AcquireBundleCommand {
            source,
            destination: config.bundle.local_path.clone(),
            model_name: config.bundle.model_name.clone(),
        })?;
    }

    let engine_loader: Arc<dyn EngineLoaderPort> = if config.engine.fake {
        Arc::new(FakeEngineLoader::default())
    } else {
        let engine_config =
            HttpEngineConfig::new(&config.engine.url).with_timeout(config.engine.timeout_secs);
        Arc::new(HttpEngineLoader::new(engine_config)?)
    };

    let prepared = PrepareBundleHandler::new(engine_loader, Arc::new(PthSpeakerTable::new()))
        .handle(PrepareBundleCommand { location })?;
    let orchestrator = SynthesisOrchestrator::new(prepared);

    if cli.list_speakers {
        if orchestrator.capabilities().has_speakers() {
            for id in orchestrator.speaker_ids() {
                println!("{}", id);
            }
        } else {
            println!("Bundle has no speaker table.");
        }
        return Ok(());
    }

    let text = cli.text.context("--text is required")?;
    let mut cmd = SynthesizeCommand::new(text);
    cmd.speaker = cli.speaker;
    cmd.language = cli.language;
    cmd.save = config.output.save_file;
    cmd.output_path = config.output.file_path.clone();

    let result = orchestrator.synthesize(cmd)?;

    match result.output_path {
        Some(path) => println!("Generated audio saved at: {}", path),
        None => println!("Audio generated."),
    }

    Ok(())
}
