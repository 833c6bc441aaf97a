pub mod infrastructure;
pub mod modules;
pub mod shared;
pub mod terminal;
pub mod ui;

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use infrastructure::AppState;
use modules::chat::ScriptedModelAdapter;
use modules::config::ApiKey;
use modules::contact::HttpFormEndpoint;
use modules::ConfigModule;
use shared::AppResult;
use ui::Site;

// 启动参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "eloytext")]
#[command(about = "EloyText live chat and contact form in the terminal")]
#[command(version)]
pub struct RunOptions {
    /// Use the offline scripted model instead of Gemini
    #[arg(long)]
    pub offline: bool,
}

pub async fn run(options: RunOptions) -> AppResult<()> {
    // 初始化日志，输出到 stderr 以免与聊天内容混在一起
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("EloyText starting...");

    let mut config = ConfigModule::from_env().load()?;

    let state = if options.offline {
        tracing::info!("Running with the offline scripted model");
        if config.chat.api_key.is_none() {
            config.chat.api_key = ApiKey::new("offline");
        }
        AppState::with_ports(
            config,
            Arc::new(ScriptedModelAdapter::new()),
            Arc::new(HttpFormEndpoint::new()?),
        )
    } else {
        AppState::from_config(config)?
    };

    let site = Site::mount(&state);
    terminal::run_terminal(site, state.event_bus.clone()).await
}
