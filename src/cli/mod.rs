mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::config::{self, AppConfig};
use crate::engine::Engine;
use crate::providers;
use crate::storage::{SessionStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "asciigen", version, about = "ASCII art chat studio for the terminal")]
struct Cli {
    /// Non-interactive mode: render one prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Art width in characters (overrides config)
    #[arg(long)]
    cols: Option<u32>,

    /// Working directory
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Resume a previous session by key
    #[arg(long)]
    session: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

pub struct App {
    pub engine: Engine,
    pub config: AppConfig,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = config::load_config(cli.working_dir.clone()).map_err(|e| anyhow::anyhow!("{e}"))?;

    if !config.has_credentials() {
        anyhow::bail!(
            "No Workers AI credentials found. Set CLOUDFLARE_ACCOUNT_ID and CLOUDFLARE_API_TOKEN env vars, or add them to the config file."
        );
    }

    let columns = cli.cols.unwrap_or(config.columns);
    if columns == 0 {
        anyhow::bail!("--cols must be greater than zero");
    }

    let store = SqliteStore::open(&config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    store
        .run_migrations()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let (chat, image) = providers::create_backends(&config).map_err(|e| anyhow::anyhow!("{e}"))?;
    let sessions = SessionStore::new(Arc::new(store));
    let engine = Engine::new(sessions, chat, image, columns);
    let app = App { engine, config };

    if let Some(prompt) = cli.prompt {
        let art = app
            .engine
            .generate_direct(&prompt, columns)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        print!("{art}");
        Ok(())
    } else {
        repl::run(app, cli.session).await
    }
}
