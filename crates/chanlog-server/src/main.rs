//! chanlog server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! cache and serves the channel history API over HTTP until SIGINT/SIGTERM.
//!
//! # Token hash generation
//!
//! To generate the argon2 PHC string for `api_token_hash`:
//!
//! ```
//! echo -n 's3cret' | cargo run -p chanlog-server -- --hash-token
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use chanlog_core::{store::HistoryStore as _, sync::SyncEngine};
use chanlog_crawler::TelegramCrawler;
use chanlog_server::{ServerConfig, auth::{AuthConfig, hash_token}};
use chanlog_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cached channel history server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a token read from stdin and exit.
  #[arg(long)]
  hash_token: bool,

  /// Print the cached channels and when each was last merged, then exit.
  #[arg(long)]
  list_channels: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_token {
    let token = read_token()?;
    let hash = hash_token(&token).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // `CHANLOG_PORT=9000`, `CHANLOG_SYNC__MAX_BACKFILL_PAGES=50`, ...
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CHANLOG")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.list_channels {
    let channels = store.list_channels().await.context("failed to list channels")?;
    for channel in &channels {
      println!("{}\t{}", channel.channel_id, channel.updated_at.to_rfc3339());
    }
    store.close().await.context("failed to close store")?;
    return Ok(());
  }

  let store = Arc::new(store);

  let crawler = TelegramCrawler::new(&server_cfg.crawler).context("failed to build crawler")?;
  let engine = SyncEngine::new(store.clone(), Arc::new(crawler), server_cfg.sync.clone());

  if server_cfg.api_token_hash.is_none() {
    tracing::warn!("api_token_hash is not set; the API is open to anyone");
  }
  let auth = AuthConfig { token_hash: server_cfg.api_token_hash.clone() };

  let app = chanlog_server::router(
    Arc::new(engine),
    Arc::new(auth),
    Duration::from_secs(server_cfg.request_timeout_secs),
  );
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(store = %store_path.display(), "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  match Arc::try_unwrap(store) {
    Ok(store) => store.close().await.context("failed to close store")?,
    Err(_) => tracing::warn!("store still in use at shutdown; leaving it to drop"),
  }
  tracing::info!("shut down");

  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutdown signal received");
}

/// Read a token from stdin.
fn read_token() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("Token: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let token = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!token.is_empty(), "empty token");
  Ok(token)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
