mod action;
mod app;
mod app_state;
mod component;
mod components;
mod history;
mod navigator;
mod recorder;
mod remote;
mod scope;
mod theme;
mod widgets;

use anyhow::Context;
use tokio::sync::mpsc;

use ffm_proto::config::Config;
use ffm_proto::i18n::Catalog;
use ffm_proto::stations::StationRegistry;
use ffm_proto::token::TokenStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Load config (created with defaults on first run) ────────────────────
    let config = Config::load().unwrap_or_default();
    let data_dir = config.paths.data_dir.clone();
    std::fs::create_dir_all(&data_dir)?;

    // ── Logging to file (the terminal belongs to the TUI) ───────────────────
    let log_path = data_dir.join("ffm.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress
    // noisy connection-level DEBUG from HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("ffm log: {}", log_path.display());

    tracing::info!("francoise fm starting…");

    // ── Leaf collaborators ──────────────────────────────────────────────────
    let token = TokenStore::new(&data_dir)
        .get_or_create()
        .context("loading user token")?;
    let registry = StationRegistry::new(&data_dir);
    let catalog = Catalog::load(&config.paths.lang_dir, &config.ui.locale)
        .with_context(|| format!("loading locale {:?}", config.ui.locale))?;
    let remote = remote::RemoteClient::new(&config.server.url)
        .with_context(|| format!("parsing server url {:?}", config.server.url))?;

    // ── Channels: app messages + raw PCM from the capture callback ──────────
    let (msg_tx, msg_rx) = mpsc::channel::<app::AppMessage>(256);
    let (pcm_tx, pcm_rx) = mpsc::channel::<Vec<f32>>(64);

    // ── Terminal reader thread ──────────────────────────────────────────────
    let event_tx = msg_tx.clone();
    std::thread::spawn(move || loop {
        match ratatui::crossterm::event::read() {
            Ok(event) => {
                if event_tx.blocking_send(app::AppMessage::Event(event)).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Terminal event read failed: {}", e);
                break;
            }
        }
    });

    // ── Run TUI ─────────────────────────────────────────────────────────────
    let app = app::App::new(
        token,
        catalog,
        registry,
        remote,
        config.recording.warmup_ms,
        msg_tx,
        pcm_tx,
    );
    app.run(msg_rx, pcm_rx).await?;

    Ok(())
}
