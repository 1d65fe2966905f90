//! Headless host: loads a scenario, runs it and logs every dispatch.
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use armada_content::ContentFactory;
use armada_core::ClientEvent;
use armada_runtime::{Event, Runtime, Topic};
use config::ServerConfig;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _guard = setup_logging(&config)?;

    let factory = ContentFactory::new(&config.data_dir);
    let mut spec = factory.load_scenario(&config.scenario)?;
    let mut game_config = match spec.config.take() {
        Some(own) => own,
        None => factory.load_config()?,
    };
    game_config.seed = config.seed.resolve(game_config.seed);
    let scenario = spec
        .build_with(&game_config)
        .with_context(|| format!("scenario '{}' from {}", config.scenario, config.data_dir.display()))?;

    info!(
        target: "armada::server",
        scenario = %config.scenario,
        seed = game_config.seed,
        teams = scenario.teams().len(),
        ships = scenario.ships().len(),
        "scenario loaded"
    );
    let teams: Vec<_> = scenario.teams().iter().map(|team| team.id()).collect();

    let runtime = Runtime::start(config.runtime.clone(), scenario).await?;
    let handle = runtime.handle();
    let mut events = handle.subscribe(Topic::All)?;

    for team in teams {
        let state = handle.sync(team).await?;
        debug!(
            target: "armada::server",
            %team,
            payload = %serde_json::to_string(&state)?,
            "initial sync"
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(target: "armada::server", "interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    log_event(&event)?;
                    if is_game_over(&event) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "armada::server", skipped, "event log lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    runtime.shutdown().await?;
    info!(target: "armada::server", "server stopped");
    Ok(())
}

fn log_event(event: &Event) -> Result<()> {
    let payload = serde_json::to_string(event)?;
    match event {
        Event::Dispatch(dispatch) => {
            debug!(target: "armada::server", team = %dispatch.team, %payload, "dispatch");
        }
        Event::TurnTimedOut { player } => {
            info!(target: "armada::server", ?player, "turn timed out");
        }
    }
    Ok(())
}

fn is_game_over(event: &Event) -> bool {
    match event {
        Event::Dispatch(dispatch) => match dispatch.event {
            ClientEvent::GameOver { winner } => {
                info!(target: "armada::server", ?winner, "game over");
                true
            }
            _ => false,
        },
        Event::TurnTimedOut { .. } => false,
    }
}

/// Setup logging to both stderr and a session log file
fn setup_logging(config: &ServerConfig) -> Result<WorkerGuard> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);
    let session_id = config.session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{}", timestamp)
    });

    let session_log_dir = log_dir.join(&session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("failed to create {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "server.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/server.log", session_log_dir.display());

    Ok(guard)
}

/// Get the platform-specific log directory
fn get_log_directory() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Caches/armada/logs");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg_cache) = std::env::var_os("XDG_CACHE_HOME") {
            return PathBuf::from(xdg_cache).join("armada/logs");
        } else if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".cache/armada/logs");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(local_appdata) = std::env::var_os("LOCALAPPDATA") {
            return PathBuf::from(local_appdata).join("armada/logs");
        }
    }

    // Fallback
    std::env::temp_dir().join("armada/logs")
}
