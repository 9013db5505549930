//! Logging to stderr and to a per-session file.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::CliConfig;

const LOG_FILE: &str = "battle.log";

/// Installs the global subscriber.
///
/// Keep the returned guard alive for the whole run; dropping it flushes and
/// stops the file writer.
pub fn setup_logging(config: &CliConfig) -> Result<WorkerGuard> {
    let session_id = config.session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{}", timestamp)
    });

    let log_root = config.log_dir.clone().unwrap_or_else(default_log_directory);
    let session_log_dir = log_root.join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(session = %session_id, "Logging initialized");
    tracing::info!("Log file: {}", session_log_dir.join(LOG_FILE).display());

    Ok(guard)
}

/// Platform cache directory, e.g. `~/.cache/battle-sim/logs` on Linux.
fn default_log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "battle-sim")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("battle-sim").join("logs"))
}
