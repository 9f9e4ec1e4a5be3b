use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE: &str = "desk-tui.log";

/// Routes tracing output to `<log_dir>/desk-tui.log`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` filter. Set `PAPERCLIP_LOG_JSON=1`
/// for JSON lines. Keep the returned guard alive for the life of the process
/// or buffered lines are lost.
pub fn init(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let path = open_log_path(log_dir)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let (writer, guard) = non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false).with_ansi(false).with_writer(writer);
    let installed = if json_enabled() { builder.json().try_init() } else { builder.try_init() };
    // a second init (tests, re-entry) keeps the first subscriber
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
    Ok(guard)
}

fn json_enabled() -> bool {
    std::env::var("PAPERCLIP_LOG_JSON").ok().as_deref() == Some("1")
}

fn open_log_path(log_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    Ok(log_dir.join(LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let _guard = init(&logs).unwrap();
        tracing::info!("hello from test");
        assert!(logs.join(LOG_FILE).exists());
    }
}
