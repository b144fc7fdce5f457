use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::TranslateResult;

const LOG_FILE_PREFIX: &str = "translator.log";
const LOG_RETENTION_DAYS: u64 = 7;

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.to_rfc3339())
    }
}

/// Installs the global subscriber: console always, plus a daily-rolling file
/// when `log_dir` is given. Safe to call more than once; later calls are
/// no-ops.
pub fn init_logger(log_dir: Option<&Path>) {
    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_timer(LocalTimer);

    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {}: {}", dir.display(), e);
            return None;
        }
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // The writer thread must outlive every span; the subscriber is global.
        std::mem::forget(guard);
        Some(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(LocalTimer)
                .boxed(),
        )
    });

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let has_file = file_layer.is_some();
    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if !installed {
        return;
    }
    if has_file {
        info!("Log system initialized (Console + File persistence)");
    } else {
        info!("Log system initialized (Console)");
    }

    if let Some(dir) = log_dir {
        match cleanup_old_logs(dir, LOG_RETENTION_DAYS) {
            Ok(deleted) if deleted > 0 => info!("Log cleanup completed: deleted {} files", deleted),
            Ok(_) => {}
            Err(e) => warn!("Failed to cleanup old logs: {}", e),
        }
    }
}

/// Deletes translator log files in `log_dir` older than `days_to_keep`.
/// Returns how many files were removed.
pub fn cleanup_old_logs(log_dir: &Path, days_to_keep: u64) -> TranslateResult<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days_to_keep.saturating_mul(86_400)))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted = 0;
    for entry in fs::read_dir(log_dir)?.flatten() {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !path.is_file() || !is_log {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if modified < cutoff {
            match fs::remove_file(&path) {
                Ok(()) => {
                    deleted += 1;
                    info!("Deleted old log file (expired): {:?}", path.file_name());
                }
                Err(e) => warn!("Failed to delete old log file {:?}: {}", path, e),
            }
        }
    }
    Ok(deleted)
}
