use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{self, fmt, prelude::*};

const LOG_RETENTION_DAYS: u64 = 7;

/// Get the log directory path in the user-specific OS cache directory
/// - Linux: ~/.cache/lsp-highlight/
/// - macOS: ~/Library/Caches/lsp-highlight/
/// - Windows: %LOCALAPPDATA%\lsp-highlight\
fn get_log_dir() -> io::Result<PathBuf> {
    let mut log_dir = dirs::cache_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Unable to determine user cache directory"))?;
    log_dir.push("lsp-highlight");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    Ok(log_dir)
}

/// Remove session logs older than `retention`
fn cleanup_old_logs(log_dir: &Path, retention: Duration) -> io::Result<()> {
    let now = SystemTime::now();

    for entry in fs::read_dir(log_dir)?.flatten() {
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let is_session_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with("session-") && name.ends_with(".log"));
        if !is_session_log {
            continue;
        }

        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > retention);
        if expired {
            if let Err(e) = fs::remove_file(entry.path()) {
                eprintln!("Failed to remove old log file {:?}: {}", entry.path(), e);
            }
        }
    }

    Ok(())
}

/// Initialize logger with stderr and optional file output
/// Returns a WorkerGuard that must be kept alive for the duration of the program
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `enable_file_logging` - Also write a DEBUG-level session log to the cache directory
///
/// Installing a second subscriber is not an error, so tests may call this repeatedly.
pub fn init_logger(no_color: bool, log_level: Option<&str>, enable_file_logging: bool) -> io::Result<WorkerGuard> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    if !enable_file_logging {
        let (_, guard) = tracing_appender::non_blocking(std::io::sink());
        // try_init only fails when a global subscriber or `log` logger is already installed
        if let Err(e) = tracing_subscriber::registry().with(stderr_layer).try_init() {
            tracing::debug!("Keeping existing logger: {}", e);
        }
        return Ok(guard);
    }

    let log_dir = get_log_dir()?;
    cleanup_old_logs(&log_dir, Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60))?;

    let timestamp = time::OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let log_path = log_dir.join(format!("session-{}-{}.log", timestamp, std::process::id()));

    let file = fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_ansi(false)
        .with_filter(tracing_subscriber::EnvFilter::new("debug"));

    if let Err(e) = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        tracing::debug!("Keeping existing logger: {}", e);
    }
    eprintln!("Logging to file: {:?}", log_path);
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_session_logs() {
        let dir = tempfile::tempdir().unwrap();
        let old_session = dir.path().join("session-20240101-000000-1.log");
        let fresh_session = dir.path().join("session-20240102-000000-2.log");
        let unrelated = dir.path().join("notes.log");
        for path in [&old_session, &fresh_session, &unrelated] {
            fs::write(path, "log").unwrap();
        }

        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        for path in [&old_session, &unrelated] {
            fs::File::options()
                .write(true)
                .open(path)
                .unwrap()
                .set_modified(an_hour_ago)
                .unwrap();
        }

        cleanup_old_logs(dir.path(), Duration::from_secs(60)).unwrap();

        assert!(!old_session.exists());
        assert!(fresh_session.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_init_logger_twice_is_tolerated() {
        let first = init_logger(true, Some("warn"), false);
        let second = init_logger(true, Some("debug"), false);
        assert!(first.is_ok());
        assert!(second.is_ok());
    }

    #[test]
    fn test_init_logger_after_foreign_log_logger() {
        // quickcheck installs an env_logger as the global `log` logger
        fn always_true() -> bool {
            true
        }
        quickcheck::QuickCheck::new().tests(1).quickcheck(always_true as fn() -> bool);

        assert!(init_logger(true, Some("info"), false).is_ok());
    }
}
