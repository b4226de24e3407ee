//! Rolling File Logger
//!
//! Writes log output to one file per day under a log directory (plus stderr)
//! and prunes the oldest files beyond a retention count.
//! Records emitted through the `log` facade are forwarded into tracing.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};

/// Number of daily files kept when no retention is given
pub const DEFAULT_RETENTION: usize = 7;

static LOGGER: OnceLock<Arc<RollingFile>> = OnceLock::new();

/// Append-only log file that switches to a new file when the date changes
pub struct RollingFile {
    dir: PathBuf,
    app_name: String,
    current: Mutex<Option<(String, File)>>,
}

impl RollingFile {
    pub fn new(dir: impl Into<PathBuf>, app_name: &str) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            app_name: app_name.to_string(),
            current: Mutex::new(None),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a given date stamp (YYYY-MM-DD)
    pub fn file_name_for(&self, date: &str) -> String {
        format!("{}-{}.log", self.app_name, date)
    }

    /// Path of the file that receives today's output
    pub fn current_path(&self) -> PathBuf {
        self.dir.join(self.file_name_for(&today()))
    }

    pub fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
        let date = today();
        let mut guard = self
            .current
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        let stale = match guard.as_ref() {
            Some((open_date, _)) => *open_date != date,
            None => true,
        };
        if stale {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.dir.join(self.file_name_for(&date)))?;
            *guard = Some((date, file));
        }

        match guard.as_mut() {
            Some((_, file)) => file.write_all(buf),
            None => Ok(()),
        }
    }

    /// Remove the oldest log files so that at most `keep` remain.
    /// Returns the number of files removed.
    pub fn prune(&self, keep: usize) -> io::Result<usize> {
        let prefix = format!("{}-", self.app_name);
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&prefix) && n.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        if files.len() <= keep {
            return Ok(0);
        }

        // Date stamps sort lexically
        files.sort();
        let excess = files.len() - keep;
        for path in files.iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Writer handed to the fmt layer for each event
pub struct RollingWriter(Arc<RollingFile>);

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct RollingMakeWriter(Arc<RollingFile>);

impl<'a> MakeWriter<'a> for RollingMakeWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter(self.0.clone())
    }
}

/// Initialize the global logger with the default retention
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with_retention(log_dir, app_name, DEFAULT_RETENTION)
}

pub fn init_logger_with_retention(
    log_dir: PathBuf,
    app_name: &str,
    keep: usize,
) -> Result<(), String> {
    let file = Arc::new(RollingFile::new(log_dir, app_name).map_err(|e| e.to_string())?);
    if let Err(e) = file.prune(keep) {
        eprintln!("[rolling-logger] failed to prune old logs: {}", e);
    }

    let writer = RollingMakeWriter(file.clone()).and(io::stderr);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    LOGGER
        .set(file)
        .map_err(|_| "Logger already initialized".to_string())?;

    log::info!("Logger initialized for {}", app_name);
    Ok(())
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::error!("{}", msg);
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    LOGGER
        .get()
        .map(|_| ())
        .ok_or_else(|| "Logger not initialized".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = RollingFile::new(dir.path(), "TierTest").unwrap();

        file.write_bytes(b"first line\n").unwrap();
        file.write_bytes(b"second line\n").unwrap();

        let content = fs::read_to_string(file.current_path()).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let file = RollingFile::new(dir.path(), "TierTest").unwrap();
        for date in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"] {
            fs::write(dir.path().join(file.file_name_for(date)), "x").unwrap();
        }
        // Unrelated files are left alone
        fs::write(dir.path().join("other.txt"), "x").unwrap();

        let removed = file.prune(2).unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join(file.file_name_for("2024-01-01")).exists());
        assert!(!dir.path().join(file.file_name_for("2024-01-02")).exists());
        assert!(dir.path().join(file.file_name_for("2024-01-04")).exists());
        assert!(dir.path().join("other.txt").exists());
    }

    #[test]
    fn test_helpers_require_init() {
        // Nothing in this test binary installs the global logger
        assert!(info("hello").is_err());
    }
}
