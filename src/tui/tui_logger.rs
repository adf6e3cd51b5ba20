use crate::{Error, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tokio::sync::mpsc;

pub enum LogEvent {
    Log(String, Level),
}

/// `log` backend: forwards records to the UI (or stderr when headless) and
/// appends them to `info.log` / `error.log`.
pub struct TuiLogger {
    sender: Mutex<Option<mpsc::UnboundedSender<LogEvent>>>,
    echo_stderr: bool,
    log_dir: PathBuf,
    info_file: Mutex<Option<File>>,
    error_file: Mutex<Option<File>>,
}

fn open_append(path: &Path) -> Option<File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}

impl TuiLogger {
    pub fn new(log_dir: impl Into<PathBuf>, echo_stderr: bool) -> Self {
        let log_dir = log_dir.into();
        let (info_file, error_file) = match std::fs::create_dir_all(&log_dir) {
            Ok(()) => (
                open_append(&log_dir.join("info.log")),
                open_append(&log_dir.join("error.log")),
            ),
            Err(_) => (None, None),
        };

        Self {
            sender: Mutex::new(None),
            echo_stderr,
            log_dir,
            info_file: Mutex::new(info_file),
            error_file: Mutex::new(error_file),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn set_sender(&self, sender: mpsc::UnboundedSender<LogEvent>) {
        if let Ok(mut guard) = self.sender.lock() {
            *guard = Some(sender);
        }
    }

    fn write_line(file: &Mutex<Option<File>>, line: &str) {
        if let Ok(mut file_guard) = file.lock() {
            if let Some(file) = &mut *file_guard {
                let _ = file.write_all(line.as_bytes());
                let _ = file.flush();
            }
        }
    }
}

impl Log for TuiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Debug only from our own crate; dependencies are chatty.
        metadata.level() <= Level::Info
            || (metadata.level() == Level::Debug && metadata.target().starts_with("dephy_interact"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!("[{}] {}: {}", record.level(), record.target(), record.args());

        if let Ok(sender_guard) = self.sender.lock() {
            if let Some(sender) = &*sender_guard {
                let _ = sender.send(LogEvent::Log(msg.clone(), record.level()));
            }
        }
        if self.echo_stderr && record.level() <= Level::Warn {
            eprintln!("{}", msg);
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let file_msg = format!(
            "[{}] {} - {}: {}\n",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        );

        if record.level() <= Level::Info {
            Self::write_line(&self.info_file, &file_msg);
        }
        if record.level() <= Level::Error {
            Self::write_line(&self.error_file, &file_msg);
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<TuiLogger> = OnceLock::new();

/// Installs the process-wide logger. Later calls return the first instance.
pub fn init_tui_logger(log_dir: impl Into<PathBuf>, echo_stderr: bool) -> Result<&'static TuiLogger> {
    let mut installed = false;
    let logger = LOGGER.get_or_init(|| {
        installed = true;
        TuiLogger::new(log_dir, echo_stderr)
    });

    if installed {
        log::set_logger(logger)
            .map_err(|e| Error::Other(format!("Failed to set logger: {}", e)))?;
        log::set_max_level(LevelFilter::Debug);
    }
    Ok(logger)
}
