//! Logger of the `p3r` binary.
//! Records are written to stderr, and to a file of the run when a log directory is given:
//! ```ignore
//! logger::init(LevelFilter::Debug, Some(PathBuf::from("/tmp")))?;
//! info!("compiled action {}", action);
//! ```

use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use log::{LevelFilter, Log, Metadata, Record};
use p3r_language::output::LOGS_DIR;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

lazy_static! {
    static ref SYSTEM_START: SystemTime = SystemTime::now();
}

pub struct Logger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(level: LevelFilter, file: Option<File>) -> Self {
        Self {
            level,
            file: file.map(Mutex::new),
        }
    }

    fn format(&self, record: &Record) -> String {
        let elapsed = SYSTEM_START.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.0);
        format!("[{:.3}] {} - {}\n", elapsed, record.level(), record.args())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let string = self.format(record);
            eprint!("{}", string);
            if let Some(file) = &self.file {
                if let Ok(mut file) = file.lock() {
                    let _ = file.write_all(string.as_bytes());
                }
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Path of the log file of a run started at `date`.
pub fn log_file_path(mut log_dir: PathBuf, date: DateTime<Local>) -> PathBuf {
    log_dir.push(LOGS_DIR);
    log_dir.push(format!("{}.log", date.format("%Y-%m-%d_%H-%M-%S")));
    log_dir
}

/// Installs the global logger.
pub fn init(level: LevelFilter, log_dir: Option<PathBuf>) -> anyhow::Result<Option<PathBuf>> {
    lazy_static::initialize(&SYSTEM_START);
    let (file, path) = match log_dir {
        Some(dir) => {
            let path = log_file_path(dir, Local::now());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            (Some(file), Some(path))
        }
        None => (None, None),
    };
    log::set_boxed_logger(Box::new(Logger::new(level, file)))
        .map(|()| log::set_max_level(level))
        .map_err(|e| anyhow::anyhow!("could not install logger: {}", e))?;
    Ok(path)
}
