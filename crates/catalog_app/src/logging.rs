//! Logger initialization for the binary.
//!
//! Logs go to the terminal, or with `--logfile` to a timestamped file under
//! `./logs`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const LOG_DIR: &str = "logs";

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the terminal.
    Terminal,
    /// Write to the given file, creating its directory.
    File(PathBuf),
}

impl LogDestination {
    /// `--logfile` picks a file named after the start time.
    pub fn from_flag(logfile: bool, now: NaiveDateTime) -> Self {
        if logfile {
            LogDestination::File(Path::new(LOG_DIR).join(log_file_name(now)))
        } else {
            LogDestination::Terminal
        }
    }
}

/// `log-19.10.2026-14.03.27.txt`
pub fn log_file_name(now: NaiveDateTime) -> String {
    now.format("log-%d.%m.%Y-%H.%M.%S.txt").to_string()
}

/// Initialize the logger. Falls back to the terminal when the log file
/// cannot be created.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let logger: Box<dyn SharedLogger> = match destination {
        LogDestination::Terminal => terminal_logger(level, config),
        LogDestination::File(path) => match create_file_logger(&path, level, config.clone()) {
            Some(file_logger) => file_logger,
            None => terminal_logger(level, config),
        },
    };

    let _ = CombinedLogger::init(vec![logger]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<dyn SharedLogger>> {
    if let Some(dir) = path.parent() {
        if let Err(err) = fs::create_dir_all(dir) {
            eprintln!("Warning: Could not create log directory {:?}: {}", dir, err);
            return None;
        }
    }
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
