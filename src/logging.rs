//! Log backend
//!
//! `StatsLogger` implements the `log` facade. Records are written as text
//! (`YYYY-MM-DD HH:MM:SS [LEVEL] message`) or as JSON lines to stderr, a
//! file, or both, with separate level filters for the console and the file.
//!
//! ```no_run
//! use gerritstats::logging::{init_logger, LogConfig, LogDestination, LogFormat};
//! use log::LevelFilter;
//! use std::path::PathBuf;
//!
//! let config = LogConfig {
//!     console_level: LevelFilter::Info,
//!     file_level: Some(LevelFilter::Debug),
//!     format: LogFormat::Json,
//!     destination: LogDestination::Both(PathBuf::from("gerritstats.log")),
//! };
//! init_logger(config).unwrap();
//! log::info!("Reading review data");
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Log destination options
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogDestination {
    #[default]
    Console,
    File(PathBuf),
    Both(PathBuf),
}

impl LogDestination {
    fn file_path(&self) -> Option<&Path> {
        match self {
            LogDestination::Console => None,
            LogDestination::File(path) | LogDestination::Both(path) => Some(path),
        }
    }

    fn writes_console(&self) -> bool {
        !matches!(self, LogDestination::File(_))
    }
}

/// One JSON log line
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        let console = if self.destination.writes_console() {
            self.console_level
        } else {
            LevelFilter::Off
        };
        match self.file_level {
            Some(file_level) if self.destination.file_path().is_some() => console.max(file_level),
            _ => console,
        }
    }
}

pub struct StatsLogger {
    config: LogConfig,
    file: Option<Mutex<File>>,
}

impl StatsLogger {
    /// Create a logger, opening the log file in append mode when one is configured
    pub fn new(config: LogConfig) -> Result<Self> {
        let file = match config.destination.file_path() {
            Some(path) => Some(Mutex::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?,
            )),
            None => None,
        };
        Ok(Self { config, file })
    }

    fn format_timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_text_message(&self, level: Level, message: &str) -> String {
        format!("{} [{}] {}", Self::format_timestamp(), level.as_str(), message)
    }

    fn format_json_message(&self, record: &log::Record) -> Result<String> {
        let level = record.level();
        let detail = (level >= Level::Debug).then(|| serde_json::json!({ "target": record.target() }));
        let entry = JsonLogEntry {
            timestamp: Self::format_timestamp(),
            level: level.as_str().to_string(),
            message: record.args().to_string(),
            detail,
        };

        serde_json::to_string(&entry).context("Failed to serialize log entry to JSON")
    }

    fn should_log_to_console(&self, level: Level) -> bool {
        self.config.destination.writes_console() && level <= self.config.console_level
    }

    fn should_log_to_file(&self, level: Level) -> bool {
        self.file.is_some() && self.config.file_level.is_some_and(|file_level| level <= file_level)
    }

    fn write_to_file(&self, formatted_message: &str) -> Result<()> {
        if let Some(file) = &self.file {
            let mut file = file
                .lock()
                .map_err(|_| anyhow::anyhow!("Log file lock poisoned"))?;
            writeln!(file, "{}", formatted_message).context("Failed to write to log file")?;
        }
        Ok(())
    }
}

impl log::Log for StatsLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log_to_console(metadata.level()) || self.should_log_to_file(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        let level = record.level();
        let to_console = self.should_log_to_console(level);
        let to_file = self.should_log_to_file(level);
        if !to_console && !to_file {
            return;
        }

        let formatted_message = match self.config.format {
            LogFormat::Text => self.format_text_message(level, &record.args().to_string()),
            LogFormat::Json => self.format_json_message(record).unwrap_or_else(|e| {
                eprintln!("JSON formatting error: {}. Falling back to text format.", e);
                self.format_text_message(level, &record.args().to_string())
            }),
        };

        if to_console {
            let _ = writeln!(io::stderr(), "{}", formatted_message);
        }
        if to_file {
            if let Err(e) = self.write_to_file(&formatted_message) {
                eprintln!("File logging error: {}", e);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Install `StatsLogger` as the global logger
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();
    let logger = StatsLogger::new(config)?;

    log::set_boxed_logger(Box::new(logger)).context("Failed to set global logger")?;
    log::set_max_level(max_level);

    Ok(())
}

/// Convert string to LevelFilter
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.trim().to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use tempfile::tempdir;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error").unwrap(), LevelFilter::Error);
        assert_eq!(parse_log_level("Warning").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level(" debug ").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_log_level("off").unwrap(), LevelFilter::Off);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let timestamp = StatsLogger::format_timestamp();
        let bytes = timestamp.as_bytes();
        assert_eq!(timestamp.len(), 19);
        assert_eq!(bytes[4], b'-');
        assert_eq!(bytes[7], b'-');
        assert_eq!(bytes[10], b' ');
        assert_eq!(bytes[13], b':');
        assert_eq!(bytes[16], b':');
    }

    #[test]
    fn test_json_log_entry_omits_empty_detail() {
        let entry = JsonLogEntry {
            timestamp: "2024-03-01 09:15:00".to_string(),
            level: "INFO".to_string(),
            message: "Loaded 12 commits".to_string(),
            detail: None,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""level":"INFO""#));
        assert!(json.contains(r#""message":"Loaded 12 commits""#));
        assert!(!json.contains("detail"));
    }

    #[test]
    fn test_text_message_formatting() {
        let logger = StatsLogger::new(LogConfig::default()).unwrap();
        let formatted = logger.format_text_message(Level::Warn, "Unknown patch set kind");
        assert!(formatted.ends_with("[WARN] Unknown patch set kind"));
    }

    #[test]
    fn test_max_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.max_level(), LevelFilter::Info);

        config.destination = LogDestination::Both(PathBuf::from("unused.log"));
        config.file_level = Some(LevelFilter::Trace);
        assert_eq!(config.max_level(), LevelFilter::Trace);

        config.destination = LogDestination::File(PathBuf::from("unused.log"));
        config.file_level = Some(LevelFilter::Warn);
        assert_eq!(config.max_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_file_destination_writes_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.log");
        let logger = StatsLogger::new(LogConfig {
            console_level: LevelFilter::Off,
            file_level: Some(LevelFilter::Debug),
            format: LogFormat::Json,
            destination: LogDestination::File(path.clone()),
        })
        .unwrap();

        logger.log(
            &log::Record::builder()
                .level(Level::Debug)
                .target("gerritstats::parser")
                .args(format_args!("Parsed {} commits", 3))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(Level::Trace)
                .args(format_args!("dropped"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let entry: JsonLogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry.level, "DEBUG");
        assert_eq!(entry.message, "Parsed 3 commits");
        assert_eq!(entry.detail.unwrap()["target"], "gerritstats::parser");
    }
}
