//! Structured logging module for Sentilens
//!
//! Lines go to stderr and, once `init_logging` has been called, to a dated
//! file in the configured log directory. Categories:
//! - ANALYSIS: Batch submissions and provider responses
//! - INPUT: Debounce settles and auto-triggers
//! - STORE: Result store mutations
//! - TONE: Tone-improvement session lifecycle
//! - ERROR: Provider failures and other errors

use chrono::{Local, Utc};
use once_cell::sync::Lazy;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
pub enum LogCategory {
    Analysis,
    Input,
    Store,
    Tone,
    Error,
}

impl LogCategory {
    fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Analysis => "ANALYSIS",
            LogCategory::Input => "INPUT",
            LogCategory::Store => "STORE",
            LogCategory::Tone => "TONE",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Log directory, set by `init_logging`. None means console only.
static LOG_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

fn log_dir() -> Option<PathBuf> {
    LOG_DIR.lock().map(|dir| (*dir).clone()).unwrap_or(None)
}

fn log_file_path(dir: &Path) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("sentilens-{}.log", today))
}

/// Initialize file logging - creates the log directory if needed
pub fn init_logging(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    if let Ok(mut slot) = LOG_DIR.lock() {
        *slot = Some(dir.to_path_buf());
    }

    log(LogCategory::Store, None, "Sentilens logging initialized");

    Ok(())
}

fn format_line(category: LogCategory, session_id: Option<&str>, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let session_context = session_id
        .map(|id| format!("session={} | ", &id[..8.min(id.len())]))
        .unwrap_or_default();

    format!(
        "[{}] [{}] {}{}\n",
        timestamp,
        category.as_str(),
        session_context,
        message
    )
}

/// Log a message with category and optional session context
pub fn log(category: LogCategory, session_id: Option<&str>, message: &str) {
    let log_line = format_line(category, session_id, message);

    eprint!("{}", log_line);

    if let Some(dir) = log_dir() {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path(&dir))
        {
            let _ = file.write_all(log_line.as_bytes());
        }
    }
}

pub fn log_analysis(session_id: Option<&str>, message: &str) {
    log(LogCategory::Analysis, session_id, message);
}

pub fn log_input(message: &str) {
    log(LogCategory::Input, None, message);
}

pub fn log_store(message: &str) {
    log(LogCategory::Store, None, message);
}

pub fn log_tone(session_id: Option<&str>, message: &str) {
    log(LogCategory::Tone, session_id, message);
}

pub fn log_error(session_id: Option<&str>, message: &str) {
    log(LogCategory::Error, session_id, message);
}

/// Clean up old log files (keep last 7 days)
pub fn cleanup_old_logs() -> Result<usize, Box<dyn std::error::Error>> {
    let dir = match log_dir() {
        Some(dir) if dir.exists() => dir,
        _ => return Ok(0),
    };

    let cutoff = Utc::now() - chrono::Duration::days(7);
    let mut deleted = 0;

    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            let modified_time: chrono::DateTime<Utc> = modified.into();
            if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}
