use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;

/// Standard severity levels with numeric ranks (TRACE=0 .. FATAL=50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Numeric rank for severity ordering.
    pub fn rank(self) -> u8 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 10,
            LogLevel::Info => 20,
            LogLevel::Warn => 30,
            LogLevel::Error => 40,
            LogLevel::Fatal => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Case-insensitive lookup. WARNING and CRITICAL are aliases of
    /// WARN and FATAL; unrecognized names yield None.
    pub fn from_name(name: &str) -> Option<LogLevel> {
        match name.to_ascii_uppercase().as_str() {
            "TRACE" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" | "ERR" => Some(LogLevel::Error),
            "FATAL" | "CRIT" | "CRITICAL" => Some(LogLevel::Fatal),
            _ => None,
        }
    }
}

/// Time grouping granularity for statistics buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeInterval {
    Minute,
    Hour,
    Day,
}

/// One parsed log line.
///
/// Entries are value objects: they are never mutated after construction.
/// Derived variants (e.g. a source-tagged copy) are built with
/// [`LogEntry::with_message`], which preserves `raw_line` verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub raw_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub extra_fields: HashMap<String, serde_json::Value>,
}

impl LogEntry {
    /// Entry with only a raw line; everything else absent.
    pub fn new(raw_line: impl Into<String>) -> Self {
        let raw_line = raw_line.into();
        let message = raw_line.trim().to_string();
        LogEntry {
            raw_line,
            timestamp: None,
            level: None,
            message,
            source_file: None,
            line_number: None,
            extra_fields: HashMap::new(),
        }
    }

    /// Copy-with-change: same entry with a replaced message.
    pub fn with_message(&self, message: impl Into<String>) -> LogEntry {
        LogEntry {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Message trimmed of surrounding whitespace, falling back to the
    /// trimmed raw line when no message was extracted. This is the
    /// dedup/grouping key used throughout.
    pub fn normalized_message(&self) -> &str {
        if self.message.trim().is_empty() {
            self.raw_line.trim()
        } else {
            self.message.trim()
        }
    }

    /// Aggregation key for the given granularity, or "unknown" when the
    /// entry has no timestamp.
    pub fn time_group(&self, interval: TimeInterval) -> String {
        match self.timestamp {
            None => "unknown".to_string(),
            Some(ts) => match interval {
                TimeInterval::Minute => ts.format("%Y-%m-%d %H:%M").to_string(),
                TimeInterval::Hour => ts.format("%Y-%m-%d %H:00").to_string(),
                TimeInterval::Day => ts.format("%Y-%m-%d").to_string(),
            },
        }
    }

    /// Millisecond epoch for chronological ordering; entries without a
    /// timestamp sort after all timestamped entries.
    pub fn epoch_millis_or_max(&self) -> i64 {
        self.timestamp
            .map(|ts| ts.and_utc().timestamp_millis())
            .unwrap_or(i64::MAX)
    }

    /// Level filter: compare the parsed level name case-insensitively,
    /// or fall back to a substring scan of the raw line when no level
    /// was parsed.
    pub fn matches_level(&self, level_filter: &str) -> bool {
        match self.level {
            Some(level) => level.as_str().eq_ignore_ascii_case(level_filter),
            None => self
                .raw_line
                .to_lowercase()
                .contains(&level_filter.to_lowercase()),
        }
    }

    /// Case-insensitive substring match against the raw line.
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        self.raw_line.to_lowercase().contains(&pattern.to_lowercase())
    }
}
