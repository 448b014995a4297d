use super::LogParser;
use crate::entry::{LogEntry, LogLevel};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Candidate timestamp shapes, tried in priority order; the first
    /// regex that matches anywhere in the line wins.
    static ref TIMESTAMP_REGEXES: Vec<Regex> = vec![
        // ISO-8601: 2023-09-09T23:20:15.123Z
        Regex::new(r"(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d{3})?(?:Z|[+-]\d{2}:\d{2})?)")
            .unwrap(),
        // Space-separated: 2023-09-09 23:20:15
        Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").unwrap(),
        // Apache/Nginx: 09/Sep/2023:23:20:15 +0000
        Regex::new(r"(\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})").unwrap(),
        // Syslog: Sep  9 23:20:15
        Regex::new(r"(\w{3}\s+\d{1,2} \d{2}:\d{2}:\d{2})").unwrap(),
        // Bare time: 23:20:15
        Regex::new(r"(\d{2}:\d{2}:\d{2})").unwrap(),
    ];

    /// Level token shapes: whole-word, bracketed, colon-suffixed.
    static ref LEVEL_REGEXES: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(TRACE|DEBUG|INFO|WARN|WARNING|ERROR|FATAL|CRITICAL)\b").unwrap(),
        Regex::new(r"(?i)\[(TRACE|DEBUG|INFO|WARN|WARNING|ERROR|FATAL|CRITICAL)\]").unwrap(),
        Regex::new(r"(?i)(TRACE|DEBUG|INFO|WARN|WARNING|ERROR|FATAL|CRITICAL):").unwrap(),
    ];
}

/// Explicit fallback formats tried when the lenient parses fail.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Generic log parser that works with most common log formats.
///
/// Uses a regex cascade to extract a timestamp and severity level from
/// arbitrary lines, and falls back to treating the whole line as the
/// message when extraction comes up short.
pub struct GenericLogParser;

impl LogParser for GenericLogParser {
    fn name(&self) -> &'static str {
        "Generic"
    }

    fn can_parse(&self, _sample_lines: &[&str]) -> bool {
        // Generic parser is the fallback for any format
        true
    }

    fn parse_line(
        &self,
        line: &str,
        source_file: Option<&str>,
        line_number: Option<usize>,
    ) -> LogEntry {
        let line = line.trim_end_matches(['\n', '\r']);

        let timestamp = extract_timestamp(line);
        let level = extract_level(line);
        let message = extract_message(line, level.is_some());

        LogEntry {
            raw_line: line.to_string(),
            timestamp,
            level,
            message,
            source_file: source_file.map(String::from),
            line_number,
            extra_fields: Default::default(),
        }
    }
}

/// Best-effort timestamp extraction; absence of a match is a normal
/// result, never an error.
pub fn extract_timestamp(line: &str) -> Option<NaiveDateTime> {
    for regex in TIMESTAMP_REGEXES.iter() {
        if let Some(caps) = regex.captures(line) {
            let ts_str = caps.get(1).map(|m| m.as_str())?;
            return parse_timestamp_str(ts_str);
        }
    }
    None
}

/// Best-effort level extraction, first matching token shape wins.
pub fn extract_level(line: &str) -> Option<LogLevel> {
    for regex in LEVEL_REGEXES.iter() {
        if let Some(caps) = regex.captures(line) {
            if let Some(m) = caps.get(1) {
                return LogLevel::from_name(m.as_str());
            }
        }
    }
    None
}

/// Parse a matched timestamp substring, trying lenient offset-aware
/// parses before the explicit format list. Returns None when every
/// format fails.
fn parse_timestamp_str(ts_str: &str) -> Option<NaiveDateTime> {
    // Offset-aware shapes first: ISO-8601 with zone, then Apache.
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(ts_str, "%d/%b/%Y:%H:%M:%S %z") {
        return Some(dt.naive_local());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts_str, format) {
            return Some(dt);
        }
    }

    // Syslog timestamps carry no year; assume the current one.
    let with_year = format!("{} {}", Local::now().year(), ts_str);
    if let Ok(dt) = NaiveDateTime::parse_from_str(&with_year, "%Y %b %e %H:%M:%S") {
        return Some(dt);
    }

    // Bare time of day resolves against today's date.
    if let Ok(time) = NaiveTime::parse_from_str(ts_str, "%H:%M:%S") {
        return Some(Local::now().date_naive().and_time(time));
    }

    None
}

/// Build the message by stripping the first matched timestamp and (when
/// a level was recognized) level token, then trimming separators. Falls
/// back to the trimmed raw line when stripping leaves nothing useful.
fn extract_message(line: &str, level_found: bool) -> String {
    let mut message = line.to_string();

    for regex in TIMESTAMP_REGEXES.iter() {
        message = regex.replacen(&message, 1, "").into_owned();
    }

    if level_found {
        for regex in LEVEL_REGEXES.iter() {
            message = regex.replacen(&message, 1, "").into_owned();
        }
    }

    let message = message
        .trim_matches(|c: char| matches!(c, ' ' | '\t' | '-' | ':' | '[' | ']'))
        .to_string();

    if message.chars().count() < 3 {
        line.trim().to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn extracts_iso_timestamp() {
        let ts = extract_timestamp("2023-09-09T23:20:15.123Z [INFO] started").unwrap();
        assert_eq!(
            ts.date(),
            NaiveDate::from_ymd_opt(2023, 9, 9).unwrap()
        );
        assert_eq!(ts.format("%H:%M:%S").to_string(), "23:20:15");
    }

    #[test]
    fn extracts_apache_timestamp() {
        let ts = extract_timestamp(r#"09/Sep/2023:23:20:15 +0000 "GET / HTTP/1.1""#).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-09-09 23:20:15");
    }

    #[test]
    fn unparseable_timestamp_is_absent() {
        assert!(extract_timestamp("no timestamps in this line").is_none());
        assert!(extract_timestamp("").is_none());
    }

    #[test]
    fn level_token_shapes() {
        assert_eq!(extract_level("[ERROR] boom"), Some(LogLevel::Error));
        assert_eq!(extract_level("warning: low disk"), Some(LogLevel::Warn));
        assert_eq!(extract_level("critical failure"), Some(LogLevel::Fatal));
        assert_eq!(extract_level("nothing to see"), None);
    }

    #[test]
    fn short_message_falls_back_to_raw_line() {
        let parser = GenericLogParser;
        let entry = parser.parse_line("2023-09-09 23:20:15 OK", None, None);
        // "OK" is under 3 chars after stripping, so the raw line wins
        assert_eq!(entry.message, "2023-09-09 23:20:15 OK");
    }

    #[test]
    fn strips_timestamp_and_level_from_message() {
        let parser = GenericLogParser;
        let entry = parser.parse_line(
            "2023-09-09 23:20:15 [ERROR] Database connection failed",
            Some("db.log"),
            Some(7),
        );
        assert_eq!(entry.message, "Database connection failed");
        assert_eq!(entry.level, Some(LogLevel::Error));
        assert_eq!(entry.source_file.as_deref(), Some("db.log"));
        assert_eq!(entry.line_number, Some(7));
    }
}
