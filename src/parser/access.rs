use super::LogParser;
use crate::entry::{LogEntry, LogLevel};
use chrono::{DateTime, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

lazy_static! {
    // Common Log Format, with optional Combined Log Format tail:
    //   host ident authuser [timestamp] "request" status size ["referer" "user-agent"]
    static ref CLF_REGEX: Regex = Regex::new(
        r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "([^"]*)" (\d{3}) (\S+)(?: "([^"]*)" "([^"]*)")?"#
    )
    .unwrap();
}

/// Parser for Apache/Nginx access logs in Common or Combined Log Format.
///
/// Request details land in `extra_fields`; the HTTP status code doubles
/// as the severity (4xx -> WARN, 5xx -> ERROR).
pub struct AccessLogParser;

impl LogParser for AccessLogParser {
    fn name(&self) -> &'static str {
        "Access"
    }

    fn can_parse(&self, sample_lines: &[&str]) -> bool {
        if sample_lines.is_empty() {
            return false;
        }
        // At least 70% of the sample must look like CLF
        let sample = &sample_lines[..sample_lines.len().min(10)];
        let matches = sample
            .iter()
            .filter(|line| CLF_REGEX.is_match(line.trim()))
            .count();
        matches * 10 >= sample.len() * 7
    }

    fn parse_line(
        &self,
        line: &str,
        source_file: Option<&str>,
        line_number: Option<usize>,
    ) -> LogEntry {
        let line = line.trim_end_matches(['\n', '\r']);

        let caps = match CLF_REGEX.captures(line) {
            Some(caps) => caps,
            None => {
                // Not CLF after all; fall back to the whole line as message
                let mut entry = LogEntry::new(line);
                entry.source_file = source_file.map(String::from);
                entry.line_number = line_number;
                return entry;
            }
        };

        let request = caps.get(5).map_or("", |m| m.as_str());
        let status: u16 = caps
            .get(6)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let size = caps.get(7).map_or("-", |m| m.as_str());

        let mut entry = LogEntry::new(line);
        entry.timestamp = caps.get(4).and_then(|m| parse_clf_timestamp(m.as_str()));
        entry.level = Some(status_to_level(status));
        entry.message = format!("{} -> {} {}", request, status, size);
        entry.source_file = source_file.map(String::from);
        entry.line_number = line_number;

        entry
            .extra_fields
            .insert("host".into(), json!(caps.get(1).map_or("", |m| m.as_str())));
        entry
            .extra_fields
            .insert("ident".into(), json!(caps.get(2).map_or("", |m| m.as_str())));
        entry.extra_fields.insert(
            "authuser".into(),
            json!(caps.get(3).map_or("", |m| m.as_str())),
        );
        entry.extra_fields.insert("request".into(), json!(request));
        entry.extra_fields.insert("status_code".into(), json!(status));
        entry.extra_fields.insert("size".into(), json!(size));
        if let Some(referer) = caps.get(8) {
            entry
                .extra_fields
                .insert("referer".into(), json!(referer.as_str()));
        }
        if let Some(user_agent) = caps.get(9) {
            entry
                .extra_fields
                .insert("user_agent".into(), json!(user_agent.as_str()));
        }

        entry
    }
}

/// Apache timestamp: 09/Sep/2023:23:20:15 +0000
fn parse_clf_timestamp(ts_str: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_str(ts_str, "%d/%b/%Y:%H:%M:%S %z") {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(ts_str, "%d/%b/%Y:%H:%M:%S").ok()
}

fn status_to_level(status: u16) -> LogLevel {
    match status {
        0..=399 => LogLevel::Info,
        400..=499 => LogLevel::Warn,
        _ => LogLevel::Error,
    }
}
