use crate::compare::ComparisonResult;
use crate::entry::LogEntry;
use crate::stats::StatsSummary;
use anyhow::Result;
use serde::Serialize;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// Which sections of a stats summary to render.
#[derive(Debug, Clone, Copy)]
pub struct StatsSections {
    pub levels: bool,
    pub patterns: bool,
    pub time_groups: bool,
    pub top: bool,
}

impl StatsSections {
    pub fn all() -> Self {
        StatsSections {
            levels: true,
            patterns: true,
            time_groups: true,
            top: true,
        }
    }
}

// Serialization views for comparison JSON, mirroring the text sections.

#[derive(Serialize)]
struct ComparisonSummary {
    added_lines: usize,
    removed_lines: usize,
    modified_lines: usize,
    common_lines: usize,
    total_differences: usize,
    has_differences: bool,
}

#[derive(Serialize)]
struct ComparisonJson<'a> {
    summary: ComparisonSummary,
    details: ComparisonDetails<'a>,
}

#[derive(Serialize)]
struct ComparisonDetails<'a> {
    added_lines: &'a [LogEntry],
    removed_lines: &'a [LogEntry],
    common_lines: &'a [LogEntry],
}

#[derive(Serialize)]
struct EntriesJson<'a> {
    entries: &'a [LogEntry],
    total_count: usize,
}

/// Render a stats summary as human-readable text.
pub fn format_stats_text(stats: &StatsSummary, sections: StatsSections, color: bool) -> String {
    let mut out = Vec::new();

    out.push(colorize("Log Statistics Summary", CYAN, true, color));
    out.push("=".repeat(50));
    out.push(String::new());
    out.push(format!(
        "Total lines: {}",
        colorize(&stats.total_lines.to_string(), GREEN, false, color)
    ));
    out.push(String::new());

    if sections.levels && !stats.level_counts.is_empty() {
        out.push(colorize("Log Levels:", YELLOW, true, color));
        let mut levels: Vec<_> = stats.level_counts.iter().collect();
        levels.sort();
        for (level, count) in levels {
            let level_color = level_color(level);
            out.push(format!(
                "  {:10}: {}",
                level,
                colorize(&count.to_string(), level_color, false, color)
            ));
        }
        out.push(String::new());
    }

    if sections.patterns && !stats.pattern_counts.is_empty() {
        out.push(colorize("Pattern Matches:", YELLOW, true, color));
        let mut patterns: Vec<_> = stats.pattern_counts.iter().collect();
        patterns.sort();
        for (pattern, count) in patterns {
            out.push(format!(
                "  {:20}: {}",
                pattern,
                colorize(&count.to_string(), GREEN, false, color)
            ));
        }
        out.push(String::new());
    }

    if sections.time_groups && !stats.time_groups.is_empty() {
        out.push(colorize("Time Distribution:", YELLOW, true, color));
        let mut groups: Vec<_> = stats.time_groups.iter().collect();
        groups.sort();
        for (time_key, count) in groups {
            out.push(format!(
                "  {:20}: {}",
                time_key,
                colorize(&count.to_string(), BLUE, false, color)
            ));
        }
        out.push(String::new());
    }

    if sections.top && !stats.top_messages.is_empty() {
        out.push(colorize("Top Messages:", YELLOW, true, color));
        for (rank, mc) in stats.top_messages.iter().enumerate() {
            let display: String = if mc.message.len() > 60 {
                format!("{}...", truncated(&mc.message, 60))
            } else {
                mc.message.clone()
            };
            out.push(format!(
                "  {:2}. ({}) {}",
                rank + 1,
                colorize(&mc.count.to_string(), GREEN, false, color),
                display
            ));
        }
        out.push(String::new());
    }

    out.join("\n")
}

/// Render a stats summary as pretty-printed JSON.
pub fn format_stats_json(stats: &StatsSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(stats)?)
}

/// Render a stats summary as sectioned CSV tables.
pub fn format_stats_csv(stats: &StatsSummary) -> Result<String> {
    // Sections have different widths, so the writer must be flexible
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Metric", "Value"])?;
    writer.write_record(["Total Lines", stats.total_lines.to_string().as_str()])?;
    writer.write_record([""; 2])?;

    if !stats.level_counts.is_empty() {
        writer.write_record(["Log Level", "Count"])?;
        let mut levels: Vec<_> = stats.level_counts.iter().collect();
        levels.sort();
        for (level, count) in levels {
            writer.write_record([level.as_str(), count.to_string().as_str()])?;
        }
        writer.write_record([""; 2])?;
    }

    if !stats.pattern_counts.is_empty() {
        writer.write_record(["Pattern", "Count"])?;
        let mut patterns: Vec<_> = stats.pattern_counts.iter().collect();
        patterns.sort();
        for (pattern, count) in patterns {
            writer.write_record([pattern.as_str(), count.to_string().as_str()])?;
        }
        writer.write_record([""; 2])?;
    }

    if !stats.time_groups.is_empty() {
        writer.write_record(["Time Group", "Count"])?;
        let mut groups: Vec<_> = stats.time_groups.iter().collect();
        groups.sort();
        for (time_key, count) in groups {
            writer.write_record([time_key.as_str(), count.to_string().as_str()])?;
        }
        writer.write_record([""; 2])?;
    }

    if !stats.top_messages.is_empty() {
        writer.write_record(["Rank", "Count", "Message"])?;
        for (rank, mc) in stats.top_messages.iter().enumerate() {
            writer.write_record([
                &(rank + 1).to_string(),
                &mc.count.to_string(),
                &mc.message,
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv output: {}", err))?;
    Ok(String::from_utf8(bytes)?)
}

/// Render a comparison result as human-readable text. Detail blocks
/// are capped at 20 lines each; `summary_only` skips them entirely.
pub fn format_comparison_text(
    result: &ComparisonResult,
    summary_only: bool,
    color: bool,
) -> String {
    let mut out = Vec::new();

    out.push(colorize("Log Comparison Result", CYAN, true, color));
    out.push("=".repeat(50));
    out.push(String::new());

    out.push(format!(
        "Added lines:    {}",
        colorize(&result.added.len().to_string(), GREEN, false, color)
    ));
    out.push(format!(
        "Removed lines:  {}",
        colorize(&result.removed.len().to_string(), RED, false, color)
    ));
    out.push(format!(
        "Modified lines: {}",
        colorize(&result.modified.len().to_string(), YELLOW, false, color)
    ));
    out.push(format!(
        "Common lines:   {}",
        colorize(&result.common.len().to_string(), BLUE, false, color)
    ));
    out.push(format!(
        "Total differences: {}",
        colorize(&result.total_differences().to_string(), MAGENTA, false, color)
    ));
    out.push(String::new());

    if summary_only {
        return out.join("\n");
    }

    if !result.added.is_empty() {
        out.push(colorize("Added Lines:", GREEN, true, color));
        for entry in result.added.iter().take(20) {
            out.push(colorize(&format!("+ {}", entry.raw_line), GREEN, false, color));
        }
        if result.added.len() > 20 {
            out.push(format!("... and {} more added lines", result.added.len() - 20));
        }
        out.push(String::new());
    }

    if !result.removed.is_empty() {
        out.push(colorize("Removed Lines:", RED, true, color));
        for entry in result.removed.iter().take(20) {
            out.push(colorize(&format!("- {}", entry.raw_line), RED, false, color));
        }
        if result.removed.len() > 20 {
            out.push(format!(
                "... and {} more removed lines",
                result.removed.len() - 20
            ));
        }
        out.push(String::new());
    }

    out.join("\n")
}

/// Render a comparison result as pretty-printed JSON.
pub fn format_comparison_json(result: &ComparisonResult) -> Result<String> {
    let view = ComparisonJson {
        summary: ComparisonSummary {
            added_lines: result.added.len(),
            removed_lines: result.removed.len(),
            modified_lines: result.modified.len(),
            common_lines: result.common.len(),
            total_differences: result.total_differences(),
            has_differences: result.has_differences(),
        },
        details: ComparisonDetails {
            added_lines: &result.added,
            removed_lines: &result.removed,
            common_lines: &result.common,
        },
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

/// Render a batch of entries as pretty-printed JSON.
pub fn format_entries_json(entries: &[LogEntry]) -> Result<String> {
    let view = EntriesJson {
        entries,
        total_count: entries.len(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

/// One merged entry as an output line: the raw line verbatim, or a
/// `timestamp [LEVEL] message` rendering when normalizing timestamps.
pub fn format_entry_line(entry: &LogEntry, normalize_timestamps: bool) -> String {
    match (normalize_timestamps, entry.timestamp) {
        (true, Some(ts)) => {
            let mut parts = vec![ts.format("%Y-%m-%d %H:%M:%S").to_string()];
            if let Some(level) = entry.level {
                parts.push(format!("[{}]", level.as_str()));
            }
            if entry.message.is_empty() {
                parts.push(entry.raw_line.clone());
            } else {
                parts.push(entry.message.clone());
            }
            parts.join(" ")
        }
        _ => entry.raw_line.clone(),
    }
}

fn colorize(text: &str, color: &str, bold: bool, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    if bold {
        format!("{}{}{}{}", BOLD, color, text, RESET)
    } else {
        format!("{}{}{}", color, text, RESET)
    }
}

fn level_color(level: &str) -> &'static str {
    match level {
        "ERROR" | "FATAL" => RED,
        "WARN" | "WARNING" => YELLOW,
        "INFO" => GREEN,
        _ => CYAN,
    }
}

/// Truncate on a char boundary.
fn truncated(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
