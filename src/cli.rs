use crate::entry::TimeInterval;
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name = "sawmill")]
#[clap(about = "Sawmill: analyze, compare, and merge log files", long_about = None)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze log files and generate statistics
    Stats(StatsArgs),
    /// Compare two log files and show differences
    Compare(CompareArgs),
    /// Merge multiple log files chronologically
    Merge(MergeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct StatsArgs {
    /// Log files to analyze
    #[clap(required = true)]
    pub files: Vec<String>,

    /// Count lines by severity level (INFO, WARN, ERROR, etc.)
    #[clap(long)]
    pub levels: bool,

    /// Count lines matching these patterns (repeatable)
    #[clap(short = 'e', long = "regex")]
    pub patterns: Vec<String>,

    /// Group counts by time interval
    #[clap(long, value_enum)]
    pub group_by: Option<TimeInterval>,

    /// Only process lines containing this severity level
    #[clap(long)]
    pub only: Option<String>,

    /// Show top N most frequent log messages
    #[clap(long)]
    pub top: Option<usize>,

    /// Output results in JSON format
    #[clap(long)]
    pub json: bool,

    /// Output results in CSV format
    #[clap(long)]
    pub csv: bool,

    /// Live mode: update stats as log files grow
    #[clap(long)]
    pub follow: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CompareArgs {
    /// First file to compare
    pub file1: String,

    /// Second file to compare
    pub file2: String,

    /// Only compare lines containing this severity level
    #[clap(long)]
    pub only: Option<String>,

    /// Ignore timestamps when comparing
    #[clap(long)]
    pub ignore_timestamps: bool,

    /// Colorize diff output
    #[clap(long)]
    pub color: bool,

    /// Show only the summary of differences
    #[clap(long)]
    pub summary: bool,

    /// Output differences in JSON format
    #[clap(long)]
    pub json: bool,

    /// Use fuzzy matching (ignore whitespace and case)
    #[clap(long)]
    pub fuzzy: bool,
}

#[derive(ClapArgs, Debug)]
pub struct MergeArgs {
    /// Log files to merge (at least two)
    #[clap(required = true)]
    pub files: Vec<String>,

    /// Output file (default: stdout)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Add the source filename as a tag to each entry
    #[clap(long)]
    pub tag: bool,

    /// Normalize timestamps to a standard format
    #[clap(long)]
    pub normalize_timestamps: bool,

    /// Remove duplicate entries
    #[clap(long)]
    pub deduplicate: bool,

    /// Stream mode: continuously merge growing files
    #[clap(long)]
    pub follow: bool,
}
