// Declare our modules
pub mod cli;
pub mod commands;
pub mod compare;
pub mod entry;
pub mod filter;
pub mod formatter;
pub mod merge;
pub mod parser;
pub mod reader;
pub mod stats;

// Re-export key types for convenience
pub use compare::{compare_entries, CompareOptions, ComparisonResult};
pub use entry::{LogEntry, LogLevel, TimeInterval};
pub use filter::filter_entries;
pub use merge::{merge_entries, MergeOptions};
pub use stats::{compute_stats, StatsOptions, StatsSummary};
