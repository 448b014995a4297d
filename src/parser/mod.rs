use crate::entry::LogEntry;

/// Trait defining the interface for all log format parsers.
///
/// Parsing is infallible by contract: malformed input always yields a
/// best-effort entry that preserves the raw line verbatim.
pub trait LogParser: Send + Sync {
    /// Returns the name of the parser.
    fn name(&self) -> &'static str;

    /// Checks if this parser can handle the given log format based on
    /// sample lines.
    fn can_parse(&self, sample_lines: &[&str]) -> bool;

    /// Parses a single line into a structured entry, attaching
    /// provenance when known.
    fn parse_line(
        &self,
        line: &str,
        source_file: Option<&str>,
        line_number: Option<usize>,
    ) -> LogEntry;
}

pub mod access;
pub mod generic;

pub use access::AccessLogParser;
pub use generic::GenericLogParser;
