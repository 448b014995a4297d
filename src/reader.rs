use crate::entry::LogEntry;
use crate::parser::LogParser;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek};
use std::path::Path;

/// Open a log file as a lazy line sequence, transparently decoding
/// gzip input. Compression is detected by extension or magic bytes.
pub fn open_lines(path: &str) -> Result<Box<dyn Iterator<Item = io::Result<String>>>> {
    let file = File::open(path).with_context(|| format!("file not found: {}", path))?;

    if is_gzip(path, &file)? {
        let reader = BufReader::new(GzDecoder::new(file));
        Ok(Box::new(reader.lines()))
    } else {
        let reader = BufReader::new(file);
        Ok(Box::new(reader.lines()))
    }
}

/// Read and parse a whole file, attaching provenance to every entry.
/// Line numbers are 1-based. Unreadable lines are skipped; unparseable
/// ones still become best-effort entries.
pub fn read_entries(path: &str, parser: &dyn LogParser) -> Result<Vec<LogEntry>> {
    let lines = open_lines(path)?;
    let entries = lines
        .filter_map(|line| line.ok())
        .enumerate()
        .map(|(idx, line)| parser.parse_line(&line, Some(path), Some(idx + 1)))
        .collect();
    Ok(entries)
}

/// Whether the file at `path` is gzip-compressed. Follow mode cannot
/// tail compressed input, so callers reject this combination up front.
pub fn is_compressed(path: &str) -> Result<bool> {
    let file = File::open(path).with_context(|| format!("file not found: {}", path))?;
    is_gzip(path, &file)
}

/// Whether the path names a gzip stream, by extension or by the
/// 1f 8b magic bytes.
fn is_gzip(path: &str, file: &File) -> Result<bool> {
    let by_extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("gzip"));
    if by_extension {
        return Ok(true);
    }

    let mut magic = [0u8; 2];
    let mut probe = file.try_clone().context("failed to probe file header")?;
    let read = probe.read(&mut magic)?;
    // Reset for the caller; the clone shares the cursor
    probe.seek(io::SeekFrom::Start(0))?;
    Ok(read == 2 && magic == [0x1f, 0x8b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GenericLogParser;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_plain_file_with_provenance() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2023-09-09 10:00:00 INFO first").unwrap();
        writeln!(file, "2023-09-09 10:00:01 INFO second").unwrap();
        let path = file.path().to_str().unwrap();

        let entries = read_entries(path, &GenericLogParser).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line_number, Some(1));
        assert_eq!(entries[1].line_number, Some(2));
        assert_eq!(entries[0].source_file.as_deref(), Some(path));
    }

    #[test]
    fn reads_gzip_file_by_magic_bytes() {
        // No .gz extension, so detection must go through the header
        let mut file = NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"ERROR compressed line\n").unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let entries =
            read_entries(file.path().to_str().unwrap(), &GenericLogParser).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].raw_line, "ERROR compressed line");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = read_entries("/no/such/file.log", &GenericLogParser);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("/no/such/file.log"));
    }
}
