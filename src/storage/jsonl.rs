//! Append-only JSONL helpers for the notification queue and outbound log.
//!
//! Writers only ever append. Readers consume from a byte offset and stop at the
//! last newline, so a line that is still being written is left for later.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Complete lines read from a JSONL file past some offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBatch {
    /// Lines without their terminating newline, blank lines included
    pub lines: Vec<String>,
    /// Offset just past each line's newline, parallel to `lines`
    pub line_ends: Vec<u64>,
    /// Offset just past the last complete line
    pub next_offset: u64,
}

/// Append one record as a single JSON line, creating the file if needed.
///
/// If the file's last byte is not a newline (an older writer that joined lines
/// without a trailing newline), a newline is written first so the new record
/// never fuses with the previous one.
pub fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).read(true).append(true).open(path)?;

    let needs_separator = {
        let len = file.metadata()?.len();
        if len == 0 {
            false
        } else {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            last[0] != b'\n'
        }
    };

    let mut line = String::new();
    if needs_separator {
        line.push('\n');
    }
    line.push_str(&serde_json::to_string(record)?);
    line.push('\n');

    // Single write so concurrent appenders cannot interleave within a line
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Read every complete line that starts at or after `offset`.
///
/// Returns `None` when the file does not exist.
pub fn read_lines_from(path: &Path, offset: u64) -> Result<Option<LineBatch>> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    let Some(last_newline) = buf.iter().rposition(|b| *b == b'\n') else {
        return Ok(Some(LineBatch {
            lines: Vec::new(),
            line_ends: Vec::new(),
            next_offset: offset,
        }));
    };

    let mut lines = Vec::new();
    let mut line_ends = Vec::new();
    let mut start = 0;
    for (i, byte) in buf[..=last_newline].iter().enumerate() {
        if *byte == b'\n' {
            let text = String::from_utf8_lossy(&buf[start..i]);
            lines.push(text.trim_end_matches('\r').to_string());
            line_ends.push(offset + i as u64 + 1);
            start = i + 1;
        }
    }

    Ok(Some(LineBatch {
        lines,
        line_ends,
        next_offset: offset + last_newline as u64 + 1,
    }))
}

/// Count non-blank lines; a missing file counts as zero.
pub fn count_lines(path: &Path) -> Result<usize> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().filter(|l| !l.trim().is_empty()).count()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_file_and_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("queue.jsonl");

        append_line(&path, &json!({"n": 1})).unwrap();
        append_line(&path, &json!({"n": 2})).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"n\":1}\n{\"n\":2}\n");
    }

    #[test]
    fn test_append_never_overwrites_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queue.jsonl");
        fs::write(&path, "{\"old\":true}\n").unwrap();

        append_line(&path, &json!({"new": true})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\"old\":true}\n"));
        assert!(content.ends_with("{\"new\":true}\n"));
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queue.jsonl");
        fs::write(&path, "{\"a\":1}\n{\"b\":2}").unwrap();

        append_line(&path, &json!({"c": 3})).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n"
        );
    }

    #[test]
    fn test_read_lines_missing_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_lines_from(&temp.path().join("nope"), 0).unwrap(), None);
    }

    #[test]
    fn test_read_lines_from_offset_skips_partial_tail() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queue.jsonl");
        fs::write(&path, "one\ntwo\nthr").unwrap();

        let batch = read_lines_from(&path, 0).unwrap().unwrap();
        assert_eq!(batch.lines, ["one", "two"]);
        assert_eq!(batch.line_ends, [4, 8]);
        assert_eq!(batch.next_offset, 8);

        let batch = read_lines_from(&path, batch.next_offset).unwrap().unwrap();
        assert!(batch.lines.is_empty());
        assert_eq!(batch.next_offset, 8);

        fs::write(&path, "one\ntwo\nthree\n").unwrap();
        let batch = read_lines_from(&path, 8).unwrap().unwrap();
        assert_eq!(batch.lines, ["three"]);
        assert_eq!(batch.next_offset, 14);
    }

    #[test]
    fn test_read_lines_keeps_blank_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queue.jsonl");
        fs::write(&path, "a\n\nb\r\n").unwrap();

        let batch = read_lines_from(&path, 0).unwrap().unwrap();
        assert_eq!(batch.lines, ["a", "", "b"]);
    }

    #[test]
    fn test_count_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pending.jsonl");
        assert_eq!(count_lines(&path).unwrap(), 0);

        fs::write(&path, "a\n\nb\nc").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 3);
    }
}
