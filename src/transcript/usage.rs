use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::StatuslineError;

/// Token counts carried by a single transcript entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    pub input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub output_tokens: u64,
}

impl UsageRecord {
    /// Extract the usage object of a parsed transcript entry.
    ///
    /// A top-level `usage` object wins over `message.usage`; the two are
    /// never merged. Counters that are missing, negative, fractional or not
    /// numbers contribute zero.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let usage = entry
            .get("usage")
            .filter(|u| u.is_object())
            .or_else(|| entry.get("message")?.get("usage").filter(|u| u.is_object()))?;

        Some(Self {
            input_tokens: counter(usage, "input_tokens"),
            cache_creation_input_tokens: counter(usage, "cache_creation_input_tokens"),
            cache_read_input_tokens: counter(usage, "cache_read_input_tokens"),
            output_tokens: counter(usage, "output_tokens"),
        })
    }

    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_creation_input_tokens)
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.output_tokens)
    }
}

fn counter(usage: &Value, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Running totals for one pass over a transcript.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub output_tokens: u64,
    /// Entries that carried a usage object.
    pub entries: u64,
}

impl UsageTotals {
    pub fn add(&mut self, record: &UsageRecord) {
        self.input_tokens = self.input_tokens.saturating_add(record.input_tokens);
        self.cache_creation_input_tokens = self
            .cache_creation_input_tokens
            .saturating_add(record.cache_creation_input_tokens);
        self.cache_read_input_tokens = self
            .cache_read_input_tokens
            .saturating_add(record.cache_read_input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(record.output_tokens);
        self.entries += 1;
    }

    /// Sum of all four counters.
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_creation_input_tokens)
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.output_tokens)
    }
}

impl Extend<UsageRecord> for UsageTotals {
    fn extend<I: IntoIterator<Item = UsageRecord>>(&mut self, iter: I) {
        for record in iter {
            self.add(&record);
        }
    }
}

impl FromIterator<UsageRecord> for UsageTotals {
    fn from_iter<I: IntoIterator<Item = UsageRecord>>(iter: I) -> Self {
        let mut totals = Self::default();
        totals.extend(iter);
        totals
    }
}

/// Parse one raw transcript line. Blank lines, invalid UTF-8, invalid JSON
/// and entries without usage all yield `None`.
pub fn parse_line(line: &[u8]) -> Option<UsageRecord> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    let entry: Value = serde_json::from_slice(line).ok()?;
    UsageRecord::from_entry(&entry)
}

/// Stream `reader` line by line and sum every usage record found.
///
/// Only the current line is buffered. Lines that do not parse are skipped;
/// a read error aborts the pass.
pub fn aggregate<R: BufRead>(reader: R) -> Result<UsageTotals, StatuslineError> {
    let mut totals = UsageTotals::default();
    let mut lines = 0u64;

    for line in reader.split(b'\n') {
        let line = line?;
        lines += 1;
        if let Some(record) = parse_line(&line) {
            tracing::trace!(line = lines, tokens = record.total(), "usage entry");
            totals.add(&record);
        }
    }

    tracing::debug!(
        lines,
        entries = totals.entries,
        total = totals.total(),
        "aggregated transcript usage"
    );
    Ok(totals)
}

/// Open `path` and aggregate its usage.
pub fn aggregate_file(path: &Path) -> Result<UsageTotals, StatuslineError> {
    let file = File::open(path)?;
    aggregate(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};
    use tempfile::TempDir;

    /// Serves `data`, then fails every further read.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::other("device went away")),
                n => Ok(n),
            }
        }
    }

    fn totals_of(contents: &str) -> UsageTotals {
        aggregate(Cursor::new(contents.as_bytes())).unwrap()
    }

    #[test]
    fn test_sums_all_four_fields() {
        let transcript = concat!(
            r#"{"usage":{"input_tokens":10,"cache_creation_input_tokens":20,"cache_read_input_tokens":30,"output_tokens":40}}"#,
            "\n",
            r#"{"message":{"usage":{"input_tokens":1,"output_tokens":2}}}"#,
            "\n",
        );
        let totals = totals_of(transcript);
        assert_eq!(totals.input_tokens, 11);
        assert_eq!(totals.cache_creation_input_tokens, 20);
        assert_eq!(totals.cache_read_input_tokens, 30);
        assert_eq!(totals.output_tokens, 42);
        assert_eq!(totals.total(), 103);
        assert_eq!(totals.entries, 2);
    }

    #[test]
    fn test_top_level_usage_takes_precedence() {
        let line = r#"{"usage":{"input_tokens":5},"message":{"usage":{"input_tokens":500,"output_tokens":7}}}"#;
        let record = parse_line(line.as_bytes()).unwrap();
        assert_eq!(record.input_tokens, 5);
        assert_eq!(record.output_tokens, 0);
    }

    #[test]
    fn test_non_object_top_level_usage_falls_through() {
        let line = r#"{"usage":null,"message":{"usage":{"output_tokens":7}}}"#;
        assert_eq!(parse_line(line.as_bytes()).unwrap().output_tokens, 7);
    }

    #[test]
    fn test_lines_without_usage_are_ignored() {
        assert_eq!(parse_line(br#"{"type":"summary"}"#), None);
        assert_eq!(parse_line(br#"{"message":{"role":"user"}}"#), None);
        assert_eq!(parse_line(br#"{"message":"text"}"#), None);
        assert_eq!(parse_line(b"[1,2,3]"), None);
        assert_eq!(parse_line(b"   "), None);
    }

    #[test]
    fn test_non_numeric_fields_count_as_zero() {
        let line = r#"{"usage":{"input_tokens":"12","cache_read_input_tokens":-4,"cache_creation_input_tokens":1.5,"output_tokens":3}}"#;
        let record = parse_line(line.as_bytes()).unwrap();
        assert_eq!(record.total(), 3);
    }

    #[test]
    fn test_malformed_lines_do_not_change_total() {
        let valid = r#"{"usage":{"input_tokens":1000,"output_tokens":500}}"#;
        let clean = format!("{valid}\n{valid}\n");
        let noisy = format!(
            "{{not json\n{valid}\n\n\u{1}garbage\n{valid}\n{{\"usage\":\n{{not json\n"
        );

        assert_eq!(totals_of(&clean).total(), 3000);
        assert_eq!(totals_of(&noisy).total(), totals_of(&clean).total());
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut bytes = br#"{"usage":{"output_tokens":9}}"#.to_vec();
        bytes.extend_from_slice(b"\n\xff\xfe\xfd\n");
        bytes.extend_from_slice(br#"{"usage":{"output_tokens":1}}"#);

        let totals = aggregate(Cursor::new(bytes)).unwrap();
        assert_eq!(totals.total(), 10);
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let transcript = "{\"usage\":{\"input_tokens\":2}}\r\n{\"usage\":{\"input_tokens\":3}}";
        assert_eq!(totals_of(transcript).total(), 5);
    }

    #[test]
    fn test_counters_saturate() {
        let line = format!(
            r#"{{"usage":{{"input_tokens":{},"output_tokens":{}}}}}"#,
            u64::MAX,
            u64::MAX
        );
        let totals = totals_of(&format!("{line}\n{line}\n"));
        assert_eq!(totals.input_tokens, u64::MAX);
        assert_eq!(totals.total(), u64::MAX);
    }

    #[test]
    fn test_collect_records() {
        let totals: UsageTotals = [
            UsageRecord {
                input_tokens: 1,
                ..Default::default()
            },
            UsageRecord {
                output_tokens: 2,
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(totals.total(), 3);
        assert_eq!(totals.entries, 2);
    }

    #[test]
    fn test_aggregate_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abc.jsonl");
        std::fs::write(
            &path,
            "{\"usage\":{\"input_tokens\":1000,\"output_tokens\":500}}\nnot json\n",
        )
        .unwrap();

        assert_eq!(aggregate_file(&path).unwrap().total(), 1500);
    }

    #[test]
    fn test_read_error_mid_stream_is_error() {
        let reader = FailingReader {
            data: Cursor::new(b"{\"usage\":{\"input_tokens\":10}}\n".to_vec()),
        };

        let err = aggregate(BufReader::new(reader)).unwrap_err();
        assert!(matches!(err, StatuslineError::Io(_)));
    }

    #[test]
    fn test_aggregate_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = aggregate_file(&dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, StatuslineError::Io(_)));
    }

    #[test]
    fn test_empty_file_is_zero() {
        assert_eq!(totals_of(""), UsageTotals::default());
    }
}
