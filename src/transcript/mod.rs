//! Transcript discovery and token accounting.

pub mod locator;
pub mod usage;

use std::path::Path;

pub use locator::find_transcript;
pub use usage::{aggregate_file, UsageTotals};

/// Token usage recorded for `session_id` under `root`.
///
/// No transcript, or one that cannot be read, yields zero totals; the
/// statusline cannot tell either case apart from an empty session.
pub fn session_usage(root: &Path, session_id: &str, extension: &str) -> UsageTotals {
    let Some(path) = find_transcript(root, session_id, extension) else {
        return UsageTotals::default();
    };

    usage_or_zero(&path)
}

fn usage_or_zero(path: &Path) -> UsageTotals {
    aggregate_file(path).unwrap_or_else(|e| {
        tracing::debug!("cannot read transcript {}: {}", path.display(), e);
        UsageTotals::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_usage_end_to_end() {
        let root = TempDir::new().unwrap();
        let project = root.path().join("-tmp-proj");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("abc.jsonl"),
            concat!(
                r#"{"type":"user","message":{"role":"user","content":"hi"}}"#,
                "\n",
                r#"{"type":"assistant","message":{"usage":"#,
                r#"{"input_tokens":3,"cache_read_input_tokens":1200,"output_tokens":40}}}"#,
                "\n",
            ),
        )
        .unwrap();

        assert_eq!(session_usage(root.path(), "abc", "jsonl").total(), 1243);
        assert_eq!(session_usage(root.path(), "xyz", "jsonl").total(), 0);
    }

    #[test]
    fn test_unreadable_transcript_is_zero() {
        // Opening a directory succeeds on Unix but the first read fails.
        let dir = TempDir::new().unwrap();
        assert_eq!(usage_or_zero(dir.path()), UsageTotals::default());
    }

    #[test]
    fn test_session_usage_missing_root() {
        let root = TempDir::new().unwrap();
        let totals = session_usage(&root.path().join("nope"), "abc", "jsonl");
        assert_eq!(totals, UsageTotals::default());
    }
}
