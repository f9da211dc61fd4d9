use std::fs;
use std::path::{Path, PathBuf};

/// Find `<session_id>.<extension>` directly under one of the first-level
/// subdirectories of `root`.
///
/// Subdirectories are visited in whatever order the filesystem lists them
/// and the first hit wins. A missing or unreadable root, or an entry that
/// cannot be inspected, counts as "not found" for that scope only.
pub fn find_transcript(root: &Path, session_id: &str, extension: &str) -> Option<PathBuf> {
    if !is_plain_file_stem(session_id) {
        tracing::debug!("refusing to look up session id {:?}", session_id);
        return None;
    }

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot list {}: {}", root.display(), e);
            return None;
        }
    };

    let file_name = format!("{}.{}", session_id, extension);

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::trace!("skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };

        // `Path::is_dir` follows symlinks, so linked project dirs are searched too.
        let project_dir = entry.path();
        if !project_dir.is_dir() {
            continue;
        }

        let candidate = project_dir.join(&file_name);
        if candidate.is_file() {
            tracing::debug!("found transcript {}", candidate.display());
            return Some(candidate);
        }
    }

    None
}

/// Session ids are opaque, but `<id>.<ext>` must stay a single path
/// component inside the project directory.
fn is_plain_file_stem(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id != "."
        && session_id != ".."
        && !session_id.contains(['/', '\\'])
}
