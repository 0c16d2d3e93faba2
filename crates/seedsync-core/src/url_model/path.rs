//! Local destination paths derived from remote URLs.

use std::path::{Path, PathBuf};

use super::{is_safe_entry_name, percent_decode, RemotePath};

/// Decoded directory of `dir` relative to the traversal `root`, split into segments.
///
/// Returns `None` if `dir` is not under `root` or a segment is unsafe.
pub fn relative_dir(root: &RemotePath, dir: &RemotePath) -> Option<Vec<String>> {
    let rest = dir.as_str().strip_prefix(root.as_str().trim_end_matches('/'))?;
    let mut segments = Vec::new();
    for raw in rest.split('/').filter(|s| !s.is_empty()) {
        if !is_safe_entry_name(raw) {
            return None;
        }
        segments.push(percent_decode(raw));
    }
    Some(segments)
}

/// Local save path for file `name` listed in remote directory `dir`:
/// `local_root` + decoded relative dir + decoded name.
pub fn local_destination(
    local_root: &Path,
    root: &RemotePath,
    dir: &RemotePath,
    name: &str,
) -> Option<PathBuf> {
    if !is_safe_entry_name(name) {
        return None;
    }
    let mut out = local_root.to_path_buf();
    for segment in relative_dir(root, dir)? {
        out.push(segment);
    }
    out.push(percent_decode(name.trim_end_matches('/')));
    Some(out)
}
