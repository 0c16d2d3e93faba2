//! Where a remote file lives from the panel's point of view.

use crate::url_model::{percent_decode, RemotePath};

/// Directory and bare file name of a remote file as the panel addresses them:
/// the traversal root's last path segment, then the decoded relative path.
/// `https://u.host/files/Show/ep1.mkv` under root `https://u.host/files/`
/// becomes dir `files/Show/`, file `ep1.mkv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumTarget {
    pub dir: String,
    pub file: String,
}

impl ChecksumTarget {
    pub fn derive(remote: &RemotePath, root: &RemotePath) -> Option<Self> {
        let root_raw = root.as_str().trim_end_matches('/');
        let root_dir = root_raw.rsplit('/').next().filter(|s| !s.is_empty())?;
        let rel = remote.as_str().strip_prefix(root_raw)?.trim_start_matches('/');
        let full = format!("{}/{}", percent_decode(root_dir), percent_decode(rel));
        let (dir, file) = full.rsplit_once('/')?;
        if file.is_empty() {
            return None;
        }
        Some(Self {
            dir: format!("{}/", dir),
            file: file.to_string(),
        })
    }
}
