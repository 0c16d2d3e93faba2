//! Local file lifecycle: chunk files opened for truncate/append, and atomic
//! whole-file rewrites (write `.part`, fsync, rename).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `ledger` → `ledger.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Open the destination for one transfer range. The first range of an attempt
/// truncates (any earlier partial content is discarded); later ranges append.
/// Writes are buffered in blocks of `block_size` bytes.
pub fn open_chunk_file(path: &Path, truncate: bool, block_size: usize) -> io::Result<BufWriter<File>> {
    let file = if truncate {
        File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?
    } else {
        File::options().create(true).append(true).open(path)?
    };
    Ok(BufWriter::with_capacity(block_size, file))
}

/// Replace `path` with `contents` so readers see either the old or the new file.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tp = temp_path(path);
    {
        let mut f = File::create(&tp)?;
        f.write_all(contents)?;
        f.sync_all()?;
    }
    fs::rename(&tp, path)
}
