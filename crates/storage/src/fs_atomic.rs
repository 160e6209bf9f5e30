// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-to-tempfile-then-rename, the only write primitive the core uses
//! for job files.

use grove_core::Error;
use std::path::Path;

/// Atomically replace `path`'s contents with `content`.
///
/// Writes to a sibling `.tmp` file first so a crash mid-write never leaves a
/// torn file at `path`; `rename` within the same directory is atomic on the
/// filesystems this tool targets.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), Error> {
    let tmp_path = sibling_tmp_path(path);
    std::fs::write(&tmp_path, content.as_bytes()).map_err(|e| Error::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| Error::io(path, e))
}

fn sibling_tmp_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
