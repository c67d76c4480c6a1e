//! Output files that are written together or not at all.
//!
//! Every payload is first written to a temporary file in its destination
//! directory. Only when all of them have been staged are they moved into
//! place; dropping an uncommitted batch removes the temporary files.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::matching::KeySet;

#[derive(Default)]
pub struct OutputBatch {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl OutputBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `contents` to a temporary file next to `path`
    ///
    /// # Errors
    ///
    /// Returns an IO error if the destination directory does not exist or
    /// the temporary file cannot be written.
    pub fn stage(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Cannot write '{}': {e}", path.display()),
            )
        })?;
        file.write_all(contents)?;
        file.flush()?;

        debug!(path = %path.display(), bytes = contents.len(), "Staged output");
        self.staged.push((file, path.to_path_buf()));
        Ok(())
    }

    /// Stage `keys` as `<dir>/<name>.txt`, one value per line in byte order.
    ///
    /// Creates `dir` if it does not exist. Returns the destination path.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory or temporary file cannot be
    /// created or written.
    pub fn stage_key_set(&mut self, dir: &Path, name: &str, keys: &KeySet) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{name}.txt"));

        let mut text = String::new();
        for value in keys.sorted() {
            text.push_str(value);
            text.push('\n');
        }
        self.stage(&path, text.as_bytes())?;
        Ok(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged file into place, replacing existing files
    ///
    /// # Errors
    ///
    /// Returns an IO error if a staged file cannot be renamed.
    pub fn commit(self) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.staged.len());
        for (file, path) in self.staged {
            file.persist(&path).map_err(|e| e.error)?;
            info!(path = %path.display(), "Wrote output");
            written.push(path);
        }
        Ok(written)
    }
}
