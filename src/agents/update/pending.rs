use crate::error::Result;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// New file contents collected during an update session.
///
/// Updaters only stage; nothing touches the disk until [`commit`](Self::commit),
/// so quitting an interactive session leaves every file as it was.
#[derive(Debug, Default)]
pub struct PendingWrites {
    files: Vec<(PathBuf, String)>,
}

impl PendingWrites {
    /// Stage `content` for `path`, replacing anything staged for it before.
    pub fn stage(&mut self, path: PathBuf, content: String) {
        match self.files.iter_mut().find(|(staged, _)| *staged == path) {
            Some(entry) => entry.1 = content,
            None => self.files.push((path, content)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every staged file and return their paths.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (path, content) in self.files {
            fs::write(&path, content)?;
            debug!(path = %path.display(), "file updated");
            written.push(path);
        }
        Ok(written)
    }
}
