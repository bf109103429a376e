//! Ephemeral per-run working directory.
//!
//! A [`Workspace`] is removed when it is released or dropped, whichever comes
//! first, so every exit path of a run cleans up. Removal failures are logged
//! as warnings and otherwise ignored.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{io_err, DeployError};

const PREFIX: &str = "sitepush-";

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
    keep: bool,
}

impl Workspace {
    /// Create a uniquely named directory under `parent` (system temp dir when
    /// `None`). With `keep`, the directory survives release for inspection.
    pub fn acquire(parent: Option<&Path>, keep: bool) -> Result<Self, DeployError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);

        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
                builder.tempdir_in(parent).map_err(|e| io_err(parent, e))?
            }
            None => builder
                .tempdir()
                .map_err(|e| io_err(std::env::temp_dir(), e))?,
        };

        let path = dir.path().to_path_buf();
        tracing::debug!(path = %path.display(), "workspace created");
        Ok(Self {
            path,
            dir: Some(dir),
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// End the run's ownership of the directory.
    pub fn release(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            let kept = dir.keep();
            tracing::info!(path = %kept.display(), "workspace kept");
            return;
        }

        match dir.close() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "workspace removed"),
            Err(error) => tracing::warn!(
                path = %self.path.display(),
                %error,
                "could not remove workspace"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.teardown();
    }
}
