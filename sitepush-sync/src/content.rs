//! Replace the checkout's tracked content with the artifact tree.
//!
//! ## `synchronize` in three steps
//!
//! 1. Remove every entry under the checkout root except `.git`.
//! 2. Copy the artifact tree in, skipping `.git` and (unless asked) any entry
//!    whose name starts with `.`.
//! 3. Write the optional `.nojekyll` / `CNAME` markers.
//!
//! Both traversals use an explicit stack and stop at the first failing path,
//! which is reported in [`DeployError::Sync`].

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use sitepush_core::SyncOptions;

use crate::error::{sync_err, DeployError};

/// Version-control metadata directory, never removed and never copied.
pub const VCS_DIR: &str = ".git";
pub const NOJEKYLL_FILE: &str = ".nojekyll";
pub const CNAME_FILE: &str = "CNAME";

/// What one synchronization wrote into the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    /// SHA-256 over `(relative path, file digest)` pairs in path order.
    pub digest: String,
}

/// Collects per-file digests so the tree digest is order independent.
#[derive(Default)]
struct Tally {
    files: BTreeMap<String, String>,
    directories: usize,
    bytes: u64,
}

impl Tally {
    fn file(&mut self, rel: &Path, content: &[u8]) {
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        self.files.insert(key, hex::encode(Sha256::digest(content)));
        self.bytes += content.len() as u64;
    }

    fn finish(self) -> SyncReport {
        let mut hasher = Sha256::new();
        for (path, digest) in &self.files {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(digest.as_bytes());
            hasher.update(b"\n");
        }
        SyncReport {
            files: self.files.len(),
            directories: self.directories,
            bytes: self.bytes,
            digest: hex::encode(hasher.finalize()),
        }
    }
}

/// Make `target` (a checkout root) hold exactly the artifact tree at `source`.
pub fn synchronize(
    source: &Path,
    target: &Path,
    options: &SyncOptions,
) -> Result<SyncReport, DeployError> {
    clear_checkout(target)?;

    let mut tally = Tally::default();
    copy_tree(source, target, options.include_hidden, &mut tally)?;
    write_markers(target, options, &mut tally)?;

    let report = tally.finish();
    tracing::info!(
        files = report.files,
        directories = report.directories,
        bytes = report.bytes,
        digest = %report.digest,
        "artifact tree synchronized"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

fn clear_checkout(root: &Path) -> Result<(), DeployError> {
    for entry in sorted_entries(root)? {
        if entry.file_name().as_os_str() == OsStr::new(VCS_DIR) {
            continue;
        }
        remove_tree(&entry.path())?;
    }
    Ok(())
}

/// Post-order removal of `path` without following symlinks.
fn remove_tree(path: &Path) -> Result<(), DeployError> {
    // (path, children already queued)
    let mut stack: Vec<(PathBuf, bool)> = vec![(path.to_path_buf(), false)];

    while let Some((current, expanded)) = stack.pop() {
        let meta = fs::symlink_metadata(&current).map_err(|e| sync_err(&current, e))?;
        if !meta.is_dir() {
            fs::remove_file(&current).map_err(|e| sync_err(&current, e))?;
            continue;
        }
        if expanded {
            fs::remove_dir(&current).map_err(|e| sync_err(&current, e))?;
            continue;
        }
        stack.push((current.clone(), true));
        for entry in sorted_entries(&current)? {
            stack.push((entry.path(), false));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn copy_tree(
    source: &Path,
    target: &Path,
    include_hidden: bool,
    tally: &mut Tally,
) -> Result<(), DeployError> {
    // Relative directories still to visit.
    let mut stack: Vec<PathBuf> = vec![PathBuf::new()];

    while let Some(rel_dir) = stack.pop() {
        for entry in sorted_entries(&source.join(&rel_dir))? {
            let name = entry.file_name();
            if name.as_os_str() == OsStr::new(VCS_DIR) {
                continue;
            }
            if !include_hidden && is_hidden(&name) {
                tracing::debug!(path = %rel_dir.join(&name).display(), "skipping hidden entry");
                continue;
            }

            let rel = rel_dir.join(&name);
            let src = entry.path();
            let dst = target.join(&rel);
            let is_link = entry
                .file_type()
                .map_err(|e| sync_err(&src, e))?
                .is_symlink();
            let meta = fs::metadata(&src).map_err(|e| sync_err(&src, e))?;

            if meta.is_dir() {
                if is_link {
                    tracing::warn!(path = %src.display(), "skipping symlinked directory");
                    continue;
                }
                fs::create_dir(&dst).map_err(|e| sync_err(&dst, e))?;
                tally.directories += 1;
                stack.push(rel);
            } else if meta.is_file() {
                let content = fs::read(&src).map_err(|e| sync_err(&src, e))?;
                fs::write(&dst, &content).map_err(|e| sync_err(&dst, e))?;
                tally.file(&rel, &content);
            } else {
                tracing::warn!(path = %src.display(), "skipping special file");
            }
        }
    }
    Ok(())
}

fn write_markers(target: &Path, options: &SyncOptions, tally: &mut Tally) -> Result<(), DeployError> {
    if options.nojekyll {
        let path = target.join(NOJEKYLL_FILE);
        fs::write(&path, b"").map_err(|e| sync_err(&path, e))?;
        tally.file(Path::new(NOJEKYLL_FILE), b"");
    }
    if let Some(domain) = &options.cname {
        let path = target.join(CNAME_FILE);
        let content = format!("{}\n", domain.trim());
        fs::write(&path, &content).map_err(|e| sync_err(&path, e))?;
        tally.file(Path::new(CNAME_FILE), content.as_bytes());
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, DeployError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| sync_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| sync_err(dir, e))?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
