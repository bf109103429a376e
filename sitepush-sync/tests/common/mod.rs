//! Local bare-repository fixtures for pipeline tests. Requires `git` on PATH.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sitepush_core::{CommitIdentity, Credential, DeploymentRequest, RepoCoordinates, Revision};
use sitepush_sync::Git;
use tempfile::TempDir;

pub const OWNER: &str = "acme";
pub const NAME: &str = "site";

/// A bare repository reachable as `file://<root>/acme/site.git`.
pub struct Remote {
    pub root: TempDir,
    pub bare: PathBuf,
}

impl Remote {
    /// Empty bare repository whose HEAD points at `main`.
    pub fn empty() -> Self {
        let root = TempDir::new().unwrap();
        let bare = root.path().join(OWNER).join(format!("{NAME}.git"));
        std::fs::create_dir_all(&bare).unwrap();
        let git = git_at(&bare);
        git.run(&["init", "--quiet", "--bare"]).unwrap();
        git.run(&["symbolic-ref", "HEAD", "refs/heads/main"]).unwrap();
        Self { root, bare }
    }

    pub fn remote_base(&self) -> String {
        format!("file://{}", self.root.path().display())
    }

    /// Push a commit containing `files` onto `branch`, on top of its current tip.
    pub fn seed(&self, branch: &str, files: &[(&str, &str)], message: &str) -> String {
        let scratch = TempDir::new().unwrap();
        let git = git_at(scratch.path());
        git.run(&["init", "--quiet"]).unwrap();
        git.run(&["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")])
            .unwrap();
        let url = self.bare.display().to_string();
        if self.rev(branch).is_some() {
            git.run(&["pull", "--quiet", &url, branch]).unwrap();
        }
        for (path, contents) in files {
            let target = scratch.path().join(path);
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(target, contents).unwrap();
        }
        git.run(&["add", "--all"]).unwrap();
        git.run(&["commit", "--quiet", "-m", message]).unwrap();
        git.run(&["push", "--quiet", &url, &format!("HEAD:refs/heads/{branch}")])
            .unwrap();
        git.run(&["rev-parse", "HEAD"]).unwrap()
    }

    /// Tip of `branch`, if it exists.
    pub fn rev(&self, branch: &str) -> Option<String> {
        git_at(&self.bare)
            .run(&["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .ok()
    }

    /// Every path on `branch`, sorted.
    pub fn files(&self, branch: &str) -> Vec<String> {
        let listing = git_at(&self.bare)
            .run(&["ls-tree", "-r", "--name-only", branch])
            .unwrap();
        let mut files: Vec<String> = listing.lines().map(str::to_string).collect();
        files.sort();
        files
    }

    pub fn show(&self, branch: &str, path: &str) -> String {
        git_at(&self.bare)
            .run(&["show", &format!("{branch}:{path}")])
            .unwrap()
    }

    pub fn commit_count(&self, branch: &str) -> usize {
        git_at(&self.bare)
            .run(&["rev-list", "--count", branch])
            .unwrap()
            .parse()
            .unwrap()
    }

    pub fn subject(&self, branch: &str) -> String {
        git_at(&self.bare)
            .run(&["log", "-1", "--format=%s", branch])
            .unwrap()
    }

    pub fn parents(&self, branch: &str) -> Vec<String> {
        git_at(&self.bare)
            .run(&["log", "-1", "--format=%P", branch])
            .unwrap()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

pub fn git_at(dir: &Path) -> Git {
    Git::new(dir, CommitIdentity::default(), Credential::default())
}

/// Write `files` under a fresh artifact directory.
pub fn artifact(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, contents) in files {
        let target = dir.path().join(path);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(target, contents).unwrap();
    }
    dir
}

/// Request against `remote` with a throwaway credential and a private
/// workspace parent.
pub fn request(remote: &Remote, artifact: &Path, workspace: &Path, revision: &str) -> DeploymentRequest {
    let mut request = DeploymentRequest::new(
        artifact,
        RepoCoordinates::new(OWNER, NAME),
        Credential::new("ghs_fixture_token"),
        Revision(revision.to_string()),
    );
    request.remote_base = remote.remote_base();
    request.workspace_parent = Some(workspace.to_path_buf());
    request
}

/// Number of entries left in a workspace parent directory.
pub fn leftovers(workspace: &Path) -> usize {
    std::fs::read_dir(workspace).unwrap().count()
}
