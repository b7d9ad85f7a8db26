//! Repository configuration
//!
//! All paths are virtual, absolute and `/`-rooted as seen by the filesystem
//! collaborator. Tracked content must live under `namespace`, which itself
//! lives under `clone_dir`. The VCS bookkeeping lives under
//! `clone_dir/<git_dir_name>` and is never scanned.

use crate::errors::{Result, VcsError};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CLONE_DIR: &str = "/";
pub const DEFAULT_NAMESPACE: &str = "/.documents";
pub const DEFAULT_GIT_DIR_NAME: &str = ".git";
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub clone_dir: PathBuf,
    pub namespace: PathBuf,
    pub git_dir_name: String,
    pub default_branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            clone_dir: PathBuf::from(DEFAULT_CLONE_DIR),
            namespace: PathBuf::from(DEFAULT_NAMESPACE),
            git_dir_name: DEFAULT_GIT_DIR_NAME.to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl RepositoryConfig {
    pub fn with_namespace(namespace: impl Into<PathBuf>) -> Self {
        RepositoryConfig {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn git_dir(&self) -> PathBuf {
        self.clone_dir.join(&self.git_dir_name)
    }

    /// Whether `path` lies strictly inside the tracked namespace
    pub fn in_namespace(&self, path: &Path) -> bool {
        path != self.namespace && path.starts_with(&self.namespace) && !self.is_reserved(path)
    }

    pub fn is_reserved(&self, path: &Path) -> bool {
        path.starts_with(self.git_dir())
    }

    /// Validate an absolute path and turn it into the repository-relative key
    /// used by the index and by tree objects.
    pub fn to_repo_path(&self, path: &Path) -> Result<PathBuf> {
        let normalized = normalize(path).ok_or_else(|| self.violation(path))?;

        if !self.in_namespace(&normalized) {
            return Err(self.violation(path));
        }

        normalized
            .strip_prefix(&self.clone_dir)
            .map(Path::to_path_buf)
            .map_err(|_| self.violation(path))
    }

    /// Like [`RepositoryConfig::to_repo_path`], but also accepts the
    /// namespace root itself for operations that work on whole directories
    pub fn to_repo_scope(&self, path: &Path) -> Result<PathBuf> {
        match normalize(path) {
            Some(normalized) if normalized == self.namespace => Ok(self.namespace_prefix()),
            _ => self.to_repo_path(path),
        }
    }

    /// Inverse of [`RepositoryConfig::to_repo_path`]
    pub fn to_fs_path(&self, repo_path: &Path) -> PathBuf {
        self.clone_dir.join(repo_path)
    }

    /// Namespace expressed relative to the clone directory
    pub fn namespace_prefix(&self) -> PathBuf {
        self.namespace
            .strip_prefix(&self.clone_dir)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn violation(&self, path: &Path) -> VcsError {
        VcsError::NamespaceViolation {
            path: path.to_path_buf(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Collapse `.` components and reject relative paths or `..` escapes
fn normalize(path: &Path) -> Option<PathBuf> {
    if !path.has_root() {
        return None;
    }

    let mut normalized = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(name) => normalized.push(name),
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    Some(normalized)
}
