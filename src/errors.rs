//! Error taxonomy for the version-control core
//!
//! Every public operation returns [`Result`]. Errors are surfaced to the caller
//! of the failing operation and never retried here.

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, VcsError>;

#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("path {path} is outside the tracked namespace {namespace}")]
    NamespaceViolation { path: PathBuf, namespace: PathBuf },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("object store I/O failure at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing to commit: the staged tree matches the current commit")]
    EmptyCommit,

    #[error("unknown revision: {0}")]
    UnknownRevision(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("no author configured, call set_author first")]
    MissingAuthor,

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("working tree I/O failure at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkout left the working tree partially updated:\n{0}")]
    Checkout(CheckoutFailures),
}

impl VcsError {
    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VcsError::StoreIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VcsError::Workspace {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        VcsError::Corrupt(reason.into())
    }
}

/// Per-file failures collected while materializing a tree
#[derive(Debug, Default)]
pub struct CheckoutFailures {
    failures: Vec<(PathBuf, std::io::Error)>,
}

impl CheckoutFailures {
    pub fn push(&mut self, path: PathBuf, error: std::io::Error) {
        self.failures.push((path, error));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.failures.iter().map(|(path, _)| path)
    }
}

impl fmt::Display for CheckoutFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .failures
            .iter()
            .map(|(path, error)| format!("\t{}: {}", path.display(), error))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_failures_render_one_line_per_path() {
        let mut failures = CheckoutFailures::default();
        failures.push(
            PathBuf::from("/.documents/a.txt"),
            std::io::Error::other("disk full"),
        );
        failures.push(
            PathBuf::from("/.documents/b.txt"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );

        let rendered = VcsError::Checkout(failures).to_string();

        assert!(rendered.contains("/.documents/a.txt: disk full"));
        assert!(rendered.contains("/.documents/b.txt"));
        assert_eq!(rendered.lines().count(), 3);
    }
}
