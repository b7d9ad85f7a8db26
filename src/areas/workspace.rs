//! Working tree access under the tracked namespace
//!
//! The scanner hashes files exactly as the object store hashes blobs, so scan
//! results compare directly with stored ids without writing any object.
//! Everything outside the namespace, and the git dir wherever it lives, is
//! invisible here.

use crate::areas::database::Database;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object::{frame, hash_bytes};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::config::RepositoryConfig;
use crate::errors::{CheckoutFailures, Result, VcsError};
use crate::fs::{FileSystem, mkdir_p, try_stat};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Blob ids of the files found by a scan, keyed by repository-relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceScan {
    pub files: BTreeMap<PathBuf, ObjectId>,
    /// Files that could not be read
    pub unreadable: BTreeSet<PathBuf>,
    /// Directories that could not be listed, so nothing beneath them is known
    pub unreadable_dirs: BTreeSet<PathBuf>,
}

impl WorkspaceScan {
    /// Whether the working-tree state of `path` could not be determined
    pub fn is_unknown(&self, path: &Path) -> bool {
        self.unreadable.contains(path)
            || self.unreadable_dirs.iter().any(|dir| path.starts_with(dir))
    }

    /// Every unreadable file and directory
    pub fn degraded(&self) -> impl Iterator<Item = &PathBuf> {
        self.unreadable.iter().chain(self.unreadable_dirs.iter())
    }
}

#[derive(Debug)]
pub struct Workspace<F> {
    fs: Arc<F>,
    config: RepositoryConfig,
}

impl<F: FileSystem> Workspace<F> {
    pub fn new(fs: Arc<F>, config: RepositoryConfig) -> Self {
        Workspace { fs, config }
    }

    /// The id a file's content would be stored under
    pub fn hash_content(content: &[u8]) -> ObjectId {
        hash_bytes(&frame(ObjectType::Blob, content))
    }

    /// Content of a file, `None` when it is missing or a directory
    pub async fn read_file(&self, repo_path: &Path) -> Result<Option<Bytes>> {
        let path = self.config.to_fs_path(repo_path);

        match self.fs.read_file(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => match try_stat(self.fs.as_ref(), &path).await {
                Ok(Some(stat)) if stat.is_dir() => Ok(None),
                _ => Err(VcsError::workspace(path, e)),
            },
        }
    }

    /// Blob id of a single file, `None` when it is missing or a directory
    pub async fn hash_file(&self, repo_path: &Path) -> Result<Option<ObjectId>> {
        Ok(self
            .read_file(repo_path)
            .await?
            .map(|content| Self::hash_content(&content)))
    }

    pub async fn is_dir(&self, repo_path: &Path) -> Result<bool> {
        let path = self.config.to_fs_path(repo_path);

        try_stat(self.fs.as_ref(), &path)
            .await
            .map(|stat| stat.is_some_and(|stat| stat.is_dir()))
            .map_err(|e| VcsError::workspace(path, e))
    }

    /// Scan the whole namespace
    pub async fn scan(&self) -> Result<WorkspaceScan> {
        self.scan_from(&self.config.namespace_prefix()).await
    }

    /// Recursively hash every file at or beneath `repo_path`
    ///
    /// A missing root scans as empty. Failures below the root are recorded
    /// per path and do not stop the scan.
    pub async fn scan_from(&self, repo_path: &Path) -> Result<WorkspaceScan> {
        let mut scan = WorkspaceScan::default();
        let root = self.config.to_fs_path(repo_path);

        let Some(stat) = try_stat(self.fs.as_ref(), &root)
            .await
            .map_err(|e| VcsError::workspace(&root, e))?
        else {
            return Ok(scan);
        };

        if stat.is_file() {
            self.scan_file(repo_path.to_path_buf(), &mut scan).await;
            return Ok(scan);
        }

        let mut pending = vec![repo_path.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let dir_path = self.config.to_fs_path(&dir);
            let names = match self.fs.readdir(&dir_path).await {
                Ok(names) => names,
                Err(e) => {
                    tracing::warn!(path = %dir_path.display(), error = %e, "unreadable directory");
                    scan.unreadable_dirs.insert(dir);
                    continue;
                }
            };

            for name in names {
                let child = dir.join(name);
                let child_path = self.config.to_fs_path(&child);
                if self.config.is_reserved(&child_path) {
                    continue;
                }

                match self.fs.stat(&child_path).await {
                    Ok(stat) if stat.is_dir() => pending.push(child),
                    Ok(_) => self.scan_file(child, &mut scan).await,
                    Err(e) if is_missing(&e) => {}
                    Err(e) => {
                        tracing::warn!(path = %child_path.display(), error = %e, "unreadable path");
                        scan.unreadable.insert(child);
                    }
                }
            }
        }

        Ok(scan)
    }

    async fn scan_file(&self, repo_path: PathBuf, scan: &mut WorkspaceScan) {
        let path = self.config.to_fs_path(&repo_path);

        match self.fs.read_file(&path).await {
            Ok(content) => {
                scan.files.insert(repo_path, Self::hash_content(&content));
            }
            // removed between listing and reading
            Err(e) if is_missing(&e) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable file");
                scan.unreadable.insert(repo_path);
            }
        }
    }

    /// Delete a file, treating an already missing file as deleted
    pub async fn remove_file(&self, repo_path: &Path) -> Result<()> {
        let path = self.config.to_fs_path(repo_path);

        match self.fs.unlink(&path).await {
            Ok(()) => Ok(()),
            Err(e) if is_missing(&e) => Ok(()),
            Err(e) => Err(VcsError::workspace(path, e)),
        }
    }

    /// Apply a checkout plan
    ///
    /// Every action is attempted. Failures are collected per path and
    /// returned together once everything else has been applied.
    pub async fn apply_migration(
        &self,
        migration: &Migration,
        database: &Database<F>,
    ) -> Result<()> {
        let mut failures = CheckoutFailures::default();

        for action in migration.deletions() {
            let path = self.config.to_fs_path(&action.path);
            match self.fs.unlink(&path).await {
                Ok(()) => {}
                Err(e) if is_missing(&e) => {}
                Err(e) => failures.push(path, e),
            }
        }

        for dir in migration.rmdirs() {
            let path = self.config.to_fs_path(dir);
            match self.fs.rmdir(&path).await {
                Ok(()) => {}
                // still holds files the target keeps, or untracked content
                Err(e) if is_missing(&e) || e.kind() == io::ErrorKind::DirectoryNotEmpty => {}
                Err(e) => failures.push(path, e),
            }
        }

        for action in migration.writes() {
            let path = self.config.to_fs_path(&action.path);
            let Some(entry) = &action.entry else {
                continue;
            };

            if let Err(e) = self.write_blob(&path, &entry.oid, database).await {
                failures.push(path, e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            tracing::warn!(failed = failures.len(), "checkout partially applied");
            Err(VcsError::Checkout(failures))
        }
    }

    async fn write_blob(&self, path: &Path, oid: &ObjectId, database: &Database<F>) -> io::Result<()> {
        let content = match database.parse_object_as_blob(oid).await {
            Ok(Some(blob)) => blob.into_content(),
            Ok(None) => return Err(io::Error::other(format!("object {oid} is not a blob"))),
            Err(e) => return Err(io::Error::other(e.to_string())),
        };

        if let Some(parent) = path.parent() {
            mkdir_p(self.fs.as_ref(), parent).await?;
        }
        if let Some(stat) = try_stat(self.fs.as_ref(), path).await?
            && stat.is_dir()
        {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory holding untracked files", path.display()),
            ));
        }

        self.fs.write_file(path, &content).await
    }
}

fn is_missing(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound
}
