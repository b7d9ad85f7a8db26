use bytes::Bytes;
use docvcs::fs::Stat;
use docvcs::{FileSystem, MemoryFs};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// MemoryFs that refuses selected operations on selected paths
///
/// Read-only paths refuse writes and unlinks. Unreadable paths refuse
/// reads and directory listings.
#[derive(Debug, Default)]
pub struct FailingFs {
    inner: MemoryFs,
    read_only: Mutex<BTreeSet<PathBuf>>,
    unreadable: Mutex<BTreeSet<PathBuf>>,
}

impl FailingFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inner(&self) -> &MemoryFs {
        &self.inner
    }

    pub fn break_path(&self, path: impl Into<PathBuf>) {
        self.read_only.lock().unwrap().insert(path.into());
    }

    pub fn hide_path(&self, path: impl Into<PathBuf>) {
        self.unreadable.lock().unwrap().insert(path.into());
    }

    fn check(set: &Mutex<BTreeSet<PathBuf>>, path: &Path) -> io::Result<()> {
        if set.lock().unwrap().contains(path) {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("EACCES: permission denied '{}'", path.display()),
            ))
        } else {
            Ok(())
        }
    }
}

impl FileSystem for FailingFs {
    async fn read_file(&self, path: &Path) -> io::Result<Bytes> {
        Self::check(&self.unreadable, path)?;
        self.inner.read_file(path).await
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        Self::check(&self.read_only, path)?;
        self.inner.write_file(path, data).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        Self::check(&self.read_only, path)?;
        self.inner.unlink(path).await
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        self.inner.mkdir(path).await
    }

    async fn rmdir(&self, path: &Path) -> io::Result<()> {
        self.inner.rmdir(path).await
    }

    async fn readdir(&self, path: &Path) -> io::Result<Vec<String>> {
        Self::check(&self.unreadable, path)?;
        self.inner.readdir(path).await
    }

    async fn stat(&self, path: &Path) -> io::Result<Stat> {
        self.inner.stat(path).await
    }
}
