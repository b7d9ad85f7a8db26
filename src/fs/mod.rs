//! Filesystem collaborator
//!
//! The core never touches the host filesystem directly. Every read and write
//! goes through a [`FileSystem`] implementation addressed by virtual,
//! absolute, `/`-rooted paths. Errors follow POSIX conventions: a missing
//! path yields [`std::io::ErrorKind::NotFound`].
//!
//! - `memory`: in-memory implementation for tests and embedding
//! - `disk`: implementation rooted at a host directory

use bytes::Bytes;
use std::future::Future;
use std::io;
use std::path::Path;

pub mod disk;
pub mod memory;

pub use disk::DiskFs;
pub use memory::MemoryFs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: FileKind,
    pub size: u64,
}

impl Stat {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

pub trait FileSystem: Send + Sync + 'static {
    fn read_file(&self, path: &Path) -> impl Future<Output = io::Result<Bytes>> + Send;

    /// Create or truncate a file. The parent directory must exist.
    fn write_file(&self, path: &Path, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    fn unlink(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Create a single directory. Fails with `AlreadyExists` if the path exists.
    fn mkdir(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Remove an empty directory
    fn rmdir(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Names of the direct children of a directory, in no particular order
    fn readdir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send;

    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<Stat>> + Send;
}

/// Create `path` and all of its missing ancestors
pub async fn mkdir_p<F: FileSystem>(fs: &F, path: &Path) -> io::Result<()> {
    let mut missing = Vec::new();
    let mut current = Some(path);

    while let Some(dir) = current {
        match fs.stat(dir).await {
            Ok(stat) if stat.is_dir() => break,
            Ok(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", dir.display()),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => missing.push(dir),
            Err(e) => return Err(e),
        }
        current = dir.parent();
    }

    for dir in missing.into_iter().rev() {
        match fs.mkdir(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// `stat` that maps NotFound to `None`
pub async fn try_stat<F: FileSystem>(fs: &F, path: &Path) -> io::Result<Option<Stat>> {
    match fs.stat(path).await {
        Ok(stat) => Ok(Some(stat)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// `read_file` that maps NotFound to `None`
pub async fn try_read<F: FileSystem>(fs: &F, path: &Path) -> io::Result<Option<Bytes>> {
    match fs.read_file(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
