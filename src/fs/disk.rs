use crate::fs::{FileKind, FileSystem, Stat};
use bytes::Bytes;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Filesystem rooted at a host directory
///
/// The virtual path `/a/b.txt` maps to `<root>/a/b.txt`. Parent-directory
/// components are rejected so callers cannot escape the root.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: Box<Path>,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskFs {
            root: root.into().into_boxed_path(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = self.root.to_path_buf();

        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(name) => resolved.push(name),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes the filesystem root: {}", path.display()),
                    ));
                }
            }
        }

        Ok(resolved)
    }
}

impl FileSystem for DiskFs {
    async fn read_file(&self, path: &Path) -> io::Result<Bytes> {
        let data = tokio::fs::read(self.resolve(path)?).await?;
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(self.resolve(path)?, data).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(self.resolve(path)?).await
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir(self.resolve(path)?).await
    }

    async fn rmdir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_dir(self.resolve(path)?).await
    }

    async fn readdir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(self.resolve(path)?).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        Ok(names)
    }

    async fn stat(&self, path: &Path) -> io::Result<Stat> {
        let metadata = tokio::fs::metadata(self.resolve(path)?).await?;
        let kind = if metadata.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        };

        Ok(Stat {
            kind,
            size: metadata.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn virtual_paths_map_under_the_root() {
        let dir = TempDir::new().unwrap();
        let fs = DiskFs::new(dir.path());

        fs.mkdir(Path::new("/notes")).await.unwrap();
        fs.write_file(Path::new("/notes/a.txt"), b"alpha").await.unwrap();

        dir.child("notes/a.txt").assert("alpha");
        assert_eq!(fs.readdir(Path::new("/notes")).await.unwrap(), vec!["a.txt"]);
        assert!(fs.stat(Path::new("/notes")).await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn parent_components_are_rejected() {
        let dir = TempDir::new().unwrap();
        let fs = DiskFs::new(dir.path());

        let err = fs.read_file(Path::new("/../etc/passwd")).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
