use crate::fs::{FileKind, FileSystem, Stat};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Node {
    File(Bytes),
    Directory,
}

/// In-memory filesystem
///
/// Holds a flat map from absolute path to node. The root directory always
/// exists. Cloning shares nothing; wrap it in an `Arc` to share.
#[derive(Debug)]
pub struct MemoryFs {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), Node::Directory);

        MemoryFs {
            nodes: Mutex::new(nodes),
        }
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        // a panic while holding the lock cannot leave the map half-updated
        self.nodes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn not_found(op: &str, path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("ENOENT: no such file or directory, {} '{}'", op, path.display()),
        )
    }

    fn require_parent_dir(
        nodes: &BTreeMap<PathBuf, Node>,
        op: &str,
        path: &Path,
    ) -> io::Result<()> {
        match path.parent().and_then(|parent| nodes.get(parent)) {
            Some(Node::Directory) => Ok(()),
            Some(Node::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("ENOTDIR: not a directory, {} '{}'", op, path.display()),
            )),
            None => Err(Self::not_found(op, path)),
        }
    }

    fn children<'n>(
        nodes: &'n BTreeMap<PathBuf, Node>,
        dir: &'n Path,
    ) -> impl Iterator<Item = &'n PathBuf> + 'n {
        nodes
            .keys()
            .filter(move |candidate| candidate.parent() == Some(dir))
    }
}

impl FileSystem for MemoryFs {
    async fn read_file(&self, path: &Path) -> io::Result<Bytes> {
        match self.nodes().get(path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Directory) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("EISDIR: illegal operation on a directory, read '{}'", path.display()),
            )),
            None => Err(Self::not_found("open", path)),
        }
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut nodes = self.nodes();
        Self::require_parent_dir(&nodes, "open", path)?;

        if let Some(Node::Directory) = nodes.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("EISDIR: illegal operation on a directory, open '{}'", path.display()),
            ));
        }

        nodes.insert(path.to_path_buf(), Node::File(Bytes::copy_from_slice(data)));
        Ok(())
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();

        match nodes.get(path) {
            Some(Node::File(_)) => {
                nodes.remove(path);
                Ok(())
            }
            Some(Node::Directory) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("EISDIR: illegal operation on a directory, unlink '{}'", path.display()),
            )),
            None => Err(Self::not_found("unlink", path)),
        }
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();

        if nodes.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("EEXIST: file already exists, mkdir '{}'", path.display()),
            ));
        }
        Self::require_parent_dir(&nodes, "mkdir", path)?;

        nodes.insert(path.to_path_buf(), Node::Directory);
        Ok(())
    }

    async fn rmdir(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();

        match nodes.get(path) {
            Some(Node::Directory) if Self::children(&nodes, path).next().is_some() => {
                Err(io::Error::new(
                    io::ErrorKind::DirectoryNotEmpty,
                    format!("ENOTEMPTY: directory not empty, rmdir '{}'", path.display()),
                ))
            }
            Some(Node::Directory) => {
                nodes.remove(path);
                Ok(())
            }
            Some(Node::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("ENOTDIR: not a directory, rmdir '{}'", path.display()),
            )),
            None => Err(Self::not_found("rmdir", path)),
        }
    }

    async fn readdir(&self, path: &Path) -> io::Result<Vec<String>> {
        let nodes = self.nodes();

        match nodes.get(path) {
            Some(Node::Directory) => Ok(Self::children(&nodes, path)
                .filter_map(|child| child.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .collect()),
            Some(Node::File(_)) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("ENOTDIR: not a directory, scandir '{}'", path.display()),
            )),
            None => Err(Self::not_found("scandir", path)),
        }
    }

    async fn stat(&self, path: &Path) -> io::Result<Stat> {
        match self.nodes().get(path) {
            Some(Node::File(data)) => Ok(Stat {
                kind: FileKind::File,
                size: data.len() as u64,
            }),
            Some(Node::Directory) => Ok(Stat {
                kind: FileKind::Directory,
                size: 0,
            }),
            None => Err(Self::not_found("stat", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn write_requires_an_existing_parent() {
        let fs = MemoryFs::new();

        let err = fs.write_file(Path::new("/missing/a.txt"), b"a").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        fs.mkdir(Path::new("/missing")).await.unwrap();
        fs.write_file(Path::new("/missing/a.txt"), b"a").await.unwrap();
        assert_eq!(fs.read_file(Path::new("/missing/a.txt")).await.unwrap(), "a");
    }

    #[tokio::test]
    async fn readdir_lists_direct_children_only() {
        let fs = MemoryFs::new();
        fs.mkdir(Path::new("/dir")).await.unwrap();
        fs.mkdir(Path::new("/dir/nested")).await.unwrap();
        fs.write_file(Path::new("/dir/a.txt"), b"a").await.unwrap();
        fs.write_file(Path::new("/dir/nested/b.txt"), b"b").await.unwrap();

        let mut names = fs.readdir(Path::new("/dir")).await.unwrap();
        names.sort();

        assert_eq!(names, vec!["a.txt".to_string(), "nested".to_string()]);
    }

    #[tokio::test]
    async fn rmdir_refuses_non_empty_directories() {
        let fs = MemoryFs::new();
        fs.mkdir(Path::new("/dir")).await.unwrap();
        fs.write_file(Path::new("/dir/a.txt"), b"a").await.unwrap();

        let err = fs.rmdir(Path::new("/dir")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::DirectoryNotEmpty);

        fs.unlink(Path::new("/dir/a.txt")).await.unwrap();
        fs.rmdir(Path::new("/dir")).await.unwrap();
        assert!(fs.stat(Path::new("/dir")).await.is_err());
    }

    #[tokio::test]
    async fn missing_paths_report_enoent() {
        let fs = MemoryFs::new();

        let err = fs.read_file(Path::new("/nope.txt")).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().starts_with("ENOENT"));
    }
}
