use crate::areas::repository::Repository;
use crate::errors::Result;
use crate::fs::FileSystem;
use std::path::PathBuf;

impl<F: FileSystem> Repository<F> {
    /// Staged files inside the namespace as absolute paths, in path order
    pub async fn list_files(&self) -> Result<Vec<PathBuf>> {
        let index = self.index();
        let index = index.lock().await;

        Ok(index
            .entries()
            .map(|entry| self.config().to_fs_path(&entry.name))
            .filter(|path| self.config().in_namespace(path))
            .collect())
    }
}
