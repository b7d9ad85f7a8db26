use crate::areas::repository::Repository;
use crate::errors::Result;
use crate::fs::FileSystem;
use std::path::Path;

impl<F: FileSystem> Repository<F> {
    /// Unstage `path`, or every staged file beneath it
    ///
    /// With `force` the files are deleted from the working tree as well,
    /// including a file at `path` that was never staged. The index is
    /// written before any file is deleted, so a failed deletion leaves the
    /// unstaging in place.
    pub async fn remove(&self, path: impl AsRef<Path>, force: bool) -> Result<()> {
        let repo_path = self.config().to_repo_scope(path.as_ref())?;

        let index = self.index();
        let mut index = index.lock().await;

        let staged = index.entries_under_path(&repo_path);
        index.remove(&repo_path);
        index.write_updates(self.fs().as_ref()).await?;

        if force {
            for file in &staged {
                self.workspace().remove_file(file).await?;
            }
            if !self.workspace().is_dir(&repo_path).await? {
                self.workspace().remove_file(&repo_path).await?;
            }
        }

        Ok(())
    }

    /// Unstage `path`, leaving the working tree untouched
    pub async fn unstage(&self, path: impl AsRef<Path>) -> Result<()> {
        self.remove(path, false).await
    }
}
