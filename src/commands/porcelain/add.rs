use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use crate::fs::FileSystem;
use std::path::Path;

impl<F: FileSystem> Repository<F> {
    /// Stage the working-tree state of `path`
    ///
    /// A directory, including the namespace root, stages every file beneath
    /// it. Tracked files beneath a directory that could not be listed keep
    /// their entries. A path missing from the working tree stages its
    /// deletion when it is tracked and is ignored otherwise.
    pub async fn add(&self, path: impl AsRef<Path>) -> Result<()> {
        let repo_path = self.config().to_repo_scope(path.as_ref())?;

        let index = self.index();
        let mut index = index.lock().await;

        if self.workspace().is_dir(&repo_path).await? {
            let scan = self.workspace().scan_from(&repo_path).await?;

            for file in scan.files.keys() {
                if let Some(content) = self.workspace().read_file(file).await? {
                    self.stage_content(&mut index, file, &content).await?;
                }
            }
            for tracked in index.entries_under_path(&repo_path) {
                if !scan.files.contains_key(&tracked) && !scan.is_unknown(&tracked) {
                    index.remove(&tracked);
                }
            }
        } else {
            match self.workspace().read_file(&repo_path).await? {
                Some(content) => self.stage_content(&mut index, &repo_path, &content).await?,
                None if index.is_tracked_file(&repo_path) => index.remove(&repo_path),
                None => {
                    tracing::debug!(path = %repo_path.display(), "ignoring missing untracked path");
                }
            }
        }

        index.write_updates(self.fs().as_ref()).await
    }

    /// Stage `content` for `path` without reading the working tree
    pub async fn stage(&self, path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
        let repo_path = self.config().to_repo_path(path.as_ref())?;

        let index = self.index();
        let mut index = index.lock().await;

        self.stage_content(&mut index, &repo_path, content).await?;
        index.write_updates(self.fs().as_ref()).await
    }

    async fn stage_content(&self, index: &mut Index, repo_path: &Path, content: &[u8]) -> Result<()> {
        let blob_id = self.database().put(ObjectType::Blob, content).await?;
        let metadata = EntryMetadata::new(EntryMode::default(), content.len() as u64, 0);

        index.add(IndexEntry::new(repo_path.to_path_buf(), blob_id, metadata));
        Ok(())
    }
}
