use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::config::RepositoryConfig;
use crate::errors::{Result, VcsError};
use crate::fs::{FileSystem, mkdir_p, try_stat};
use std::sync::Arc;

impl<F: FileSystem> Repository<F> {
    /// Create the repository layout where it is missing, then open it
    ///
    /// An existing repository is left as it is, so calling `init` twice is
    /// the same as calling `open` the second time.
    pub async fn init(config: RepositoryConfig, fs: Arc<F>) -> Result<Self> {
        if !config.namespace.starts_with(&config.clone_dir) {
            return Err(VcsError::NamespaceViolation {
                path: config.namespace.clone(),
                namespace: config.clone_dir.clone(),
            });
        }
        let default_branch = BranchName::try_parse(config.default_branch.as_str())?;

        let repository = Repository::new(config, fs);

        let objects_path = repository.database().objects_path().to_path_buf();
        mkdir_p(repository.fs().as_ref(), &objects_path)
            .await
            .map_err(|e| VcsError::store_io(&objects_path, e))?;

        let heads_path = repository.refs().heads_path();
        mkdir_p(repository.fs().as_ref(), &heads_path)
            .await
            .map_err(|e| VcsError::store_io(&heads_path, e))?;

        let head_path = repository.refs().head_path();
        let head = try_stat(repository.fs().as_ref(), &head_path)
            .await
            .map_err(|e| VcsError::store_io(&head_path, e))?;
        if head.is_none() {
            repository.refs().set_head_branch(&default_branch).await?;
            tracing::info!(
                git_dir = %repository.config().git_dir().display(),
                branch = %default_branch,
                "initialized empty repository"
            );
        }

        repository.load_index().await?;
        Ok(repository)
    }

    /// Open an existing repository, reading its index
    pub async fn open(config: RepositoryConfig, fs: Arc<F>) -> Result<Self> {
        let repository = Repository::new(config, fs);

        let head_path = repository.refs().head_path();
        let head = try_stat(repository.fs().as_ref(), &head_path)
            .await
            .map_err(|e| VcsError::store_io(&head_path, e))?;
        if head.is_none() {
            return Err(VcsError::NotFound(format!(
                "repository at {}",
                repository.config().git_dir().display()
            )));
        }

        repository.load_index().await?;
        Ok(repository)
    }

    /// Flush pending index changes and release the handle
    pub async fn close(self) -> Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.write_updates(self.fs().as_ref()).await
    }

    async fn load_index(&self) -> Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate(self.fs().as_ref()).await
    }
}
