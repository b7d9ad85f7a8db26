use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::Result;
use crate::fs::FileSystem;

impl<F: FileSystem> Repository<F> {
    /// Every branch, sorted by name
    pub async fn branches(&self) -> Result<Vec<BranchName>> {
        self.refs().list_branches().await
    }

    /// The checked-out branch, `None` when HEAD is detached
    pub async fn current_branch(&self) -> Result<Option<BranchName>> {
        self.refs().current_branch().await
    }
}
