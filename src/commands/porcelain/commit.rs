use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;

impl<F: FileSystem> Repository<F> {
    /// Commit the index as a child of HEAD with the configured author
    pub async fn commit(&self, message: &str) -> Result<ObjectId> {
        let author = self.commit_author()?;
        self.commit_as(message, author).await
    }

    /// Commit the index as a child of HEAD with an explicit author
    pub async fn commit_as(&self, message: &str, author: Author) -> Result<ObjectId> {
        let index = self.index();
        let index = index.lock().await;

        let tree = Tree::build(index.entries())?;
        for subtree in tree.post_order() {
            self.database().store(subtree).await?;
        }
        let tree_id = tree.object_id()?;

        let parent = self.refs().read_head().await?;
        if let Some(parent) = &parent {
            let parent_commit = self
                .database()
                .parse_object_as_commit(parent)
                .await?
                .ok_or_else(|| VcsError::corrupt(format!("HEAD {parent} is not a commit")))?;
            if parent_commit.tree_oid() == &tree_id {
                return Err(VcsError::EmptyCommit);
            }
        }

        let message = format!("{}\n", message.trim_end_matches('\n'));
        let commit = Commit::new(parent.into_iter().collect(), tree_id, author, message);
        let commit_id = self.database().store(&commit).await?;
        self.refs().update_head(&commit_id).await?;

        tracing::info!(
            commit = %commit_id.to_short_oid(),
            message = %commit.short_message(),
            "created commit"
        );

        Ok(commit_id)
    }
}
