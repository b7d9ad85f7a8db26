use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;
use std::collections::BTreeMap;

impl<F: FileSystem> Repository<F> {
    /// Switch to a branch or commit, creating the branch when it is new
    ///
    /// An existing branch or a stored commit id has its tree materialized in
    /// the working tree, which also resets the index to that tree. A new
    /// branch starts at the current commit, so nothing on disk changes.
    ///
    /// When some files cannot be written or deleted the rest of the checkout
    /// still completes, HEAD moves, and the failures are returned together.
    pub async fn checkout(&self, name: &str) -> Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        match Revision::resolve(name, self.refs(), self.database()).await? {
            Revision::Branch { name, oid } => {
                let applied = partial(self.materialize_commit(&mut index, &oid).await)?;
                self.refs().set_head_branch(&name).await?;
                tracing::info!(branch = %name, commit = %oid.to_short_oid(), "switched branch");
                applied
            }
            Revision::Commit(oid) => {
                let applied = partial(self.materialize_commit(&mut index, &oid).await)?;
                self.refs().set_head_detached(&oid).await?;
                tracing::info!(commit = %oid.to_short_oid(), "detached HEAD");
                applied
            }
            Revision::NewBranch(name) => {
                if let Some(head) = self.refs().read_head().await? {
                    self.refs().create_branch(&name, &head).await?;
                }
                self.refs().set_head_branch(&name).await?;
                tracing::info!(branch = %name, "switched to a new branch");
                Ok(())
            }
        }
    }

    async fn materialize_commit(&self, index: &mut Index, commit_oid: &ObjectId) -> Result<()> {
        let commit = self
            .database()
            .parse_object_as_commit(commit_oid)
            .await?
            .ok_or_else(|| VcsError::UnknownRevision(commit_oid.to_string()))?;

        self.materialize(index, commit.tree_oid()).await
    }

    /// Make the namespace in the working tree and the index match `tree_oid`
    ///
    /// Failed file operations are reported once the index has been reset,
    /// so a later status shows exactly which paths still differ.
    async fn materialize(&self, index: &mut Index, tree_oid: &ObjectId) -> Result<()> {
        let target = self
            .database()
            .tree_reader()
            .flatten(tree_oid)
            .await?
            .into_iter()
            .filter(|(path, _)| self.config().in_namespace(&self.config().to_fs_path(path)))
            .collect::<BTreeMap<_, _>>();
        let scan = self.workspace().scan().await?;

        let migration = Migration::plan(&target, &scan, &self.config().namespace_prefix());
        tracing::debug!(
            writes = migration.writes().count(),
            deletions = migration.deletions().count(),
            "planned checkout"
        );
        let applied = self.workspace().apply_migration(&migration, self.database()).await;

        let mut entries = Vec::with_capacity(target.len());
        for (path, entry) in target {
            let (_, size) = self.database().header(&entry.oid).await?;
            let metadata = EntryMetadata::new(entry.mode, size as u64, 0);
            entries.push(IndexEntry::new(path, entry.oid, metadata));
        }
        index.replace_all(entries);
        index.write_updates(self.fs().as_ref()).await?;

        applied
    }
}

/// Separate a partially applied checkout, which still moves HEAD, from
/// failures that abort before anything is switched
fn partial(result: Result<()>) -> Result<Result<()>> {
    match result {
        Ok(()) => Ok(Ok(())),
        Err(VcsError::Checkout(failures)) => Ok(Err(VcsError::Checkout(failures))),
        Err(e) => Err(e),
    }
}
