use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::{LogEntry, RevList};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;

impl<F: FileSystem> Repository<F> {
    /// History reachable from HEAD, newest first; empty before the first
    /// commit
    pub async fn log(&self) -> Result<Vec<LogEntry>> {
        let head = {
            let index = self.index();
            let _guard = index.lock().await;

            self.refs().read_head().await?
        };

        RevList::new(self.database()).walk(head.as_ref()).await
    }

    /// Load a commit by its full id
    pub async fn read_commit(&self, oid: &str) -> Result<Commit> {
        let oid = ObjectId::try_parse(oid).map_err(|_| VcsError::UnknownRevision(oid.to_string()))?;

        self.database()
            .parse_object_as_commit(&oid)
            .await?
            .ok_or_else(|| VcsError::UnknownRevision(oid.to_string()))
    }
}
