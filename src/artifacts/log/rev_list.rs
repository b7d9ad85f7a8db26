use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;
use derive_new::new;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// A commit as listed by the log
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct LogEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

impl LogEntry {
    pub fn tree_oid(&self) -> &ObjectId {
        self.commit.tree_oid()
    }
}

/// Queue slot ordered by commit time, then by discovery order so equal
/// timestamps keep the order commits were reached in
#[derive(Debug, PartialEq, Eq)]
struct Pending {
    timestamp: i64,
    sequence: u64,
    entry: LogEntry,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(new)]
pub struct RevList<'d, F> {
    database: &'d Database<F>,
}

impl<F: FileSystem> RevList<'_, F> {
    /// Every commit reachable from `start`, newest first
    pub async fn walk(&self, start: Option<&ObjectId>) -> Result<Vec<LogEntry>> {
        let mut queue = BinaryHeap::new();
        let mut seen = HashSet::new();
        let mut sequence = 0u64;
        let mut history = Vec::new();

        if let Some(start) = start {
            seen.insert(start.clone());
            queue.push(self.load(start, &mut sequence).await?);
        }

        while let Some(Pending { entry, .. }) = queue.pop() {
            for parent in entry.commit.parents() {
                if seen.insert(parent.clone()) {
                    queue.push(self.load(parent, &mut sequence).await?);
                }
            }
            history.push(entry);
        }

        Ok(history)
    }

    async fn load(&self, oid: &ObjectId, sequence: &mut u64) -> Result<Pending> {
        let commit = self
            .database
            .parse_object_as_commit(oid)
            .await?
            .ok_or_else(|| VcsError::corrupt(format!("object {oid} is not a commit")))?;

        *sequence += 1;
        Ok(Pending {
            timestamp: commit.timestamp(),
            sequence: *sequence,
            entry: LogEntry::new(oid.clone(), commit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Author;
    use crate::artifacts::objects::object::Object;
    use crate::fs::MemoryFs;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn database() -> Database<MemoryFs> {
        Database::new(
            Arc::new(MemoryFs::new()),
            PathBuf::from("/.git/objects").into_boxed_path(),
        )
    }

    async fn commit(
        database: &Database<MemoryFs>,
        parents: Vec<ObjectId>,
        seconds: i64,
        message: &str,
    ) -> ObjectId {
        let timestamp = DateTime::from_timestamp(seconds, 0).unwrap().fixed_offset();
        let author = Author::new_with_timestamp("Karen Brown", "karen@example.com", timestamp);
        let tree = ObjectId::try_parse("4b825dc642cb6eb9a060e54bf8d69288fbee4904").unwrap();
        let commit = Commit::new(parents, tree, author, format!("{message}\n"));

        let oid = database.store(&commit).await.unwrap();
        assert_eq!(oid, commit.object_id().unwrap());
        oid
    }

    fn messages(history: &[LogEntry]) -> Vec<String> {
        history
            .iter()
            .map(|entry| entry.commit.short_message())
            .collect()
    }

    #[tokio::test]
    async fn empty_history_walks_to_nothing() {
        let database = database();

        assert!(RevList::new(&database).walk(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn linear_history_is_listed_newest_first() {
        let database = database();
        let first = commit(&database, vec![], 100, "first").await;
        let second = commit(&database, vec![first], 200, "second").await;
        let third = commit(&database, vec![second], 300, "third").await;

        let history = RevList::new(&database).walk(Some(&third)).await.unwrap();

        assert_eq!(messages(&history), vec!["third", "second", "first"]);
        assert_eq!(history[0].oid, third);
    }

    #[tokio::test]
    async fn merged_histories_interleave_by_time_and_list_shared_commits_once() {
        let database = database();
        let root = commit(&database, vec![], 100, "root").await;
        let left = commit(&database, vec![root.clone()], 300, "left").await;
        let right = commit(&database, vec![root], 200, "right").await;
        let merge = commit(&database, vec![left, right], 400, "merge").await;

        let history = RevList::new(&database).walk(Some(&merge)).await.unwrap();

        assert_eq!(messages(&history), vec!["merge", "left", "right", "root"]);
    }

    #[tokio::test]
    async fn identical_timestamps_keep_parent_order() {
        let database = database();
        let first = commit(&database, vec![], 100, "first").await;
        let second = commit(&database, vec![first], 100, "second").await;
        let third = commit(&database, vec![second], 100, "third").await;

        let history = RevList::new(&database).walk(Some(&third)).await.unwrap();

        assert_eq!(messages(&history), vec!["third", "second", "first"]);
    }
}
