use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_status::FileStatus;
use crate::artifacts::status::inspector::PathState;
use crate::artifacts::status::status_info::StatusReport;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Index and HEAD as they stood when a read began
struct Snapshot {
    index: BTreeMap<PathBuf, ObjectId>,
    head_tree: Option<ObjectId>,
}

impl<F: FileSystem> Repository<F> {
    /// Classify a single path against HEAD, the index and the working tree
    ///
    /// Directories, the namespace root included, are `Absent`. A file that
    /// exists but cannot be read is an error, since no status describes it.
    pub async fn status(&self, path: impl AsRef<Path>) -> Result<FileStatus> {
        let repo_path = self.config().to_repo_scope(path.as_ref())?;
        let snapshot = self.snapshot().await?;

        let head = match &snapshot.head_tree {
            Some(tree_oid) => self
                .database()
                .tree_reader()
                .file_entry(tree_oid, &repo_path)
                .await?
                .map(|entry| entry.oid),
            None => None,
        };
        let workspace = self.workspace().hash_file(&repo_path).await?;

        Ok(PathState::new(
            head.as_ref(),
            snapshot.index.get(&repo_path),
            workspace.as_ref(),
        )
        .classify())
    }

    /// Classify every path known to HEAD, the index or the working tree
    /// inside the namespace
    pub async fn status_all(&self) -> Result<StatusReport> {
        let snapshot = self.snapshot().await?;

        let head = match &snapshot.head_tree {
            Some(tree_oid) => self
                .database()
                .tree_reader()
                .flatten(tree_oid)
                .await?
                .into_iter()
                .map(|(path, entry)| (path, entry.oid))
                .collect::<BTreeMap<_, _>>(),
            None => BTreeMap::new(),
        };
        let scan = self.workspace().scan().await?;

        let paths = head
            .keys()
            .chain(snapshot.index.keys())
            .chain(scan.files.keys())
            .filter(|path| self.config().in_namespace(&self.config().to_fs_path(path)))
            .filter(|path| !scan.is_unknown(path))
            .collect::<BTreeSet<_>>();

        let mut report = StatusReport::default();
        for path in paths {
            let status = PathState::new(
                head.get(path),
                snapshot.index.get(path),
                scan.files.get(path),
            )
            .classify();
            report.entries.insert(self.config().to_fs_path(path), status);
        }
        report.unreadable = scan
            .degraded()
            .map(|path| self.config().to_fs_path(path))
            .collect();

        Ok(report)
    }

    /// Copy the index and resolve HEAD under the lock, then release it
    async fn snapshot(&self) -> Result<Snapshot> {
        let (index, head) = {
            let index = self.index();
            let index = index.lock().await;

            let entries = index
                .entries()
                .map(|entry| (entry.name.clone(), entry.oid.clone()))
                .collect::<BTreeMap<_, _>>();
            (entries, self.refs().read_head().await?)
        };

        let head_tree = match head {
            Some(oid) => Some(
                self.database()
                    .parse_object_as_commit(&oid)
                    .await?
                    .ok_or_else(|| VcsError::corrupt(format!("HEAD {oid} is not a commit")))?
                    .tree_oid()
                    .clone(),
            ),
            None => None,
        };

        Ok(Snapshot { index, head_tree })
    }
}
