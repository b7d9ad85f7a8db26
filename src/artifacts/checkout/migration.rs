//! Checkout migration planning
//!
//! Compares the full path to blob mapping of a target tree with a scan of the
//! working tree and plans the filesystem operations that make the working
//! tree match the target:
//!
//! 1. delete files absent from the target
//! 2. remove directories those deletions leave empty, deepest first
//! 3. write files that are missing or whose content differs
//!
//! Deletions run before writes so a file can replace a directory and the
//! other way round.

use crate::areas::workspace::WorkspaceScan;
use crate::artifacts::database::database_entry::DatabaseEntry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    Add,
    Modify,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub action_type: ActionType,
    /// Repository-relative path
    pub path: PathBuf,
    /// Blob to write, `None` for deletions
    pub entry: Option<DatabaseEntry>,
}

#[derive(Debug, Default)]
pub struct Migration {
    actions: Vec<Action>,
    rmdirs: BTreeSet<PathBuf>,
}

impl Migration {
    /// Plan the changes turning the scanned working tree into `target`
    ///
    /// Unreadable files are always rewritten or deleted since their content
    /// is unknown. Directories that could not be listed are never deleted,
    /// but target files beneath them are still written. Directory pruning
    /// never climbs above `root`.
    pub fn plan(
        target: &BTreeMap<PathBuf, DatabaseEntry>,
        current: &WorkspaceScan,
        root: &Path,
    ) -> Self {
        let mut migration = Migration::default();

        let stale = current
            .files
            .keys()
            .chain(current.unreadable.iter())
            .filter(|path| !target.contains_key(*path))
            .collect::<BTreeSet<_>>();
        for path in stale {
            migration.record_delete(path, root);
        }

        for (path, entry) in target {
            let unknown = current.is_unknown(path);
            let action_type = match current.files.get(path) {
                Some(oid) if *oid == entry.oid && !unknown => continue,
                Some(_) => ActionType::Modify,
                None if unknown => ActionType::Modify,
                None => ActionType::Add,
            };

            migration.actions.push(Action {
                action_type,
                path: path.clone(),
                entry: Some(entry.clone()),
            });
        }

        migration
    }

    fn record_delete(&mut self, path: &Path, root: &Path) {
        self.actions.push(Action {
            action_type: ActionType::Delete,
            path: path.to_path_buf(),
            entry: None,
        });

        for parent in path
            .ancestors()
            .skip(1)
            .take_while(|ancestor| *ancestor != root && ancestor.starts_with(root))
        {
            self.rmdirs.insert(parent.to_path_buf());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn deletions(&self) -> impl Iterator<Item = &Action> {
        self.actions_of(ActionType::Delete)
    }

    /// Additions and modifications, in path order
    pub fn writes(&self) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(|action| action.action_type != ActionType::Delete)
    }

    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |action| action.action_type == action_type)
    }

    /// Directories to try removing once deletions are done, deepest first
    pub fn rmdirs(&self) -> impl Iterator<Item = &PathBuf> {
        let mut dirs = self.rmdirs.iter().collect::<Vec<_>>();
        dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
        dirs.into_iter()
    }
}
