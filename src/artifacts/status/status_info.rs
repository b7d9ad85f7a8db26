use crate::artifacts::status::file_status::FileStatus;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Status of every path known to the commit, the index or the working tree
/// under the tracked namespace
///
/// Files that could not be read are listed in `unreadable` and left out of
/// `entries`; a report with unreadable files is still a valid report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub entries: BTreeMap<PathBuf, FileStatus>,
    pub unreadable: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn status(&self, path: &Path) -> FileStatus {
        self.entries.get(path).copied().unwrap_or(FileStatus::Absent)
    }

    /// Paths whose status is anything but unmodified
    pub fn changes(&self) -> impl Iterator<Item = (&PathBuf, &FileStatus)> {
        self.entries.iter().filter(|(_, status)| status.is_change())
    }

    pub fn is_clean(&self) -> bool {
        self.changes().next().is_none() && self.unreadable.is_empty()
    }
}
