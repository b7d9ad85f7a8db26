use colored::{ColoredString, Colorize};
use std::fmt;

/// Status of one path from the three-way comparison of the current commit,
/// the index and the working tree
///
/// A leading `*` marks a working tree that differs from what is staged;
/// the plain forms mean the working tree matches the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileStatus {
    Absent,
    Unmodified,
    Added,
    StarAdded,
    Modified,
    StarModified,
    Deleted,
    StarDeleted,
}

impl FileStatus {
    pub const ALL: [FileStatus; 8] = [
        FileStatus::Absent,
        FileStatus::Unmodified,
        FileStatus::Added,
        FileStatus::StarAdded,
        FileStatus::Modified,
        FileStatus::StarModified,
        FileStatus::Deleted,
        FileStatus::StarDeleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Absent => "absent",
            FileStatus::Unmodified => "unmodified",
            FileStatus::Added => "added",
            FileStatus::StarAdded => "*added",
            FileStatus::Modified => "modified",
            FileStatus::StarModified => "*modified",
            FileStatus::Deleted => "deleted",
            FileStatus::StarDeleted => "*deleted",
        }
    }

    /// The working tree differs from the index
    pub fn is_unstaged(&self) -> bool {
        self.as_str().starts_with('*')
    }

    /// Whether the path would show up in a summary of changes
    pub fn is_change(&self) -> bool {
        !matches!(self, FileStatus::Absent | FileStatus::Unmodified)
    }

    /// Staged statuses in green, unstaged in red
    pub fn colored(&self) -> ColoredString {
        if self.is_unstaged() {
            self.as_str().red()
        } else if self.is_change() {
            self.as_str().green()
        } else {
            self.as_str().normal()
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FileStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        FileStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("unknown status {value:?}"))
    }
}
