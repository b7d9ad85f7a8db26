//! Three-way classification of a single path
//!
//! | commit | index          | working tree         | status       |
//! |--------|----------------|----------------------|--------------|
//! | -      | -              | -                    | absent       |
//! | -      | -              | present              | *added       |
//! | -      | present        | same as index        | added        |
//! | -      | present        | differs or missing   | *added       |
//! | C      | same as C      | same as index        | unmodified   |
//! | C      | differs from C | same as index        | modified     |
//! | C      | present        | differs              | *modified    |
//! | C      | present        | missing              | *deleted     |
//! | C      | -              | missing              | deleted      |
//! | C      | -              | present              | *added       |
//!
//! The last row is a staged deletion whose file was re-created: the working
//! tree wins and the path reads as new to the index.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_status::FileStatus;
use derive_new::new;

/// Blob ids of one path in the current commit, the index and the working tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct PathState<'a> {
    pub head: Option<&'a ObjectId>,
    pub index: Option<&'a ObjectId>,
    pub workspace: Option<&'a ObjectId>,
}

impl PathState<'_> {
    pub fn classify(&self) -> FileStatus {
        match (self.head, self.index, self.workspace) {
            (None, None, None) => FileStatus::Absent,
            (None, None, Some(_)) => FileStatus::StarAdded,
            (None, Some(index), workspace) => {
                if workspace == Some(index) {
                    FileStatus::Added
                } else {
                    FileStatus::StarAdded
                }
            }
            (Some(_), None, None) => FileStatus::Deleted,
            (Some(_), None, Some(_)) => FileStatus::StarAdded,
            (Some(head), Some(index), workspace) => match workspace {
                None => FileStatus::StarDeleted,
                Some(workspace) if workspace != index => FileStatus::StarModified,
                Some(_) if index == head => FileStatus::Unmodified,
                Some(_) => FileStatus::Modified,
            },
        }
    }
}
