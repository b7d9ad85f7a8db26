//! Public repository operations
//!
//! Each file adds one operation (or a small family of them) to
//! [`Repository`](crate::areas::repository::Repository):
//!
//! - `init`: create or open a repository, close it
//! - `add`: stage working-tree files or raw content
//! - `remove`: unstage files, optionally deleting them
//! - `status`: classify one path or the whole namespace
//! - `commit`: record the index as a new commit
//! - `log`: walk history from HEAD
//! - `checkout`: switch branches or detach at a commit
//! - `read_obj_from_tree`: read a file from any stored tree
//! - `list_files`: list staged files
//! - `branch`: list branches

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod list_files;
pub mod log;
pub mod read_obj_from_tree;
pub mod remove;
pub mod status;
