//! A git-compatible version-control engine for documents kept under one
//! namespace of a pluggable filesystem
//!
//! ```no_run
//! # async fn demo() -> docvcs::Result<()> {
//! use docvcs::{MemoryFs, Repository, RepositoryConfig};
//! use std::sync::Arc;
//!
//! let repository = Repository::init(RepositoryConfig::default(), Arc::new(MemoryFs::new())).await?;
//! repository.set_author("Jane", "jane@example.com");
//! repository.stage("/.documents/notes.txt", b"hello").await?;
//! repository.commit("First commit!").await?;
//! # Ok(())
//! # }
//! ```

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;
pub mod fs;

pub use areas::repository::Repository;
pub use artifacts::log::rev_list::LogEntry;
pub use artifacts::objects::commit::{Author, Commit};
pub use artifacts::objects::object_id::ObjectId;
pub use artifacts::status::file_status::FileStatus;
pub use artifacts::status::status_info::StatusReport;
pub use config::RepositoryConfig;
pub use errors::{Result, VcsError};
pub use fs::{DiskFs, FileSystem, MemoryFs};
