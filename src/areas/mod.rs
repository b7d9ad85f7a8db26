//! Stateful repository components
//!
//! - `database`: object store for blobs, trees and commits
//! - `index`: staging area
//! - `refs`: HEAD and branch pointers
//! - `repository`: the open repository handle tying them together
//! - `workspace`: working tree reads, scans and checkout writes

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
