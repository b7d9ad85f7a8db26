//! Database entry types
//!
//! This module contains types used when reading objects back from the
//! database. Database entries are references to objects with their mode,
//! and the tree reader resolves paths inside historical trees.

pub mod database_entry;
pub mod tree_reader;
