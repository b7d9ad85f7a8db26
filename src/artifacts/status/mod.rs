//! Working tree status
//!
//! Every path is classified by comparing three facts: its blob in the
//! current commit's tree, in the index, and in the working tree.
//!
//! ## Components
//!
//! - `file_status`: the fixed set of statuses and their string forms
//! - `inspector`: the classification table for one path
//! - `status_info`: the report over every path in the namespace

pub mod file_status;
pub mod inspector;
pub mod status_info;
