//! Commit history traversal
//!
//! History is walked from a starting commit through every parent, newest
//! commit first. Merge parents are followed too; each commit is listed once
//! however many paths lead to it.

pub mod rev_list;
