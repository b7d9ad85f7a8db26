//! Data types and algorithms
//!
//! - `branch`: branch names and checkout revision resolution
//! - `checkout`: migration planning
//! - `database`: tree entries and point-in-time tree reads
//! - `index`: index entry encoding
//! - `log`: history traversal
//! - `objects`: blob, tree and commit objects
//! - `status`: path classification

pub mod branch;
pub mod checkout;
pub mod database;
pub mod index;
pub mod log;
pub mod objects;
pub mod status;
