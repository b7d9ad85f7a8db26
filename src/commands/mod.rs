//! Repository operations exposed to callers
//!
//! Operations are grouped under `porcelain`, one file per user-facing
//! command, each extending the repository handle.

pub mod porcelain;
