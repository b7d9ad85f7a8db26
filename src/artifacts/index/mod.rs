//! Index file format
//!
//! The index (staging area) records which blob each path will have in the
//! next commit.
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Each entry padded to 8-byte alignment
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// 4 bytes for the signature, 4 for the version, 4 for the entry count
pub const HEADER_SIZE: usize = 12;

pub const SIGNATURE: &[u8; 4] = b"DIRC";

pub const VERSION: u32 = 2;
