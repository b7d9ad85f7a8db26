//! Index entry representation
//!
//! Each entry in the index represents one staged file: its repository-relative
//! path, the blob it was staged as, and a little metadata (mode, size, stage).
//!
//! ## Entry Format
//!
//! ```text
//! mode (4) | size (4) | oid (20) | flags (2) | path | NUL padding to 8 bytes
//! ```
//!
//! `flags` carries the merge stage in bits 12-13 and the path length
//! (capped at 0xfff) in the low 12 bits.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Result, VcsError};
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::cmp::min;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const MAX_PATH_SIZE: usize = 0xfff;
const STAGE_SHIFT: u16 = 12;
const STAGE_MASK: u16 = 0x3000;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Smallest possible encoded entry: fixed fields, a one-byte path and padding
pub const ENTRY_MIN_SIZE: usize = 32;

/// Size of the fixed-width prefix before the path
const ENTRY_FIXED_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the clone directory
    pub name: PathBuf,
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct EntryMetadata {
    pub mode: EntryMode,
    pub size: u64,
    /// Merge stage, always 0 outside of conflict resolution
    pub stage: u8,
}

impl IndexEntry {
    pub fn basename(&self) -> Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| VcsError::corrupt(format!("invalid file name {:?}", self.name)))
    }

    /// Ancestor directories of the entry, outermost first
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();
        dirs
    }

    fn flags(&self) -> u16 {
        let name_len = min(self.name.as_os_str().len(), MAX_PATH_SIZE) as u16;
        ((self.metadata.stage as u16) << STAGE_SHIFT) & STAGE_MASK | name_len
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| VcsError::corrupt(format!("non UTF-8 entry name {:?}", self.name)))?;

        let mut entry_bytes = Vec::new();
        let write_err = |e: std::io::Error| VcsError::corrupt(e.to_string());
        entry_bytes
            .write_u32::<NetworkEndian>(self.metadata.mode.as_u32())
            .map_err(write_err)?;
        entry_bytes
            .write_u32::<NetworkEndian>(self.metadata.size as u32)
            .map_err(write_err)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes
            .write_u16::<NetworkEndian>(self.flags())
            .map_err(write_err)?;
        entry_bytes
            .write_all(entry_name.as_bytes())
            .map_err(write_err)?;

        // at least one NUL terminates the path
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| VcsError::corrupt(e.to_string()))?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(VcsError::corrupt("index entry is truncated"));
        }

        let mode = EntryMode::try_from(NetworkEndian::read_u32(&bytes[0..4]))?;
        let size = NetworkEndian::read_u32(&bytes[4..8]) as u64;
        let oid = ObjectId::read_h40_from(&mut &bytes[8..28])?;
        let flags = NetworkEndian::read_u16(&bytes[28..30]);
        let stage = ((flags & STAGE_MASK) >> STAGE_SHIFT) as u8;

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| VcsError::corrupt("missing NUL terminator in entry name"))?;
        let name = std::str::from_utf8(&bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end])
            .map_err(|_| VcsError::corrupt("entry name is not UTF-8"))?;

        Ok(IndexEntry {
            name: PathBuf::from(name),
            oid,
            metadata: EntryMetadata { mode, size, stage },
        })
    }
}
