//! Index (staging area)
//!
//! The index records which blob each path will have in the next commit. It is
//! read when the repository is opened and rewritten in full after every
//! mutation.
//!
//! ## Data Structures
//!
//! - `entries`: staged files keyed by their repository-relative path
//! - `children`: directory path to the staged files beneath it, so staging a
//!   file over a directory (or the reverse) drops the conflicting entries

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Result, VcsError};
use crate::fs::{FileSystem, try_read};
use byteorder::{ByteOrder, NetworkEndian};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<PathBuf, IndexEntry>,
    children: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Set by every mutation, cleared once written
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn is_tracked_file(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Staged entries ordered by path
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Staged files at or beneath `path`
    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        // empty path is the root of the repository
        if path.as_os_str().is_empty() {
            return self.entries.keys().cloned().collect();
        }
        if self.entries.contains_key(path) {
            return vec![path.to_path_buf()];
        }

        self.children
            .get(path)
            .map(|children| children.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Reload from the filesystem
    ///
    /// A missing or empty index file loads as an empty index.
    pub async fn rehydrate<F: FileSystem>(&mut self, fs: &F) -> Result<()> {
        self.clear();
        self.changed = false;

        let data = try_read(fs, &self.path)
            .await
            .map_err(|e| VcsError::store_io(self.path.as_ref(), e))?;
        let Some(data) = data.filter(|data| !data.is_empty()) else {
            return Ok(());
        };

        let mut reader = Checksum::new(Cursor::new(data));
        let entries_count = Self::parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;
        reader.verify()?;

        tracing::debug!(entries = self.entries.len(), "loaded index");
        Ok(())
    }

    fn parse_header(reader: &mut Checksum<Cursor<bytes::Bytes>>) -> Result<u32> {
        let header = reader.read(HEADER_SIZE)?;

        if &header[0..4] != SIGNATURE {
            return Err(VcsError::corrupt("invalid index file signature"));
        }

        let version = NetworkEndian::read_u32(&header[4..8]);
        if version != VERSION {
            return Err(VcsError::corrupt(format!(
                "unsupported index file version: {version}"
            )));
        }

        Ok(NetworkEndian::read_u32(&header[8..12]))
    }

    /// Entries have variable length: read the minimum, then whole blocks
    /// until the block ends in the NUL padding
    fn parse_entries(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<Cursor<bytes::Bytes>>,
    ) -> Result<()> {
        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();

            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(&entry_bytes[..])?;
            self.store_entry(entry);
        }

        Ok(())
    }

    /// Persist the index if it changed since it was loaded or last written
    pub async fn write_updates<F: FileSystem>(&mut self, fs: &F) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut writer = Checksum::new(Vec::with_capacity(
            HEADER_SIZE + self.entries.len() * ENTRY_MIN_SIZE + CHECKSUM_SIZE,
        ));

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(SIGNATURE);
        NetworkEndian::write_u32(&mut header[4..8], VERSION);
        NetworkEndian::write_u32(&mut header[8..12], self.entries.len() as u32);
        writer.write(&header);

        for entry in self.entries.values() {
            writer.write(&entry.serialize()?);
        }

        fs.write_file(&self.path, &writer.finish())
            .await
            .map_err(|e| VcsError::store_io(self.path.as_ref(), e))?;
        self.changed = false;

        tracing::debug!(entries = self.entries.len(), "wrote index");
        Ok(())
    }

    /// Stage an entry, replacing any file or directory it collides with
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;
    }

    /// Unstage a file or every file beneath a directory. Absent paths are a
    /// no-op.
    pub fn remove(&mut self, path: &Path) {
        if path.as_os_str().is_empty() {
            self.changed |= !self.entries.is_empty();
            self.clear();
            return;
        }

        let removed_file = self.remove_entry(path);
        let removed_children = self.remove_children(path);

        self.changed |= removed_file || removed_children;
    }

    /// Replace every entry at once, as after a checkout
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = IndexEntry>) {
        self.clear();
        for entry in entries {
            self.store_entry(entry);
        }
        self.changed = true;
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_path_buf())
                .or_default()
                .insert(entry.name.clone());
        }

        self.entries.insert(entry.name.clone(), entry);
    }

    fn remove_children(&mut self, path: &Path) -> bool {
        let Some(children) = self.children.remove(path) else {
            return false;
        };

        for child in children {
            self.remove_entry(&child);
        }
        true
    }

    fn remove_entry(&mut self, path: &Path) -> bool {
        let Some(entry) = self.entries.remove(path) else {
            return false;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
        true
    }
}
