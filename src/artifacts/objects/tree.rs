//! Tree object
//!
//! Trees represent directory snapshots. They contain entries for files
//! (blobs) and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Ordering
//!
//! Directory entries are keyed as `name/` so that the `BTreeMap` order is the
//! canonical tree order (a directory `a` sorts as `a/`, after `a.txt`).
//! Two trees built from identical path to blob mappings therefore encode to
//! identical bytes and share one identifier.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, VcsError};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Debug, Clone)]
enum TreeEntry {
    /// File staged in the index
    File(IndexEntry),
    /// Directory being built from the index
    Directory(Tree),
    /// Entry decoded from a stored tree
    Stored(DatabaseEntry),
}

impl TreeEntry {
    fn mode(&self) -> EntryMode {
        match self {
            TreeEntry::File(entry) => entry.metadata.mode,
            TreeEntry::Directory(_) => EntryMode::Directory,
            TreeEntry::Stored(entry) => entry.mode,
        }
    }

    fn oid(&self) -> Result<ObjectId> {
        match self {
            TreeEntry::File(entry) => Ok(entry.oid.clone()),
            TreeEntry::Directory(tree) => tree.object_id(),
            TreeEntry::Stored(entry) => Ok(entry.oid.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Build a tree hierarchy from a flat list of index entries
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            let parents = entry.parent_dirs();
            root.add_entry(&parents, entry)?;
        }

        Ok(root)
    }

    fn add_entry(&mut self, parents: &[&Path], entry: &IndexEntry) -> Result<()> {
        let Some((first, rest)) = parents.split_first() else {
            self.entries.insert(
                entry.basename()?.to_string(),
                TreeEntry::File(entry.clone()),
            );
            return Ok(());
        };

        let parent = first
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| VcsError::corrupt(format!("invalid parent of {:?}", entry.name)))?;
        let key = format!("{parent}/");

        let slot = self
            .entries
            .entry(key)
            .or_insert_with(|| TreeEntry::Directory(Tree::default()));
        if !matches!(slot, TreeEntry::Directory(_)) {
            *slot = TreeEntry::Directory(Tree::default());
        }

        match slot {
            TreeEntry::Directory(tree) => tree.add_entry(rest, entry),
            _ => unreachable!("slot was just replaced by a directory"),
        }
    }

    /// Every tree in the hierarchy, children before their parents
    ///
    /// Storing trees in this order guarantees a parent is never written
    /// before the subtrees it references.
    pub fn post_order(&self) -> Vec<&Tree> {
        let mut trees = Vec::new();
        self.collect_post_order(&mut trees);
        trees
    }

    fn collect_post_order<'t>(&'t self, trees: &mut Vec<&'t Tree>) {
        for entry in self.entries.values() {
            if let TreeEntry::Directory(tree) = entry {
                tree.collect_post_order(trees);
            }
        }
        trees.push(self);
    }

    /// Entries of a tree loaded from the store, in canonical order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &DatabaseEntry)> {
        self.entries.iter().filter_map(|(key, entry)| match entry {
            TreeEntry::Stored(stored) => Some((key.trim_end_matches('/'), stored)),
            _ => None,
        })
    }

    /// Look up a single entry of a tree loaded from the store
    pub fn entry(&self, name: &str) -> Option<&DatabaseEntry> {
        [name.to_string(), format!("{name}/")]
            .iter()
            .find_map(|key| match self.entries.get(key) {
                Some(TreeEntry::Stored(stored)) => Some(stored),
                _ => None,
            })
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content_bytes = Vec::new();

        for (name, tree_entry) in &self.entries {
            let name = name.trim_end_matches('/');
            let header = format!("{:o} {}\0", tree_entry.mode().as_u32(), name);

            content_bytes
                .write_all(header.as_bytes())
                .map_err(|e| VcsError::corrupt(e.to_string()))?;
            tree_entry.oid()?.write_h40_to(&mut content_bytes)?;
        }

        Ok(frame(self.object_type(), &content_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut entries = BTreeMap::new();

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();
        let read_err = |e: std::io::Error| VcsError::corrupt(e.to_string());

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes).map_err(read_err)?;
            if n == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(VcsError::corrupt("unexpected EOF in tree entry mode"));
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| VcsError::corrupt("tree entry mode is not UTF-8"))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes).map_err(read_err)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(VcsError::corrupt("unexpected EOF in tree entry name"));
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| VcsError::corrupt("tree entry name is not UTF-8"))?;
            if name.is_empty() || name == "." || name == ".." || name.contains('/') {
                return Err(VcsError::corrupt(format!("invalid tree entry name {name:?}")));
            }

            let oid = ObjectId::read_h40_from(&mut reader)?;

            let key = if mode.is_tree() {
                format!("{name}/")
            } else {
                name.to_owned()
            };
            entries.insert(key, TreeEntry::Stored(DatabaseEntry::new(oid, mode)));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
