//! Point-in-time reads against stored trees
//!
//! Trees are resolved one entry at a time straight from the object store, so
//! no checkout is needed to look at historical content. Well-formed trees are
//! acyclic by construction; descent is still bounded by [`MAX_TREE_DEPTH`] so
//! a malformed store cannot send a walk into an endless loop.

use crate::areas::database::Database;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

pub const MAX_TREE_DEPTH: usize = 256;

pub struct TreeReader<'d, F> {
    database: &'d Database<F>,
}

impl<'d, F: FileSystem> TreeReader<'d, F> {
    pub fn new(database: &'d Database<F>) -> Self {
        TreeReader { database }
    }

    /// Load `oid` as a tree, `None` when it is absent, unreadable or of
    /// another kind
    async fn load_tree(&self, oid: &ObjectId) -> Result<Option<Tree>> {
        match self.database.parse_object(oid).await {
            Ok(ObjectBox::Tree(tree)) => Ok(Some(*tree)),
            Ok(_) => Ok(None),
            Err(VcsError::NotFound(_) | VcsError::Corrupt(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Content of the blob at `path` (relative to the tree root)
    ///
    /// A missing segment, a path naming a directory, or a tree id that does
    /// not resolve to a tree all yield `Ok(None)`. Only store I/O failures
    /// are errors.
    pub async fn read_object_from_tree(
        &self,
        tree_oid: &ObjectId,
        path: &Path,
    ) -> Result<Option<Bytes>> {
        let Some(entry) = self.file_entry(tree_oid, path).await? else {
            return Ok(None);
        };

        match self.database.parse_object(&entry.oid).await {
            Ok(ObjectBox::Blob(blob)) => Ok(Some(blob.into_content())),
            Ok(_) | Err(VcsError::NotFound(_) | VcsError::Corrupt(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The file entry at `path`, resolved the same way as
    /// [`TreeReader::read_object_from_tree`] without loading the blob
    pub async fn file_entry(&self, tree_oid: &ObjectId, path: &Path) -> Result<Option<DatabaseEntry>> {
        let segments = path
            .components()
            .map(|component| match component {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>();
        let Some(segments) = segments else {
            return Ok(None);
        };
        let Some((file_name, dirs)) = segments.split_last() else {
            return Ok(None);
        };
        if dirs.len() >= MAX_TREE_DEPTH {
            return Ok(None);
        }

        let Some(mut tree) = self.load_tree(tree_oid).await? else {
            return Ok(None);
        };

        for dir in dirs {
            let Some(entry) = tree.entry(dir).filter(|entry| entry.is_tree()) else {
                return Ok(None);
            };
            let Some(subtree) = self.load_tree(&entry.oid).await? else {
                return Ok(None);
            };
            tree = subtree;
        }

        Ok(tree.entry(file_name).filter(|entry| !entry.is_tree()).cloned())
    }

    /// Every file beneath `tree_oid`, keyed by its path relative to the root
    pub async fn flatten(&self, tree_oid: &ObjectId) -> Result<BTreeMap<PathBuf, DatabaseEntry>> {
        let mut files = BTreeMap::new();
        let mut pending = vec![(PathBuf::new(), tree_oid.clone(), 0usize)];

        while let Some((prefix, oid, depth)) = pending.pop() {
            if depth > MAX_TREE_DEPTH {
                return Err(VcsError::corrupt(format!(
                    "tree {tree_oid} nests deeper than {MAX_TREE_DEPTH} levels"
                )));
            }

            let tree = self
                .database
                .parse_object_as_tree(&oid)
                .await?
                .ok_or_else(|| VcsError::corrupt(format!("object {oid} is not a tree")))?;

            for (name, entry) in tree.entries() {
                let path = prefix.join(name);
                if entry.is_tree() {
                    pending.push((path, entry.oid.clone(), depth + 1));
                } else {
                    files.insert(path, entry.clone());
                }
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::EntryMode;
    use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
    use crate::artifacts::objects::object_type::ObjectType;
    use crate::fs::MemoryFs;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn database() -> Database<MemoryFs> {
        Database::new(
            Arc::new(MemoryFs::new()),
            PathBuf::from("/.git/objects").into_boxed_path(),
        )
    }

    async fn store_files(database: &Database<MemoryFs>, files: &[(&str, &str)]) -> ObjectId {
        let mut entries = Vec::new();
        for (path, content) in files {
            let oid = database
                .put(ObjectType::Blob, content.as_bytes())
                .await
                .unwrap();
            entries.push(IndexEntry::new(
                PathBuf::from(path),
                oid,
                EntryMetadata::new(EntryMode::default(), content.len() as u64, 0),
            ));
        }

        let tree = Tree::build(entries.iter()).unwrap();
        for subtree in tree.post_order() {
            database.store(subtree).await.unwrap();
        }
        database.store(&tree).await.unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn reads_nested_blob_content(database: Database<MemoryFs>) {
        let root = store_files(&database, &[(".documents/dir/foo.txt", "foo")]).await;

        let content = database
            .tree_reader()
            .read_object_from_tree(&root, Path::new(".documents/dir/foo.txt"))
            .await
            .unwrap();

        assert_eq!(content, Some(Bytes::from_static(b"foo")));
    }

    #[rstest]
    #[case("missing")]
    #[case(".documents/dir")]
    #[case(".documents/dir/foo.txt/deeper")]
    #[case(".documents/../foo.txt")]
    #[case("")]
    #[tokio::test]
    async fn unresolvable_paths_read_as_none(database: Database<MemoryFs>, #[case] path: &str) {
        let root = store_files(&database, &[(".documents/dir/foo.txt", "foo")]).await;

        let content = database
            .tree_reader()
            .read_object_from_tree(&root, Path::new(path))
            .await
            .unwrap();

        assert_eq!(content, None);
    }

    #[rstest]
    #[tokio::test]
    async fn ids_that_are_not_trees_read_as_none(database: Database<MemoryFs>) {
        let blob = database.put(ObjectType::Blob, b"foo").await.unwrap();
        let absent = ObjectId::try_parse("f".repeat(40)).unwrap();
        let reader = database.tree_reader();

        assert_eq!(
            reader
                .read_object_from_tree(&blob, Path::new("foo"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            reader
                .read_object_from_tree(&absent, Path::new("foo"))
                .await
                .unwrap(),
            None
        );
    }

    #[rstest]
    #[tokio::test]
    async fn flatten_lists_every_file(database: Database<MemoryFs>) {
        let root = store_files(
            &database,
            &[
                (".documents/a.txt", "a"),
                (".documents/dir/b.txt", "b"),
                (".documents/dir/sub/c.txt", "c"),
            ],
        )
        .await;

        let files = database.tree_reader().flatten(&root).await.unwrap();

        assert_eq!(
            files.keys().collect::<Vec<_>>(),
            vec![
                &PathBuf::from(".documents/a.txt"),
                &PathBuf::from(".documents/dir/b.txt"),
                &PathBuf::from(".documents/dir/sub/c.txt"),
            ]
        );
    }
}
