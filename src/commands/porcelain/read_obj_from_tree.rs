use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use crate::fs::FileSystem;
use bytes::Bytes;
use std::path::Path;

impl<F: FileSystem> Repository<F> {
    /// Content of `path` as recorded in the tree `tree_id`
    ///
    /// Reads straight from the object store without touching the working
    /// tree. An id that is not a stored tree, a path outside the namespace
    /// and a path missing from the tree all read as `None`.
    pub async fn read_obj_from_tree(&self, tree_id: &str, path: impl AsRef<Path>) -> Result<Option<Bytes>> {
        let Ok(tree_oid) = ObjectId::try_parse(tree_id) else {
            return Ok(None);
        };
        let Ok(repo_path) = self.config().to_repo_path(path.as_ref()) else {
            return Ok(None);
        };

        self.database()
            .tree_reader()
            .read_object_from_tree(&tree_oid, &repo_path)
            .await
    }
}
