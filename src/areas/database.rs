//! Object store
//!
//! Content-addressable, append-only storage of zlib-compressed objects laid
//! out as `objects/<2 hex>/<38 hex>` on the filesystem collaborator. Putting
//! content that is already present is a no-op returning the same id.

use crate::artifacts::database::tree_reader::TreeReader;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable, frame, hash_bytes};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Result, VcsError};
use crate::fs::{FileSystem, mkdir_p};
use bytes::Bytes;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct Database<F> {
    fs: Arc<F>,
    path: Box<Path>,
}

impl<F: FileSystem> Database<F> {
    pub fn new(fs: Arc<F>, path: Box<Path>) -> Self {
        Database { fs, path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn tree_reader(&self) -> TreeReader<'_, F> {
        TreeReader::new(self)
    }

    fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    /// Store raw content of the given kind and return its identifier
    pub async fn put(&self, object_type: ObjectType, content: &[u8]) -> Result<ObjectId> {
        let framed = frame(object_type, content);
        let object_id = hash_bytes(&framed);

        self.write_if_missing(&object_id, framed).await?;

        Ok(object_id)
    }

    /// Store an encoded object and return its identifier
    pub async fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let framed = object.serialize()?;
        let object_id = hash_bytes(&framed);

        self.write_if_missing(&object_id, framed).await?;

        Ok(object_id)
    }

    pub async fn has(&self, object_id: &ObjectId) -> Result<bool> {
        let object_path = self.object_path(object_id);

        crate::fs::try_stat(self.fs.as_ref(), &object_path)
            .await
            .map(|stat| stat.is_some_and(|stat| stat.is_file()))
            .map_err(|e| VcsError::store_io(object_path, e))
    }

    /// Load an object as its kind and raw payload
    pub async fn get(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let object_content = self.read_object(object_id).await?;
        let mut reader = Cursor::new(object_content);

        let (object_type, size) = ObjectType::parse_header(&mut reader)?;
        let offset = reader.position() as usize;
        let payload = reader.into_inner().slice(offset..);

        if payload.len() != size {
            return Err(VcsError::corrupt(format!(
                "object {object_id} declares {size} bytes but holds {}",
                payload.len()
            )));
        }

        Ok((object_type, payload))
    }

    /// Kind and payload size of an object, inflating only its header
    pub async fn header(&self, object_id: &ObjectId) -> Result<(ObjectType, usize)> {
        let compressed = self.read_compressed(object_id).await?;
        let mut reader = BufReader::new(flate2::read::ZlibDecoder::new(&compressed[..]));

        ObjectType::parse_header(&mut reader)
    }

    pub async fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, payload) = self.get(object_id).await?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(&payload[..])?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(&payload[..])?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                &payload[..],
            )?))),
            ObjectType::Tag => Ok(ObjectBox::Tag(payload)),
        }
    }

    pub async fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Option<Blob>> {
        match self.parse_object(object_id).await? {
            ObjectBox::Blob(blob) => Ok(Some(*blob)),
            _ => Ok(None),
        }
    }

    pub async fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Option<Tree>> {
        match self.parse_object(object_id).await? {
            ObjectBox::Tree(tree) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub async fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Option<Commit>> {
        match self.parse_object(object_id).await? {
            ObjectBox::Commit(commit) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    async fn write_if_missing(&self, object_id: &ObjectId, framed: Bytes) -> Result<()> {
        if self.has(object_id).await? {
            tracing::trace!(%object_id, "object already stored");
            return Ok(());
        }

        let object_path = self.object_path(object_id);
        let object_dir = object_path
            .parent()
            .ok_or_else(|| VcsError::corrupt(format!("invalid object path {object_path:?}")))?;

        mkdir_p(self.fs.as_ref(), object_dir)
            .await
            .map_err(|e| VcsError::store_io(object_dir, e))?;

        let compressed = Self::compress(&framed)?;
        self.fs
            .write_file(&object_path, &compressed)
            .await
            .map_err(|e| VcsError::store_io(&object_path, e))?;

        tracing::debug!(%object_id, bytes = framed.len(), "stored object");
        Ok(())
    }

    async fn read_compressed(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(object_id);

        match self.fs.read_file(&object_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VcsError::NotFound(format!("object {object_id}")))
            }
            Err(e) => Err(VcsError::store_io(object_path, e)),
        }
    }

    async fn read_object(&self, object_id: &ObjectId) -> Result<Bytes> {
        let compressed = self.read_compressed(object_id).await?;

        Self::decompress(&compressed)
            .map_err(|_| VcsError::corrupt(format!("object {object_id} is not valid zlib data")))
    }

    fn compress(data: &[u8]) -> Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .and_then(|_| encoder.finish())
            .map(Bytes::from)
            .map_err(|e| VcsError::corrupt(format!("unable to compress object: {e}")))
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }
}
