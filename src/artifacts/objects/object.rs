use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;

/// Canonical encoding: `<type> <size>\0<payload>`
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decoding of the payload; the header has already been consumed
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(hash_bytes(&content))
    }
}

/// SHA-1 over an already encoded object
pub fn hash_bytes(content: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(content);

    // a SHA-1 digest is always 20 bytes, which always parses
    ObjectId::from_digest(&hasher.finalize()).unwrap_or_default()
}

/// Encode a raw payload with its header
pub fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let mut framed = object_type.header(payload.len()).into_bytes();
    framed.extend_from_slice(payload);
    Bytes::from(framed)
}

/// A decoded object of any kind
#[derive(Debug, Clone)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    /// Tags are stored and returned verbatim
    Tag(Bytes),
}
