//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. They uniquely
//! identify every stored object (blobs, trees, commits, tags).
//!
//! ## Storage
//!
//! Objects are stored in `<git-dir>/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{Result, VcsError};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase hex digits are accepted and normalized to lowercase.
    pub fn try_parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.len() != OBJECT_ID_LENGTH {
            return Err(VcsError::corrupt(format!(
                "invalid object ID length {}: {:?}",
                id.len(),
                id
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VcsError::corrupt(format!(
                "invalid object ID characters: {:?}",
                id
            )));
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an ID from a raw 20-byte digest
    pub fn from_digest(digest: &[u8]) -> Result<Self> {
        let hex = digest
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();
        Self::try_parse(hex)
    }

    /// Write the object ID in binary format (20 bytes)
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| VcsError::corrupt(format!("invalid hex digit in {hex40}")))?;
            writer
                .write_all(&[byte])
                .map_err(|e| VcsError::corrupt(e.to_string()))?;
        }

        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; OBJECT_ID_LENGTH / 2];
        reader
            .read_exact(&mut buffer)
            .map_err(|_| VcsError::corrupt("unexpected EOF in object id"))?;

        Self::from_digest(&buffer)
    }

    /// Split the hash as `XX/YYYY...` for the two-level object layout
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
