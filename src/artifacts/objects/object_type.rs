use crate::errors::{Result, VcsError};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Consume the `<type> <size>\0` header, leaving the reader at the payload
    ///
    /// Returns the object type together with the declared payload size.
    pub fn parse_header(data_reader: &mut impl BufRead) -> Result<(ObjectType, usize)> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| VcsError::corrupt(e.to_string()))?;
        if object_type.pop() != Some(b' ') {
            return Err(VcsError::corrupt("unexpected EOF in object header"));
        }

        let object_type = std::str::from_utf8(&object_type)
            .map_err(|_| VcsError::corrupt("object type is not UTF-8"))?;
        let object_type = ObjectType::try_from(object_type)?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| VcsError::corrupt(e.to_string()))?;
        if size.pop() != Some(b'\0') {
            return Err(VcsError::corrupt("unexpected EOF in object size"));
        }

        let size = std::str::from_utf8(&size)
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| VcsError::corrupt("invalid object size"))?;

        Ok((object_type, size))
    }

    pub fn header(&self, payload_len: usize) -> String {
        format!("{} {}\0", self.as_str(), payload_len)
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = VcsError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            _ => Err(VcsError::corrupt(format!("invalid object type {value:?}"))),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
