use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{Result, VcsError};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::Read;

/// Running SHA-1 over everything read from or written to the index
#[derive(Debug)]
pub struct Checksum<T> {
    inner: T,
    digest: Sha1,
}

impl<T> Checksum<T> {
    pub fn new(inner: T) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }
}

impl<R: Read> Checksum<R> {
    pub fn read(&mut self, size: usize) -> Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|_| VcsError::corrupt("unexpected end-of-file while reading index"))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    pub fn verify(&mut self) -> Result<()> {
        let mut expected_checksum = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut expected_checksum)
            .map_err(|_| VcsError::corrupt("index checksum is missing"))?;

        let actual_checksum = self.digest.clone().finalize();

        if expected_checksum != actual_checksum.as_slice() {
            return Err(VcsError::corrupt(
                "index checksum does not match value stored on disk",
            ));
        }

        Ok(())
    }
}

impl Checksum<Vec<u8>> {
    pub fn write(&mut self, data: &[u8]) {
        self.inner.extend_from_slice(data);
        self.digest.update(data);
    }

    /// Append the checksum and return the complete buffer
    pub fn finish(mut self) -> Bytes {
        let checksum = self.digest.finalize();
        self.inner.extend_from_slice(checksum.as_slice());
        Bytes::from(self.inner)
    }
}
