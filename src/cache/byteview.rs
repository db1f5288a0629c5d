//! Byte View Module
//!
//! Immutable byte payload shared between the local store, the loader and the wire.

use std::fmt;

use bytes::Bytes;

// == Byte View ==
/// An immutable view over cached bytes.
///
/// Cloning is cheap (reference counted); the underlying bytes are never
/// mutated once stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows the bytes without copying.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the shared buffer itself.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(value: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(value),
        }
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<&str> for ByteView {
    fn from(value: &str) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(value.as_bytes()),
        }
    }
}

impl From<String> for ByteView {
    fn from(value: String) -> Self {
        Self {
            bytes: Bytes::from(value),
        }
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}
