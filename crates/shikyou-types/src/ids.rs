use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a document inside a collection.
///
/// Identifiers are assigned by the store on creation and are opaque to
/// everything above it. They are never persisted as a document field.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identifier, which no stored document has.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Content-addressed reference to a body stored outside the document database.
///
/// Usually an IPFS cid handed in by the caller. The store never resolves or
/// validates it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Prefix of references produced by [`ContentRef::digest`].
    pub const DIGEST_PREFIX: &'static str = "b3:";

    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    /// Derive a local reference from raw content (`b3:` + BLAKE3 hex).
    ///
    /// Identical content always yields the same reference.
    pub fn digest(content: &[u8]) -> Self {
        let hash = blake3::hash(content);
        Self(format!("{}{}", Self::DIGEST_PREFIX, hex::encode(hash.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this reference was produced by [`ContentRef::digest`].
    pub fn is_digest(&self) -> bool {
        self.0.starts_with(Self::DIGEST_PREFIX)
    }
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef({})", self.0)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}
