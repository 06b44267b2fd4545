use shikyou_store::StoreError;
use thiserror::Error;

/// The two ways a blog operation can fail.
///
/// The underlying [`StoreError`] is passed through untouched so callers can
/// inspect the backend's cause.
#[derive(Debug, Error)]
pub enum BlogError {
    /// A create, update or delete was not applied (or, for batch deletes,
    /// not fully applied).
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    /// A fetch failed, or returned a document that is not a valid record.
    #[error("store read failed: {0}")]
    StoreRead(#[source] StoreError),
}

impl BlogError {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::StoreWrite(_))
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Self::StoreRead(_))
    }

    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::StoreWrite(e) | Self::StoreRead(e) => e,
        }
    }
}

pub type BlogResult<T> = Result<T, BlogError>;
