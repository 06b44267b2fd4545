use shikyou_types::DocumentId;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The document an update targeted does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: DocumentId },

    /// Transport failure talking to a remote backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Encoding or decoding JSON failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document or response did not have the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The backend cannot serve the call right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend was configured with unusable parameters.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &DocumentId) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
