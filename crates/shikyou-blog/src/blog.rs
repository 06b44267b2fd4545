use std::sync::Arc;

use shikyou_store::DocumentStore;
use shikyou_types::{Clock, SystemClock};

/// Posts, comments and view counters over one document store.
///
/// `Blog` holds no record state of its own: every call goes to the store,
/// and independent calls may run concurrently. Timestamps come from the
/// configured [`Clock`].
pub struct Blog<S> {
    pub(crate) store: S,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<S: DocumentStore> Blog<S> {
    /// A blog stamping records with a monotonic [`SystemClock`].
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Blog<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blog").field("store", &self.store).finish()
    }
}
