/**
Compute-once slot for listing results

A `Snapshot` is filled by the first successful, non-empty fetch and hands out the
same `Arc` for the rest of its life. Failed fetches leave it empty so the next
caller tries again. Callers are serialized on the slot, so concurrent first calls
issue a single fetch.
*/
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub struct Snapshot<T> {
    kind: &'static str,
    slot: Mutex<Option<Arc<Vec<T>>>>,
}

impl<T> Snapshot<T> {
    #[must_use]
    pub const fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slot: Mutex::const_new(None),
        }
    }

    /// Return the stored items, or run `fill` and store what it returns.
    ///
    /// # Errors
    ///
    /// Will return whatever `fill` fails with; nothing is stored in that case
    pub async fn get_or_try_fill<F, Fut, E>(&self, fill: F) -> Result<Arc<Vec<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(items) = slot.as_ref() {
            debug!("♻️ {} served from cache ({} items)", self.kind, items.len());
            return Ok(items.clone());
        }

        debug!("🔧 {} not cached, fetching", self.kind);
        let items = Arc::new(fill().await?);
        // an empty listing is not treated as a snapshot
        if !items.is_empty() {
            *slot = Some(items.clone());
        }
        Ok(items)
    }

    pub async fn is_filled(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}
