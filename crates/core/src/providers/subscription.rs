use tokio::sync::mpsc;

use crate::errors::CoreError;
use crate::models::catalog::CatalogItem;

/// One push from the catalog data source: a whole snapshot, or the error
/// the source ran into while producing one.
pub type CatalogEvent = Result<Vec<CatalogItem>, CoreError>;

/// Sending half handed to the code that produces snapshots.
pub type CatalogPublisher = mpsc::UnboundedSender<CatalogEvent>;

/// A live catalog feed owned by a session.
///
/// Dropping the subscription releases it: the receiver closes (so further
/// sends fail) and the cancel hook, if any, runs.
pub struct CatalogSubscription {
    receiver: mpsc::UnboundedReceiver<CatalogEvent>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for CatalogSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSubscription")
            .field("has_cancel_hook", &self.cancel.is_some())
            .finish()
    }
}

impl CatalogSubscription {
    /// Create a connected publisher / subscription pair.
    pub fn channel() -> (CatalogPublisher, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            tx,
            Self {
                receiver: rx,
                cancel: None,
            },
        )
    }

    /// Run `cancel` when the subscription is released.
    pub fn with_cancel(mut self, cancel: impl FnOnce() + Send + 'static) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    /// Wait for the next snapshot. `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<CatalogEvent> {
        self.receiver.recv().await
    }

    /// Take an already-delivered snapshot without waiting.
    pub fn try_next(&mut self) -> Option<CatalogEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for CatalogSubscription {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
