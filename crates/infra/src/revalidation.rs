//! Cache invalidation notices for admin views.
//!
//! Every successful catalog or user mutation announces the admin path whose
//! cached rendering is now stale. Delivery is lossy: with no subscribers the
//! notice is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevalidationNotice {
    pub path: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Revalidator {
    tx: broadcast::Sender<RevalidationNotice>,
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Revalidator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn notify(&self, path: &str) {
        let notice = RevalidationNotice { path: path.to_string(), at: Utc::now() };
        let receivers = self.tx.send(notice).unwrap_or(0);
        debug!(path, receivers, "revalidation notice");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RevalidationNotice> {
        self.tx.subscribe()
    }
}
