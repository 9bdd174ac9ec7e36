//! Network availability

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wren_view::NetworkMonitor;

/// Connectivity flag flipped by the platform's network notifications.
#[derive(Debug, Clone)]
pub struct SharedNetworkMonitor {
    available: Arc<AtomicBool>,
}

impl SharedNetworkMonitor {
    pub fn new(available: bool) -> Self {
        Self {
            available: Arc::new(AtomicBool::new(available)),
        }
    }

    pub fn set_available(&self, available: bool) {
        let previous = self.available.swap(available, Ordering::SeqCst);
        if previous != available {
            tracing::info!(available, "Network availability changed");
        }
    }
}

impl Default for SharedNetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkMonitor for SharedNetworkMonitor {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
