//! Network-class gate port.
//!
//! Downloads run only while an unmetered network is available. Reachability
//! detection itself lives outside this crate; [`ManualNetworkMonitor`] is a
//! settable implementation for embedders that already track connectivity
//! and for tests.

use tokio::sync::watch;

/// Source of the "unmetered network available" signal.
pub trait NetworkMonitorPort: Send + Sync {
    /// Current gate state.
    fn is_unmetered(&self) -> bool;

    /// Receiver that observes every gate change.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// A network monitor driven by explicit calls to [`set_unmetered`].
///
/// [`set_unmetered`]: ManualNetworkMonitor::set_unmetered
#[derive(Debug)]
pub struct ManualNetworkMonitor {
    tx: watch::Sender<bool>,
}

impl ManualNetworkMonitor {
    pub fn new(unmetered: bool) -> Self {
        let (tx, _rx) = watch::channel(unmetered);
        Self { tx }
    }

    /// Update the gate. Subscribers are only woken when the value changes.
    pub fn set_unmetered(&self, unmetered: bool) {
        self.tx.send_if_modified(|current| {
            if *current == unmetered {
                false
            } else {
                *current = unmetered;
                true
            }
        });
    }
}

impl Default for ManualNetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkMonitorPort for ManualNetworkMonitor {
    fn is_unmetered(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
