//! Offline event emitter port.
//!
//! Lets the coordinator publish change notifications without coupling to a
//! transport (channels, IPC, UI bindings).

use crate::events::OfflineEvent;

/// Port for emitting offline download events.
///
/// Implementations must not block; buffer or forward asynchronously.
pub trait OfflineEventEmitterPort: Send + Sync {
    fn emit(&self, event: OfflineEvent);
}

/// A no-op emitter for tests and the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOfflineEmitter;

impl NoopOfflineEmitter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OfflineEventEmitterPort for NoopOfflineEmitter {
    fn emit(&self, _event: OfflineEvent) {
        // Intentionally do nothing
    }
}
