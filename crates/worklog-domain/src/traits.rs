//! Trait definitions for external interactions
//!
//! These traits define the boundaries between pipeline logic and the layers
//! that drive it (CLI, web front end).

use crate::progress::ProgressUpdate;

/// Receives progress snapshots at file and period boundaries
///
/// Called synchronously from the pipeline; implementations should return
/// quickly and hand off to their own transport if they need to.
pub trait ProgressObserver: Send + Sync {
    /// Handle a new snapshot
    fn on_progress(&self, update: &ProgressUpdate);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Observer that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _update: &ProgressUpdate) {}
}
