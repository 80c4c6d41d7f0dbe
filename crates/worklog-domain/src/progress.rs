//! Incrementally updated progress record for long-running runs

use crate::traits::ProgressObserver;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Pipeline stage currently executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Not started
    Pending,
    /// Enumerating expected files
    Discovery,
    /// Reading and sanitizing files
    Processing,
    /// Calling providers for entity extraction
    Extraction,
    /// Grouping results and generating narratives
    Aggregation,
    /// Writing the report
    Reporting,
    /// Finished successfully
    Complete,
    /// Stopped by a cancellation signal
    Cancelled,
}

impl Stage {
    /// Snake-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Discovery => "discovery",
            Stage::Processing => "processing",
            Stage::Extraction => "extraction",
            Stage::Aggregation => "aggregation",
            Stage::Reporting => "reporting",
            Stage::Complete => "complete",
            Stage::Cancelled => "cancelled",
        }
    }
}

/// Progress snapshot handed to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current stage
    pub stage: Stage,
    /// Units finished in the current stage
    pub processed: usize,
    /// Units expected in the current stage
    pub total: usize,
    /// Errors accumulated over the whole run
    pub errors: Vec<String>,
}

impl Default for ProgressUpdate {
    fn default() -> Self {
        Self {
            stage: Stage::Pending,
            processed: 0,
            total: 0,
            errors: Vec::new(),
        }
    }
}

/// Owns the progress record and notifies the observer on every change
///
/// Cheap to clone; clones share the same record.
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<Mutex<ProgressUpdate>>,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressTracker {
    /// Create a tracker reporting to `observer`
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressUpdate::default())),
            observer,
        }
    }

    /// Enter a new stage with `total` units of work
    pub fn begin_stage(&self, stage: Stage, total: usize) {
        self.update(|s| {
            s.stage = stage;
            s.processed = 0;
            s.total = total;
        });
    }

    /// Mark one unit of the current stage as done
    pub fn advance(&self) {
        self.update(|s| s.processed += 1);
    }

    /// Append an error message and mark the unit as done
    pub fn advance_with_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| {
            s.processed += 1;
            s.errors.push(message);
        });
    }

    /// Append an error message without advancing
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| s.errors.push(message));
    }

    /// Current snapshot
    pub fn snapshot(&self) -> ProgressUpdate {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut ProgressUpdate)) {
        let snapshot = {
            let mut guard = match self.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut guard);
            guard.clone()
        };
        // Notify outside the lock so observers may call snapshot()
        self.observer.on_progress(&snapshot);
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("state", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NoopObserver;

    #[test]
    fn test_tracker_stages_and_errors() {
        let tracker = ProgressTracker::new(Arc::new(NoopObserver));
        tracker.begin_stage(Stage::Processing, 3);
        tracker.advance();
        tracker.advance_with_error("bad encoding");

        let snap = tracker.snapshot();
        assert_eq!(snap.stage, Stage::Processing);
        assert_eq!(snap.processed, 2);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.errors, vec!["bad encoding".to_string()]);

        tracker.begin_stage(Stage::Extraction, 5);
        let snap = tracker.snapshot();
        assert_eq!(snap.processed, 0);
        assert_eq!(snap.errors.len(), 1, "errors persist across stages");
    }

    #[test]
    fn test_observer_receives_every_update() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = move |u: &ProgressUpdate| sink.lock().unwrap().push((u.stage, u.processed));

        let tracker = ProgressTracker::new(Arc::new(observer));
        tracker.begin_stage(Stage::Discovery, 2);
        tracker.advance();
        tracker.advance();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![(Stage::Discovery, 0), (Stage::Discovery, 1), (Stage::Discovery, 2)]
        );
    }
}
