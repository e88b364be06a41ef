//! Progress-callback trait for conformance-run events.
//!
//! Pass an [`Arc<dyn SuiteProgressCallback>`] to
//! [`crate::suite::run_suite_with_progress`] to hear about each check as it
//! starts and finishes. The CLI uses this to drive its spinner; a CI wrapper
//! could forward the same events to a log or a dashboard.
//!
//! # Example
//!
//! ```rust
//! use hwp_reader_check::{CheckOutcome, SuiteProgressCallback};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct FailureCounter(AtomicUsize);
//!
//! impl SuiteProgressCallback for FailureCounter {
//!     fn on_check_complete(&self, outcome: &CheckOutcome) {
//!         if !outcome.passed {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//! ```

use crate::report::{CheckName, CheckOutcome, ProbeOutcome, SuiteReport};
use std::sync::Arc;

/// Called by the suite runner as it works through the checks.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Checks run one after another, so calls never
/// overlap, but the trait is `Send + Sync` so a callback can be shared with
/// other tasks.
pub trait SuiteProgressCallback: Send + Sync {
    /// Called once before the health probe.
    fn on_suite_start(&self, base_url: &str) {
        let _ = base_url;
    }

    /// Called just before a check sends its request.
    fn on_check_start(&self, name: CheckName) {
        let _ = name;
    }

    /// Called when the health probe finishes.
    fn on_probe_complete(&self, outcome: &ProbeOutcome) {
        let _ = outcome;
    }

    /// Called when an extraction, conversion or idempotence check finishes.
    fn on_check_complete(&self, outcome: &CheckOutcome) {
        let _ = outcome;
    }

    /// Called once with the final report, including after an abort.
    fn on_suite_complete(&self, report: &SuiteReport) {
        let _ = report;
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl SuiteProgressCallback for NoopProgressCallback {}

/// Convenience alias for a shared callback.
pub type ProgressCallback = Arc<dyn SuiteProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SuiteProgressCallback for Recorder {
        fn on_check_start(&self, name: CheckName) {
            self.events.lock().unwrap().push(format!("start:{name:?}"));
        }

        fn on_check_complete(&self, outcome: &CheckOutcome) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done:{:?}:{}", outcome.name, outcome.passed));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_suite_start("http://localhost:8500");
        cb.on_check_start(CheckName::HealthProbe);
        cb.on_check_complete(&CheckOutcome::pass(CheckName::Extract, Some(200), "ok"));
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let rec = Recorder::default();
        rec.on_check_start(CheckName::Extract);
        rec.on_check_complete(&CheckOutcome::pass(CheckName::Extract, Some(200), "ok"));
        let events = rec.events.lock().unwrap().clone();
        assert_eq!(events, vec!["start:Extract", "done:Extract:true"]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_check_start(CheckName::Convert);
    }
}
