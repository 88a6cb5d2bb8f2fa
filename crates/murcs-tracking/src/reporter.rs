//! Error reporting collaborator
//!
//! Non-fatal field access failures are handed to an [`ErrorReporter`]
//! instead of aborting the surrounding operation.

use crate::error::TrackingError;

/// Receives failures the engine recovers from
///
/// Fire-and-forget: implementations must not panic.
pub trait ErrorReporter: Send {
    /// Report a failure with a short description of what was being done
    fn report(&self, error: &TrackingError, context: &str);
}

/// Default reporter: logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &TrackingError, context: &str) {
        tracing::error!(%error, "{context}");
    }
}

impl<F> ErrorReporter for F
where
    F: Fn(&TrackingError, &str) + Send,
{
    fn report(&self, error: &TrackingError, context: &str) {
        self(error, context);
    }
}
