// ABOUTME: Observability sink injected into the feed pipeline.
// ABOUTME: TracingObserver forwards to the tracing crate; NullObserver discards everything.

/// Receives progress and warning messages from the pipeline.
pub trait Observer {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    /// Non-fatal problems: unavailable probe tools, undetectable MIME types, missing self-link.
    fn warn(&self, message: &str);
}

/// Forwards pipeline messages to `tracing` under the `castgen` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "castgen", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "castgen", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "castgen", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn warn(&self, _message: &str) {}
}
