// src/engine/signals.rs

//! Signals shared between the session handler, the supervisor and the
//! operator cancel channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Request to restart the runner without ending the run.
///
/// Setting it twice before it is consumed still yields one restart.
#[derive(Debug, Clone, Default)]
pub struct RebootSignal {
    inner: Arc<RebootInner>,
}

#[derive(Debug, Default)]
struct RebootInner {
    requested: AtomicBool,
    notify: Notify,
}

impl RebootSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    /// Whether a request is pending (not yet consumed).
    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Wait for a request and consume it.
    ///
    /// Cancel-safe: a request is only consumed when this returns.
    pub async fn requested(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.inner.requested.swap(false, Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

/// The run-wide stop token plus the narrower reboot request.
///
/// The stop token is one-shot: once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct RunSignals {
    pub stop: CancellationToken,
    pub reboot: RebootSignal,
}

impl RunSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}
