// src/operator/cancel.rs

//! Operator cancel channel.
//!
//! A backend only has to resolve a future when the operator asks to stop;
//! the channel turns that into the run-wide stop signal, exactly once.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::operator::keypress::KeypressCancelSource;
use crate::types::{CancelBackendKind, ExecutionMode};

/// Something the operator can do to end the run early.
pub trait OperatorCancelSource: Send {
    /// Resolves when the operator asks to stop. May never resolve.
    fn triggered(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Backend that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCancelSource;

impl OperatorCancelSource for NoopCancelSource {
    fn triggered(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(std::future::pending())
    }
}

/// Backend that fires on Ctrl-C (SIGINT).
#[derive(Debug, Clone, Copy, Default)]
pub struct CtrlCCancelSource;

impl OperatorCancelSource for CtrlCCancelSource {
    fn triggered(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C; operator cancel disabled");
                std::future::pending::<()>().await;
            }
        })
    }
}

/// Build the configured backend.
pub fn build_cancel_source(kind: CancelBackendKind) -> Box<dyn OperatorCancelSource> {
    match kind {
        CancelBackendKind::Keypress => Box::new(KeypressCancelSource::new()),
        CancelBackendKind::CtrlC => Box::new(CtrlCCancelSource),
        CancelBackendKind::None => Box::new(NoopCancelSource),
    }
}

/// The backend actually installed for a run.
///
/// Manual mode reads operator commands from stdin, so a keypress backend
/// falls back to Ctrl-C there.
pub fn cancel_backend_for(
    mode: ExecutionMode,
    configured: CancelBackendKind,
) -> CancelBackendKind {
    match (mode, configured) {
        (ExecutionMode::Manual, CancelBackendKind::Keypress) => CancelBackendKind::CtrlC,
        (_, kind) => kind,
    }
}

/// Waits for the operator independently of socket and runner activity.
pub struct OperatorCancelChannel {
    source: Box<dyn OperatorCancelSource>,
    stop: CancellationToken,
}

impl OperatorCancelChannel {
    pub fn new(source: Box<dyn OperatorCancelSource>, stop: CancellationToken) -> Self {
        Self { source, stop }
    }

    /// Run until the operator fires or the run stops for another reason.
    ///
    /// Returns true when the operator ended the run.
    pub async fn run(mut self) -> bool {
        tokio::select! {
            _ = self.stop.cancelled() => {
                debug!("stop signal observed; operator cancel channel exiting");
                false
            }
            _ = self.source.triggered() => {
                let first = !self.stop.is_cancelled();
                self.stop.cancel();
                if first {
                    info!("operator requested stop; stopping server");
                }
                first
            }
        }
    }
}
