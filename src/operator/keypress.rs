// src/operator/keypress.rs

use std::future::Future;
use std::io::IsTerminal;
use std::pin::Pin;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::operator::cancel::OperatorCancelSource;

/// Fires when the space key is pressed.
///
/// The terminal is put in raw mode so a single keypress is seen without
/// Enter; Ctrl-C is handled as a stop too because raw mode swallows SIGINT.
/// When stdin is not a terminal this backend never fires.
pub struct KeypressCancelSource {
    imp: Option<(RawModeGuard, EventStream)>,
}

impl KeypressCancelSource {
    pub fn new() -> Self {
        if !std::io::stdin().is_terminal() {
            debug!("stdin is not a terminal; keypress cancel disabled");
            return Self { imp: None };
        }

        match RawModeGuard::enable() {
            Ok(guard) => {
                eprintln!("Press the space key to stop the server...");
                Self {
                    imp: Some((guard, EventStream::new())),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to enable raw terminal mode; keypress cancel disabled");
                Self { imp: None }
            }
        }
    }
}

impl Default for KeypressCancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorCancelSource for KeypressCancelSource {
    fn triggered(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let Some((_, stream)) = self.imp.as_mut() else {
                return std::future::pending().await;
            };

            while let Some(event) = stream.next().await {
                match event {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if key.code == KeyCode::Char(' ') {
                            eprintln!("Space key pressed. Stopping server.");
                            return;
                        }
                        if key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            return;
                        }
                    }
                    Ok(other) => debug!("unhandled terminal event: {:?}", other),
                    Err(e) => warn!(error = %e, "failed to read terminal event"),
                }
            }

            debug!("terminal event stream ended");
            std::future::pending().await
        })
    }
}

/// Restores cooked mode on drop.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("failed to restore terminal state: {e}");
        }
    }
}
