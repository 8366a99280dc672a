// src/operator/console.rs

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// Source of operator commands and sink for runner responses (manual mode).
pub trait OperatorConsole: Send {
    /// Next command line, or `None` once input is closed.
    fn read_command(&mut self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;

    /// Show one runner response to the operator.
    fn show_response(&mut self, response: &str);
}

/// Console backed by the process's stdin/stdout.
pub struct StdinConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StdinConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinConsole").finish_non_exhaustive()
    }
}

impl OperatorConsole for StdinConsole {
    fn read_command(&mut self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move {
            print!("Enter command and args: ");
            let _ = std::io::stdout().flush();

            match self.lines.next_line().await {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to read operator input");
                    None
                }
            }
        })
    }

    fn show_response(&mut self, response: &str) {
        println!("> {response}");
    }
}
