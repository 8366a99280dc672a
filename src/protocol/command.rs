// src/protocol/command.rs

use std::fmt;

use crate::model::TestIdentifier;

/// A command sent to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Ask for the newline-separated list of test identifiers.
    GetTests,
    /// Run one test.
    Run(TestIdentifier),
    Exit,
    Quit,
    /// Operator text forwarded verbatim (manual mode).
    Raw(String),
}

impl RemoteCommand {
    /// Bytes on the wire, including the NUL terminator.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = self.to_string().into_bytes();
        bytes.push(0);
        bytes
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCommand::GetTests => f.write_str("TESTS"),
            RemoteCommand::Run(id) => write!(f, "RUN {id}"),
            RemoteCommand::Exit => f.write_str("EXIT"),
            RemoteCommand::Quit => f.write_str("QUIT"),
            RemoteCommand::Raw(text) => f.write_str(text),
        }
    }
}

/// True when operator input asks the runner to exit (`EXIT` or `QUIT`, any
/// case, surrounding whitespace ignored).
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
