use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use remotest::operator::{OperatorCancelSource, OperatorConsole};

/// Console that replays a fixed list of commands and records what was
/// shown. Input "closes" once the list is exhausted.
pub struct ScriptedConsole {
    commands: VecDeque<String>,
    shown: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConsole {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            shown: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the responses shown so far.
    pub fn shown(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.shown)
    }
}

impl OperatorConsole for ScriptedConsole {
    fn read_command(&mut self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        let next = self.commands.pop_front();
        Box::pin(async move { next })
    }

    fn show_response(&mut self, response: &str) {
        self.shown.lock().unwrap().push(response.to_string());
    }
}

/// Cancel source fired from the test through a [`CancelTrigger`].
pub struct ManualCancelSource {
    notify: Arc<Notify>,
}

/// Handle that fires a [`ManualCancelSource`].
#[derive(Clone)]
pub struct CancelTrigger {
    notify: Arc<Notify>,
}

impl ManualCancelSource {
    pub fn new() -> (Self, CancelTrigger) {
        let notify = Arc::new(Notify::new());
        (
            Self {
                notify: Arc::clone(&notify),
            },
            CancelTrigger { notify },
        )
    }
}

impl CancelTrigger {
    pub fn fire(&self) {
        // notify_one stores a permit if nobody is waiting yet.
        self.notify.notify_one();
    }
}

impl OperatorCancelSource for ManualCancelSource {
    fn triggered(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.notify.notified())
    }
}
