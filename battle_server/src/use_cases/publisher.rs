// Command publisher: fan-out of outbound commands and fan-in to subscribers.

use parking_lot::{Mutex, RwLock};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::error;

use crate::use_cases::commands::Command;

pub type CommandHandler = Arc<dyn Fn(&Command) + Send + Sync>;

pub trait CommandPublisher: Send + Sync {
    /// Fire-and-forget; delivery failures are logged by the implementation.
    fn publish_command(&self, command: &Command);
    fn subscribe(&self, handler: CommandHandler);
}

/// Subscriber list that isolates each handler from the others' panics.
#[derive(Default)]
pub struct Subscribers {
    handlers: RwLock<Vec<CommandHandler>>,
}

impl Subscribers {
    pub fn add(&self, handler: CommandHandler) {
        self.handlers.write().push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispatch(&self, command: &Command) {
        // Snapshot so handlers may subscribe others without deadlocking.
        let handlers = self.handlers.read().clone();
        for (index, handler) in handlers.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| handler(command))).is_err() {
                error!(
                    subscriber = index,
                    command = command.type_tag(),
                    "command subscriber panicked"
                );
            }
        }
    }
}

/// Keeps every published command in order and hands it to local subscribers.
///
/// Used where no transport is involved: tests, replays and single-process tools.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Command>>,
    subscribers: Subscribers,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Command> {
        self.published.lock().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<Command> {
        std::mem::take(&mut *self.published.lock())
    }
}

impl CommandPublisher for RecordingPublisher {
    fn publish_command(&self, command: &Command) {
        self.published.lock().push(command.clone());
        self.subscribers.dispatch(command);
    }

    fn subscribe(&self, handler: CommandHandler) {
        self.subscribers.add(handler);
    }
}
