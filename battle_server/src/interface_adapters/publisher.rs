// CommandPublisher backed by the transport adapter.

use std::sync::Arc;
use tracing::error;

use crate::interface_adapters::adapter::CommandTransportAdapter;
use crate::use_cases::commands::Command;
use crate::use_cases::publisher::{CommandHandler, CommandPublisher, Subscribers};

pub struct TransportPublisher {
    adapter: Arc<CommandTransportAdapter>,
    subscribers: Arc<Subscribers>,
}

impl TransportPublisher {
    /// Takes over the adapter's receive callback; inbound commands reach `subscribe`d handlers.
    pub fn new(adapter: Arc<CommandTransportAdapter>) -> Self {
        let subscribers = Arc::new(Subscribers::default());
        let inbound = subscribers.clone();
        adapter.initialize(Arc::new(move |command: Command| inbound.dispatch(&command)));
        Self { adapter, subscribers }
    }
}

impl CommandPublisher for TransportPublisher {
    fn publish_command(&self, command: &Command) {
        if let Err(e) = self.adapter.publish_command(command) {
            error!(command = command.type_tag(), error = %e, "failed to publish command");
        }
    }

    fn subscribe(&self, handler: CommandHandler) {
        self.subscribers.add(handler);
    }
}
