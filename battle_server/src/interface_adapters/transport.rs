// Transport seam plus the in-process bus used when everything runs in one process.

use parking_lot::RwLock;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::interface_adapters::errors::TransportError;
use crate::interface_adapters::protocol::TransportMessage;

pub type MessageHandler = Arc<dyn Fn(TransportMessage) -> Result<(), TransportError> + Send + Sync>;

pub trait Transport: Send + Sync {
    /// Fire-and-forget; ordering is preserved per transport.
    fn publish(&self, message: TransportMessage);
    fn subscribe(&self, handler: MessageHandler);
}

/// Hands a message to every handler; errors and panics stay with the handler that caused them.
pub(crate) fn deliver(handlers: &[MessageHandler], message: &TransportMessage) {
    for (index, handler) in handlers.iter().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| handler(message.clone()))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(
                subscriber = index,
                command = %message.command_type,
                error = %e,
                "subscriber rejected message"
            ),
            Err(_) => error!(
                subscriber = index,
                command = %message.command_type,
                "subscriber panicked"
            ),
        }
    }
}

/// Bounded queue drained by a background task. A full queue drops the message.
pub struct InProcessBus {
    sender: mpsc::Sender<TransportMessage>,
    subscribers: Arc<RwLock<Vec<MessageHandler>>>,
}

impl InProcessBus {
    /// Must be called inside a tokio runtime.
    pub fn spawn(capacity: usize) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(capacity);
        let subscribers = Arc::new(RwLock::new(Vec::new()));
        tokio::spawn(drain(receiver, subscribers.clone()));
        Arc::new(Self { sender, subscribers })
    }
}

async fn drain(mut receiver: mpsc::Receiver<TransportMessage>, subscribers: Arc<RwLock<Vec<MessageHandler>>>) {
    while let Some(message) = receiver.recv().await {
        let handlers = subscribers.read().clone();
        deliver(&handlers, &message);
    }
    debug!("in-process bus closed");
}

impl Transport for InProcessBus {
    fn publish(&self, message: TransportMessage) {
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(message)) => {
                warn!(command = %message.command_type, "bus queue full; dropping message");
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                warn!(command = %message.command_type, "bus closed; dropping message");
            }
        }
    }

    fn subscribe(&self, handler: MessageHandler) {
        self.subscribers.write().push(handler);
    }
}
