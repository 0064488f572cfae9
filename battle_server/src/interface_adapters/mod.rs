// Interface adapters: wire protocol, command transport and network hosting.

pub mod adapter;
pub mod errors;
pub mod net;
pub mod protocol;
pub mod publisher;
pub mod transport;

pub use adapter::{CommandRegistry, CommandTransportAdapter};
pub use errors::TransportError;
pub use protocol::TransportMessage;
pub use publisher::TransportPublisher;
pub use transport::{InProcessBus, MessageHandler, Transport};
