// Network adapter modules: host lifecycle and the websocket hub.

pub mod host;
pub mod hub;

pub use host::{DummyHost, NetworkHost, WsHubHost};
pub use hub::{Hub, hub_ws_handler};
