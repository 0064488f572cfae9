// Command <-> transport adapter: a closed registry of command types and the envelope codec.

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::interface_adapters::errors::TransportError;
use crate::interface_adapters::protocol::TransportMessage;
use crate::interface_adapters::transport::Transport;
use crate::use_cases::commands::Command;

type Decoder = fn(Value) -> Result<Command, serde_json::Error>;

fn entry(tag: &'static str, decode: Decoder) -> (&'static str, Decoder) {
    (tag, decode)
}

/// Wire tags and their decoders. Built once; both ends must agree on it.
pub struct CommandRegistry {
    entries: Vec<(&'static str, Decoder)>,
}

impl CommandRegistry {
    pub fn standard() -> Self {
        Self::with_entries(vec![
            entry("JoinGame", |v| serde_json::from_value(v).map(Command::JoinGame)),
            entry("UpdatePlayerStatus", |v| serde_json::from_value(v).map(Command::UpdatePlayerStatus)),
            entry("DeployUnit", |v| serde_json::from_value(v).map(Command::DeployUnit)),
            entry("MoveUnit", |v| serde_json::from_value(v).map(Command::MoveUnit)),
            entry("WeaponConfiguration", |v| serde_json::from_value(v).map(Command::WeaponConfiguration)),
            entry("WeaponAttackDeclaration", |v| {
                serde_json::from_value(v).map(Command::WeaponAttackDeclaration)
            }),
            entry("PhysicalAttack", |v| serde_json::from_value(v).map(Command::PhysicalAttack)),
            entry("TurnEnded", |v| serde_json::from_value(v).map(Command::TurnEnded)),
            entry("RollDice", |v| serde_json::from_value(v).map(Command::RollDice)),
            entry("ChangePhase", |v| serde_json::from_value(v).map(Command::ChangePhase)),
            entry("ChangeActivePlayer", |v| serde_json::from_value(v).map(Command::ChangeActivePlayer)),
            entry("TurnIncremented", |v| serde_json::from_value(v).map(Command::TurnIncremented)),
            entry("DiceRolled", |v| serde_json::from_value(v).map(Command::DiceRolled)),
            entry("HeatUpdated", |v| serde_json::from_value(v).map(Command::HeatUpdated)),
            entry("WeaponAttackResolution", |v| {
                serde_json::from_value(v).map(Command::WeaponAttackResolution)
            }),
        ])
    }

    pub fn with_entries(entries: Vec<(&'static str, Decoder)>) -> Self {
        Self { entries }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.decoder(tag).is_some()
    }

    fn decoder(&self, tag: &str) -> Option<Decoder> {
        self.entries
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, decode)| *decode)
    }

    pub fn encode(&self, command: &Command) -> Result<TransportMessage, TransportError> {
        let tag = command.type_tag();
        if !self.contains(tag) {
            return Err(TransportError::UnknownCommandType(tag.to_string()));
        }
        Ok(TransportMessage {
            command_type: tag.to_string(),
            origin_id: command.game_origin_id(),
            payload: command.payload_json()?,
            timestamp: command.timestamp(),
        })
    }

    /// Decodes a message; the envelope's origin and timestamp win over the payload's.
    pub fn decode(&self, message: &TransportMessage) -> Result<Command, TransportError> {
        let decode = self
            .decoder(&message.command_type)
            .ok_or_else(|| TransportError::UnknownCommandType(message.command_type.clone()))?;
        let invalid = |source| TransportError::InvalidPayload {
            command_type: message.command_type.clone(),
            source,
        };

        let value: Value = serde_json::from_str(&message.payload).map_err(invalid)?;
        if !value.is_object() {
            return Err(TransportError::NotACommand(message.command_type.clone()));
        }
        let mut command = decode(value).map_err(invalid)?;
        command.set_envelope(message.origin_id, message.timestamp);
        Ok(command)
    }
}

pub type ReceiveHandler = Arc<dyn Fn(Command) + Send + Sync>;

/// Bridges commands and any number of transports.
pub struct CommandTransportAdapter {
    registry: Arc<CommandRegistry>,
    transports: RwLock<Vec<Arc<dyn Transport>>>,
    on_received: RwLock<Option<ReceiveHandler>>,
}

impl CommandTransportAdapter {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            transports: RwLock::new(Vec::new()),
            on_received: RwLock::new(None),
        }
    }

    /// Transports added after `initialize` are wired to the same callback.
    pub fn add_transport(&self, transport: Arc<dyn Transport>) {
        // Held across wiring so a concurrent `initialize` sees this transport or wires it first.
        let mut transports = self.transports.write();
        if let Some(handler) = self.on_received.read().clone() {
            self.wire(transport.as_ref(), handler);
        }
        transports.push(transport);
    }

    pub fn transport_count(&self) -> usize {
        self.transports.read().len()
    }

    pub fn publish_command(&self, command: &Command) -> Result<(), TransportError> {
        let message = self.registry.encode(command)?;
        let transports = self.transports.read().clone();
        debug!(command = %message.command_type, transports = transports.len(), "publishing command");
        for transport in transports {
            transport.publish(message.clone());
        }
        Ok(())
    }

    pub fn initialize(&self, on_received: ReceiveHandler) {
        // Same lock order as `add_transport`: transports, then the handler.
        let transports = self.transports.write();
        *self.on_received.write() = Some(on_received.clone());
        for transport in transports.iter() {
            self.wire(transport.as_ref(), on_received.clone());
        }
    }

    fn wire(&self, transport: &dyn Transport, on_received: ReceiveHandler) {
        let registry = self.registry.clone();
        transport.subscribe(Arc::new(move |message: TransportMessage| -> Result<(), TransportError> {
            let command = registry.decode(&message)?;
            on_received(command);
            Ok(())
        }));
    }
}
