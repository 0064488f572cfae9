use thiserror::Error;

/// Failures at the command/transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unknown command type `{0}`")]
    UnknownCommandType(String),
    #[error("invalid payload for `{command_type}`")]
    InvalidPayload {
        command_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("payload for `{0}` is not a command object")]
    NotACommand(String),
    #[error("failed to serialize command")]
    Serialization(#[from] serde_json::Error),
}
