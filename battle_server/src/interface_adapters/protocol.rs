// Wire envelope shared by every transport.
// The payload is the command's own JSON, carried as a string so transports stay opaque to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportMessage {
    #[serde(rename = "type")]
    pub command_type: String,
    pub origin_id: Uuid,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}
