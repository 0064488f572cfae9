// Use cases layer: game flow, command model and combat resolution.

pub mod combat;
pub mod commands;
pub mod game;
pub mod phases;
pub mod publisher;
pub mod replica;
pub mod roster;
pub mod turn_order;

pub use commands::{Command, CommandKind};
pub use game::{ServerGame, game_task};
pub use phases::{PhaseName, RuleOptions};
pub use publisher::{CommandHandler, CommandPublisher, RecordingPublisher};
pub use replica::ClientGame;
pub use roster::Roster;
