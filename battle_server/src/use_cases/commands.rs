// Command model: every player action and server decision as an immutable message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::heat::HeatData;
use crate::domain::hex::{HexCoordinates, HexDirection, HexPosition};
use crate::domain::player::PlayerStatus;
use crate::domain::rules::PhysicalAttackType;
use crate::domain::to_hit::ToHitBreakdown;
use crate::domain::units::{HitDirection, MovementType, PartLocation, UnitData, WeaponMount, WeaponTarget};
use crate::use_cases::phases::PhaseName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub player_name: String,
    pub tint: String,
    pub units: Vec<UnitData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerStatusCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub player_status: PlayerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployUnitCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub unit_id: Uuid,
    pub position: HexCoordinates,
    pub direction: HexDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveUnitCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub unit_id: Uuid,
    pub movement_type: MovementType,
    /// Position after each step, the starting position excluded.
    pub movement_path: Vec<HexPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WeaponConfiguration {
    TorsoRotation { direction: HexDirection },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponConfigurationCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub unit_id: Uuid,
    pub configuration: WeaponConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponAttackDeclarationCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub unit_id: Uuid,
    pub weapon_targets: Vec<WeaponTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAttackCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub attacker_id: Uuid,
    pub target_id: Uuid,
    pub attack_type: PhysicalAttackType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEndedCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollDiceCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePhaseCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub phase: PhaseName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeActivePlayerCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Option<Uuid>,
    pub units_to_play: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnIncrementedCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub turn_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRolledCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub roll: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatUpdatedCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub unit_id: Uuid,
    pub unit_name: String,
    pub heat_data: HeatData,
    pub previous_heat: u32,
    pub final_heat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AttackKind {
    Weapon { mount: WeaponMount },
    Physical { attack_type: PhysicalAttackType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitLocationData {
    pub location: PartLocation,
    pub damage: u32,
    pub location_roll: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResolution {
    pub weapon_name: String,
    pub to_hit_number: i32,
    pub breakdown: ToHitBreakdown,
    pub attack_roll: u32,
    pub is_hit: bool,
    pub hit_direction: HitDirection,
    pub cluster_roll: Option<u32>,
    pub hits: Vec<HitLocationData>,
}

impl AttackResolution {
    pub fn total_damage(&self) -> u32 {
        self.hits.iter().map(|h| h.damage).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponAttackResolutionCommand {
    pub game_origin_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub player_id: Uuid,
    pub attacker_id: Uuid,
    pub target_id: Uuid,
    pub attack: AttackKind,
    pub resolution: AttackResolution,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    JoinGame(JoinGameCommand),
    UpdatePlayerStatus(UpdatePlayerStatusCommand),
    DeployUnit(DeployUnitCommand),
    MoveUnit(MoveUnitCommand),
    WeaponConfiguration(WeaponConfigurationCommand),
    WeaponAttackDeclaration(WeaponAttackDeclarationCommand),
    PhysicalAttack(PhysicalAttackCommand),
    TurnEnded(TurnEndedCommand),
    RollDice(RollDiceCommand),
    ChangePhase(ChangePhaseCommand),
    ChangeActivePlayer(ChangeActivePlayerCommand),
    TurnIncremented(TurnIncrementedCommand),
    DiceRolled(DiceRolledCommand),
    HeatUpdated(HeatUpdatedCommand),
    WeaponAttackResolution(WeaponAttackResolutionCommand),
}

/// Variant tag of a command; its string form is the wire `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    JoinGame,
    UpdatePlayerStatus,
    DeployUnit,
    MoveUnit,
    WeaponConfiguration,
    WeaponAttackDeclaration,
    PhysicalAttack,
    TurnEnded,
    RollDice,
    ChangePhase,
    ChangeActivePlayer,
    TurnIncremented,
    DiceRolled,
    HeatUpdated,
    WeaponAttackResolution,
}

impl CommandKind {
    pub const ALL: [CommandKind; 15] = [
        CommandKind::JoinGame,
        CommandKind::UpdatePlayerStatus,
        CommandKind::DeployUnit,
        CommandKind::MoveUnit,
        CommandKind::WeaponConfiguration,
        CommandKind::WeaponAttackDeclaration,
        CommandKind::PhysicalAttack,
        CommandKind::TurnEnded,
        CommandKind::RollDice,
        CommandKind::ChangePhase,
        CommandKind::ChangeActivePlayer,
        CommandKind::TurnIncremented,
        CommandKind::DiceRolled,
        CommandKind::HeatUpdated,
        CommandKind::WeaponAttackResolution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::JoinGame => "JoinGame",
            CommandKind::UpdatePlayerStatus => "UpdatePlayerStatus",
            CommandKind::DeployUnit => "DeployUnit",
            CommandKind::MoveUnit => "MoveUnit",
            CommandKind::WeaponConfiguration => "WeaponConfiguration",
            CommandKind::WeaponAttackDeclaration => "WeaponAttackDeclaration",
            CommandKind::PhysicalAttack => "PhysicalAttack",
            CommandKind::TurnEnded => "TurnEnded",
            CommandKind::RollDice => "RollDice",
            CommandKind::ChangePhase => "ChangePhase",
            CommandKind::ChangeActivePlayer => "ChangeActivePlayer",
            CommandKind::TurnIncremented => "TurnIncremented",
            CommandKind::DiceRolled => "DiceRolled",
            CommandKind::HeatUpdated => "HeatUpdated",
            CommandKind::WeaponAttackResolution => "WeaponAttackResolution",
        }
    }
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::JoinGame(_) => CommandKind::JoinGame,
            Command::UpdatePlayerStatus(_) => CommandKind::UpdatePlayerStatus,
            Command::DeployUnit(_) => CommandKind::DeployUnit,
            Command::MoveUnit(_) => CommandKind::MoveUnit,
            Command::WeaponConfiguration(_) => CommandKind::WeaponConfiguration,
            Command::WeaponAttackDeclaration(_) => CommandKind::WeaponAttackDeclaration,
            Command::PhysicalAttack(_) => CommandKind::PhysicalAttack,
            Command::TurnEnded(_) => CommandKind::TurnEnded,
            Command::RollDice(_) => CommandKind::RollDice,
            Command::ChangePhase(_) => CommandKind::ChangePhase,
            Command::ChangeActivePlayer(_) => CommandKind::ChangeActivePlayer,
            Command::TurnIncremented(_) => CommandKind::TurnIncremented,
            Command::DiceRolled(_) => CommandKind::DiceRolled,
            Command::HeatUpdated(_) => CommandKind::HeatUpdated,
            Command::WeaponAttackResolution(_) => CommandKind::WeaponAttackResolution,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn game_origin_id(&self) -> Uuid {
        self.envelope().0
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.envelope().1
    }

    fn envelope(&self) -> (Uuid, DateTime<Utc>) {
        match self {
            Command::JoinGame(c) => (c.game_origin_id, c.timestamp),
            Command::UpdatePlayerStatus(c) => (c.game_origin_id, c.timestamp),
            Command::DeployUnit(c) => (c.game_origin_id, c.timestamp),
            Command::MoveUnit(c) => (c.game_origin_id, c.timestamp),
            Command::WeaponConfiguration(c) => (c.game_origin_id, c.timestamp),
            Command::WeaponAttackDeclaration(c) => (c.game_origin_id, c.timestamp),
            Command::PhysicalAttack(c) => (c.game_origin_id, c.timestamp),
            Command::TurnEnded(c) => (c.game_origin_id, c.timestamp),
            Command::RollDice(c) => (c.game_origin_id, c.timestamp),
            Command::ChangePhase(c) => (c.game_origin_id, c.timestamp),
            Command::ChangeActivePlayer(c) => (c.game_origin_id, c.timestamp),
            Command::TurnIncremented(c) => (c.game_origin_id, c.timestamp),
            Command::DiceRolled(c) => (c.game_origin_id, c.timestamp),
            Command::HeatUpdated(c) => (c.game_origin_id, c.timestamp),
            Command::WeaponAttackResolution(c) => (c.game_origin_id, c.timestamp),
        }
    }

    /// Overwrites the two fields the transport envelope is authoritative for.
    pub fn set_envelope(&mut self, origin_id: Uuid, timestamp: DateTime<Utc>) {
        let (origin, stamp) = match self {
            Command::JoinGame(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::UpdatePlayerStatus(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::DeployUnit(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::MoveUnit(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::WeaponConfiguration(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::WeaponAttackDeclaration(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::PhysicalAttack(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::TurnEnded(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::RollDice(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::ChangePhase(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::ChangeActivePlayer(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::TurnIncremented(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::DiceRolled(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::HeatUpdated(c) => (&mut c.game_origin_id, &mut c.timestamp),
            Command::WeaponAttackResolution(c) => (&mut c.game_origin_id, &mut c.timestamp),
        };
        *origin = origin_id;
        *stamp = timestamp;
    }

    /// Same command re-issued under another origin; the timestamp is kept.
    pub fn with_origin(mut self, origin_id: Uuid) -> Self {
        let timestamp = self.timestamp();
        self.set_envelope(origin_id, timestamp);
        self
    }

    /// The player issuing a client command. Server commands have none.
    pub fn player_id(&self) -> Option<Uuid> {
        match self {
            Command::JoinGame(c) => Some(c.player_id),
            Command::UpdatePlayerStatus(c) => Some(c.player_id),
            Command::DeployUnit(c) => Some(c.player_id),
            Command::MoveUnit(c) => Some(c.player_id),
            Command::WeaponConfiguration(c) => Some(c.player_id),
            Command::WeaponAttackDeclaration(c) => Some(c.player_id),
            Command::PhysicalAttack(c) => Some(c.player_id),
            Command::TurnEnded(c) => Some(c.player_id),
            Command::RollDice(c) => Some(c.player_id),
            Command::ChangePhase(_)
            | Command::ChangeActivePlayer(_)
            | Command::TurnIncremented(_)
            | Command::DiceRolled(_)
            | Command::HeatUpdated(_)
            | Command::WeaponAttackResolution(_) => None,
        }
    }

    /// Serializes the variant's own fields, without the enum tag.
    pub fn payload_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Command::JoinGame(c) => serde_json::to_string(c),
            Command::UpdatePlayerStatus(c) => serde_json::to_string(c),
            Command::DeployUnit(c) => serde_json::to_string(c),
            Command::MoveUnit(c) => serde_json::to_string(c),
            Command::WeaponConfiguration(c) => serde_json::to_string(c),
            Command::WeaponAttackDeclaration(c) => serde_json::to_string(c),
            Command::PhysicalAttack(c) => serde_json::to_string(c),
            Command::TurnEnded(c) => serde_json::to_string(c),
            Command::RollDice(c) => serde_json::to_string(c),
            Command::ChangePhase(c) => serde_json::to_string(c),
            Command::ChangeActivePlayer(c) => serde_json::to_string(c),
            Command::TurnIncremented(c) => serde_json::to_string(c),
            Command::DiceRolled(c) => serde_json::to_string(c),
            Command::HeatUpdated(c) => serde_json::to_string(c),
            Command::WeaponAttackResolution(c) => serde_json::to_string(c),
        }
    }
}
