// Shared fixtures for integration tests: unit templates, client commands and a live server.
#![allow(dead_code)]

use battle_server::domain::hex::{HexCoordinates, HexDirection, HexPosition};
use battle_server::domain::player::PlayerStatus;
use battle_server::domain::units::{ArmorData, MovementType, UnitData, WeaponTarget};
use battle_server::use_cases::commands::{
    Command, DeployUnitCommand, JoinGameCommand, MoveUnitCommand, RollDiceCommand, TurnEndedCommand,
    UpdatePlayerStatusCommand, WeaponAttackDeclarationCommand,
};
use battle_server::use_cases::phases::RuleOptions;
use battle_server::{BattleServer, ServerSettings};
use chrono::Utc;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use uuid::Uuid;

/// A 20-ton mech with a medium laser in the right arm and armor everywhere.
pub fn light_mech(chassis: &str) -> UnitData {
    let armor = ["HD", "CT", "LT", "RT", "LA", "RA", "LL", "RL"]
        .into_iter()
        .map(|code| (code.to_string(), ArmorData { front: 8, rear: 4 }))
        .collect();
    UnitData {
        id: Uuid::new_v4(),
        chassis: chassis.to_string(),
        model: "TEST-1".to_string(),
        mass: 20,
        walk_mp: 6,
        engine_rating: 120,
        engine_type: "Fusion".to_string(),
        pilot: Default::default(),
        armor,
        equipment: BTreeMap::from([("RA".to_string(), vec!["Medium Laser".to_string()])]),
    }
}

/// One client's view: its own origin id and the player it speaks for.
#[derive(Debug, Clone, Copy)]
pub struct TestClient {
    pub origin: Uuid,
    pub player_id: Uuid,
}

impl TestClient {
    pub fn new() -> Self {
        Self {
            origin: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
        }
    }

    pub fn join(&self, name: &str, units: Vec<UnitData>) -> Command {
        Command::JoinGame(JoinGameCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
            player_name: name.to_string(),
            tint: "#336699".to_string(),
            units,
        })
    }

    pub fn ready(&self) -> Command {
        Command::UpdatePlayerStatus(UpdatePlayerStatusCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
            player_status: PlayerStatus::Playing,
        })
    }

    pub fn deploy(&self, unit_id: Uuid, position: HexCoordinates, direction: HexDirection) -> Command {
        Command::DeployUnit(DeployUnitCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
            unit_id,
            position,
            direction,
        })
    }

    pub fn roll(&self) -> Command {
        Command::RollDice(RollDiceCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
        })
    }

    pub fn move_unit(&self, unit_id: Uuid, movement_type: MovementType, movement_path: Vec<HexPosition>) -> Command {
        Command::MoveUnit(MoveUnitCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
            unit_id,
            movement_type,
            movement_path,
        })
    }

    pub fn declare(&self, unit_id: Uuid, weapon_targets: Vec<WeaponTarget>) -> Command {
        Command::WeaponAttackDeclaration(WeaponAttackDeclarationCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
            unit_id,
            weapon_targets,
        })
    }

    pub fn end_turn(&self) -> Command {
        Command::TurnEnded(TurnEndedCommand {
            game_origin_id: self.origin,
            timestamp: Utc::now(),
            player_id: self.player_id,
        })
    }
}

/// Starts a full server on an ephemeral loopback port and returns it with its hub URL.
pub async fn start_server() -> (BattleServer, String) {
    let settings = ServerSettings {
        bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        map_width: 15,
        map_height: 17,
        dice_seed: Some(42),
        options: RuleOptions::default(),
    };
    let server = battle_server::start(settings).await.expect("server starts");
    let addr = server.local_addr().expect("server has an address");
    (server, format!("ws://{addr}/hub"))
}
