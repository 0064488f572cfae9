// Roster: the owned player/unit aggregate and the single place command effects land.
//
// Server and replica both feed authoritative commands through `Roster::apply`, so
// replaying the same command stream always yields the same units.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::hex::{HexCoordinates, HexPosition};
use crate::domain::movement;
use crate::domain::player::{Player, PlayerStatus};
use crate::domain::rules::RulesProvider;
use crate::domain::units::{PhysicalAttackDeclaration, Unit};
use crate::use_cases::commands::{AttackKind, Command, WeaponConfiguration};

pub struct Roster {
    players: Vec<Player>,
    rules: Arc<dyn RulesProvider>,
}

impl Roster {
    pub fn new(rules: Arc<dyn RulesProvider>) -> Self {
        Self {
            players: Vec::new(),
            rules,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    fn player_mut(&mut self, player_id: Uuid) -> Result<&mut Player, DomainError> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(DomainError::UnknownPlayer(player_id))
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.players.iter().flat_map(|p| p.units.iter())
    }

    pub fn unit(&self, unit_id: Uuid) -> Option<&Unit> {
        self.units().find(|u| u.id == unit_id)
    }

    fn unit_mut(&mut self, unit_id: Uuid) -> Result<&mut Unit, DomainError> {
        self.players
            .iter_mut()
            .flat_map(|p| p.units.iter_mut())
            .find(|u| u.id == unit_id)
            .ok_or(DomainError::UnknownUnit(unit_id))
    }

    /// The unit if it exists and belongs to `player_id`.
    pub fn owned_unit(&self, player_id: Uuid, unit_id: Uuid) -> Option<&Unit> {
        self.player(player_id).and_then(|p| p.unit(unit_id))
    }

    pub fn owner_of(&self, unit_id: Uuid) -> Option<Uuid> {
        self.players
            .iter()
            .find(|p| p.unit(unit_id).is_some())
            .map(|p| p.id)
    }

    /// Surviving unit standing on `coordinates`, if any.
    pub fn unit_at(&self, coordinates: HexCoordinates) -> Option<&Unit> {
        self.units().find(|u| {
            !u.is_destroyed() && u.position.is_some_and(|p| p.coordinates == coordinates)
        })
    }

    pub fn all_playing(&self) -> bool {
        !self.players.is_empty()
            && self
                .players
                .iter()
                .all(|p| p.status == PlayerStatus::Playing)
    }

    /// Applies the effect of an authoritative command. Commands with no roster effect are accepted as no-ops.
    pub fn apply(&mut self, command: &Command) -> Result<(), DomainError> {
        match command {
            Command::JoinGame(join) => {
                if self.player(join.player_id).is_some() {
                    debug!(player_id = %join.player_id, "player already joined");
                    return Ok(());
                }
                let mut player = Player::new(join.player_id, join.player_name.clone(), join.tint.clone());
                for data in &join.units {
                    match Unit::from_data(data, self.rules.as_ref()) {
                        Ok(mut unit) => {
                            unit.owner_id = Some(player.id);
                            player.units.push(unit);
                        }
                        Err(e) => {
                            warn!(player_id = %player.id, unit_id = %data.id, error = %e, "dropping invalid unit template");
                        }
                    }
                }
                self.players.push(player);
            }
            Command::UpdatePlayerStatus(update) => {
                self.player_mut(update.player_id)?.status = update.player_status;
            }
            Command::DeployUnit(deploy) => {
                let unit = self.unit_mut(deploy.unit_id)?;
                unit.deploy(HexPosition::new(deploy.position, deploy.direction));
            }
            Command::MoveUnit(mv) => {
                let unit = self.unit_mut(mv.unit_id)?;
                let start = unit.position.ok_or(DomainError::UnitNotDeployed(unit.id))?;
                let summary = movement::summarize(start, mv.movement_type, &mv.movement_path);
                unit.move_to(summary.final_position, mv.movement_type, summary.hexes_moved);
            }
            Command::WeaponConfiguration(config) => {
                let unit = self.unit_mut(config.unit_id)?;
                match config.configuration {
                    WeaponConfiguration::TorsoRotation { direction } => {
                        unit.rotate_torso(direction);
                    }
                }
            }
            Command::WeaponAttackDeclaration(declaration) => {
                self.unit_mut(declaration.unit_id)?
                    .declare_weapon_attack(declaration.weapon_targets.clone());
            }
            Command::PhysicalAttack(attack) => {
                self.unit_mut(attack.attacker_id)?
                    .declare_physical_attack(Some(PhysicalAttackDeclaration {
                        target_id: attack.target_id,
                        attack_type: attack.attack_type,
                    }));
            }
            Command::HeatUpdated(heat) => {
                self.unit_mut(heat.unit_id)?.apply_heat(&heat.heat_data);
            }
            Command::WeaponAttackResolution(result) => {
                if let AttackKind::Weapon { mount } = result.attack {
                    self.unit_mut(result.attacker_id)?.fire_weapon(mount)?;
                }
                let direction = result.resolution.hit_direction;
                let target = self.unit_mut(result.target_id)?;
                for hit in &result.resolution.hits {
                    target.apply_damage(hit.location, hit.damage, direction);
                }
            }
            Command::TurnIncremented(_) => {
                for player in &mut self.players {
                    for unit in &mut player.units {
                        unit.reset_turn_state();
                    }
                    if player.status == PlayerStatus::Playing && player.surviving_units().next().is_none() {
                        player.status = PlayerStatus::Defeated;
                    }
                }
            }
            Command::TurnEnded(_)
            | Command::RollDice(_)
            | Command::ChangePhase(_)
            | Command::ChangeActivePlayer(_)
            | Command::DiceRolled(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hex::HexDirection;
    use crate::domain::rules::ClassicRules;
    use crate::domain::units::{ArmorData, UnitData};
    use crate::use_cases::commands::{DeployUnitCommand, JoinGameCommand, UpdatePlayerStatusCommand};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn template(mass: u32) -> UnitData {
        UnitData {
            id: Uuid::new_v4(),
            chassis: "Locust".to_string(),
            model: "LCT-1V".to_string(),
            mass,
            walk_mp: 8,
            engine_rating: 160,
            engine_type: "Fusion".to_string(),
            pilot: Default::default(),
            armor: BTreeMap::from([("CT".to_string(), ArmorData { front: 10, rear: 2 })]),
            equipment: BTreeMap::new(),
        }
    }

    fn join(player_id: Uuid, units: Vec<UnitData>) -> Command {
        Command::JoinGame(JoinGameCommand {
            game_origin_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            player_id,
            player_name: "Natasha".to_string(),
            tint: "#aa0000".to_string(),
            units,
        })
    }

    #[test]
    fn join_builds_units_and_drops_bad_templates() {
        let mut roster = Roster::new(Arc::new(ClassicRules));
        let player_id = Uuid::new_v4();
        roster
            .apply(&join(player_id, vec![template(20), template(21)]))
            .expect("join applies");

        let player = roster.player(player_id).expect("player registered");
        assert_eq!(player.status, PlayerStatus::Joining);
        assert_eq!(player.units.len(), 1);
        assert_eq!(player.units[0].owner_id, Some(player_id));

        // A second join for the same player changes nothing.
        roster.apply(&join(player_id, vec![template(20)])).expect("join applies");
        assert_eq!(roster.players().len(), 1);
        assert_eq!(roster.player(player_id).map(|p| p.units.len()), Some(1));
    }

    #[test]
    fn unknown_references_are_reported() {
        let mut roster = Roster::new(Arc::new(ClassicRules));
        let stranger = Uuid::new_v4();
        let status = Command::UpdatePlayerStatus(UpdatePlayerStatusCommand {
            game_origin_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            player_id: stranger,
            player_status: PlayerStatus::Playing,
        });
        assert_eq!(roster.apply(&status), Err(DomainError::UnknownPlayer(stranger)));

        let ghost = Uuid::new_v4();
        let deploy = Command::DeployUnit(DeployUnitCommand {
            game_origin_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            player_id: stranger,
            unit_id: ghost,
            position: HexCoordinates::new(1, 1),
            direction: HexDirection::Top,
        });
        assert_eq!(roster.apply(&deploy), Err(DomainError::UnknownUnit(ghost)));
    }

    #[test]
    fn all_playing_requires_someone_to_play() {
        let mut roster = Roster::new(Arc::new(ClassicRules));
        assert!(!roster.all_playing());
        let player_id = Uuid::new_v4();
        roster.apply(&join(player_id, vec![])).expect("join applies");
        assert!(!roster.all_playing());
        roster
            .apply(&Command::UpdatePlayerStatus(UpdatePlayerStatusCommand {
                game_origin_id: Uuid::new_v4(),
                timestamp: Utc::now(),
                player_id,
                player_status: PlayerStatus::Playing,
            }))
            .expect("status applies");
        assert!(roster.all_playing());
    }
}
