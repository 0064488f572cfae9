// Client-side replica: mirrors the server's state from its authoritative commands.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::rules::RulesProvider;
use crate::use_cases::commands::Command;
use crate::use_cases::phases::PhaseName;
use crate::use_cases::roster::Roster;

pub struct ClientGame {
    id: Uuid,
    server_id: Uuid,
    phase: PhaseName,
    turn: u32,
    active_player: Option<Uuid>,
    units_to_play: u32,
    initiative_rolls: BTreeMap<Uuid, Vec<u32>>,
    roster: Roster,
}

impl ClientGame {
    pub fn new(id: Uuid, server_id: Uuid, rules: Arc<dyn RulesProvider>) -> Self {
        Self {
            id,
            server_id,
            phase: PhaseName::Start,
            turn: 1,
            active_player: None,
            units_to_play: 0,
            initiative_rolls: BTreeMap::new(),
            roster: Roster::new(rules),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> PhaseName {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn active_player(&self) -> Option<Uuid> {
        self.active_player
    }

    pub fn units_to_play(&self) -> u32 {
        self.units_to_play
    }

    pub fn initiative_rolls(&self, player_id: Uuid) -> &[u32] {
        self.initiative_rolls.get(&player_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Is it `player_id`'s turn to act.
    pub fn can_act(&self, player_id: Uuid) -> bool {
        self.active_player == Some(player_id)
    }

    /// Applies a command if it came from the server; anything else is ignored.
    pub fn apply(&mut self, command: &Command) {
        if command.game_origin_id() != self.server_id {
            debug!(command = command.type_tag(), "ignoring command not issued by the server");
            return;
        }

        match command {
            Command::ChangePhase(change) => {
                if change.phase == PhaseName::Initiative {
                    self.initiative_rolls.clear();
                }
                self.phase = change.phase;
            }
            Command::ChangeActivePlayer(change) => {
                self.active_player = change.player_id;
                self.units_to_play = change.units_to_play;
            }
            Command::TurnIncremented(turn) => self.turn = turn.turn_number,
            Command::DiceRolled(roll) => {
                self.initiative_rolls.entry(roll.player_id).or_default().push(roll.roll);
            }
            _ => {}
        }

        if let Err(e) = self.roster.apply(command) {
            warn!(command = command.type_tag(), error = %e, "replica could not apply server command");
        }
    }
}
