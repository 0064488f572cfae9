// Authoritative game: phase state machine driven by one command stream.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::dice::DiceSource;
use crate::domain::map::BattleMap;
use crate::domain::rules::RulesProvider;
use crate::domain::to_hit::ToHitCalculator;
use crate::use_cases::commands::{ChangeActivePlayerCommand, ChangePhaseCommand, Command};
use crate::use_cases::phases::{Phase, PhaseName, PhaseOutcome, RuleOptions, StartPhase, next_phase};
use crate::use_cases::publisher::CommandPublisher;
use crate::use_cases::roster::Roster;

/// Everything a phase may read or change while handling a command.
pub struct GameContext {
    pub(crate) id: Uuid,
    pub(crate) roster: Roster,
    pub(crate) map: Option<BattleMap>,
    pub(crate) turn: u32,
    pub(crate) initiative_order: Vec<Uuid>,
    pub(crate) active_player: Option<Uuid>,
    pub(crate) options: RuleOptions,
    pub(crate) calculator: ToHitCalculator,
    pub(crate) dice: Box<dyn DiceSource>,
    publisher: Arc<dyn CommandPublisher>,
}

impl GameContext {
    pub(crate) fn stamp(&self) -> (Uuid, DateTime<Utc>) {
        (self.id, Utc::now())
    }

    /// Applies an authoritative command locally and broadcasts it.
    pub(crate) fn commit(&mut self, command: Command) -> bool {
        if let Err(e) = self.roster.apply(&command) {
            error!(command = command.type_tag(), error = %e, "failed to apply command");
            return false;
        }
        self.publisher.publish_command(&command);
        true
    }

    /// Re-issues an accepted client command under the server's origin.
    pub(crate) fn accept(&mut self, command: &Command) -> bool {
        let command = command.clone().with_origin(self.id);
        self.commit(command)
    }

    pub(crate) fn set_active_player(&mut self, player_id: Option<Uuid>, units_to_play: u32) {
        self.active_player = player_id;
        let (game_origin_id, timestamp) = self.stamp();
        self.commit(Command::ChangeActivePlayer(ChangeActivePlayerCommand {
            game_origin_id,
            timestamp,
            player_id,
            units_to_play,
        }));
    }

    pub(crate) fn roll_2d6(&mut self) -> [u8; 2] {
        self.dice.roll_2d6()
    }
}

pub struct ServerGame {
    phase: Phase,
    ctx: GameContext,
}

impl ServerGame {
    pub fn new(
        publisher: Arc<dyn CommandPublisher>,
        dice: Box<dyn DiceSource>,
        rules: Arc<dyn RulesProvider>,
        options: RuleOptions,
    ) -> Self {
        Self {
            phase: Phase::new(PhaseName::Start),
            ctx: GameContext {
                id: Uuid::new_v4(),
                roster: Roster::new(rules.clone()),
                map: None,
                turn: 1,
                initiative_order: Vec::new(),
                active_player: None,
                options,
                calculator: ToHitCalculator::new(rules),
                dice,
                publisher,
            },
        }
    }

    pub fn id(&self) -> Uuid {
        self.ctx.id
    }

    pub fn phase(&self) -> PhaseName {
        self.phase.name()
    }

    pub fn turn(&self) -> u32 {
        self.ctx.turn
    }

    pub fn roster(&self) -> &Roster {
        &self.ctx.roster
    }

    pub fn active_player(&self) -> Option<Uuid> {
        self.ctx.active_player
    }

    pub fn initiative_order(&self) -> &[Uuid] {
        &self.ctx.initiative_order
    }

    pub fn battle_map(&self) -> Option<&BattleMap> {
        self.ctx.map.as_ref()
    }

    /// Installs the map; the match may start right away if everyone is ready.
    pub fn set_battle_map(&mut self, map: BattleMap) {
        info!(width = map.width, height = map.height, "battle map set");
        self.ctx.map = Some(map);
        if self.phase.name() == PhaseName::Start && StartPhase::gate(&self.ctx) == PhaseOutcome::Advance {
            self.advance();
        }
    }

    pub fn handle_command(&mut self, command: &Command) {
        if command.game_origin_id() == self.ctx.id {
            debug!(command = command.type_tag(), "ignoring own command");
            return;
        }
        if let (Some(active), Some(sender)) = (self.ctx.active_player, command.player_id()) {
            if active != sender {
                debug!(
                    command = command.type_tag(),
                    player_id = %sender,
                    active_player = %active,
                    "command from inactive player ignored"
                );
                return;
            }
        }

        match self.phase.handle(&mut self.ctx, command) {
            Some(PhaseOutcome::Advance) => self.advance(),
            Some(PhaseOutcome::Stay) => {}
            None => debug!(
                command = command.type_tag(),
                phase = ?self.phase.name(),
                "command not accepted in this phase"
            ),
        }
    }

    // Automatic phases finish inside `enter`, so keep going until one waits for input.
    fn advance(&mut self) {
        loop {
            let next = next_phase(self.phase.name(), &self.ctx.options);
            self.phase = Phase::new(next);
            info!(phase = ?next, turn = self.ctx.turn, "phase changed");
            let (game_origin_id, timestamp) = self.ctx.stamp();
            self.ctx.commit(Command::ChangePhase(ChangePhaseCommand {
                game_origin_id,
                timestamp,
                phase: next,
            }));
            if self.phase.enter(&mut self.ctx) == PhaseOutcome::Stay {
                break;
            }
        }
    }
}

/// Owns the game and feeds it commands until shutdown; hands the game back for inspection.
pub async fn game_task(
    mut game: ServerGame,
    mut commands: mpsc::Receiver<Command>,
    shutdown: Arc<Notify>,
) -> ServerGame {
    info!(game_id = %game.id(), "game task started");
    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            received = commands.recv() => match received {
                Some(command) => game.handle_command(&command),
                None => break,
            },
        }
    }
    info!(game_id = %game.id(), phase = ?game.phase(), turn = game.turn(), "game task stopped");
    game
}
