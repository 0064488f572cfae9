mod support;

use battle_server::domain::hex::{HexCoordinates, HexDirection, HexPosition};
use battle_server::domain::map::BattleMap;
use battle_server::domain::ScriptedDice;
use battle_server::domain::rules::{ClassicRules, PhysicalAttackType};
use battle_server::domain::units::{ArmorData, MovementType, UnitData, WeaponTarget};
use battle_server::use_cases::commands::{AttackKind, PhysicalAttackCommand};
use battle_server::use_cases::{ClientGame, Command, PhaseName, RecordingPublisher, RuleOptions, ServerGame};
use chrono::Utc;
use std::sync::Arc;
use support::{TestClient, light_mech};
use uuid::Uuid;

struct Match {
    game: ServerGame,
    recorder: Arc<RecordingPublisher>,
    replica: ClientGame,
    a: TestClient,
    b: TestClient,
    a_unit: Uuid,
    b_unit: Uuid,
}

impl Match {
    fn new(script: Vec<u8>) -> Self {
        Self::with_options(script, RuleOptions::default())
    }

    fn with_options(script: Vec<u8>, options: RuleOptions) -> Self {
        Self::with_units(script, options, light_mech("Commando"), light_mech("Locust"))
    }

    fn with_units(script: Vec<u8>, options: RuleOptions, a_data: UnitData, b_data: UnitData) -> Self {
        let recorder = Arc::new(RecordingPublisher::new());
        let mut game = ServerGame::new(
            recorder.clone(),
            Box::new(ScriptedDice::new(script)),
            Arc::new(ClassicRules),
            options,
        );
        game.set_battle_map(BattleMap::clear(15, 17));
        let replica = ClientGame::new(Uuid::new_v4(), game.id(), Arc::new(ClassicRules));

        let (a_unit, b_unit) = (a_data.id, b_data.id);
        let (a, b) = (TestClient::new(), TestClient::new());
        game.handle_command(&a.join("Alice", vec![a_data]));
        game.handle_command(&b.join("Bob", vec![b_data]));

        Self {
            game,
            recorder,
            replica,
            a,
            b,
            a_unit,
            b_unit,
        }
    }

    fn send(&mut self, command: Command) {
        self.game.handle_command(&command);
        self.sync();
    }

    // Feeds everything the server broadcast so far into the replica.
    fn sync(&mut self) {
        for command in self.recorder.drain() {
            self.replica.apply(&command);
        }
    }

    fn ready_and_deploy(&mut self) {
        self.ready_and_deploy_at(HexCoordinates::new(4, 4), HexCoordinates::new(4, 8));
    }

    fn ready_and_deploy_at(&mut self, a_at: HexCoordinates, b_at: HexCoordinates) {
        self.send(self.a.ready());
        self.send(self.b.ready());
        assert_eq!(self.game.phase(), PhaseName::Deployment);
        self.send(self.a.deploy(self.a_unit, a_at, HexDirection::Bottom));
        self.send(self.b.deploy(self.b_unit, b_at, HexDirection::Top));
    }

    fn assert_replica_in_sync(&self) {
        assert_eq!(self.replica.phase(), self.game.phase());
        assert_eq!(self.replica.turn(), self.game.turn());
        assert_eq!(self.replica.active_player(), self.game.active_player());
        assert_eq!(self.replica.roster().players(), self.game.roster().players());
    }
}

#[test]
fn when_all_players_ready_then_start_waits_for_the_map() {
    let recorder = Arc::new(RecordingPublisher::new());
    let mut game = ServerGame::new(
        recorder.clone(),
        Box::new(ScriptedDice::new(vec![1, 2])),
        Arc::new(ClassicRules),
        RuleOptions::default(),
    );
    let player = TestClient::new();
    game.handle_command(&player.join("Solo", vec![light_mech("Wasp")]));
    game.handle_command(&player.ready());
    assert_eq!(game.phase(), PhaseName::Start);

    game.set_battle_map(BattleMap::clear(15, 17));
    assert_eq!(game.phase(), PhaseName::Deployment);
    assert_eq!(game.active_player(), Some(player.player_id));
}

#[test]
fn when_one_player_is_not_ready_then_the_game_stays_in_start() {
    let mut m = Match::new(vec![1, 2, 3, 4]);
    m.send(m.a.ready());
    assert_eq!(m.game.phase(), PhaseName::Start);

    // Joining twice does not add a second player.
    m.send(m.a.join("Alice again", vec![light_mech("Jenner")]));
    assert_eq!(m.game.roster().players().len(), 2);
}

#[test]
fn when_inactive_player_acts_then_the_command_is_ignored() {
    let mut m = Match::new(vec![1, 2, 3, 4]);
    m.send(m.a.ready());
    m.send(m.b.ready());
    assert_eq!(m.game.active_player(), Some(m.a.player_id));

    m.send(m.b.deploy(m.b_unit, HexCoordinates::new(4, 8), HexDirection::Top));
    let b_unit = m.game.roster().unit(m.b_unit).expect("unit exists");
    assert!(!b_unit.is_deployed());
    assert_eq!(m.game.phase(), PhaseName::Deployment);
    assert_eq!(m.game.active_player(), Some(m.a.player_id));
}

#[test]
fn when_deploying_onto_an_occupied_hex_then_the_unit_stays_off_the_map() {
    let mut m = Match::new(vec![1, 2, 3, 4]);
    m.send(m.a.ready());
    m.send(m.b.ready());
    m.send(m.a.deploy(m.a_unit, HexCoordinates::new(4, 4), HexDirection::Bottom));
    m.send(m.b.deploy(m.b_unit, HexCoordinates::new(4, 4), HexDirection::Top));

    assert!(!m.game.roster().unit(m.b_unit).expect("unit exists").is_deployed());
    assert_eq!(m.game.phase(), PhaseName::Deployment);
    assert_eq!(m.game.active_player(), Some(m.b.player_id));
}

#[test]
fn when_initiative_ties_then_tied_players_roll_again() {
    let mut m = Match::new(vec![3, 4, 3, 4, 1, 1, 6, 6]);
    m.ready_and_deploy();
    assert_eq!(m.game.phase(), PhaseName::Initiative);

    m.send(m.a.roll());
    // A second roll before everyone rolled is ignored.
    m.send(m.a.roll());
    m.send(m.b.roll());
    assert_eq!(m.game.phase(), PhaseName::Initiative);

    m.send(m.a.roll());
    m.send(m.b.roll());
    assert_eq!(m.game.phase(), PhaseName::Movement);
    assert_eq!(m.game.initiative_order(), &[m.a.player_id, m.b.player_id]);
    assert_eq!(m.replica.initiative_rolls(m.a.player_id), &[7, 2]);
    assert_eq!(m.replica.initiative_rolls(m.b.player_id), &[7, 12]);
}

#[test]
fn when_a_full_turn_is_played_then_the_replica_matches_the_server() {
    let mut m = Match::new(vec![1, 2, 3, 4, 5, 6]);
    m.ready_and_deploy();
    m.assert_replica_in_sync();

    // A rolls 3 and B rolls 7: A lost initiative and moves first.
    m.send(m.a.roll());
    m.send(m.b.roll());
    assert_eq!(m.game.phase(), PhaseName::Movement);
    assert_eq!(m.game.initiative_order(), &[m.a.player_id, m.b.player_id]);
    assert!(m.replica.can_act(m.a.player_id));

    m.send(m.b.move_unit(m.b_unit, MovementType::StandingStill, Vec::new()));
    assert!(!m.game.roster().unit(m.b_unit).expect("unit exists").has_moved());

    let start = HexCoordinates::new(4, 4);
    let step = HexPosition::new(start.neighbor(HexDirection::Bottom), HexDirection::Bottom);
    m.send(m.a.move_unit(m.a_unit, MovementType::Walk, vec![step]));
    assert_eq!(m.game.active_player(), Some(m.b.player_id));
    m.send(m.b.move_unit(m.b_unit, MovementType::StandingStill, Vec::new()));
    assert_eq!(m.game.phase(), PhaseName::WeaponsAttack);

    let a_position = m.game.roster().unit(m.a_unit).and_then(|u| u.position);
    assert_eq!(a_position, Some(step));

    let mount_of = |game: &ServerGame, unit_id: Uuid| {
        game.roster()
            .unit(unit_id)
            .and_then(|u| u.weapons().next().map(|(mount, _, _)| mount))
            .expect("unit carries a weapon")
    };
    let (a_mount, b_mount) = (mount_of(&m.game, m.a_unit), mount_of(&m.game, m.b_unit));

    m.send(m.a.declare(
        m.a_unit,
        vec![WeaponTarget {
            weapon: a_mount,
            target_id: m.b_unit,
            is_primary_target: true,
        }],
    ));
    m.game.handle_command(&m.b.declare(
        m.b_unit,
        vec![WeaponTarget {
            weapon: b_mount,
            target_id: m.a_unit,
            is_primary_target: true,
        }],
    ));

    // Resolution and heat run on their own; the game waits for players to end the turn.
    assert_eq!(m.game.phase(), PhaseName::End);
    let broadcast = m.recorder.published();
    let resolutions = broadcast
        .iter()
        .filter(|c| matches!(c, Command::WeaponAttackResolution(_)))
        .count();
    let heat_updates = broadcast
        .iter()
        .filter(|c| matches!(c, Command::HeatUpdated(_)))
        .count();
    assert_eq!(resolutions, 2);
    assert_eq!(heat_updates, 2);
    assert!(broadcast.iter().all(|c| c.game_origin_id() == m.game.id()));
    m.sync();
    m.assert_replica_in_sync();

    m.send(m.a.end_turn());
    assert_eq!(m.game.phase(), PhaseName::End);
    m.send(m.b.end_turn());
    assert_eq!(m.game.turn(), 2);
    assert_eq!(m.game.phase(), PhaseName::Initiative);
    m.assert_replica_in_sync();

    // Turn state is cleared for the next round.
    let a_unit = m.game.roster().unit(m.a_unit).expect("unit exists");
    assert!(!a_unit.has_moved());
    assert!(!a_unit.weapons_declared);
}

// Three PPCs and a medium laser: an alpha strike after walking lands exactly on the shutdown line.
fn hot_mech() -> UnitData {
    let mut data = light_mech("Firestarter");
    data.equipment.insert(
        "RA".to_string(),
        vec!["PPC".to_string(), "PPC".to_string(), "PPC".to_string(), "Medium Laser".to_string()],
    );
    data
}

fn armored_mech() -> UnitData {
    let mut data = light_mech("Atlas");
    for armor in data.armor.values_mut() {
        *armor = ArmorData { front: 200, rear: 200 };
    }
    data
}

// Rolls until initiative resolves; the script may produce ties.
fn roll_initiative(m: &mut Match) {
    while m.game.phase() == PhaseName::Initiative {
        m.send(m.a.roll());
        m.send(m.b.roll());
    }
}

#[test]
fn when_a_unit_overheats_then_it_sits_out_the_next_turn_and_restarts_once_cooled() {
    let mut m = Match::with_units(
        vec![1, 2, 3, 4, 5, 6],
        RuleOptions::default(),
        hot_mech(),
        armored_mech(),
    );
    m.ready_and_deploy();
    roll_initiative(&mut m);
    assert_eq!(m.game.phase(), PhaseName::Movement);

    let step = HexPosition::new(HexCoordinates::new(4, 4).neighbor(HexDirection::Bottom), HexDirection::Bottom);
    m.send(m.a.move_unit(m.a_unit, MovementType::Walk, vec![step]));
    m.send(m.b.move_unit(m.b_unit, MovementType::StandingStill, Vec::new()));
    assert_eq!(m.game.phase(), PhaseName::WeaponsAttack);

    let alpha: Vec<_> = m
        .game
        .roster()
        .unit(m.a_unit)
        .expect("unit exists")
        .weapons()
        .map(|(mount, _, _)| WeaponTarget {
            weapon: mount,
            target_id: m.b_unit,
            is_primary_target: true,
        })
        .collect();
    assert_eq!(alpha.len(), 4);
    for _ in 0..2 {
        if m.game.active_player() == Some(m.a.player_id) {
            m.send(m.a.declare(m.a_unit, alpha.clone()));
        } else {
            m.send(m.b.declare(m.b_unit, Vec::new()));
        }
    }
    assert_eq!(m.game.phase(), PhaseName::End);

    // 33 weapon heat plus 1 for walking, less 4 engine sinks.
    let hot = m.game.roster().unit(m.a_unit).expect("unit exists");
    assert_eq!(hot.heat, 30);
    assert!(hot.is_shutdown());
    assert!(!hot.is_destroyed());

    m.send(m.a.end_turn());
    m.send(m.b.end_turn());
    assert_eq!(m.game.turn(), 2);
    // A shut-down unit still counts as surviving, so its player rolls.
    roll_initiative(&mut m);
    assert_eq!(m.game.phase(), PhaseName::Movement);

    // The server stood the shut-down unit still on its own and only B moves.
    let idle = m.game.roster().unit(m.a_unit).expect("unit exists");
    assert_eq!(idle.movement_type_used, Some(MovementType::StandingStill));
    assert_eq!(idle.position, Some(step));
    assert_eq!(m.game.active_player(), Some(m.b.player_id));
    assert_eq!(m.replica.units_to_play(), 1);
    assert!(!m.replica.can_act(m.a.player_id));

    // Orders for the shut-down unit are ignored.
    let ahead = HexPosition::new(step.coordinates.neighbor(HexDirection::Bottom), HexDirection::Bottom);
    m.send(m.a.move_unit(m.a_unit, MovementType::Walk, vec![ahead]));
    assert_eq!(m.game.phase(), PhaseName::Movement);

    m.send(m.b.move_unit(m.b_unit, MovementType::StandingStill, Vec::new()));
    assert_eq!(m.game.phase(), PhaseName::WeaponsAttack);
    assert_eq!(m.game.active_player(), Some(m.b.player_id));
    m.send(m.b.declare(m.b_unit, Vec::new()));
    assert_eq!(m.game.phase(), PhaseName::End);

    let cooled = m.game.roster().unit(m.a_unit).expect("unit exists");
    assert_eq!(cooled.heat, 26);
    assert!(!cooled.is_shutdown());
    assert!(cooled.is_operational());
    m.assert_replica_in_sync();
}

#[test]
fn when_physical_attacks_are_enabled_then_punches_resolve_with_the_weapons() {
    let mut m = Match::with_options(vec![1, 2, 3, 4, 5, 6], RuleOptions { physical_attacks: true });
    let a_at = HexCoordinates::new(4, 4);
    m.ready_and_deploy_at(a_at, a_at.neighbor(HexDirection::Bottom));
    m.send(m.a.roll());
    m.send(m.b.roll());

    m.send(m.a.move_unit(m.a_unit, MovementType::StandingStill, Vec::new()));
    m.send(m.b.move_unit(m.b_unit, MovementType::StandingStill, Vec::new()));
    assert_eq!(m.game.phase(), PhaseName::PhysicalAttack);

    m.send(Command::PhysicalAttack(PhysicalAttackCommand {
        game_origin_id: m.a.origin,
        timestamp: Utc::now(),
        player_id: m.a.player_id,
        attacker_id: m.a_unit,
        target_id: m.b_unit,
        attack_type: PhysicalAttackType::Punch,
    }));
    assert_eq!(m.game.active_player(), Some(m.b.player_id));
    m.send(m.b.end_turn());
    assert_eq!(m.game.phase(), PhaseName::WeaponsAttack);

    m.send(m.a.declare(m.a_unit, Vec::new()));
    m.game.handle_command(&m.b.declare(m.b_unit, Vec::new()));
    assert_eq!(m.game.phase(), PhaseName::End);

    let physical: Vec<_> = m
        .recorder
        .published()
        .into_iter()
        .filter_map(|c| match c {
            Command::WeaponAttackResolution(result) => Some(result),
            _ => None,
        })
        .collect();
    assert_eq!(physical.len(), 1);
    assert_eq!(physical[0].attacker_id, m.a_unit);
    assert_eq!(
        physical[0].attack,
        AttackKind::Physical {
            attack_type: PhysicalAttackType::Punch
        }
    );
    m.sync();
    m.assert_replica_in_sync();
}
