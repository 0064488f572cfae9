// Phase state machine: one variant per phase, one transition function.

pub mod deployment;
pub mod end;
pub mod heat;
pub mod initiative;
pub mod movement;
pub mod physical;
pub mod resolution;
pub mod start;
pub mod weapons;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::units::Unit;
use crate::use_cases::commands::Command;
use crate::use_cases::game::GameContext;
use crate::use_cases::turn_order::{TurnOrder, build_turn_order};

pub use deployment::DeploymentPhase;
pub use end::EndPhase;
pub use heat::HeatPhase;
pub use initiative::InitiativePhase;
pub use movement::MovementPhase;
pub use physical::PhysicalAttackPhase;
pub use resolution::ResolutionPhase;
pub use start::StartPhase;
pub use weapons::WeaponsAttackPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseName {
    Start,
    Deployment,
    Initiative,
    Movement,
    PhysicalAttack,
    WeaponsAttack,
    WeaponAttackResolution,
    Heat,
    End,
}

/// Optional rules switched on per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleOptions {
    pub physical_attacks: bool,
}

pub fn next_phase(current: PhaseName, options: &RuleOptions) -> PhaseName {
    match current {
        PhaseName::Start => PhaseName::Deployment,
        PhaseName::Deployment => PhaseName::Initiative,
        PhaseName::Initiative => PhaseName::Movement,
        PhaseName::Movement if options.physical_attacks => PhaseName::PhysicalAttack,
        PhaseName::Movement => PhaseName::WeaponsAttack,
        PhaseName::PhysicalAttack => PhaseName::WeaponsAttack,
        PhaseName::WeaponsAttack => PhaseName::WeaponAttackResolution,
        PhaseName::WeaponAttackResolution => PhaseName::Heat,
        PhaseName::Heat => PhaseName::End,
        PhaseName::End => PhaseName::Initiative,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Stay,
    Advance,
}

#[derive(Debug)]
pub enum Phase {
    Start(StartPhase),
    Deployment(DeploymentPhase),
    Initiative(InitiativePhase),
    Movement(MovementPhase),
    PhysicalAttack(PhysicalAttackPhase),
    WeaponsAttack(WeaponsAttackPhase),
    WeaponAttackResolution(ResolutionPhase),
    Heat(HeatPhase),
    End(EndPhase),
}

impl Phase {
    pub fn new(name: PhaseName) -> Self {
        match name {
            PhaseName::Start => Phase::Start(StartPhase),
            PhaseName::Deployment => Phase::Deployment(DeploymentPhase),
            PhaseName::Initiative => Phase::Initiative(InitiativePhase::default()),
            PhaseName::Movement => Phase::Movement(MovementPhase::default()),
            PhaseName::PhysicalAttack => Phase::PhysicalAttack(PhysicalAttackPhase::default()),
            PhaseName::WeaponsAttack => Phase::WeaponsAttack(WeaponsAttackPhase::default()),
            PhaseName::WeaponAttackResolution => Phase::WeaponAttackResolution(ResolutionPhase),
            PhaseName::Heat => Phase::Heat(HeatPhase),
            PhaseName::End => Phase::End(EndPhase::default()),
        }
    }

    pub fn name(&self) -> PhaseName {
        match self {
            Phase::Start(_) => PhaseName::Start,
            Phase::Deployment(_) => PhaseName::Deployment,
            Phase::Initiative(_) => PhaseName::Initiative,
            Phase::Movement(_) => PhaseName::Movement,
            Phase::PhysicalAttack(_) => PhaseName::PhysicalAttack,
            Phase::WeaponsAttack(_) => PhaseName::WeaponsAttack,
            Phase::WeaponAttackResolution(_) => PhaseName::WeaponAttackResolution,
            Phase::Heat(_) => PhaseName::Heat,
            Phase::End(_) => PhaseName::End,
        }
    }

    /// Runs on entry; automatic phases do all their work here and advance.
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        match self {
            Phase::Start(_) => StartPhase::gate(ctx),
            Phase::Deployment(phase) => phase.enter(ctx),
            Phase::Initiative(phase) => phase.enter(ctx),
            Phase::Movement(phase) => phase.enter(ctx),
            Phase::PhysicalAttack(phase) => phase.enter(ctx),
            Phase::WeaponsAttack(phase) => phase.enter(ctx),
            Phase::WeaponAttackResolution(phase) => phase.enter(ctx),
            Phase::Heat(phase) => phase.enter(ctx),
            Phase::End(phase) => phase.enter(ctx),
        }
    }

    /// `None` when the command is not legal in this phase.
    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        match self {
            Phase::Start(phase) => phase.handle(ctx, command),
            Phase::Deployment(phase) => phase.handle(ctx, command),
            Phase::Initiative(phase) => phase.handle(ctx, command),
            Phase::Movement(phase) => phase.handle(ctx, command),
            Phase::PhysicalAttack(phase) => phase.handle(ctx, command),
            Phase::WeaponsAttack(phase) => phase.handle(ctx, command),
            Phase::WeaponAttackResolution(_) | Phase::Heat(_) => None,
            Phase::End(phase) => phase.handle(ctx, command),
        }
    }
}

/// Which units may still act in a turn-ordered phase.
pub(crate) type Eligibility = fn(&Unit) -> bool;

fn eligible_count(ctx: &GameContext, player_id: uuid::Uuid, eligible: Eligibility) -> u32 {
    ctx.roster
        .player(player_id)
        .map_or(0, |p| p.units.iter().filter(|u| eligible(u)).count() as u32)
}

pub(crate) fn build_order(ctx: &GameContext, eligible: Eligibility) -> TurnOrder {
    let counts: BTreeMap<uuid::Uuid, u32> = ctx
        .roster
        .players()
        .iter()
        .map(|p| (p.id, eligible_count(ctx, p.id, eligible)))
        .collect();
    TurnOrder::new(build_turn_order(&ctx.initiative_order, &counts))
}

/// Activates the next step whose player still has units to act with.
pub(crate) fn activate_step(
    order: &mut TurnOrder,
    ctx: &mut GameContext,
    eligible: Eligibility,
) -> PhaseOutcome {
    while let Some(step) = order.current() {
        let remaining = eligible_count(ctx, step.player_id, eligible);
        if remaining > 0 {
            ctx.set_active_player(Some(step.player_id), step.units_to_play.min(remaining));
            return PhaseOutcome::Stay;
        }
        order.advance();
    }
    ctx.set_active_player(None, 0);
    PhaseOutcome::Advance
}

/// Books one unit as played and moves on once the step is used up.
pub(crate) fn finish_play(
    order: &mut TurnOrder,
    ctx: &mut GameContext,
    eligible: Eligibility,
) -> PhaseOutcome {
    let step_done = order.record_play();
    let player_left = order
        .current()
        .is_some_and(|step| eligible_count(ctx, step.player_id, eligible) > 0);
    if step_done || !player_left {
        order.advance();
        activate_step(order, ctx, eligible)
    } else {
        PhaseOutcome::Stay
    }
}
