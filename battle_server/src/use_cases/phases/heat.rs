// Heat: movement and weapon heat in, dissipation out, for every unit on the map.

use tracing::{info, warn};

use super::PhaseOutcome;
use crate::domain::heat::{HeatData, MovementHeatSource};
use crate::domain::units::MovementType;
use crate::use_cases::commands::{Command, HeatUpdatedCommand};
use crate::use_cases::game::GameContext;

#[derive(Debug, Default)]
pub struct HeatPhase;

impl HeatPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        let rules = ctx.calculator.rules();
        let mut updates = Vec::new();
        for unit in ctx.roster.units().filter(|u| u.is_deployed() && !u.is_destroyed()) {
            let movement_type = unit.movement_type_used.unwrap_or(MovementType::StandingStill);
            let heat_data = HeatData {
                movement_heat_sources: vec![MovementHeatSource {
                    movement_type,
                    hexes_moved: unit.distance_covered,
                    heat: rules.movement_heat(movement_type, unit.distance_covered),
                }],
                weapon_heat_sources: unit.weapon_heat.clone(),
                dissipation: unit.dissipation(),
            };
            let final_heat = heat_data.resolve(unit.heat);
            let effects = rules.heat_effects(final_heat);
            if effects.shutdown || effects.shutdown_avoid.is_some() || effects.ammo_explosion_avoid.is_some() {
                warn!(
                    unit_id = %unit.id,
                    heat = final_heat,
                    shutdown = effects.shutdown,
                    shutdown_avoid = ?effects.shutdown_avoid,
                    ammo_explosion_avoid = ?effects.ammo_explosion_avoid,
                    "unit running hot"
                );
            }
            let (game_origin_id, timestamp) = ctx.stamp();
            updates.push(Command::HeatUpdated(HeatUpdatedCommand {
                game_origin_id,
                timestamp,
                unit_id: unit.id,
                unit_name: unit.name(),
                heat_data,
                previous_heat: unit.heat,
                final_heat,
            }));
        }

        info!(turn = ctx.turn, units = updates.len(), "heat resolved");
        for update in updates {
            ctx.commit(update);
        }
        PhaseOutcome::Advance
    }
}
