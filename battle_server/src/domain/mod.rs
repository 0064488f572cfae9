// Domain layer: rules, geometry and the unit model.

pub mod dice;
pub mod errors;
pub mod heat;
pub mod hex;
pub mod map;
pub mod movement;
pub mod player;
pub mod rules;
pub mod to_hit;
pub mod units;

pub use dice::{DiceSource, RandomDice, ScriptedDice};
pub use errors::DomainError;
pub use heat::{DissipationData, HeatData, MovementHeatSource, WeaponHeatSource};
pub use hex::{HexCoordinates, HexDirection, HexPosition};
pub use map::{BattleMap, HexData, Terrain};
pub use player::{Player, PlayerStatus};
pub use rules::{ClassicRules, IMPOSSIBLE_ROLL, PhysicalAttackType, RulesProvider, SHUTDOWN_HEAT};
pub use to_hit::{ModifierKind, RangeBracket, RollModifier, ToHitBreakdown, ToHitCalculator};
