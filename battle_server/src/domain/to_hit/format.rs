// Log formatting for to-hit modifiers, kept apart from the numbers themselves.

use std::fmt::Write;

use crate::domain::to_hit::{ModifierKind, RollModifier, ToHitBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierTag {
    Gunnery,
    Piloting,
    AttackerMovement,
    TargetMovement,
    Range,
    PhysicalAttack,
    Heat,
    SecondaryTarget,
    Terrain,
}

const LABELS: &[(ModifierTag, &str)] = &[
    (ModifierTag::Gunnery, "gunnery"),
    (ModifierTag::Piloting, "piloting"),
    (ModifierTag::AttackerMovement, "attacker movement"),
    (ModifierTag::TargetMovement, "target movement"),
    (ModifierTag::Range, "range"),
    (ModifierTag::PhysicalAttack, "physical attack"),
    (ModifierTag::Heat, "heat"),
    (ModifierTag::SecondaryTarget, "secondary target"),
    (ModifierTag::Terrain, "terrain"),
];

fn tag(kind: &ModifierKind) -> ModifierTag {
    match kind {
        ModifierKind::Gunnery { .. } => ModifierTag::Gunnery,
        ModifierKind::Piloting { .. } => ModifierTag::Piloting,
        ModifierKind::AttackerMovement { .. } => ModifierTag::AttackerMovement,
        ModifierKind::TargetMovement { .. } => ModifierTag::TargetMovement,
        ModifierKind::Range { .. } => ModifierTag::Range,
        ModifierKind::PhysicalAttack { .. } => ModifierTag::PhysicalAttack,
        ModifierKind::Heat { .. } => ModifierTag::Heat,
        ModifierKind::SecondaryTarget { .. } => ModifierTag::SecondaryTarget,
        ModifierKind::Terrain { .. } => ModifierTag::Terrain,
    }
}

fn label(kind: &ModifierKind) -> &'static str {
    let tag = tag(kind);
    LABELS
        .iter()
        .find(|(candidate, _)| *candidate == tag)
        .map_or("modifier", |&(_, label)| label)
}

fn detail(kind: &ModifierKind) -> String {
    match kind {
        ModifierKind::Gunnery { skill } | ModifierKind::Piloting { skill } => skill.to_string(),
        ModifierKind::AttackerMovement { movement } => format!("{movement:?}"),
        ModifierKind::TargetMovement {
            hexes_moved,
            jumped,
        } => {
            if *jumped {
                format!("{hexes_moved} hexes, jumped")
            } else {
                format!("{hexes_moved} hexes")
            }
        }
        ModifierKind::Range { bracket, distance } => format!("{bracket:?} at {distance}"),
        ModifierKind::PhysicalAttack { attack } => format!("{attack:?}"),
        ModifierKind::Heat { heat } => heat.to_string(),
        ModifierKind::SecondaryTarget { in_forward_arc: true } => "forward arc".to_string(),
        ModifierKind::SecondaryTarget { in_forward_arc: false } => "outside forward arc".to_string(),
        ModifierKind::Terrain {
            coordinates,
            terrain,
        } => format!("{terrain:?} at ({}, {})", coordinates.q, coordinates.r),
    }
}

/// Renders one modifier, e.g. `range (Medium at 4): +2`.
pub fn format_modifier(modifier: &RollModifier) -> String {
    format!(
        "{} ({}): {:+}",
        label(&modifier.kind),
        detail(&modifier.kind),
        modifier.value
    )
}

/// Renders a full breakdown on one line, ending with the target number.
pub fn format_breakdown(breakdown: &ToHitBreakdown) -> String {
    let mut line = String::new();
    for modifier in breakdown.modifiers() {
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(&format_modifier(modifier));
    }
    if !breakdown.has_line_of_sight {
        line.push_str(", no line of sight");
    }
    let _ = write!(line, " => {}", breakdown.total());
    line
}
