//! Read-only per-tick view of a session, for rendering and telemetry.

use serde::Serialize;

use crate::catalog::AbilityId;
use crate::combat::effects::EffectKind;
use crate::combat::entity::{EntityId, EntityKind, Position};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EffectSnapshot {
    pub effect_id: u32,
    pub kind: EffectKind,
    pub remaining_ticks: u64,
    pub stacks: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub current_health: u32,
    pub max_health: u32,
    pub position: Position,
    pub effects: Vec<EffectSnapshot>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SlotSnapshot {
    pub ability: AbilityId,
    pub ready_at_tick: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub player: EntitySnapshot,
    pub hostiles: Vec<EntitySnapshot>,
    pub allies: Vec<EntitySnapshot>,
    pub deck: Vec<Option<SlotSnapshot>>,
    pub projectiles_in_flight: usize,
    pub manual_control: bool,
    pub boss_active: bool,
}
