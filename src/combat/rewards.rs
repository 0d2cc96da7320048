//! Kill crediting and reward batching.
//!
//! The death sweep is the only place kills become rewards. Every damage
//! source just marks entities dying; the sweep credits each one exactly
//! once (the `reward_credited` flag is the single source of truth) and
//! removes the corpse afterwards, so no combination of projectile, area,
//! and periodic damage in one tick can double-pay.

use serde::Serialize;

use crate::combat::entity::{Entity, EntityId, EntityKind, Position};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillRecord {
    pub entity: EntityId,
    pub enemy_type_id: u32,
    pub position: Position,
}

/// Everything one tick's kills are worth. Ephemeral: emitted in the tick
/// report and not retained by the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RewardBatch {
    pub total_experience: u64,
    pub total_gold: u64,
    pub kills: Vec<KillRecord>,
}

/// Sweeps dead and dying entities: credits uncredited rewards, removes the
/// corpses, and returns the tick's reward batch. The player is never swept.
pub fn resolve_deaths(entities: &mut Vec<Entity>, current_tick: u64) -> Option<RewardBatch> {
    let mut batch = RewardBatch::default();
    for entity in entities.iter_mut() {
        if entity.kind == EntityKind::Player {
            continue;
        }
        if entity.current_health > 0 && entity.dying.is_none() {
            continue;
        }
        // Health hit zero outside the impact path (periodic damage): the
        // sweep owns the mark in that case.
        entity.mark_dying(current_tick);
        if entity.reward_credited {
            continue;
        }
        entity.reward_credited = true;
        if let Some(reward) = entity.reward {
            batch.total_experience += reward.experience;
            batch.total_gold += reward.gold;
            batch.kills.push(KillRecord {
                entity: entity.id,
                enemy_type_id: reward.enemy_type_id,
                position: entity.position,
            });
        }
    }

    entities.retain(|entity| {
        entity.kind == EntityKind::Player || (entity.current_health > 0 && entity.dying.is_none())
    });

    if batch.kills.is_empty() && batch.total_experience == 0 && batch.total_gold == 0 {
        None
    } else {
        Some(batch)
    }
}
