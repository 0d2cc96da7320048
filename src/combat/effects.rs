//! Status effect bookkeeping: stacking, periodic pulses, and expiry.
//!
//! The manager never touches entities directly. It advances timers and
//! reports pulses (periodic damage or healing); the session applies them so
//! that all health mutation stays on one code path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::EffectTemplate;
use crate::combat::entity::EntityId;
use crate::core::constants::MAX_EFFECT_STACKS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    DamageOverTime,
    Heal,
    Buff,
    Debuff,
    Stun,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    pub effect_id: u32,
    pub kind: EffectKind,
    pub remaining_ticks: u64,
    pub tick_interval: u64,
    /// Per-pulse amount for DoT/Heal; percent magnitude for Buff/Debuff.
    pub value: u32,
    pub stackable: bool,
    pub stacks: u32,
    pub last_applied_tick: u64,
}

impl StatusEffect {
    pub fn from_template(template: &EffectTemplate, current_tick: u64) -> Self {
        Self {
            effect_id: template.effect_id,
            kind: template.kind,
            remaining_ticks: template.duration_ticks,
            tick_interval: template.tick_interval.max(1),
            value: template.value,
            stackable: template.stackable,
            stacks: 1,
            last_applied_tick: current_tick,
        }
    }
}

/// One periodic application of an effect on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectPulse {
    pub target: EntityId,
    pub effect_id: u32,
    pub kind: EffectKind,
    /// Damage for DoT, healing for Heal. Stacks are already multiplied in.
    pub amount: u32,
}

/// Tracks active effects per entity.
///
/// Storage is a BTreeMap so pulse order is stable across runs; a seeded
/// session replays identically, events included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectManager {
    effects: BTreeMap<EntityId, Vec<StatusEffect>>,
}

impl EffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an effect. Re-applying the same effect id stacks it (capped)
    /// when stackable, refreshing the duration to the longer of the two;
    /// non-stackable effects are replaced outright.
    pub fn add_effect(&mut self, target: EntityId, effect: StatusEffect) {
        let list = self.effects.entry(target).or_default();
        if let Some(existing) = list.iter_mut().find(|e| e.effect_id == effect.effect_id) {
            if existing.stackable {
                existing.stacks = (existing.stacks + 1).min(MAX_EFFECT_STACKS);
                existing.remaining_ticks = existing.remaining_ticks.max(effect.remaining_ticks);
            } else {
                *existing = effect;
            }
        } else {
            list.push(effect);
        }
    }

    /// Advances every effect by one tick. Effects whose interval has elapsed
    /// since their last application fire a pulse; expired effects are
    /// removed. Must be called exactly once per session tick.
    pub fn process_tick(&mut self, current_tick: u64) -> Vec<EffectPulse> {
        let mut pulses = Vec::new();
        for (&target, list) in self.effects.iter_mut() {
            for effect in list.iter_mut() {
                if current_tick >= effect.last_applied_tick + effect.tick_interval {
                    effect.last_applied_tick = current_tick;
                    match effect.kind {
                        EffectKind::DamageOverTime | EffectKind::Heal => {
                            pulses.push(EffectPulse {
                                target,
                                effect_id: effect.effect_id,
                                kind: effect.kind,
                                amount: effect.value * effect.stacks,
                            });
                        }
                        // Passive while active; no periodic pulse
                        EffectKind::Buff | EffectKind::Debuff | EffectKind::Stun => {}
                    }
                }
                effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
            }
            list.retain(|e| e.remaining_ticks > 0);
        }
        self.effects.retain(|_, list| !list.is_empty());
        pulses
    }

    pub fn clear_entity(&mut self, target: EntityId) {
        self.effects.remove(&target);
    }

    /// Drops effects for every entity the keep predicate rejects. Called
    /// after the death sweep so effects never outlive their host.
    pub fn retain_targets(&mut self, keep: impl Fn(EntityId) -> bool) {
        self.effects.retain(|&target, _| keep(target));
    }

    pub fn effects_on(&self, target: EntityId) -> &[StatusEffect] {
        self.effects
            .get(&target)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_stunned(&self, target: EntityId) -> bool {
        self.effects_on(target)
            .iter()
            .any(|e| e.kind == EffectKind::Stun)
    }

    /// Total outgoing damage bonus from active buffs, in percent.
    pub fn attack_bonus_percent(&self, target: EntityId) -> u32 {
        self.effects_on(target)
            .iter()
            .filter(|e| e.kind == EffectKind::Buff)
            .map(|e| e.value * e.stacks)
            .sum()
    }

    /// Flat defense reduction from active debuffs.
    pub fn defense_penalty(&self, target: EntityId) -> u32 {
        self.effects_on(target)
            .iter()
            .filter(|e| e.kind == EffectKind::Debuff)
            .map(|e| e.value * e.stacks)
            .sum()
    }
}
