//! The five-slot ability deck: equipping, cooldown gating, and synergies.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::catalog::{AbilityId, AbilityTag, Catalog};
use crate::combat::stats::effective_cooldown_ticks;
use crate::core::constants::DECK_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbilitySlot {
    pub ability: AbilityId,
    pub ready_at_tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipError {
    InvalidSlot { index: usize },
    UnknownAbility { id: AbilityId },
}

impl fmt::Display for EquipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipError::InvalidSlot { index } => {
                write!(f, "slot index {} out of range (deck has {} slots)", index, DECK_SIZE)
            }
            EquipError::UnknownAbility { id } => {
                write!(f, "ability {} is not in the catalog", id.0)
            }
        }
    }
}

impl std::error::Error for EquipError {}

/// Fixed-size deck of ability slots plus the synergy bonuses the current
/// loadout activates. Bonuses are recomputed on every deck change, never
/// during combat.
#[derive(Debug, Clone, Default)]
pub struct AbilityDeck {
    slots: [Option<AbilitySlot>; DECK_SIZE],
    active_bonuses: HashMap<AbilityTag, u32>,
}

impl AbilityDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equips an ability, overwriting whatever occupied the slot.
    pub fn equip(
        &mut self,
        catalog: &Catalog,
        ability: AbilityId,
        slot_index: usize,
    ) -> Result<(), EquipError> {
        if slot_index >= DECK_SIZE {
            return Err(EquipError::InvalidSlot { index: slot_index });
        }
        if catalog.ability(ability).is_none() {
            return Err(EquipError::UnknownAbility { id: ability });
        }
        self.slots[slot_index] = Some(AbilitySlot {
            ability,
            ready_at_tick: 0,
        });
        self.recompute_synergies(catalog);
        Ok(())
    }

    pub fn slot(&self, index: usize) -> Option<&AbilitySlot> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn slots(&self) -> &[Option<AbilitySlot>; DECK_SIZE] {
        &self.slots
    }

    /// Empty slots are never ready.
    pub fn is_ready(&self, slot_index: usize, current_tick: u64) -> bool {
        match self.slot(slot_index) {
            Some(slot) => current_tick >= slot.ready_at_tick,
            None => false,
        }
    }

    /// Spends the slot's cooldown if it is ready. Returns false (and leaves
    /// the slot untouched) when the slot is empty or still cooling down.
    pub fn use_slot(
        &mut self,
        catalog: &Catalog,
        slot_index: usize,
        current_tick: u64,
        cooldown_reduction_percent: u32,
    ) -> bool {
        if !self.is_ready(slot_index, current_tick) {
            return false;
        }
        let slot = match self.slots.get_mut(slot_index).and_then(|s| s.as_mut()) {
            Some(slot) => slot,
            None => return false,
        };
        let cooldown = match catalog.ability(slot.ability) {
            Some(def) => def.cooldown_ticks,
            None => return false,
        };
        slot.ready_at_tick =
            current_tick + effective_cooldown_ticks(cooldown, cooldown_reduction_percent);
        true
    }

    /// Total synergy damage bonus applying to a cast with the given tags.
    pub fn damage_bonus_percent(&self, tags: &[AbilityTag]) -> u32 {
        tags.iter()
            .filter_map(|tag| self.active_bonuses.get(tag))
            .sum()
    }

    pub fn active_bonuses(&self) -> &HashMap<AbilityTag, u32> {
        &self.active_bonuses
    }

    fn recompute_synergies(&mut self, catalog: &Catalog) {
        let mut carriers: HashMap<AbilityTag, HashSet<AbilityId>> = HashMap::new();
        for slot in self.slots.iter().flatten() {
            if let Some(def) = catalog.ability(slot.ability) {
                for tag in def.tags {
                    carriers.entry(*tag).or_default().insert(slot.ability);
                }
            }
        }
        self.active_bonuses.clear();
        for rule in catalog.synergy_rules() {
            let distinct = carriers.get(&rule.tag).map_or(0, |set| set.len());
            if distinct >= rule.min_distinct {
                *self.active_bonuses.entry(rule.tag).or_insert(0) += rule.bonus_percent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_with(catalog: &Catalog, abilities: &[(u32, usize)]) -> AbilityDeck {
        let mut deck = AbilityDeck::new();
        for &(ability, slot) in abilities {
            deck.equip(catalog, AbilityId(ability), slot).unwrap();
        }
        deck
    }

    #[test]
    fn test_equip_rejects_out_of_range_slot() {
        let catalog = Catalog::standard();
        let mut deck = AbilityDeck::new();
        assert_eq!(
            deck.equip(&catalog, AbilityId(1), 5),
            Err(EquipError::InvalidSlot { index: 5 })
        );
    }

    #[test]
    fn test_equip_rejects_unknown_ability() {
        let catalog = Catalog::standard();
        let mut deck = AbilityDeck::new();
        assert_eq!(
            deck.equip(&catalog, AbilityId(404), 0),
            Err(EquipError::UnknownAbility { id: AbilityId(404) })
        );
        // Failed equip leaves the slot empty
        assert!(deck.slot(0).is_none());
    }

    #[test]
    fn test_empty_slot_is_never_ready() {
        let deck = AbilityDeck::new();
        assert!(!deck.is_ready(0, 1000));
    }

    #[test]
    fn test_cooldown_schedule() {
        let catalog = Catalog::standard();
        // Fireball: 20 tick cooldown
        let mut deck = deck_with(&catalog, &[(1, 0)]);

        assert!(deck.use_slot(&catalog, 0, 100, 0));
        assert!(!deck.is_ready(0, 100));
        assert!(!deck.is_ready(0, 119));
        assert!(deck.is_ready(0, 120));
        // Failed use while cooling down spends nothing
        assert!(!deck.use_slot(&catalog, 0, 110, 0));
        assert_eq!(deck.slot(0).unwrap().ready_at_tick, 120);
    }

    #[test]
    fn test_cooldown_reduction_shortens_schedule() {
        let catalog = Catalog::standard();
        let mut deck = deck_with(&catalog, &[(1, 0)]);

        // 25% reduction: 20 -> 15 ticks
        assert!(deck.use_slot(&catalog, 0, 100, 25));
        assert!(!deck.is_ready(0, 114));
        assert!(deck.is_ready(0, 115));
    }

    #[test]
    fn test_overwrite_resets_readiness() {
        let catalog = Catalog::standard();
        let mut deck = deck_with(&catalog, &[(1, 0)]);
        deck.use_slot(&catalog, 0, 100, 0);
        assert!(!deck.is_ready(0, 101));

        deck.equip(&catalog, AbilityId(7), 0).unwrap();
        assert!(deck.is_ready(0, 101));
    }

    #[test]
    fn test_synergy_activates_on_distinct_carriers() {
        let catalog = Catalog::standard();
        // Fireball + Venom Dart both carry Strike and Dot
        let deck = deck_with(&catalog, &[(1, 0), (3, 1)]);

        assert_eq!(deck.damage_bonus_percent(&[AbilityTag::Strike]), 10);
        assert_eq!(deck.damage_bonus_percent(&[AbilityTag::Dot]), 20);
        assert_eq!(
            deck.damage_bonus_percent(&[AbilityTag::Strike, AbilityTag::Dot]),
            30
        );
        assert_eq!(deck.damage_bonus_percent(&[AbilityTag::Aoe]), 0);
    }

    #[test]
    fn test_single_carrier_activates_nothing() {
        let catalog = Catalog::standard();
        let deck = deck_with(&catalog, &[(1, 0)]);
        assert!(deck.active_bonuses().is_empty());
    }

    #[test]
    fn test_duplicate_ability_counts_once() {
        let catalog = Catalog::standard();
        // Same ability in two slots: one distinct carrier, no synergy
        let deck = deck_with(&catalog, &[(1, 0), (1, 1)]);
        assert_eq!(deck.damage_bonus_percent(&[AbilityTag::Strike]), 0);
    }

    #[test]
    fn test_synergy_recomputes_on_overwrite() {
        let catalog = Catalog::standard();
        let mut deck = deck_with(&catalog, &[(1, 0), (3, 1)]);
        assert_eq!(deck.damage_bonus_percent(&[AbilityTag::Strike]), 10);

        // Replace Venom Dart with Mending Light: Strike pair broken
        deck.equip(&catalog, AbilityId(4), 1).unwrap();
        assert_eq!(deck.damage_bonus_percent(&[AbilityTag::Strike]), 0);
    }
}
