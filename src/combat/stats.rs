//! Combat stat block and the shared damage formula.
//!
//! Every damage source in the simulation (ability casts, boss scripts,
//! enemy contact attacks) goes through [`calculate_damage`], so balance
//! tuning lives in base damage values and stat tables rather than in
//! per-path math.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::constants::{MAX_COOLDOWN_REDUCTION_PERCENT, MIN_DAMAGE};

/// Stat block shared by players, enemies, and bosses. All fields are
/// integer percents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Outgoing damage bonus: +1% per point.
    pub attack: u32,
    /// Incoming damage mitigation, diminishing: defense / (defense + 100).
    pub defense: u32,
    pub crit_chance_percent: u32,
    pub crit_damage_percent: u32,
    pub cooldown_reduction_percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageResult {
    pub damage: u32,
    pub is_critical: bool,
}

/// Rolls whether an attack crits based on crit chance percentage.
pub fn roll_crit(crit_chance_percent: u32, rng: &mut impl Rng) -> bool {
    rng.gen_range(0..100) < crit_chance_percent
}

/// Computes final damage for one hit.
///
/// Order: attack scaling, then the crit multiplier, then defense
/// mitigation. The result is floored to an integer and never drops below
/// the minimum damage clamp.
pub fn calculate_damage(
    base_damage: u32,
    attacker: &CombatStats,
    defender: &CombatStats,
    rng: &mut impl Rng,
) -> DamageResult {
    let mut damage = base_damage as f64 * (1.0 + attacker.attack as f64 / 100.0);

    let is_critical = roll_crit(attacker.crit_chance_percent, rng);
    if is_critical {
        damage *= 1.0 + attacker.crit_damage_percent as f64 / 100.0;
    }

    let defense = defender.defense as f64;
    damage *= 1.0 - defense / (defense + 100.0);

    let damage = (damage.floor() as u32).max(MIN_DAMAGE);
    DamageResult {
        damage,
        is_critical,
    }
}

/// Applies cooldown reduction to a base cooldown, flooring to whole ticks.
/// Reduction is capped so cooldowns never reach zero from stats alone.
pub fn effective_cooldown_ticks(cooldown_ticks: u64, cooldown_reduction_percent: u32) -> u64 {
    let reduction = cooldown_reduction_percent.min(MAX_COOLDOWN_REDUCTION_PERCENT) as u64;
    cooldown_ticks * (100 - reduction) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn stats(attack: u32, defense: u32, crit_chance: u32, crit_damage: u32) -> CombatStats {
        CombatStats {
            attack,
            defense,
            crit_chance_percent: crit_chance,
            crit_damage_percent: crit_damage,
            cooldown_reduction_percent: 0,
        }
    }

    #[test]
    fn test_base_damage_with_attack_scaling() {
        // 10 base, 10 attack, no crit, no defense: floor(10 * 1.1) = 11
        let mut rng = test_rng();
        let result = calculate_damage(10, &stats(10, 0, 0, 50), &stats(0, 0, 0, 0), &mut rng);
        assert_eq!(result.damage, 11);
        assert!(!result.is_critical);
    }

    #[test]
    fn test_guaranteed_crit_applies_multiplier() {
        // 100% crit chance, +100% crit damage: 10 * 2 = 20
        let mut rng = test_rng();
        let result = calculate_damage(10, &stats(0, 0, 100, 100), &stats(0, 0, 0, 0), &mut rng);
        assert_eq!(result.damage, 20);
        assert!(result.is_critical);
    }

    #[test]
    fn test_defense_mitigation_is_diminishing() {
        let mut rng = test_rng();
        // 100 defense mitigates exactly half: 100 * (1 - 100/200) = 50
        let result = calculate_damage(100, &stats(0, 0, 0, 0), &stats(0, 100, 0, 0), &mut rng);
        assert_eq!(result.damage, 50);

        // 300 defense mitigates 75%, not 100%
        let result = calculate_damage(100, &stats(0, 0, 0, 0), &stats(0, 300, 0, 0), &mut rng);
        assert_eq!(result.damage, 25);
    }

    #[test]
    fn test_damage_floors_fractions() {
        let mut rng = test_rng();
        // 7 * 1.05 = 7.35 -> 7
        let result = calculate_damage(7, &stats(5, 0, 0, 0), &stats(0, 0, 0, 0), &mut rng);
        assert_eq!(result.damage, 7);
    }

    #[test]
    fn test_minimum_damage_clamp() {
        let mut rng = test_rng();
        // 1 base against massive defense still lands 1
        let result = calculate_damage(1, &stats(0, 0, 0, 0), &stats(0, 10_000, 0, 0), &mut rng);
        assert_eq!(result.damage, 1);
    }

    #[test]
    fn test_zero_crit_chance_never_crits() {
        let mut rng = test_rng();
        for _ in 0..100 {
            assert!(!roll_crit(0, &mut rng));
        }
    }

    #[test]
    fn test_full_crit_chance_always_crits() {
        let mut rng = test_rng();
        for _ in 0..100 {
            assert!(roll_crit(100, &mut rng));
        }
    }

    #[test]
    fn test_damage_is_deterministic_with_seeded_rng() {
        let attacker = stats(37, 0, 30, 80);
        let defender = stats(0, 42, 0, 0);
        let first: Vec<u32> = {
            let mut rng = test_rng();
            (0..20)
                .map(|_| calculate_damage(25, &attacker, &defender, &mut rng).damage)
                .collect()
        };
        let second: Vec<u32> = {
            let mut rng = test_rng();
            (0..20)
                .map(|_| calculate_damage(25, &attacker, &defender, &mut rng).damage)
                .collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_effective_cooldown_floors() {
        assert_eq!(effective_cooldown_ticks(20, 0), 20);
        assert_eq!(effective_cooldown_ticks(20, 25), 15);
        // 20 * 0.9 = 18
        assert_eq!(effective_cooldown_ticks(20, 10), 18);
        // floor(15 * 0.67) = 10
        assert_eq!(effective_cooldown_ticks(15, 33), 10);
    }

    #[test]
    fn test_effective_cooldown_reduction_is_capped() {
        // 80% cap: even absurd reduction leaves a fifth of the cooldown
        assert_eq!(effective_cooldown_ticks(100, 100), 20);
        assert_eq!(effective_cooldown_ticks(100, 250), 20);
    }
}
