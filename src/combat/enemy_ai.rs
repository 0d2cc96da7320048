//! Per-enemy behavior: close on the player, attack in range.
//!
//! Bosses are exempt; their attacks come from the session's scripted
//! pattern. Enemies move in fixed steps with a little jitter so packs
//! spread out instead of stacking on one point.

use rand::Rng;

use crate::combat::effects::EffectManager;
use crate::combat::entity::{AiPhase, Entity, EntityId, EntityKind};
use crate::combat::stats::calculate_damage;
use crate::core::constants::{
    ENEMY_ATTACK_COOLDOWN_TICKS, ENEMY_ATTACK_RANGE, ENEMY_MOVE_JITTER, ENEMY_MOVE_STEP,
    ENEMY_STANDOFF_DISTANCE,
};

/// A contact attack that landed this tick. The session applies the damage
/// to the player so all health mutation stays on one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAttack {
    pub attacker: EntityId,
    pub damage: u32,
    pub is_critical: bool,
}

/// Runs one behavior step for every living non-boss enemy. Movement is
/// clamped to the session's arena half-extents.
pub fn run_enemy_ai(
    entities: &mut [Entity],
    player_id: EntityId,
    current_tick: u64,
    effects: &EffectManager,
    (arena_half_width, arena_half_height): (f64, f64),
    rng: &mut impl Rng,
) -> Vec<EnemyAttack> {
    let (player_position, player_stats, player_alive) =
        match entities.iter().find(|e| e.id == player_id) {
            Some(player) => (player.position, player.stats, player.is_alive()),
            None => return Vec::new(),
        };

    let mut attacks = Vec::new();
    for enemy in entities.iter_mut() {
        if enemy.kind != EntityKind::Enemy {
            continue;
        }
        if !enemy.is_alive() {
            enemy.ai_phase = AiPhase::Dead;
            continue;
        }
        if effects.is_stunned(enemy.id) {
            continue;
        }

        let distance = enemy.position.distance(&player_position);
        if distance <= ENEMY_ATTACK_RANGE && player_alive {
            enemy.ai_phase = AiPhase::Attacking;
            let off_cooldown =
                current_tick.saturating_sub(enemy.last_attack_tick) >= ENEMY_ATTACK_COOLDOWN_TICKS;
            if off_cooldown {
                let result =
                    calculate_damage(enemy.base_damage, &enemy.stats, &player_stats, rng);
                enemy.last_attack_tick = current_tick;
                attacks.push(EnemyAttack {
                    attacker: enemy.id,
                    damage: result.damage,
                    is_critical: result.is_critical,
                });
            }
        } else if distance > ENEMY_STANDOFF_DISTANCE {
            enemy.ai_phase = AiPhase::Approaching;
            if distance > f64::EPSILON {
                let step = ENEMY_MOVE_STEP + rng.gen_range(-ENEMY_MOVE_JITTER..ENEMY_MOVE_JITTER);
                let step = step.min(distance - ENEMY_STANDOFF_DISTANCE).max(0.0);
                enemy.position.x += (player_position.x - enemy.position.x) / distance * step;
                enemy.position.y += (player_position.y - enemy.position.y) / distance * step;
                enemy
                    .position
                    .clamp_to_arena(arena_half_width, arena_half_height);
            }
        }
    }
    attacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::effects::{EffectKind, StatusEffect};
    use crate::combat::entity::Position;
    use crate::combat::stats::CombatStats;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ARENA: (f64, f64) = (500.0, 500.0);

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn player() -> Entity {
        Entity::new(
            EntityId(0),
            EntityKind::Player,
            "Player".to_string(),
            250,
            CombatStats::default(),
            Position::default(),
        )
    }

    fn enemy_at(id: u64, x: f64) -> Entity {
        Entity::new(
            EntityId(id),
            EntityKind::Enemy,
            format!("Enemy {}", id),
            100,
            CombatStats::default(),
            Position::new(x, 0.0),
        )
        .with_base_damage(10)
    }

    #[test]
    fn test_distant_enemy_approaches_player() {
        let mut entities = vec![player(), enemy_at(1, 300.0)];
        let effects = EffectManager::new();
        let mut rng = test_rng();

        let before = entities[1].position.x;
        let attacks = run_enemy_ai(&mut entities, EntityId(0), 25, &effects, ARENA, &mut rng);
        assert!(attacks.is_empty());
        assert!(entities[1].position.x < before);
        assert_eq!(entities[1].ai_phase, AiPhase::Approaching);
    }

    #[test]
    fn test_approach_stops_at_standoff_distance() {
        let mut entities = vec![player(), enemy_at(1, 300.0)];
        let effects = EffectManager::new();
        let mut rng = test_rng();

        for tick in 1..100 {
            run_enemy_ai(&mut entities, EntityId(0), tick, &effects, ARENA, &mut rng);
        }
        let distance = entities[1].position.distance(&entities[0].position);
        assert!(distance >= ENEMY_STANDOFF_DISTANCE - 1e-9);
        assert!(distance <= ENEMY_ATTACK_RANGE);
    }

    #[test]
    fn test_enemy_in_range_attacks_after_cooldown() {
        let mut entities = vec![player(), enemy_at(1, 40.0)];
        let effects = EffectManager::new();
        let mut rng = test_rng();

        // last_attack_tick starts at 0, so tick 19 is still inside cooldown
        let attacks = run_enemy_ai(&mut entities, EntityId(0), 19, &effects, ARENA, &mut rng);
        assert!(attacks.is_empty());
        assert_eq!(entities[1].ai_phase, AiPhase::Attacking);

        let attacks = run_enemy_ai(&mut entities, EntityId(0), 20, &effects, ARENA, &mut rng);
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].attacker, EntityId(1));
        assert!(attacks[0].damage >= 10);
        assert_eq!(entities[1].last_attack_tick, 20);

        // Immediately after attacking, the cooldown gates again
        let attacks = run_enemy_ai(&mut entities, EntityId(0), 21, &effects, ARENA, &mut rng);
        assert!(attacks.is_empty());
    }

    #[test]
    fn test_movement_respects_configured_arena_bounds() {
        // A shrunken arena pulls a straggler spawned outside it back in
        let mut player = player();
        player.position = Position::new(-40.0, 0.0);
        let mut entities = vec![player, enemy_at(1, 300.0)];
        let effects = EffectManager::new();
        let mut rng = test_rng();

        for tick in 1..50 {
            run_enemy_ai(&mut entities, EntityId(0), tick, &effects, (50.0, 50.0), &mut rng);
            assert!(entities[1].position.x.abs() <= 50.0);
            assert!(entities[1].position.y.abs() <= 50.0);
        }
    }

    #[test]
    fn test_dead_player_draws_no_attacks() {
        let mut entities = vec![player(), enemy_at(1, 40.0)];
        entities[0].take_damage(250);
        let effects = EffectManager::new();
        let mut rng = test_rng();

        let attacks = run_enemy_ai(&mut entities, EntityId(0), 50, &effects, ARENA, &mut rng);
        assert!(attacks.is_empty());
    }

    #[test]
    fn test_stunned_enemy_does_nothing() {
        let mut entities = vec![player(), enemy_at(1, 40.0)];
        let mut effects = EffectManager::new();
        effects.add_effect(
            EntityId(1),
            StatusEffect {
                effect_id: 107,
                kind: EffectKind::Stun,
                remaining_ticks: 100,
                tick_interval: 1,
                value: 0,
                stackable: false,
                stacks: 1,
                last_applied_tick: 0,
            },
        );
        let mut rng = test_rng();

        let position = entities[1].position;
        let attacks = run_enemy_ai(&mut entities, EntityId(0), 50, &effects, ARENA, &mut rng);
        assert!(attacks.is_empty());
        assert_eq!(entities[1].position, position);
    }

    #[test]
    fn test_boss_is_exempt_from_contact_ai() {
        let mut boss = enemy_at(1, 40.0);
        boss.kind = EntityKind::Boss;
        let mut entities = vec![player(), boss];
        let effects = EffectManager::new();
        let mut rng = test_rng();

        let attacks = run_enemy_ai(&mut entities, EntityId(0), 100, &effects, ARENA, &mut rng);
        assert!(attacks.is_empty());
        assert_eq!(entities[1].last_attack_tick, 0);
    }

    #[test]
    fn test_dying_enemy_transitions_to_dead_phase() {
        let mut entities = vec![player(), enemy_at(1, 40.0)];
        entities[1].take_damage(100);
        entities[1].mark_dying(9);
        let effects = EffectManager::new();
        let mut rng = test_rng();

        run_enemy_ai(&mut entities, EntityId(0), 10, &effects, ARENA, &mut rng);
        assert_eq!(entities[1].ai_phase, AiPhase::Dead);
    }
}
