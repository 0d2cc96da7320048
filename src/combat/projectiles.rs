//! In-flight projectiles and impact resolution.
//!
//! Damage and the crit roll are fixed at launch; resolution only delivers
//! them. Flight time is tick-native: travel milliseconds convert to a tick
//! count when launched, and due projectiles resolve on the session's own
//! tick path. Both single-target and area impacts are idempotent, so stray
//! resolutions (a despawned target, a stopped session) are safe no-ops.

use serde::{Deserialize, Serialize};

use crate::catalog::{AbilityId, EffectTemplate};
use crate::combat::entity::{Entity, EntityId, EntityKind, Position};
use crate::core::constants::TICK_INTERVAL_MS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Impact {
    SingleTarget(EntityId),
    Area { point: Position, radius: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    pub id: u64,
    pub ability: AbilityId,
    /// Side the caster was on at launch; area impacts only damage the
    /// opposing side. Copied out so a caster dying mid-flight changes
    /// nothing.
    pub caster_kind: EntityKind,
    pub impact: Impact,
    pub damage: u32,
    pub is_critical: bool,
    pub effect: Option<EffectTemplate>,
    pub launched_tick: u64,
    pub resolve_at_tick: u64,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: EntityId,
    pub damage: u32,
    /// The hit dropped the target to zero health.
    pub lethal: bool,
}

#[derive(Debug, Clone)]
pub struct ImpactOutcome {
    pub projectile_id: u64,
    pub ability: AbilityId,
    pub is_critical: bool,
    pub hits: Vec<Hit>,
    pub effect: Option<EffectTemplate>,
}

/// Converts flight milliseconds to whole ticks at the given tick interval,
/// rounding up. Zero travel resolves in the same tick it was launched.
pub fn travel_ticks(travel_ms: u64, tick_interval_ms: u64) -> u64 {
    let interval = tick_interval_ms.max(1);
    (travel_ms + interval - 1) / interval
}

#[derive(Debug, Clone)]
pub struct ProjectileSystem {
    tick_interval_ms: u64,
    in_flight: Vec<Projectile>,
    next_id: u64,
}

impl Default for ProjectileSystem {
    fn default() -> Self {
        Self::new(TICK_INTERVAL_MS)
    }
}

impl ProjectileSystem {
    /// Sessions running at a non-default rate pass their own interval so
    /// flight times stay true to wall-clock milliseconds.
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            tick_interval_ms: tick_interval_ms.max(1),
            in_flight: Vec::new(),
            next_id: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        &mut self,
        ability: AbilityId,
        caster_kind: EntityKind,
        impact: Impact,
        damage: u32,
        is_critical: bool,
        effect: Option<EffectTemplate>,
        travel_ms: u64,
        current_tick: u64,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight.push(Projectile {
            id,
            ability,
            caster_kind,
            impact,
            damage,
            is_critical,
            effect,
            launched_tick: current_tick,
            resolve_at_tick: current_tick + travel_ticks(travel_ms, self.tick_interval_ms),
            resolved: false,
        });
        id
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }

    /// Resolves every projectile whose flight time has elapsed, applying
    /// damage and marking lethal targets dying. Marked targets are skipped
    /// by every later resolution, this tick or any other, so one kill can
    /// never be delivered twice.
    pub fn resolve_due(&mut self, current_tick: u64, entities: &mut [Entity]) -> Vec<ImpactOutcome> {
        let mut outcomes = Vec::new();
        for projectile in self.in_flight.iter_mut() {
            if projectile.resolved || current_tick < projectile.resolve_at_tick {
                continue;
            }
            projectile.resolved = true;

            let mut hits = Vec::new();
            match projectile.impact {
                Impact::SingleTarget(target_id) => {
                    // A despawned or already-dying target means the impact
                    // fizzles silently.
                    if let Some(target) = entities.iter_mut().find(|e| e.id == target_id) {
                        if target.is_alive() {
                            hits.push(apply_hit(target, projectile.damage, current_tick));
                        }
                    }
                }
                Impact::Area { point, radius } => {
                    for target in entities.iter_mut() {
                        if !target.is_alive()
                            || !projectile.caster_kind.is_hostile_to(target.kind)
                        {
                            continue;
                        }
                        // Boundary inclusive: distance == radius hits
                        if target.position.distance(&point) <= radius {
                            hits.push(apply_hit(target, projectile.damage, current_tick));
                        }
                    }
                }
            }

            outcomes.push(ImpactOutcome {
                projectile_id: projectile.id,
                ability: projectile.ability,
                is_critical: projectile.is_critical,
                hits,
                effect: projectile.effect,
            });
        }
        self.in_flight.retain(|projectile| !projectile.resolved);
        outcomes
    }
}

fn apply_hit(target: &mut Entity, damage: u32, current_tick: u64) -> Hit {
    target.take_damage(damage);
    let lethal = target.current_health == 0;
    if lethal {
        target.mark_dying(current_tick);
    }
    Hit {
        target: target.id,
        damage,
        lethal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::stats::CombatStats;

    fn enemy(id: u64, health: u32, x: f64) -> Entity {
        Entity::new(
            EntityId(id),
            EntityKind::Enemy,
            format!("Enemy {}", id),
            health,
            CombatStats::default(),
            Position::new(x, 0.0),
        )
    }

    fn launch_at(
        system: &mut ProjectileSystem,
        target: EntityId,
        damage: u32,
        travel_ms: u64,
        tick: u64,
    ) -> u64 {
        system.launch(
            AbilityId(7),
            EntityKind::Player,
            Impact::SingleTarget(target),
            damage,
            false,
            None,
            travel_ms,
            tick,
        )
    }

    #[test]
    fn test_travel_ticks_rounds_up() {
        assert_eq!(travel_ticks(0, 100), 0);
        assert_eq!(travel_ticks(50, 100), 1);
        assert_eq!(travel_ticks(100, 100), 1);
        assert_eq!(travel_ticks(250, 100), 3);
    }

    #[test]
    fn test_travel_ticks_follows_tick_interval() {
        // The same flight time takes more ticks at a faster tick rate
        assert_eq!(travel_ticks(200, 50), 4);
        assert_eq!(travel_ticks(200, 100), 2);
        assert_eq!(travel_ticks(75, 50), 2);
    }

    #[test]
    fn test_faster_tick_rate_stretches_flight() {
        let mut system = ProjectileSystem::new(50);
        let mut entities = vec![enemy(1, 100, 0.0)];
        launch_at(&mut system, EntityId(1), 30, 200, 10);

        // 200 ms at 50 ms per tick is four ticks in flight
        for tick in 11..14 {
            assert!(system.resolve_due(tick, &mut entities).is_empty());
        }
        assert_eq!(system.resolve_due(14, &mut entities).len(), 1);
        assert_eq!(entities[0].current_health, 70);
    }

    #[test]
    fn test_projectile_resolves_after_travel() {
        let mut system = ProjectileSystem::new(100);
        let mut entities = vec![enemy(1, 100, 0.0)];
        launch_at(&mut system, EntityId(1), 30, 300, 10);

        assert!(system.resolve_due(11, &mut entities).is_empty());
        assert!(system.resolve_due(12, &mut entities).is_empty());
        let outcomes = system.resolve_due(13, &mut entities);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].hits, vec![Hit { target: EntityId(1), damage: 30, lethal: false }]);
        assert_eq!(entities[0].current_health, 70);
        assert_eq!(system.in_flight(), 0);
    }

    #[test]
    fn test_impact_on_despawned_target_fizzles() {
        let mut system = ProjectileSystem::new(100);
        launch_at(&mut system, EntityId(42), 30, 0, 10);

        let mut entities = vec![enemy(1, 100, 0.0)];
        let outcomes = system.resolve_due(10, &mut entities);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].hits.is_empty());
        assert_eq!(entities[0].current_health, 100);
    }

    #[test]
    fn test_lethal_hit_marks_dying_and_blocks_rekill() {
        let mut system = ProjectileSystem::new(100);
        let mut entities = vec![enemy(1, 25, 0.0)];
        launch_at(&mut system, EntityId(1), 30, 0, 10);
        launch_at(&mut system, EntityId(1), 30, 0, 10);

        let outcomes = system.resolve_due(10, &mut entities);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].hits.len(), 1);
        assert!(outcomes[0].hits[0].lethal);
        // Second projectile found the target already dying and fizzled
        assert!(outcomes[1].hits.is_empty());
        assert_eq!(entities[0].dying.map(|d| d.since_tick), Some(10));
    }

    #[test]
    fn test_area_impact_includes_boundary() {
        let mut system = ProjectileSystem::new(100);
        let mut entities = vec![
            enemy(1, 100, 20.0),
            enemy(2, 100, 79.0),
            enemy(3, 100, 80.0),
            enemy(4, 100, 81.0),
        ];
        system.launch(
            AbilityId(2),
            EntityKind::Player,
            Impact::Area {
                point: Position::new(0.0, 0.0),
                radius: 80.0,
            },
            25,
            false,
            None,
            0,
            5,
        );

        let outcomes = system.resolve_due(5, &mut entities);
        let hit_ids: Vec<EntityId> = outcomes[0].hits.iter().map(|h| h.target).collect();
        assert_eq!(hit_ids, vec![EntityId(1), EntityId(2), EntityId(3)]);
        assert_eq!(entities[3].current_health, 100);
    }

    #[test]
    fn test_area_impact_spares_caster_side() {
        let mut system = ProjectileSystem::new(100);
        let mut player = Entity::new(
            EntityId(0),
            EntityKind::Player,
            "Player".to_string(),
            200,
            CombatStats::default(),
            Position::new(10.0, 0.0),
        );
        player.current_health = 200;
        let mut entities = vec![player, enemy(1, 100, 30.0)];
        system.launch(
            AbilityId(2),
            EntityKind::Player,
            Impact::Area {
                point: Position::new(0.0, 0.0),
                radius: 80.0,
            },
            25,
            false,
            None,
            0,
            5,
        );

        let outcomes = system.resolve_due(5, &mut entities);
        assert_eq!(outcomes[0].hits.len(), 1);
        assert_eq!(outcomes[0].hits[0].target, EntityId(1));
        assert_eq!(entities[0].current_health, 200);
    }

    #[test]
    fn test_resolution_is_idempotent_after_clearing() {
        let mut system = ProjectileSystem::new(100);
        let mut entities = vec![enemy(1, 100, 0.0)];
        launch_at(&mut system, EntityId(1), 30, 0, 10);

        assert_eq!(system.resolve_due(10, &mut entities).len(), 1);
        // Nothing left to deliver on later ticks
        assert!(system.resolve_due(11, &mut entities).is_empty());
        assert_eq!(entities[0].current_health, 70);
    }
}
