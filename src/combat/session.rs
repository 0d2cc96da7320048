//! Combat session: owns all combat state and orchestrates each tick.
//!
//! A session is a plain value created and owned by the caller (one per
//! player by contract). Nothing here reads the wall clock or shares state;
//! the caller drives `tick` from a scheduler callback, and every mutation
//! from outside the tick path arrives through the command queue.
//!
//! Tick order is fixed: drain commands, advance the clock, pulse status
//! effects, run enemy AI and the boss script, auto-cast, resolve impacts,
//! sweep deaths (the only place kills become rewards), report the player
//! down transition, then top up the enemy population.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

use crate::catalog::{
    generate_enemy_name, tier_enemy_rewards, tier_enemy_stats, AbilityId, BossId, Catalog,
};
use crate::combat::abilities::{AbilityDeck, EquipError};
use crate::combat::effects::{EffectKind, EffectManager, StatusEffect};
use crate::combat::enemy_ai::run_enemy_ai;
use crate::combat::entity::{Entity, EntityId, EntityKind, Position, RewardValue};
use crate::combat::projectiles::{Impact, ProjectileSystem};
use crate::combat::rewards::{resolve_deaths, RewardBatch};
use crate::combat::snapshot::{EffectSnapshot, EntitySnapshot, SlotSnapshot, Snapshot};
use crate::combat::stats::{calculate_damage, CombatStats};
use crate::core::commands::{CommandQueue, SessionCommand};
use crate::core::constants::{
    ARENA_HALF_HEIGHT, ARENA_HALF_WIDTH, BOSS_REWARD_MULTIPLIER, BOSS_STAT_MULTIPLIERS,
    DECK_SIZE, DEFAULT_ENEMY_CAP, ENEMY_STAT_VARIANCE_MAX, ENEMY_STAT_VARIANCE_MIN,
    PLAYER_BASE_HP, SPAWN_RING_RADIUS, TICK_INTERVAL_MS,
};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_interval_ms: u64,
    pub enemy_cap: usize,
    pub enemy_tier: u32,
    pub tier_depth: u32,
    /// Top the enemy population up to the cap each tick. Tests that need a
    /// controlled population turn this off and spawn explicitly.
    pub auto_spawn: bool,
    pub arena_half_width: f64,
    pub arena_half_height: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            enemy_cap: DEFAULT_ENEMY_CAP,
            enemy_tier: 1,
            tier_depth: 1,
            auto_spawn: true,
            arena_half_width: ARENA_HALF_WIDTH,
            arena_half_height: ARENA_HALF_HEIGHT,
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Everything that happened during one tick, in occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AbilityCast { slot: usize, ability: AbilityId },
    ProjectileLaunched { projectile_id: u64, ability: AbilityId },
    ImpactHit { projectile_id: u64, target: EntityId, damage: u32, is_critical: bool },
    EffectApplied { target: EntityId, effect_id: u32 },
    EffectPulsed { target: EntityId, effect_id: u32, kind: EffectKind, amount: u32 },
    EnemyAttacked { attacker: EntityId, damage: u32, is_critical: bool },
    EnemySpawned { id: EntityId, name: String },
    BossEngaged { id: EntityId, name: String },
    EnemySlain { id: EntityId, enemy_type_id: u32 },
    RewardsIssued { experience: u64, gold: u64, kills: usize },
    PlayerDowned,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<SessionEvent>,
    pub rewards: Option<RewardBatch>,
}

/// Scripted boss attack cadence.
#[derive(Debug, Clone, Copy)]
struct BossScript {
    boss: EntityId,
    ability: AbilityId,
    period_ticks: u64,
    next_cast_tick: u64,
}

pub struct CombatSession {
    config: SessionConfig,
    catalog: Catalog,
    current_tick: u64,
    next_entity_id: u64,
    // Invariant: the player is entities[0] and is never removed.
    entities: Vec<Entity>,
    deck: AbilityDeck,
    effects: EffectManager,
    projectiles: ProjectileSystem,
    commands: CommandQueue,
    manual_control: bool,
    player_downed_reported: bool,
    boss_script: Option<BossScript>,
    pending_events: Vec<SessionEvent>,
}

impl CombatSession {
    pub fn new(
        config: SessionConfig,
        catalog: Catalog,
        player_stats: CombatStats,
        player_max_health: u32,
    ) -> Self {
        let projectiles = ProjectileSystem::new(config.tick_interval_ms);
        let mut session = Self {
            config,
            catalog,
            current_tick: 0,
            next_entity_id: 0,
            entities: Vec::new(),
            deck: AbilityDeck::new(),
            effects: EffectManager::new(),
            projectiles,
            commands: CommandQueue::new(),
            manual_control: false,
            player_downed_reported: false,
            boss_script: None,
            pending_events: Vec::new(),
        };
        let player_id = session.allocate_id();
        session.entities.push(Entity::new(
            player_id,
            EntityKind::Player,
            "Player".to_string(),
            player_max_health.max(1),
            player_stats,
            Position::default(),
        ));
        session
    }

    pub fn with_defaults(catalog: Catalog, player_stats: CombatStats) -> Self {
        Self::new(SessionConfig::default(), catalog, player_stats, PLAYER_BASE_HP)
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn player(&self) -> &Entity {
        &self.entities[0]
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn deck(&self) -> &AbilityDeck {
        &self.deck
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn player_alive(&self) -> bool {
        self.entities[0].is_alive()
    }

    pub fn boss_active(&self) -> bool {
        self.entities
            .iter()
            .any(|e| e.kind == EntityKind::Boss && e.is_alive())
    }

    pub fn live_enemy_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind == EntityKind::Enemy && e.is_alive())
            .count()
    }

    pub fn projectiles_in_flight(&self) -> usize {
        self.projectiles.in_flight()
    }

    // ── Caller-facing mutation ───────────────────────────────────────────

    /// Queues an intent for the next tick. The queue drains in arrival
    /// order before anything else in the tick runs.
    pub fn queue_command(&mut self, command: SessionCommand) {
        self.commands.push(command);
    }

    /// Equips an ability, overwriting the slot and recomputing synergies.
    pub fn equip(&mut self, ability: AbilityId, slot_index: usize) -> Result<(), EquipError> {
        self.deck.equip(&self.catalog, ability, slot_index)
    }

    /// Casts a slot immediately through the same readiness and targeting
    /// path as auto-cast. Returns false (spending nothing) when the slot is
    /// empty, cooling down, or no target is available.
    pub fn manual_cast(&mut self, slot_index: usize, rng: &mut impl Rng) -> bool {
        self.cast_slot(slot_index, rng)
    }

    /// Pauses auto-cast only; manual casts and everything else continue.
    pub fn set_manual_control(&mut self, enabled: bool) {
        self.manual_control = enabled;
    }

    pub fn manual_control(&self) -> bool {
        self.manual_control
    }

    /// Replaces the player's stat block (an upgraded loadout, a level-up)
    /// without touching current health beyond clamping to the new maximum.
    pub fn sync_player_stats(&mut self, stats: CombatStats, max_health: u32) {
        let player = &mut self.entities[0];
        player.stats = stats;
        player.max_health = max_health.max(1);
        player.current_health = player.current_health.min(player.max_health);
    }

    /// Spawns one enemy from the configured tier, at the given position
    /// (clamped to the arena) or on the spawn ring when none is given.
    pub fn spawn_enemy(&mut self, position: Option<Position>, rng: &mut impl Rng) -> EntityId {
        self.spawn_enemy_internal(position, rng)
    }

    /// Engages a boss: every other combatant is cleared atomically and the
    /// boss becomes the sole hostile, with its scripted attack pattern
    /// armed. No regular spawns happen while it lives.
    pub fn spawn_boss(&mut self, boss_id: BossId, rng: &mut impl Rng) -> Option<EntityId> {
        let def = *self.catalog.boss(boss_id)?;

        let cleared: Vec<EntityId> = self.entities.iter().skip(1).map(|e| e.id).collect();
        for id in cleared {
            self.effects.clear_entity(id);
        }
        self.entities.truncate(1);

        let (base_hp, base_damage, base_defense) = tier_enemy_stats(def.tier, 1);
        let (hp_mult, damage_mult, defense_mult) = BOSS_STAT_MULTIPLIERS;
        let max_health = (base_hp as f64 * hp_mult).max(1.0) as u32;
        let damage = (base_damage as f64 * damage_mult).max(1.0) as u32;
        let defense = (base_defense as f64 * defense_mult) as u32;
        let (experience, gold) = tier_enemy_rewards(def.tier);

        let id = self.allocate_id();
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let mut position = Position::new(
            SPAWN_RING_RADIUS * angle.cos(),
            SPAWN_RING_RADIUS * angle.sin(),
        );
        position.clamp_to_arena(self.config.arena_half_width, self.config.arena_half_height);

        let stats = CombatStats {
            attack: 10,
            defense,
            crit_chance_percent: 10,
            crit_damage_percent: 50,
            cooldown_reduction_percent: 0,
        };
        self.entities.push(
            Entity::new(id, EntityKind::Boss, def.name.to_string(), max_health, stats, position)
                .with_base_damage(damage)
                .with_reward(RewardValue {
                    enemy_type_id: 1000 + def.id.0,
                    experience: experience * BOSS_REWARD_MULTIPLIER,
                    gold: gold * BOSS_REWARD_MULTIPLIER,
                }),
        );
        self.boss_script = Some(BossScript {
            boss: id,
            ability: def.script_ability,
            period_ticks: def.script_period_ticks,
            next_cast_tick: self.current_tick + def.script_period_ticks,
        });
        self.pending_events.push(SessionEvent::BossEngaged {
            id,
            name: def.name.to_string(),
        });
        log::debug!("boss {} engaged on tick {}", def.name, self.current_tick);
        Some(id)
    }

    // ── The tick ─────────────────────────────────────────────────────────

    /// Runs one simulation step. See the module docs for the fixed phase
    /// order.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickReport {
        for command in self.commands.drain() {
            self.apply_command(command, rng);
        }

        self.current_tick += 1;
        let tick = self.current_tick;

        self.apply_effect_pulses(tick);

        let player_id = self.entities[0].id;
        let arena = (self.config.arena_half_width, self.config.arena_half_height);
        let attacks = run_enemy_ai(&mut self.entities, player_id, tick, &self.effects, arena, rng);
        for attack in attacks {
            self.entities[0].take_damage(attack.damage);
            self.pending_events.push(SessionEvent::EnemyAttacked {
                attacker: attack.attacker,
                damage: attack.damage,
                is_critical: attack.is_critical,
            });
        }
        self.run_boss_script(tick, rng);

        if !self.manual_control
            && self.player_alive()
            && self.has_live_hostiles()
            && !self.effects.is_stunned(player_id)
        {
            for slot_index in 0..DECK_SIZE {
                if self.deck.is_ready(slot_index, tick) {
                    self.cast_slot(slot_index, rng);
                }
            }
        }

        let outcomes = self.projectiles.resolve_due(tick, &mut self.entities);
        for outcome in outcomes {
            for hit in &outcome.hits {
                self.pending_events.push(SessionEvent::ImpactHit {
                    projectile_id: outcome.projectile_id,
                    target: hit.target,
                    damage: hit.damage,
                    is_critical: outcome.is_critical,
                });
                if !hit.lethal {
                    if let Some(template) = outcome.effect {
                        self.effects
                            .add_effect(hit.target, StatusEffect::from_template(&template, tick));
                        self.pending_events.push(SessionEvent::EffectApplied {
                            target: hit.target,
                            effect_id: template.effect_id,
                        });
                    }
                }
            }
        }

        let rewards = resolve_deaths(&mut self.entities, tick);
        if let Some(batch) = &rewards {
            for kill in &batch.kills {
                self.pending_events.push(SessionEvent::EnemySlain {
                    id: kill.entity,
                    enemy_type_id: kill.enemy_type_id,
                });
            }
            self.pending_events.push(SessionEvent::RewardsIssued {
                experience: batch.total_experience,
                gold: batch.total_gold,
                kills: batch.kills.len(),
            });
            log::debug!(
                "tick {}: credited {} kills for {} xp / {} gold",
                tick,
                batch.kills.len(),
                batch.total_experience,
                batch.total_gold
            );
        }
        let survivors: HashSet<EntityId> = self.entities.iter().map(|e| e.id).collect();
        self.effects.retain_targets(|id| survivors.contains(&id));
        if let Some(script) = self.boss_script {
            if !survivors.contains(&script.boss) {
                self.boss_script = None;
            }
        }

        if self.entities[0].current_health == 0 {
            if !self.player_downed_reported {
                self.player_downed_reported = true;
                self.pending_events.push(SessionEvent::PlayerDowned);
                log::info!("player downed on tick {}", tick);
            }
        } else {
            self.player_downed_reported = false;
        }

        if self.config.auto_spawn && !self.boss_active() {
            while self.live_enemy_count() < self.config.enemy_cap {
                self.spawn_enemy_internal(None, rng);
            }
        }

        TickReport {
            tick,
            events: std::mem::take(&mut self.pending_events),
            rewards,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let snap = |entity: &Entity| EntitySnapshot {
            id: entity.id,
            kind: entity.kind,
            name: entity.name.clone(),
            current_health: entity.current_health,
            max_health: entity.max_health,
            position: entity.position,
            effects: self
                .effects
                .effects_on(entity.id)
                .iter()
                .map(|effect| EffectSnapshot {
                    effect_id: effect.effect_id,
                    kind: effect.kind,
                    remaining_ticks: effect.remaining_ticks,
                    stacks: effect.stacks,
                })
                .collect(),
        };

        Snapshot {
            tick: self.current_tick,
            player: snap(&self.entities[0]),
            hostiles: self.entities[1..]
                .iter()
                .filter(|e| matches!(e.kind, EntityKind::Enemy | EntityKind::Boss))
                .map(snap)
                .collect(),
            allies: self.entities[1..]
                .iter()
                .filter(|e| e.kind == EntityKind::SummonedAlly)
                .map(snap)
                .collect(),
            deck: self
                .deck
                .slots()
                .iter()
                .map(|slot| {
                    slot.map(|s| SlotSnapshot {
                        ability: s.ability,
                        ready_at_tick: s.ready_at_tick,
                    })
                })
                .collect(),
            projectiles_in_flight: self.projectiles.in_flight(),
            manual_control: self.manual_control,
            boss_active: self.boss_active(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    fn has_live_hostiles(&self) -> bool {
        self.entities
            .iter()
            .any(|e| matches!(e.kind, EntityKind::Enemy | EntityKind::Boss) && e.is_alive())
    }

    fn nearest_live_hostile(&self) -> Option<(EntityId, Position, CombatStats)> {
        let player_position = self.entities[0].position;
        self.entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Enemy | EntityKind::Boss) && e.is_alive())
            .min_by(|a, b| {
                a.position
                    .distance(&player_position)
                    .partial_cmp(&b.position.distance(&player_position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| (e.id, e.position, e.stats))
    }

    fn apply_command(&mut self, command: SessionCommand, rng: &mut impl Rng) {
        match command {
            SessionCommand::Equip { ability, slot } => {
                if let Err(error) = self.equip(ability, slot) {
                    log::warn!("queued equip rejected: {}", error);
                }
            }
            SessionCommand::Cast { slot } => {
                self.cast_slot(slot, rng);
            }
            SessionCommand::SetManualControl(enabled) => self.manual_control = enabled,
            SessionCommand::SyncPlayerStats { stats, max_health } => {
                self.sync_player_stats(stats, max_health);
            }
            SessionCommand::SpawnEnemy { position } => {
                self.spawn_enemy_internal(position, rng);
            }
            SessionCommand::SpawnBoss(boss_id) => {
                if self.spawn_boss(boss_id, rng).is_none() {
                    log::warn!("queued boss spawn rejected: unknown boss {}", boss_id.0);
                }
            }
        }
    }

    fn apply_effect_pulses(&mut self, tick: u64) {
        for pulse in self.effects.process_tick(tick) {
            let entity = match self.entities.iter_mut().find(|e| e.id == pulse.target) {
                Some(entity) => entity,
                None => continue,
            };
            if !entity.is_alive() {
                continue;
            }
            match pulse.kind {
                EffectKind::DamageOverTime => {
                    entity.take_damage(pulse.amount);
                    if entity.current_health == 0 && entity.kind != EntityKind::Player {
                        entity.mark_dying(tick);
                    }
                }
                EffectKind::Heal => entity.heal(pulse.amount),
                EffectKind::Buff | EffectKind::Debuff | EffectKind::Stun => continue,
            }
            self.pending_events.push(SessionEvent::EffectPulsed {
                target: pulse.target,
                effect_id: pulse.effect_id,
                kind: pulse.kind,
                amount: pulse.amount,
            });
        }
    }

    fn run_boss_script(&mut self, tick: u64, rng: &mut impl Rng) {
        let script = match self.boss_script {
            Some(script) => script,
            None => return,
        };
        let boss_stats = match self
            .entities
            .iter()
            .find(|e| e.id == script.boss && e.is_alive())
        {
            Some(boss) => boss.stats,
            None => {
                self.boss_script = None;
                return;
            }
        };
        if tick < script.next_cast_tick || !self.player_alive() {
            return;
        }
        let def = match self.catalog.ability(script.ability) {
            Some(def) => *def,
            None => return,
        };
        let player_id = self.entities[0].id;
        let player_stats = self.entities[0].stats;
        let result = calculate_damage(def.base_damage, &boss_stats, &player_stats, rng);
        let projectile_id = self.projectiles.launch(
            def.id,
            EntityKind::Boss,
            Impact::SingleTarget(player_id),
            result.damage,
            result.is_critical,
            def.effect,
            def.travel_ms,
            tick,
        );
        self.pending_events.push(SessionEvent::ProjectileLaunched {
            projectile_id,
            ability: def.id,
        });
        if let Some(script) = &mut self.boss_script {
            script.next_cast_tick = tick + script.period_ticks;
        }
    }

    /// Shared cast path for auto-cast, manual casts, and queued casts.
    /// Readiness and targeting are checked before the cooldown is spent, so
    /// a failed cast changes nothing.
    fn cast_slot(&mut self, slot_index: usize, rng: &mut impl Rng) -> bool {
        let tick = self.current_tick;
        if !self.deck.is_ready(slot_index, tick) {
            return false;
        }
        let ability_id = match self.deck.slot(slot_index) {
            Some(slot) => slot.ability,
            None => return false,
        };
        let def = match self.catalog.ability(ability_id) {
            Some(def) => *def,
            None => return false,
        };
        let player_id = self.entities[0].id;
        if self.effects.is_stunned(player_id) {
            return false;
        }
        let player_stats = self.entities[0].stats;

        // Zero base damage marks a self-targeted utility cast
        if def.base_damage == 0 {
            if !self.deck.use_slot(
                &self.catalog,
                slot_index,
                tick,
                player_stats.cooldown_reduction_percent,
            ) {
                return false;
            }
            self.pending_events.push(SessionEvent::AbilityCast {
                slot: slot_index,
                ability: ability_id,
            });
            if let Some(template) = def.effect {
                self.effects
                    .add_effect(player_id, StatusEffect::from_template(&template, tick));
                self.pending_events.push(SessionEvent::EffectApplied {
                    target: player_id,
                    effect_id: template.effect_id,
                });
            }
            return true;
        }

        let (target_id, target_position, target_stats) = match self.nearest_live_hostile() {
            Some(target) => target,
            None => return false,
        };

        let synergy = self.deck.damage_bonus_percent(def.tags);
        let base = (def.base_damage as f64 * (1.0 + synergy as f64 / 100.0)) as u32;
        let mut attacker = player_stats;
        attacker.attack += self.effects.attack_bonus_percent(player_id);

        // Area damage is fixed at cast and cannot see per-target defense,
        // so it is computed unmitigated; single-target hits mitigate here.
        let (impact, defender) = match def.area_radius {
            Some(radius) => (
                Impact::Area {
                    point: target_position,
                    radius,
                },
                CombatStats::default(),
            ),
            None => {
                let mut defender = target_stats;
                defender.defense = defender
                    .defense
                    .saturating_sub(self.effects.defense_penalty(target_id));
                (Impact::SingleTarget(target_id), defender)
            }
        };
        let result = calculate_damage(base, &attacker, &defender, rng);

        if !self.deck.use_slot(
            &self.catalog,
            slot_index,
            tick,
            attacker.cooldown_reduction_percent,
        ) {
            return false;
        }
        let projectile_id = self.projectiles.launch(
            ability_id,
            EntityKind::Player,
            impact,
            result.damage,
            result.is_critical,
            def.effect,
            def.travel_ms,
            tick,
        );
        self.pending_events.push(SessionEvent::AbilityCast {
            slot: slot_index,
            ability: ability_id,
        });
        self.pending_events.push(SessionEvent::ProjectileLaunched {
            projectile_id,
            ability: ability_id,
        });
        true
    }

    fn spawn_enemy_internal(&mut self, at: Option<Position>, rng: &mut impl Rng) -> EntityId {
        let tier = self.config.enemy_tier;
        let (base_hp, base_damage, defense) = tier_enemy_stats(tier, self.config.tier_depth);
        let hp_variance = rng.gen_range(ENEMY_STAT_VARIANCE_MIN..ENEMY_STAT_VARIANCE_MAX);
        let damage_variance = rng.gen_range(ENEMY_STAT_VARIANCE_MIN..ENEMY_STAT_VARIANCE_MAX);
        let max_health = ((base_hp as f64) * hp_variance).max(1.0) as u32;
        let damage = ((base_damage as f64) * damage_variance).max(1.0) as u32;
        let (experience, gold) = tier_enemy_rewards(tier);

        let mut position = match at {
            Some(position) => position,
            None => {
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                Position::new(SPAWN_RING_RADIUS * angle.cos(), SPAWN_RING_RADIUS * angle.sin())
            }
        };
        position.clamp_to_arena(self.config.arena_half_width, self.config.arena_half_height);

        let id = self.allocate_id();
        let name = generate_enemy_name(tier, rng);
        let stats = CombatStats {
            attack: 0,
            defense,
            crit_chance_percent: 5,
            crit_damage_percent: 50,
            cooldown_reduction_percent: 0,
        };
        let mut entity = Entity::new(id, EntityKind::Enemy, name.clone(), max_health, stats, position)
            .with_base_damage(damage)
            .with_reward(RewardValue {
                enemy_type_id: tier,
                experience,
                gold,
            });
        // Fresh spawns wait a full attack cooldown before swinging
        entity.last_attack_tick = self.current_tick;
        self.entities.push(entity);
        self.pending_events
            .push(SessionEvent::EnemySpawned { id, name });
        id
    }
}
