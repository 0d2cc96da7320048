//! Entity model: players, enemies, bosses, and summoned allies.

use serde::{Deserialize, Serialize};

use crate::catalog::Element;
use crate::combat::stats::CombatStats;

/// Session-local entity identifier. Ids are handed out sequentially by the
/// owning session, so a seeded run reproduces the same ids every time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn clamp_to_arena(&mut self, half_width: f64, half_height: f64) {
        self.x = self.x.clamp(-half_width, half_width);
        self.y = self.y.clamp(-half_height, half_height);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
    SummonedAlly,
}

impl EntityKind {
    fn is_player_side(self) -> bool {
        matches!(self, EntityKind::Player | EntityKind::SummonedAlly)
    }

    pub fn is_hostile_to(self, other: EntityKind) -> bool {
        self.is_player_side() != other.is_player_side()
    }
}

/// Per-enemy behavior phase. Bosses ignore this (their attacks come from a
/// scripted pattern, not the approach/attack loop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiPhase {
    Approaching,
    Attacking,
    Dead,
}

/// Marks an entity that reached zero health this tick. Marked entities are
/// no longer valid targets but stay in the list until the death sweep, so
/// nothing else in the same tick can kill them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyingMark {
    pub since_tick: u64,
}

/// What killing this entity is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardValue {
    pub enemy_type_id: u32,
    pub experience: u64,
    pub gold: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub current_health: u32,
    pub max_health: u32,
    pub stats: CombatStats,
    /// Base damage of this entity's contact attack. Abilities carry their
    /// own base damage instead.
    pub base_damage: u32,
    pub position: Position,
    pub last_attack_tick: u64,
    pub element: Option<Element>,
    pub ai_phase: AiPhase,
    pub dying: Option<DyingMark>,
    pub reward: Option<RewardValue>,
    pub reward_credited: bool,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        name: String,
        max_health: u32,
        stats: CombatStats,
        position: Position,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            current_health: max_health,
            max_health,
            stats,
            base_damage: 0,
            position,
            last_attack_tick: 0,
            element: None,
            ai_phase: AiPhase::Approaching,
            dying: None,
            reward: None,
            reward_credited: false,
        }
    }

    pub fn with_base_damage(mut self, base_damage: u32) -> Self {
        self.base_damage = base_damage;
        self
    }

    pub fn with_reward(mut self, reward: RewardValue) -> Self {
        self.reward = Some(reward);
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Alive means targetable: positive health and not yet swept into dying.
    pub fn is_alive(&self) -> bool {
        self.current_health > 0 && self.dying.is_none()
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current_health = self
            .current_health
            .saturating_add(amount)
            .min(self.max_health);
    }

    pub fn mark_dying(&mut self, current_tick: u64) {
        if self.dying.is_none() {
            self.dying = Some(DyingMark {
                since_tick: current_tick,
            });
        }
    }
}
