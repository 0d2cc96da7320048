//! Single-writer intent queue.
//!
//! Callers outside the tick path queue intents instead of mutating the
//! session; the session drains the queue once per tick, in arrival order,
//! before anything else runs. That keeps every mutation serialized on the
//! tick path.

use std::collections::VecDeque;

use crate::catalog::{AbilityId, BossId};
use crate::combat::entity::Position;
use crate::combat::stats::CombatStats;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Equip { ability: AbilityId, slot: usize },
    Cast { slot: usize },
    SetManualControl(bool),
    SyncPlayerStats { stats: CombatStats, max_health: u32 },
    SpawnEnemy { position: Option<Position> },
    SpawnBoss(BossId),
}

#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<SessionCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: SessionCommand) {
        self.pending.push_back(command);
    }

    /// Takes every pending command in arrival order.
    pub fn drain(&mut self) -> Vec<SessionCommand> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
