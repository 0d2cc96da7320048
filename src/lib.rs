//! Skirmish - Real-Time Combat Simulation Core
//!
//! An embeddable, deterministic combat engine: a fixed-interval tick
//! scheduler drives `CombatSession` values that own their entities, ability
//! deck, status effects, and in-flight projectiles. All mutation happens on
//! the session's own tick path; callers observe results through per-tick
//! event reports and read-only snapshots.

pub mod catalog;
pub mod combat;
pub mod core;

pub use crate::catalog::Catalog;
pub use crate::combat::session::{CombatSession, SessionConfig, SessionEvent, TickReport};
pub use crate::core::constants::TICK_INTERVAL_MS;
pub use crate::core::scheduler::TickScheduler;
