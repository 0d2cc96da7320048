//! Entities, abilities, status effects, projectiles, and session orchestration.

#![allow(unused_imports)]

pub mod abilities;
pub mod effects;
pub mod enemy_ai;
pub mod entity;
pub mod projectiles;
pub mod rewards;
pub mod session;
pub mod snapshot;
pub mod stats;

pub use abilities::*;
pub use effects::*;
pub use enemy_ai::*;
pub use entity::*;
pub use projectiles::*;
pub use rewards::*;
pub use session::*;
pub use snapshot::*;
pub use stats::*;
