//! Tick scheduling, session commands, and tuning constants.

#![allow(unused_imports)]

pub mod commands;
pub mod constants;
pub mod scheduler;

pub use commands::*;
pub use constants::*;
pub use scheduler::*;
