//! Static reference data: abilities, synergy rules, enemy tiers, bosses.

#![allow(unused_imports)]

pub mod data;

pub use data::*;
