//! Ability, boss, and enemy tier definitions.
//!
//! All reference data is static tables; a [`Catalog`] value indexes them for
//! lookup and validates the synergy rules at construction.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::effects::EffectKind;
use crate::core::constants::{TIER_ENEMY_REWARDS, TIER_ENEMY_STATS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AbilityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BossId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AbilityTag {
    Strike,
    Aoe,
    Dot,
    Buff,
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Frost,
    Storm,
    Venom,
    Shadow,
    Radiant,
}

/// Blueprint for the status effect an ability applies on hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectTemplate {
    pub effect_id: u32,
    pub kind: EffectKind,
    pub duration_ticks: u64,
    pub tick_interval: u64,
    pub value: u32,
    pub stackable: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: &'static str,
    pub tags: &'static [AbilityTag],
    /// Zero means a self-targeted utility cast (heal or buff).
    pub base_damage: u32,
    pub cooldown_ticks: u64,
    /// Flight time in milliseconds, converted to ticks at launch.
    pub travel_ms: u64,
    pub area_radius: Option<f64>,
    pub effect: Option<EffectTemplate>,
    pub element: Option<Element>,
}

/// When `min_distinct` equipped abilities carry `tag`, casts with that tag
/// gain `bonus_percent` damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SynergyRule {
    pub tag: AbilityTag,
    pub min_distinct: usize,
    pub bonus_percent: u32,
}

pub const ABILITIES: [AbilityDef; 8] = [
    AbilityDef {
        id: AbilityId(1),
        name: "Fireball",
        tags: &[AbilityTag::Strike, AbilityTag::Dot],
        base_damage: 40,
        cooldown_ticks: 20,
        travel_ms: 300,
        area_radius: None,
        effect: Some(EffectTemplate {
            effect_id: 101,
            kind: EffectKind::DamageOverTime,
            duration_ticks: 30,
            tick_interval: 10,
            value: 5,
            stackable: true,
        }),
        element: Some(Element::Fire),
    },
    AbilityDef {
        id: AbilityId(2),
        name: "Frost Nova",
        tags: &[AbilityTag::Aoe],
        base_damage: 30,
        cooldown_ticks: 40,
        travel_ms: 0,
        area_radius: Some(80.0),
        effect: Some(EffectTemplate {
            effect_id: 102,
            kind: EffectKind::Debuff,
            duration_ticks: 30,
            tick_interval: 10,
            value: 10,
            stackable: false,
        }),
        element: Some(Element::Frost),
    },
    AbilityDef {
        id: AbilityId(3),
        name: "Venom Dart",
        tags: &[AbilityTag::Strike, AbilityTag::Dot],
        base_damage: 15,
        cooldown_ticks: 15,
        travel_ms: 250,
        area_radius: None,
        effect: Some(EffectTemplate {
            effect_id: 103,
            kind: EffectKind::DamageOverTime,
            duration_ticks: 50,
            tick_interval: 5,
            value: 4,
            stackable: true,
        }),
        element: Some(Element::Venom),
    },
    AbilityDef {
        id: AbilityId(4),
        name: "Mending Light",
        tags: &[AbilityTag::Heal],
        base_damage: 0,
        cooldown_ticks: 60,
        travel_ms: 0,
        area_radius: None,
        effect: Some(EffectTemplate {
            effect_id: 104,
            kind: EffectKind::Heal,
            duration_ticks: 40,
            tick_interval: 10,
            value: 25,
            stackable: false,
        }),
        element: Some(Element::Radiant),
    },
    AbilityDef {
        id: AbilityId(5),
        name: "Battle Fury",
        tags: &[AbilityTag::Buff],
        base_damage: 0,
        cooldown_ticks: 80,
        travel_ms: 0,
        area_radius: None,
        effect: Some(EffectTemplate {
            effect_id: 105,
            kind: EffectKind::Buff,
            duration_ticks: 50,
            tick_interval: 10,
            value: 20,
            stackable: false,
        }),
        element: None,
    },
    AbilityDef {
        id: AbilityId(6),
        name: "Thunder Coil",
        tags: &[AbilityTag::Strike, AbilityTag::Aoe],
        base_damage: 55,
        cooldown_ticks: 50,
        travel_ms: 400,
        area_radius: Some(60.0),
        effect: None,
        element: Some(Element::Storm),
    },
    AbilityDef {
        id: AbilityId(7),
        name: "Shadow Lash",
        tags: &[AbilityTag::Strike],
        base_damage: 25,
        cooldown_ticks: 10,
        travel_ms: 200,
        area_radius: None,
        effect: None,
        element: Some(Element::Shadow),
    },
    AbilityDef {
        id: AbilityId(8),
        name: "Plague Burst",
        tags: &[AbilityTag::Aoe, AbilityTag::Dot],
        base_damage: 20,
        cooldown_ticks: 45,
        travel_ms: 350,
        area_radius: Some(70.0),
        effect: Some(EffectTemplate {
            effect_id: 106,
            kind: EffectKind::DamageOverTime,
            duration_ticks: 40,
            tick_interval: 10,
            value: 6,
            stackable: true,
        }),
        element: Some(Element::Venom),
    },
];

pub const SYNERGY_RULES: [SynergyRule; 3] = [
    SynergyRule {
        tag: AbilityTag::Strike,
        min_distinct: 2,
        bonus_percent: 10,
    },
    SynergyRule {
        tag: AbilityTag::Aoe,
        min_distinct: 2,
        bonus_percent: 15,
    },
    SynergyRule {
        tag: AbilityTag::Dot,
        min_distinct: 2,
        bonus_percent: 20,
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BossDef {
    pub id: BossId,
    pub name: &'static str,
    pub tier: u32,
    /// Ability fired at the player on a fixed cadence.
    pub script_ability: AbilityId,
    pub script_period_ticks: u64,
}

pub const BOSSES: [BossDef; 3] = [
    BossDef {
        id: BossId(1),
        name: "Ashen Tyrant",
        tier: 3,
        script_ability: AbilityId(1),
        script_period_ticks: 30,
    },
    BossDef {
        id: BossId(2),
        name: "Herald of the Maw",
        tier: 5,
        script_ability: AbilityId(6),
        script_period_ticks: 40,
    },
    BossDef {
        id: BossId(3),
        name: "Storm Sovereign",
        tier: 8,
        script_ability: AbilityId(6),
        script_period_ticks: 25,
    },
];

/// Looks up tier base stats. Returns (hp, damage, defense) before variance.
/// Tiers are 1-indexed; out-of-range tiers clamp to the last table entry.
pub fn tier_enemy_stats(tier: u32, depth: u32) -> (u32, u32, u32) {
    let index = (tier.saturating_sub(1) as usize).min(TIER_ENEMY_STATS.len() - 1);
    let (base_hp, hp_step, base_dmg, dmg_step, base_def, def_step) = TIER_ENEMY_STATS[index];
    let offset = depth.saturating_sub(1);
    (
        base_hp + offset * hp_step,
        base_dmg + offset * dmg_step,
        base_def + offset * def_step,
    )
}

/// Kill reward (experience, gold) for a tier, clamped like the stat table.
pub fn tier_enemy_rewards(tier: u32) -> (u64, u64) {
    let index = (tier.saturating_sub(1) as usize).min(TIER_ENEMY_REWARDS.len() - 1);
    TIER_ENEMY_REWARDS[index]
}

fn tier_name_prefixes(tier: u32) -> &'static [&'static str] {
    match tier {
        1 => &["Feral", "Mangy", "Young", "Stray", "Restless"],
        2 => &["Thorned", "Gloom", "Tangled", "Creeping", "Mossback"],
        3 => &["Cinder", "Scorched", "Ashen", "Smolder", "Charred"],
        4 => &["Hollow", "Pale", "Sunken", "Buried", "Echoing"],
        5 => &["Storm", "Galebound", "Crackling", "Skyborn", "Howling"],
        6 => &["Shattered", "Glass", "Riven", "Splintered", "Jagged"],
        7 => &["Nether", "Void", "Umbral", "Scarred", "Dread"],
        _ => &["Maw", "Ravenous", "Gorging", "Endless", "Abyssal"],
    }
}

fn tier_name_suffixes(tier: u32) -> &'static [&'static str] {
    match tier {
        1 => &["Jackal", "Boar", "Raven", "Viper", "Hound"],
        2 => &["Stalker", "Treant", "Widow", "Shambler", "Wisp"],
        3 => &["Salamander", "Imp", "Drake", "Ravager", "Husk"],
        4 => &["Wight", "Crawler", "Ghoul", "Lurker", "Revenant"],
        5 => &["Harpy", "Djinn", "Roc", "Elemental", "Herald"],
        6 => &["Golem", "Sentinel", "Shardling", "Colossus", "Warden"],
        7 => &["Fiend", "Reaver", "Horror", "Butcher", "Shade"],
        _ => &["Devourer", "Leviathan", "Tyrant", "Behemoth", "Maw"],
    }
}

/// Generates a tier-themed enemy name.
pub fn generate_enemy_name(tier: u32, rng: &mut impl Rng) -> String {
    let prefixes = tier_name_prefixes(tier);
    let suffixes = tier_name_suffixes(tier);
    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    let suffix = suffixes[rng.gen_range(0..suffixes.len())];
    format!("{} {}", prefix, suffix)
}

/// Indexed reference data plus validated synergy rules.
#[derive(Debug, Clone)]
pub struct Catalog {
    abilities: HashMap<AbilityId, AbilityDef>,
    bosses: HashMap<BossId, BossDef>,
    synergy_rules: Vec<SynergyRule>,
}

impl Catalog {
    /// Builds the standard catalog. Synergy rules that no deck could ever
    /// satisfy (fewer abilities carry the tag than the rule requires) are
    /// dropped with a warning.
    pub fn standard() -> Self {
        Self::with_rules(SYNERGY_RULES.to_vec())
    }

    pub fn with_rules(rules: Vec<SynergyRule>) -> Self {
        let abilities: HashMap<AbilityId, AbilityDef> =
            ABILITIES.iter().map(|def| (def.id, *def)).collect();
        let bosses: HashMap<BossId, BossDef> =
            BOSSES.iter().map(|def| (def.id, *def)).collect();

        let synergy_rules = rules
            .into_iter()
            .filter(|rule| {
                let carriers = abilities
                    .values()
                    .filter(|def| def.tags.contains(&rule.tag))
                    .count();
                if carriers < rule.min_distinct {
                    log::warn!(
                        "dropping unattainable synergy rule for {:?}: needs {} carriers, catalog has {}",
                        rule.tag,
                        rule.min_distinct,
                        carriers
                    );
                    return false;
                }
                true
            })
            .collect();

        Self {
            abilities,
            bosses,
            synergy_rules,
        }
    }

    pub fn ability(&self, id: AbilityId) -> Option<&AbilityDef> {
        self.abilities.get(&id)
    }

    pub fn boss(&self, id: BossId) -> Option<&BossDef> {
        self.bosses.get(&id)
    }

    pub fn synergy_rules(&self) -> &[SynergyRule] {
        &self.synergy_rules
    }
}
