// Tick and timing
pub const TICK_INTERVAL_MS: u64 = 100;
pub const TICKS_PER_SECOND: u32 = 10;

// Ability deck
pub const DECK_SIZE: usize = 5;
pub const MAX_COOLDOWN_REDUCTION_PERCENT: u32 = 80;

// Status effects
pub const MAX_EFFECT_STACKS: u32 = 10;

// Damage
pub const MIN_DAMAGE: u32 = 1;

// Arena bounds (positions are clamped to ±half extents)
pub const ARENA_HALF_WIDTH: f64 = 500.0;
pub const ARENA_HALF_HEIGHT: f64 = 500.0;

// Enemy population
pub const DEFAULT_ENEMY_CAP: usize = 5;
pub const SPAWN_RING_RADIUS: f64 = 320.0;

// Enemy AI movement and attacks
pub const ENEMY_ATTACK_RANGE: f64 = 60.0;
pub const ENEMY_STANDOFF_DISTANCE: f64 = 48.0;
pub const ENEMY_MOVE_STEP: f64 = 12.0;
pub const ENEMY_MOVE_JITTER: f64 = 2.0;
pub const ENEMY_ATTACK_COOLDOWN_TICKS: u64 = 20;

// Enemy tier base stats: (base_hp, hp_step, base_dmg, dmg_step, base_def, def_step)
// Index 0 = Tier 1. Steps are per-depth increments above depth 1.
pub const TIER_ENEMY_STATS: [(u32, u32, u32, u32, u32, u32); 8] = [
    (60, 10, 8, 2, 0, 0),      // Tier 1: Outskirts
    (110, 16, 14, 3, 3, 1),    // Tier 2: Wildwood
    (180, 24, 23, 5, 8, 2),    // Tier 3: Cinder Flats
    (260, 30, 34, 6, 14, 3),   // Tier 4: Hollow Depths
    (360, 38, 47, 8, 21, 3),   // Tier 5: Stormreach
    (480, 46, 62, 10, 30, 4),  // Tier 6: Shattered Spire
    (620, 56, 80, 12, 40, 5),  // Tier 7: Netherscar
    (800, 68, 101, 14, 52, 6), // Tier 8: The Maw
];

// Enemy reward values: (experience, gold) at tier depth 1
pub const TIER_ENEMY_REWARDS: [(u64, u64); 8] = [
    (12, 5),
    (22, 9),
    (38, 15),
    (60, 24),
    (90, 36),
    (130, 52),
    (185, 74),
    (260, 104),
];

// Boss multipliers: (hp_mult, dmg_mult, def_mult)
pub const BOSS_STAT_MULTIPLIERS: (f64, f64, f64) = (5.0, 1.8, 2.2);
pub const BOSS_REWARD_MULTIPLIER: u64 = 10;

// Enemy stat variance
pub const ENEMY_STAT_VARIANCE_MIN: f64 = 0.9;
pub const ENEMY_STAT_VARIANCE_MAX: f64 = 1.1;

// Player defaults
pub const PLAYER_BASE_HP: u32 = 250;
