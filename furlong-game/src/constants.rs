//! Centralized balance and tuning constants for Furlong game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets. Values the orchestrator may legitimately retune live on
//! `GameConfig` instead.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_RACE_PLACED: &str = "log.race.placed";
pub(crate) const LOG_RACE_UNPLACED: &str = "log.race.unplaced";
pub(crate) const LOG_STABLE_BRED: &str = "log.stable.bred";
pub(crate) const LOG_STABLE_PURCHASED: &str = "log.stable.purchased";
pub(crate) const LOG_SEASON_WON: &str = "log.season.won";

// Stat bands ---------------------------------------------------------------
pub(crate) const PLAYER_SPEED_MIN: i32 = 30;
pub(crate) const PLAYER_SPEED_MAX: i32 = 100;
pub(crate) const BRED_STAT_MIN: i32 = 30;
pub(crate) const BRED_STAT_MAX: i32 = 105;
pub(crate) const BOOSTER_GEN_MIN: i32 = 30;
pub(crate) const BOOSTER_GEN_MAX: i32 = 100;
pub(crate) const DISTANCE_PREF_MIN: i32 = 800;
pub(crate) const DISTANCE_PREF_MAX: i32 = 2600;
pub(crate) const BRED_DISTANCE_MIN: i32 = 600;
pub(crate) const BRED_DISTANCE_MAX: i32 = 2800;
pub(crate) const FATIGUE_MAX: i32 = 100;
pub(crate) const MAX_TRAITS: usize = 3;
pub(crate) const FIRST_RACE_STAT_BONUS: i32 = 3;
pub(crate) const HUE_DEGREES: f32 = 360.0;
pub(crate) const BRED_HUE_JITTER: f32 = 30.0;

// Performance model --------------------------------------------------------
pub(crate) const SPEED_MIDPOINT: f64 = 65.0;
pub(crate) const SPEED_HALF_RANGE: f64 = 35.0;
pub(crate) const DISTANCE_FIT_MIDPOINT: f64 = 0.55;
pub(crate) const DISTANCE_FIT_HALF_RANGE: f64 = 0.45;
pub(crate) const DISTANCE_FIT_FLOOR: f64 = 0.1;
pub(crate) const DISTANCE_FIT_MAX_DEVIATION: f64 = 1800.0;
pub(crate) const FATIGUE_PERFORMANCE_FLOOR: f64 = 0.5;
pub(crate) const BOOST_ENERGY_FACTOR: f64 = 1.3;
pub(crate) const BOOST_FOCUS_FACTOR: f64 = 1.2;
pub(crate) const BOOST_LUCK_BASE: f64 = 1.1;
pub(crate) const BOOST_LUCK_SPREAD: f64 = 0.3;

// Specialization tuning ----------------------------------------------------
pub(crate) const CHAMPION_WIN_THRESHOLD: u32 = 1;
pub(crate) const MASTER_WIN_THRESHOLD: u32 = 3;
pub(crate) const LEGEND_WIN_THRESHOLD: u32 = 6;
pub(crate) const ROOKIE_PLUS_SCORE: f64 = 0.5;
pub(crate) const SECOND_PLACE_WEIGHT: f64 = 0.5;
pub(crate) const CHAMPION_SPEED_BONUS: f64 = 0.04;
pub(crate) const CHAMPION_COMEBACK_SPEED_BONUS: f64 = 0.08;
pub(crate) const MASTER_SPEED_BONUS: f64 = 0.08;
pub(crate) const LEGEND_SPEED_BONUS: f64 = 0.12;

// Breeding tuning ----------------------------------------------------------
pub(crate) const BREEDING_BONUS: f64 = 1.05;
pub(crate) const BREEDING_COMEBACK_BONUS: f64 = 1.10;
pub(crate) const TRAIT_INHERIT_CHANCE: f64 = 0.6;
pub(crate) const TRAIT_MUTATION_CHANCE: f64 = 0.2;
pub(crate) const SPEED_NOISE_MEAN: f64 = 5.0;
pub(crate) const SPEED_NOISE_STD_DEV: f64 = 5.0;
pub(crate) const BOOSTER_NOISE_STD_DEV: f64 = 10.0;
pub(crate) const DISTANCE_NOISE_STD_DEV: f64 = 200.0;

// Race engine tuning -------------------------------------------------------
pub(crate) const PHASE_BASE_CHANCE: f64 = 0.02;
pub(crate) const TRAIT_CHANCE_TICK_SCALE: f64 = 50.0;
pub(crate) const SINCE_EVENT_ESCALATION: f64 = 0.05;
pub(crate) const LATE_RACE_ESCALATION: f64 = 0.8;
pub(crate) const STRUGGLE_POOL_CHANCE: f64 = 0.2;
pub(crate) const STRUGGLE_POOL_WEIGHT: f64 = 1.0;
pub(crate) const EARLY_WINDOW_END: f64 = 0.2;
pub(crate) const MID_WINDOW_END: f64 = 0.7;
pub(crate) const EARLY_PHASE_WEIGHT: f64 = 2.0;
pub(crate) const MID_PHASE_WEIGHT: f64 = 1.25;
pub(crate) const LATE_PHASE_WEIGHT: f64 = 2.0;
pub(crate) const BOOSTER_POWER_MIDPOINT: f64 = 100.0;
pub(crate) const BASE_STEP_SIZE: f64 = 2.5;
pub(crate) const PERFORMANCE_STEP_FACTOR: f64 = 2.0;
pub(crate) const INITIAL_MOMENTUM_BASE: f64 = 0.5;
pub(crate) const INITIAL_ENERGY_BASE: f64 = 80.0;
pub(crate) const MOMENTUM_MIN: f64 = 0.4;
pub(crate) const MOMENTUM_MAX: f64 = 1.6;
pub(crate) const MOMENTUM_DRIFT_SPREAD: f64 = 0.06;
pub(crate) const SURGE_MOMENTUM_GAIN: f64 = 0.05;
pub(crate) const SURGE_MOMENTUM_CAP: f64 = 1.5;
pub(crate) const STRUGGLE_MOMENTUM_LOSS: f64 = 0.1;
pub(crate) const STRUGGLE_MOMENTUM_FLOOR: f64 = 0.3;
pub(crate) const MOVEMENT_JITTER_SPREAD: f64 = 0.4;
pub(crate) const MIN_TICK_MOVEMENT: f64 = 0.3;
pub(crate) const ENERGY_FLOOR: f64 = 10.0;
pub(crate) const ENERGY_BASE_DRAIN: f64 = 0.8;
pub(crate) const ENERGY_EFFORT_DRAIN: f64 = 0.3;
pub(crate) const ENERGY_FACTOR_FLOOR: f64 = 0.3;
pub(crate) const PHASE_EFFORT_WEIGHT: f64 = 0.2;
pub(crate) const FINISH_LINE_PROGRESS: f64 = 100.0;
pub(crate) const MIN_FINISHERS_FOR_EARLY_END: usize = 3;
pub(crate) const MIN_TICKS_BEFORE_EARLY_END: u32 = 35;
/// Structural worst case is 100 / 0.3 ≈ 334 ticks; the runner uses this
/// slightly larger bound as a hard stop.
pub(crate) const RACE_TICK_HARD_LIMIT: u32 = 400;

// Economy tuning -----------------------------------------------------------
pub(crate) const ENTRY_BASE_FEE: f64 = 10.0;
pub(crate) const ENTRY_FEE_CAP: i64 = 200;
pub(crate) const ENTRY_MED_FACTOR: f64 = 2.5;
pub(crate) const ENTRY_MAX_FACTOR: f64 = 5.0;
pub(crate) const PRIZE_FIRST_SHARE: f64 = 0.7;
pub(crate) const PRIZE_SECOND_SHARE: f64 = 0.2;
pub(crate) const PRIZE_THIRD_SHARE: f64 = 0.1;
pub(crate) const AFFORDABILITY_DESPERATE: f64 = 1.2;
pub(crate) const AFFORDABILITY_STRUGGLING: f64 = 2.0;
pub(crate) const AFFORDABILITY_TIGHT: f64 = 4.0;
pub(crate) const COMEBACK_MAXIMUM: f64 = 3.0;
pub(crate) const COMEBACK_STRONG: f64 = 2.0;
pub(crate) const COMEBACK_MINOR: f64 = 1.5;
pub(crate) const COMEBACK_NONE: f64 = 1.0;
pub(crate) const UPGRADE_SPEED_BASE: f64 = 8.0;
pub(crate) const UPGRADE_VETERAN_BASE: f64 = 3.0;
pub(crate) const UPGRADE_STABLE_SPEED_BASE: f64 = 2.0;
pub(crate) const UPGRADE_MIRACLE_SPEED: i32 = 15;
pub(crate) const UPGRADE_STAT_CAP: i32 = 100;
pub(crate) const UPGRADE_OPTION_COUNT: usize = 3;
pub(crate) const BREEDING_MIN_HORSES: usize = 2;

// Scout tuning -------------------------------------------------------------
pub(crate) const SCOUT_SPEED_VISIBILITY_THRESHOLD: u64 = 4;
pub(crate) const SCOUT_TRAITS_VISIBILITY_THRESHOLD: u64 = 3;
pub(crate) const SCOUT_DISTANCE_VISIBILITY_THRESHOLD: u64 = 5;
pub(crate) const SCOUT_ESTIMATE_DAMPING: f64 = 0.9;
pub(crate) const SCOUT_EXACT_SPEED_LEAK_CHANCE: f64 = 0.3;
pub(crate) const SCOUT_TRAIT_REPORT_CHANCE: f64 = 0.5;
pub(crate) const SCOUT_MUCH_FASTER_MARGIN: i32 = 10;
pub(crate) const SCOUT_FASTER_MARGIN: i32 = 5;
pub(crate) const SCOUT_FIT_PERFECT: f64 = 0.8;
pub(crate) const SCOUT_FIT_POOR: f64 = 0.5;
pub(crate) const SCOUT_FIT_SUBOPTIMAL: f64 = 0.6;
pub(crate) const SCOUT_THREAT_MAJOR: f64 = 1.4;
pub(crate) const SCOUT_THREAT_STRONG: f64 = 1.2;
pub(crate) const SCOUT_THREAT_WEAK: f64 = 0.75;
pub(crate) const SCOUT_FALLBACK_SPEED: i32 = 50;
pub(crate) const REPUTATION_ELITE: i32 = 95;
pub(crate) const REPUTATION_STRONG: i32 = 85;
pub(crate) const REPUTATION_RISING: i32 = 70;
pub(crate) const REPUTATION_AVERAGE: i32 = 50;
pub(crate) const WIN_CHANCE_TRAIT_STEP: f64 = 0.1;
pub(crate) const WIN_CHANCE_TRAIT_CAP: f64 = 1.2;
pub(crate) const STRONG_SPEED_THRESHOLD: i32 = 70;
pub(crate) const WEAK_SPEED_THRESHOLD: i32 = 50;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
