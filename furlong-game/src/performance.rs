//! Performance model: distance fit, race-day multiplier, specialization.
//!
//! The multiplier is computed once per race and stays fixed for its
//! duration; per-tick variation comes from momentum and phases instead.

use rand::Rng;

use crate::config::{BoostKind, GameConfig};
use crate::constants::{
    BOOST_ENERGY_FACTOR, BOOST_FOCUS_FACTOR, BOOST_LUCK_BASE, BOOST_LUCK_SPREAD,
    CHAMPION_COMEBACK_SPEED_BONUS, CHAMPION_SPEED_BONUS, DISTANCE_FIT_FLOOR,
    DISTANCE_FIT_HALF_RANGE, DISTANCE_FIT_MAX_DEVIATION, DISTANCE_FIT_MIDPOINT,
    FATIGUE_PERFORMANCE_FLOOR, LEGEND_SPEED_BONUS, MASTER_SPEED_BONUS, SPEED_HALF_RANGE,
    SPEED_MIDPOINT,
};
use crate::economy::calculate_comeback_bonus;
use crate::horse::{Horse, SpecializationLevel};

/// How well a horse fits a race distance, in `[0.1, 1.0]`.
///
/// Linear falloff over the maximum possible deviation, floored so no horse
/// is ever impossible, only heavily penalized.
#[must_use]
pub fn calculate_distance_fit(horse: &Horse, race_distance: u32) -> f64 {
    let deviation = f64::from((horse.distance_preference - i32_distance(race_distance)).abs());
    (1.0 - deviation / DISTANCE_FIT_MAX_DEVIATION).max(DISTANCE_FIT_FLOOR)
}

/// Passive performance bonus from career tier.
///
/// The Champion bonus is replaced by a larger constant while comeback
/// assistance is active, helping losing players catch up once they have
/// any winning horse.
#[must_use]
pub fn specialization_bonus(
    cfg: &GameConfig,
    horse: &Horse,
    race_number: u32,
    wallet: i64,
) -> f64 {
    let comeback_active = calculate_comeback_bonus(cfg, race_number, wallet) > 1.0;
    match horse.specialization_level() {
        SpecializationLevel::Rookie | SpecializationLevel::RookiePlus => 0.0,
        SpecializationLevel::Champion => {
            if comeback_active {
                CHAMPION_COMEBACK_SPEED_BONUS
            } else {
                CHAMPION_SPEED_BONUS
            }
        }
        SpecializationLevel::Master => MASTER_SPEED_BONUS,
        SpecializationLevel::Legend => LEGEND_SPEED_BONUS,
    }
}

/// Race-day performance multiplier.
///
/// Raw speed contributes a bounded deviation around a neutral midpoint so
/// distance fit, traits, and in-race randomness matter as much as the
/// stat. Fatigue degrades linearly to a floor of one half.
pub fn calculate_horse_performance<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    horse: &Horse,
    race_distance: u32,
    boost: Option<BoostKind>,
    race_number: u32,
    wallet: i64,
) -> f64 {
    let speed_normalized = (f64::from(horse.speed) - SPEED_MIDPOINT) / SPEED_HALF_RANGE;
    let speed_factor = 1.0 + speed_normalized * cfg.speed_impact_scaling;

    let raw_fit = calculate_distance_fit(horse, race_distance);
    let fit_normalized = (raw_fit - DISTANCE_FIT_MIDPOINT) / DISTANCE_FIT_HALF_RANGE;
    let distance_factor = 1.0 + fit_normalized * cfg.distance_impact_scaling;

    let fatigue_factor =
        (1.0 - f64::from(horse.fatigue) / 100.0).max(FATIGUE_PERFORMANCE_FLOOR);

    let boost_factor = match boost {
        Some(BoostKind::Energy) => BOOST_ENERGY_FACTOR,
        Some(BoostKind::Focus) => BOOST_FOCUS_FACTOR,
        Some(BoostKind::Luck) => BOOST_LUCK_BASE + rng.r#gen::<f64>() * BOOST_LUCK_SPREAD,
        None => 1.0,
    };

    let specialization_factor = 1.0 + specialization_bonus(cfg, horse, race_number, wallet);

    speed_factor * distance_factor * fatigue_factor * boost_factor * specialization_factor
}

fn i32_distance(race_distance: u32) -> i32 {
    i32::try_from(race_distance).unwrap_or(i32::MAX)
}
