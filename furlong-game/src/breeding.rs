//! Breeding: two parents produce one offspring, parents unaffected.

use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

use crate::config::{GameConfig, TraitId};
use crate::constants::{
    BRED_DISTANCE_MAX, BRED_DISTANCE_MIN, BRED_HUE_JITTER, BRED_STAT_MAX, BRED_STAT_MIN,
    BREEDING_BONUS, BREEDING_COMEBACK_BONUS, DISTANCE_NOISE_STD_DEV, HUE_DEGREES, MAX_TRAITS,
    SPEED_NOISE_MEAN, SPEED_NOISE_STD_DEV, TRAIT_INHERIT_CHANCE, TRAIT_MUTATION_CHANCE,
    BOOSTER_NOISE_STD_DEV,
};
use crate::economy::calculate_comeback_bonus;
use crate::horse::{Horse, HorseIdAllocator, random_catalog_trait, random_name};
use crate::numbers::round_f64_to_i32;
use crate::rng::normal;

/// Breed two horses into a player-owned offspring.
///
/// Stats average the parents, get a breeding bonus (larger while comeback
/// assistance is active), then pick up normal-distributed noise before
/// clamping to the wider post-breeding band. Traits inherit independently
/// with a chance of one mutation; the offspring always ends up with one to
/// three traits.
pub fn breed_horses<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    ids: &mut HorseIdAllocator,
    parent1: &Horse,
    parent2: &Horse,
    race_number: u32,
    wallet: i64,
) -> Horse {
    let avg_speed = f64::from(parent1.speed + parent2.speed) / 2.0;
    let avg_booster = f64::from(parent1.booster_power + parent2.booster_power) / 2.0;
    let avg_distance =
        f64::from(parent1.distance_preference + parent2.distance_preference) / 2.0;

    let breeding_bonus = if calculate_comeback_bonus(cfg, race_number, wallet) > 1.0 {
        BREEDING_COMEBACK_BONUS
    } else {
        BREEDING_BONUS
    };

    let speed_noise = normal(rng, SPEED_NOISE_MEAN, SPEED_NOISE_STD_DEV);
    let booster_noise = normal(rng, 0.0, BOOSTER_NOISE_STD_DEV);
    let distance_noise = normal(rng, 0.0, DISTANCE_NOISE_STD_DEV);

    let speed = round_f64_to_i32(avg_speed * breeding_bonus + speed_noise)
        .clamp(BRED_STAT_MIN, BRED_STAT_MAX);
    let booster_power = round_f64_to_i32(avg_booster * breeding_bonus + booster_noise)
        .clamp(BRED_STAT_MIN, BRED_STAT_MAX);
    let distance_preference = round_f64_to_i32(avg_distance + distance_noise)
        .clamp(BRED_DISTANCE_MIN, BRED_DISTANCE_MAX);

    let traits = inherit_traits(cfg, rng, parent1, parent2);

    let parent_hue = (parent1.color_hue + parent2.color_hue) / 2.0;
    let jitter = rng.gen_range(-BRED_HUE_JITTER..=BRED_HUE_JITTER);
    let color_hue = (parent_hue + jitter).rem_euclid(HUE_DEGREES);

    Horse {
        id: ids.allocate(),
        name: random_name(cfg, rng),
        speed,
        booster_power,
        distance_preference,
        color_hue,
        is_player: true,
        fatigue: 0,
        traits,
        total_races: 0,
        total_wins: 0,
        total_seconds: 0,
        parents: Some((parent1.name.clone(), parent2.name.clone())),
    }
}

fn inherit_traits<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    parent1: &Horse,
    parent2: &Horse,
) -> SmallVec<[TraitId; 3]> {
    let mut pool: Vec<TraitId> = Vec::new();
    for t in parent1.traits.iter().chain(parent2.traits.iter()) {
        if !pool.contains(t) {
            pool.push(*t);
        }
    }

    let mut inherited: Vec<TraitId> = pool
        .into_iter()
        .filter(|_| rng.r#gen::<f64>() < TRAIT_INHERIT_CHANCE)
        .collect();

    if rng.r#gen::<f64>() < TRAIT_MUTATION_CHANCE {
        let mut candidates: Vec<TraitId> = cfg
            .traits
            .keys()
            .copied()
            .filter(|t| !inherited.contains(t))
            .collect();
        candidates.sort_unstable();
        if let Some(mutation) = candidates.choose(rng) {
            inherited.push(*mutation);
        }
    }

    inherited.shuffle(rng);
    inherited.truncate(MAX_TRAITS);

    if inherited.is_empty()
        && let Some(fallback) = random_catalog_trait(cfg, rng)
    {
        inherited.push(fallback);
    }
    inherited.into_iter().collect()
}
