//! Horse entities: identity, generation, market offers, and post-race wear.
//!
//! Horses are immutable snapshots. Every mutation returns a new `Horse`
//! value; the roster owner swaps whole lists atomically.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{GameConfig, TraitId};
use crate::constants::{
    BOOSTER_GEN_MAX, BOOSTER_GEN_MIN, DISTANCE_PREF_MAX, DISTANCE_PREF_MIN, FATIGUE_MAX,
    FIRST_RACE_STAT_BONUS, HUE_DEGREES, PLAYER_SPEED_MAX, PLAYER_SPEED_MIN,
};
use crate::numbers::round_f64_to_i32;

/// Stable opaque identifier for a horse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct HorseId(pub u64);

impl HorseId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic allocator giving every horse a unique id for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseIdAllocator {
    next: u64,
}

impl Default for HorseIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl HorseIdAllocator {
    pub fn allocate(&mut self) -> HorseId {
        let id = HorseId(self.next);
        self.next += 1;
        id
    }
}

/// Career tier derived from cumulative win history. Never regresses
/// because it is recomputed from counters that only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum SpecializationLevel {
    #[default]
    Rookie,
    RookiePlus,
    Champion,
    Master,
    Legend,
}

impl SpecializationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rookie => "Rookie",
            Self::RookiePlus => "Rookie+",
            Self::Champion => "Champion",
            Self::Master => "Master",
            Self::Legend => "Legend",
        }
    }
}

/// The central entity: one horse with stats, traits, and career record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horse {
    pub id: HorseId,
    pub name: String,
    pub speed: i32,
    pub booster_power: i32,
    /// Preferred race distance in meters.
    pub distance_preference: i32,
    /// Cosmetic hue in degrees, 0..360.
    pub color_hue: f32,
    pub is_player: bool,
    /// Persistent cross-race wear, 0..=100.
    pub fatigue: i32,
    pub traits: SmallVec<[TraitId; 3]>,
    pub total_races: u32,
    pub total_wins: u32,
    pub total_seconds: u32,
    /// Parent names for bred horses, for lineage display.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parents: Option<(String, String)>,
}

impl Horse {
    #[must_use]
    pub fn has_trait(&self, trait_id: TraitId) -> bool {
        self.traits.contains(&trait_id)
    }

    /// Currently-held negative traits, in roster order.
    #[must_use]
    pub fn negative_traits(&self) -> Vec<TraitId> {
        self.traits
            .iter()
            .copied()
            .filter(|t| t.is_negative())
            .collect()
    }

    /// Career tier, a pure function of the cumulative counters.
    #[must_use]
    pub fn specialization_level(&self) -> SpecializationLevel {
        use crate::constants::{
            CHAMPION_WIN_THRESHOLD, LEGEND_WIN_THRESHOLD, MASTER_WIN_THRESHOLD, ROOKIE_PLUS_SCORE,
            SECOND_PLACE_WEIGHT,
        };
        if self.total_wins >= LEGEND_WIN_THRESHOLD {
            SpecializationLevel::Legend
        } else if self.total_wins >= MASTER_WIN_THRESHOLD {
            SpecializationLevel::Master
        } else if self.total_wins >= CHAMPION_WIN_THRESHOLD {
            SpecializationLevel::Champion
        } else if f64::from(self.total_wins) + SECOND_PLACE_WEIGHT * f64::from(self.total_seconds)
            >= ROOKIE_PLUS_SCORE
        {
            SpecializationLevel::RookiePlus
        } else {
            SpecializationLevel::Rookie
        }
    }

    /// Copy-back step after a race: fatigue gain plus career counters.
    /// `finish_position` is 0-based within the ordered results.
    #[must_use]
    pub fn after_race(&self, cfg: &GameConfig, finish_position: usize) -> Self {
        let mut updated = self.clone();
        updated.fatigue = (self.fatigue + cfg.fatigue_per_race).clamp(0, FATIGUE_MAX);
        updated.total_races += 1;
        if finish_position == 0 {
            updated.total_wins += 1;
        } else if finish_position == 1 {
            updated.total_seconds += 1;
        }
        updated
    }

    /// Ownership flip when the player buys a market horse.
    #[must_use]
    pub fn purchased(&self) -> Self {
        let mut owned = self.clone();
        owned.is_player = true;
        owned
    }
}

/// Generate a fresh horse.
///
/// Player horses sample around the base speed; AI horses escalate with the
/// race number and track the player's best speed so opposition stays
/// competitive. All stats are clamped to their band before returning.
pub fn generate_horse<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    ids: &mut HorseIdAllocator,
    is_player: bool,
    race_number: u32,
    distance_preference: Option<i32>,
    player_best_speed: Option<i32>,
) -> Horse {
    let (base_speed, variability) = if is_player {
        (cfg.base_speed, cfg.speed_range)
    } else {
        let mut base = cfg.base_speed
            + cfg.ai_base_speed_bonus
            + f64::from(race_number) * cfg.ai_speed_scaling;
        if let Some(best) = player_best_speed {
            base += (f64::from(best) - cfg.base_speed) * cfg.ai_player_relative;
        }
        (base, cfg.ai_speed_variability)
    };

    let lo = round_f64_to_i32(base_speed - variability);
    let hi = round_f64_to_i32(base_speed + variability).max(lo);
    let speed = rng.gen_range(lo..=hi);

    let distance_preference = distance_preference
        .unwrap_or_else(|| rng.gen_range(DISTANCE_PREF_MIN..=DISTANCE_PREF_MAX));
    let booster_power = rng.gen_range(BOOSTER_GEN_MIN..=BOOSTER_GEN_MAX);

    let trait_chance = if is_player {
        cfg.player_trait_chance
    } else {
        cfg.ai_trait_chance
    };
    let trait_count = if rng.r#gen::<f64>() < trait_chance { 2 } else { 1 };
    let traits = sample_traits(cfg, rng, trait_count);

    // Onboarding assist on the very first race.
    let stat_bonus = if is_player && race_number == 1 {
        FIRST_RACE_STAT_BONUS
    } else {
        0
    };
    let speed = if is_player {
        (speed + stat_bonus).clamp(PLAYER_SPEED_MIN, PLAYER_SPEED_MAX)
    } else {
        speed.clamp(cfg.ai_min_speed, cfg.ai_max_speed)
    };

    Horse {
        id: ids.allocate(),
        name: random_name(cfg, rng),
        speed,
        booster_power: (booster_power + stat_bonus).clamp(BOOSTER_GEN_MIN, BOOSTER_GEN_MAX),
        distance_preference,
        color_hue: rng.r#gen::<f32>() * HUE_DEGREES,
        is_player,
        fatigue: 0,
        traits,
        total_races: 0,
        total_wins: 0,
        total_seconds: 0,
        parents: None,
    }
}

/// Market offers: one distance specialist per supported race distance,
/// each priced implicitly by speed closeness to the player's current best.
pub fn horse_buying_options<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    ids: &mut HorseIdAllocator,
    player_horses: &[Horse],
) -> Vec<Horse> {
    let fastest = player_horses
        .iter()
        .map(|h| h.speed)
        .max()
        .unwrap_or(PLAYER_SPEED_MIN);

    cfg.race_distances
        .iter()
        .map(|&distance| {
            let distance = i32::try_from(distance).unwrap_or(DISTANCE_PREF_MIN);
            let speed = rng.gen_range(
                fastest - cfg.market_speed_spread..=fastest + cfg.market_speed_spread,
            );
            let preference = rng.gen_range(
                distance - cfg.market_distance_spread..=distance + cfg.market_distance_spread,
            );
            let mut offer = generate_horse(cfg, rng, ids, false, 1, Some(preference), None);
            offer.speed = speed.clamp(PLAYER_SPEED_MIN, PLAYER_SPEED_MAX);
            offer.is_player = false;
            offer
        })
        .collect()
}

pub(crate) fn sample_traits<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    count: usize,
) -> SmallVec<[TraitId; 3]> {
    let mut pool = sorted_catalog(cfg);
    pool.shuffle(rng);
    pool.into_iter().take(count).collect()
}

pub(crate) fn random_catalog_trait<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
) -> Option<TraitId> {
    sorted_catalog(cfg).choose(rng).copied()
}

// Sorted so draws are reproducible regardless of map iteration order.
fn sorted_catalog(cfg: &GameConfig) -> Vec<TraitId> {
    let mut pool: Vec<TraitId> = cfg.traits.keys().copied().collect();
    pool.sort_unstable();
    pool
}

pub(crate) fn random_name<R: Rng + ?Sized>(cfg: &GameConfig, rng: &mut R) -> String {
    cfg.horse_names
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| String::from("Unnamed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngBundle;

    fn fixture() -> (GameConfig, RngBundle, HorseIdAllocator) {
        (
            GameConfig::default_config(),
            RngBundle::from_user_seed(0xF0A1),
            HorseIdAllocator::default(),
        )
    }

    #[test]
    fn allocator_is_monotonic() {
        let mut ids = HorseIdAllocator::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(b > a);
    }

    #[test]
    fn generated_player_horses_stay_in_band() {
        let (cfg, bundle, mut ids) = fixture();
        let mut rng = bundle.stable();
        for race in 1..=10 {
            let horse = generate_horse(&cfg, &mut *rng, &mut ids, true, race, None, None);
            assert!((PLAYER_SPEED_MIN..=PLAYER_SPEED_MAX).contains(&horse.speed));
            assert!((BOOSTER_GEN_MIN..=BOOSTER_GEN_MAX).contains(&horse.booster_power));
            assert!(!horse.traits.is_empty() && horse.traits.len() <= 2);
            assert_eq!(horse.fatigue, 0);
        }
    }

    #[test]
    fn ai_horses_respect_ai_band_even_when_scaled() {
        let (cfg, bundle, mut ids) = fixture();
        let mut rng = bundle.stable();
        for race in 1..=30 {
            let horse =
                generate_horse(&cfg, &mut *rng, &mut ids, false, race, None, Some(100));
            assert!((cfg.ai_min_speed..=cfg.ai_max_speed).contains(&horse.speed));
        }
    }

    #[test]
    fn specialization_tiers_follow_counters() {
        let (cfg, bundle, mut ids) = fixture();
        let mut rng = bundle.stable();
        let horse = generate_horse(&cfg, &mut *rng, &mut ids, true, 1, None, None);
        assert_eq!(horse.specialization_level(), SpecializationLevel::Rookie);

        let placed = horse.after_race(&cfg, 1);
        assert_eq!(placed.total_seconds, 1);
        assert_eq!(placed.specialization_level(), SpecializationLevel::RookiePlus);

        let winner = placed.after_race(&cfg, 0);
        assert_eq!(winner.specialization_level(), SpecializationLevel::Champion);

        let mut career = winner;
        for _ in 0..5 {
            career = career.after_race(&cfg, 0);
        }
        assert_eq!(career.specialization_level(), SpecializationLevel::Legend);
    }

    #[test]
    fn fatigue_clamps_at_the_cap() {
        let (cfg, bundle, mut ids) = fixture();
        let mut rng = bundle.stable();
        let mut horse = generate_horse(&cfg, &mut *rng, &mut ids, true, 1, None, None);
        for _ in 0..10 {
            horse = horse.after_race(&cfg, 5);
        }
        assert_eq!(horse.fatigue, FATIGUE_MAX);
    }

    #[test]
    fn market_offers_cover_every_distance() {
        let (cfg, bundle, mut ids) = fixture();
        let mut rng = bundle.stable();
        let stable_horse = generate_horse(&cfg, &mut *rng, &mut ids, true, 1, None, None);
        let offers = horse_buying_options(&cfg, &mut *rng, &mut ids, &[stable_horse.clone()]);
        assert_eq!(offers.len(), cfg.race_distances.len());
        for (offer, &distance) in offers.iter().zip(&cfg.race_distances) {
            assert!(!offer.is_player);
            assert!((PLAYER_SPEED_MIN..=PLAYER_SPEED_MAX).contains(&offer.speed));
            let distance = i32::try_from(distance).unwrap();
            assert!((offer.distance_preference - distance).abs() <= cfg.market_distance_spread);
            assert!((offer.speed - stable_horse.speed).abs() <= cfg.market_speed_spread);
            assert!(offer.purchased().is_player);
        }
    }
}
