//! Scout intel: partial, stable visibility into opposing horses.
//!
//! Which attributes a scout can see is deterministic per horse so reports
//! do not flicker across re-renders: each attribute draws from a hash of
//! the horse id under a per-attribute salt. What the scout says about a
//! visible attribute still involves session randomness.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use twox_hash::XxHash64;

use crate::config::{GameConfig, TraitId};
use crate::constants::{
    REPUTATION_AVERAGE, REPUTATION_ELITE, REPUTATION_RISING, REPUTATION_STRONG,
    SCOUT_DISTANCE_VISIBILITY_THRESHOLD, SCOUT_ESTIMATE_DAMPING, SCOUT_EXACT_SPEED_LEAK_CHANCE,
    SCOUT_FALLBACK_SPEED, SCOUT_FASTER_MARGIN, SCOUT_FIT_PERFECT, SCOUT_FIT_POOR,
    SCOUT_FIT_SUBOPTIMAL, SCOUT_MUCH_FASTER_MARGIN, SCOUT_SPEED_VISIBILITY_THRESHOLD,
    SCOUT_THREAT_MAJOR, SCOUT_THREAT_STRONG, SCOUT_THREAT_WEAK, SCOUT_TRAIT_REPORT_CHANCE,
    SCOUT_TRAITS_VISIBILITY_THRESHOLD, STRONG_SPEED_THRESHOLD, WEAK_SPEED_THRESHOLD,
    WIN_CHANCE_TRAIT_CAP, WIN_CHANCE_TRAIT_STEP,
};
use crate::horse::{Horse, HorseId};
use crate::numbers::round_f64_to_i32;
use crate::performance::calculate_distance_fit;

const SPEED_VISIBILITY_SALT: u64 = 0x1234;
const TRAITS_VISIBILITY_SALT: u64 = 0x5678;
const DISTANCE_VISIBILITY_SALT: u64 = 0x9876;
const SPEED_ESTIMATE_SALT: u64 = 0xE571;

/// Which attributes of a horse the scout can see. Stable per horse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutVisibility {
    pub speed: bool,
    pub traits: bool,
    pub distance: bool,
}

#[must_use]
pub fn visibility_for(horse_id: HorseId) -> ScoutVisibility {
    ScoutVisibility {
        speed: attribute_roll(horse_id, SPEED_VISIBILITY_SALT) >= SCOUT_SPEED_VISIBILITY_THRESHOLD,
        traits: attribute_roll(horse_id, TRAITS_VISIBILITY_SALT)
            >= SCOUT_TRAITS_VISIBILITY_THRESHOLD,
        distance: attribute_roll(horse_id, DISTANCE_VISIBILITY_SALT)
            >= SCOUT_DISTANCE_VISIBILITY_THRESHOLD,
    }
}

/// Blurred but stable speed estimate, present only when speed is visible.
#[must_use]
pub fn estimated_speed(horse: &Horse) -> Option<i32> {
    if !visibility_for(horse.id).speed {
        return None;
    }
    let damped = (f64::from(horse.speed) * SCOUT_ESTIMATE_DAMPING).floor();
    let blur = attribute_roll(horse.id, SPEED_ESTIMATE_SALT);
    Some(round_f64_to_i32(damped) + i32::try_from(blur).unwrap_or(0))
}

fn attribute_roll(horse_id: HorseId, salt: u64) -> u64 {
    XxHash64::oneshot(salt, &horse_id.value().to_le_bytes()) % 10
}

/// One observation in a scout report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoutNote {
    MuchFasterThanBest,
    FasterThanBest,
    SlightlyFasterThanBest,
    ExactSpeed(i32),
    PerfectForDistance,
    PoorDistanceFit,
    SuboptimalDistance,
    StrongTrait(TraitId),
    DangerousFinisher,
    WillLeadEarly,
    MajorThreat,
    StrongContender,
    WeakOpposition,
}

impl ScoutNote {
    /// Stable key the presentation layer localizes.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MuchFasterThanBest => "scout.speed.much-faster",
            Self::FasterThanBest => "scout.speed.faster",
            Self::SlightlyFasterThanBest => "scout.speed.slightly-faster",
            Self::ExactSpeed(_) => "scout.speed.exact",
            Self::PerfectForDistance => "scout.distance.perfect",
            Self::PoorDistanceFit => "scout.distance.poor",
            Self::SuboptimalDistance => "scout.distance.suboptimal",
            Self::StrongTrait(_) => "scout.trait.strong",
            Self::DangerousFinisher => "scout.combo.dangerous-finisher",
            Self::WillLeadEarly => "scout.combo.will-lead-early",
            Self::MajorThreat => "scout.threat.major",
            Self::StrongContender => "scout.threat.strong",
            Self::WeakOpposition => "scout.threat.weak",
        }
    }
}

/// Generate scout reports for the AI field, measured against the player's
/// best horse. A missing roster falls back to a nominal comparator.
pub fn generate_scout_reports<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    ai_horses: &[Horse],
    player_horses: &[Horse],
    race_distance: u32,
) -> HashMap<HorseId, Vec<ScoutNote>> {
    let best_speed = find_best_player_horse(player_horses)
        .map_or(SCOUT_FALLBACK_SPEED, |best| best.speed);

    ai_horses
        .iter()
        .map(|horse| {
            let mut notes = Vec::new();
            analyze_speed(rng, horse, best_speed, &mut notes);
            analyze_distance_fit(horse, race_distance, &mut notes);
            analyze_traits(cfg, rng, horse, &mut notes);
            analyze_threat_level(horse, best_speed, &mut notes);
            (horse.id, notes)
        })
        .collect()
}

/// The player's best overall horse, by raw speed.
#[must_use]
pub fn find_best_player_horse(player_horses: &[Horse]) -> Option<&Horse> {
    player_horses.iter().max_by_key(|h| h.speed)
}

fn analyze_speed<R: Rng + ?Sized>(
    rng: &mut R,
    horse: &Horse,
    best_speed: i32,
    notes: &mut Vec<ScoutNote>,
) {
    if horse.speed > best_speed + SCOUT_MUCH_FASTER_MARGIN {
        notes.push(ScoutNote::MuchFasterThanBest);
    } else if horse.speed > best_speed + SCOUT_FASTER_MARGIN {
        notes.push(ScoutNote::FasterThanBest);
    } else if horse.speed > best_speed {
        notes.push(ScoutNote::SlightlyFasterThanBest);
    } else if rng.r#gen::<f64>() < SCOUT_EXACT_SPEED_LEAK_CHANCE {
        notes.push(ScoutNote::ExactSpeed(horse.speed));
    }
}

fn analyze_distance_fit(horse: &Horse, race_distance: u32, notes: &mut Vec<ScoutNote>) {
    let fit = calculate_distance_fit(horse, race_distance);
    if fit > SCOUT_FIT_PERFECT {
        notes.push(ScoutNote::PerfectForDistance);
    } else if fit < SCOUT_FIT_POOR {
        notes.push(ScoutNote::PoorDistanceFit);
    } else if fit < SCOUT_FIT_SUBOPTIMAL {
        notes.push(ScoutNote::SuboptimalDistance);
    }
}

fn analyze_traits<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    horse: &Horse,
    notes: &mut Vec<ScoutNote>,
) {
    let dangerous = [TraitId::Sprinter, TraitId::Closer, TraitId::EarlySpeed];
    for trait_id in horse.traits.iter().copied().filter(|t| dangerous.contains(t)) {
        if cfg.traits.contains_key(&trait_id) && rng.r#gen::<f64>() < SCOUT_TRAIT_REPORT_CHANCE {
            notes.push(ScoutNote::StrongTrait(trait_id));
        }
    }

    if horse.has_trait(TraitId::Closer) && horse.has_trait(TraitId::Sprinter) {
        notes.push(ScoutNote::DangerousFinisher);
    }
    if horse.has_trait(TraitId::EarlySpeed) && horse.has_trait(TraitId::FrontRunner) {
        notes.push(ScoutNote::WillLeadEarly);
    }
}

fn analyze_threat_level(horse: &Horse, best_speed: i32, notes: &mut Vec<ScoutNote>) {
    let ratio = f64::from(horse.speed) / f64::from(best_speed.max(1));
    if ratio > SCOUT_THREAT_MAJOR {
        notes.push(ScoutNote::MajorThreat);
    } else if ratio > SCOUT_THREAT_STRONG {
        notes.push(ScoutNote::StrongContender);
    } else if ratio < SCOUT_THREAT_WEAK {
        notes.push(ScoutNote::WeakOpposition);
    }
}

/// Reputation tier derived from raw speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reputation {
    Elite,
    Strong,
    Rising,
    Average,
    Weak,
}

impl Reputation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elite => "Elite",
            Self::Strong => "Strong",
            Self::Rising => "Rising",
            Self::Average => "Average",
            Self::Weak => "Weak",
        }
    }
}

#[must_use]
pub fn calculate_reputation(horse: &Horse) -> Reputation {
    if horse.speed > REPUTATION_ELITE {
        Reputation::Elite
    } else if horse.speed > REPUTATION_STRONG {
        Reputation::Strong
    } else if horse.speed > REPUTATION_RISING {
        Reputation::Rising
    } else if horse.speed > REPUTATION_AVERAGE {
        Reputation::Average
    } else {
        Reputation::Weak
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    HighSpeed,
    MultiTalented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weakness {
    LowSpeed,
    NoSpecialTraits,
}

/// Full statistical read on one horse, the premium scouting feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub speed_rating: i32,
    pub distance_fit: f64,
    pub trait_count: usize,
    /// Rough win likelihood as a rounded percentage.
    pub estimated_win_chance: i32,
    pub strengths: Vec<Strength>,
    pub weaknesses: Vec<Weakness>,
}

#[must_use]
pub fn detailed_analysis(horse: &Horse, race_distance: u32) -> DetailedAnalysis {
    let fit = calculate_distance_fit(horse, race_distance);
    let mut strengths = Vec::new();
    if horse.speed > STRONG_SPEED_THRESHOLD {
        strengths.push(Strength::HighSpeed);
    }
    if horse.traits.len() > 1 {
        strengths.push(Strength::MultiTalented);
    }
    let mut weaknesses = Vec::new();
    if horse.speed < WEAK_SPEED_THRESHOLD {
        weaknesses.push(Weakness::LowSpeed);
    }
    if horse.traits.is_empty() {
        weaknesses.push(Weakness::NoSpecialTraits);
    }
    DetailedAnalysis {
        speed_rating: horse.speed,
        distance_fit: fit,
        trait_count: horse.traits.len(),
        estimated_win_chance: estimate_win_chance(horse, fit),
        strengths,
        weaknesses,
    }
}

fn estimate_win_chance(horse: &Horse, fit: f64) -> i32 {
    let speed_factor = f64::from(horse.speed) / 100.0;
    let trait_factor = (1.0
        + f64::from(u32::try_from(horse.traits.len()).unwrap_or(0)) * WIN_CHANCE_TRAIT_STEP)
        .min(WIN_CHANCE_TRAIT_CAP);
    round_f64_to_i32(speed_factor * fit * trait_factor * 100.0)
}
