//! Upgrade generation, the comeback mechanic, and upgrade application.
//!
//! The comeback bonus is the single control knob for all struggling-player
//! assistance: upgrade magnitudes, breeding quality, and specialization
//! payouts all read it.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{GameConfig, TraitId};
use crate::constants::{
    AFFORDABILITY_DESPERATE, AFFORDABILITY_STRUGGLING, AFFORDABILITY_TIGHT, BREEDING_MIN_HORSES,
    COMEBACK_MAXIMUM, COMEBACK_MINOR, COMEBACK_NONE, COMEBACK_STRONG, ENTRY_BASE_FEE, MAX_TRAITS,
    UPGRADE_MIRACLE_SPEED, UPGRADE_OPTION_COUNT, UPGRADE_SPEED_BASE, UPGRADE_STABLE_SPEED_BASE,
    UPGRADE_STAT_CAP, UPGRADE_VETERAN_BASE,
};
use crate::horse::Horse;
use crate::numbers::{floor_f64_to_i64, i64_to_f64, round_f64_to_i32};

/// Minimum entry fee for a race: the escalating-fee formula shared by
/// entry pricing and the comeback calculation.
#[must_use]
pub fn min_entry_fee(cfg: &GameConfig, race_number: u32) -> i64 {
    let exponent = i32::try_from(race_number.saturating_sub(1)).unwrap_or(i32::MAX);
    floor_f64_to_i64(ENTRY_BASE_FEE * cfg.min_entry_multiplier.powi(exponent))
}

/// Difficulty-assistance multiplier from the player's financial state.
///
/// Non-increasing in the wallet-to-fee ratio: desperate players get 3x,
/// thriving players 1x.
#[must_use]
pub fn calculate_comeback_bonus(cfg: &GameConfig, race_number: u32, wallet: i64) -> f64 {
    let min_fee = min_entry_fee(cfg, race_number).max(1);
    let affordability = i64_to_f64(wallet) / i64_to_f64(min_fee);
    if affordability < AFFORDABILITY_DESPERATE {
        COMEBACK_MAXIMUM
    } else if affordability < AFFORDABILITY_STRUGGLING {
        COMEBACK_STRONG
    } else if affordability < AFFORDABILITY_TIGHT {
        COMEBACK_MINOR
    } else {
        COMEBACK_NONE
    }
}

/// Assistance tier for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComebackLevel {
    None,
    Minor,
    Strong,
    Maximum,
}

/// Summary of the current comeback state for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComebackInfo {
    pub level: ComebackLevel,
    pub bonus: f64,
    pub is_active: bool,
    pub message_key: &'static str,
}

#[must_use]
pub fn comeback_info(cfg: &GameConfig, race_number: u32, wallet: i64) -> ComebackInfo {
    let bonus = calculate_comeback_bonus(cfg, race_number, wallet);
    let (level, message_key) = if bonus >= COMEBACK_MAXIMUM {
        (ComebackLevel::Maximum, "comeback.maximum")
    } else if bonus >= COMEBACK_STRONG {
        (ComebackLevel::Strong, "comeback.strong")
    } else if bonus > COMEBACK_NONE {
        (ComebackLevel::Minor, "comeback.minor")
    } else {
        (ComebackLevel::None, "comeback.none")
    };
    ComebackInfo {
        level,
        bonus,
        is_active: bonus > COMEBACK_NONE,
        message_key,
    }
}

/// The effect an upgrade performs when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UpgradeKind {
    Speed { value: i32 },
    Recovery,
    Veteran { value: i32 },
    StableSpeed { value: i32 },
    NewTrait,
    AddTrait { trait_id: TraitId },
    RemoveBadTrait,
    OptimizeDistance,
    StableRest,
    BuyHorse,
    Breed,
    Miracle { value: i32 },
}

impl UpgradeKind {
    /// Identity used when deduplicating offered options. Named trait
    /// additions stay distinct per trait.
    #[must_use]
    pub fn dedup_key(self) -> String {
        match self {
            Self::Speed { .. } => "speed".into(),
            Self::Recovery => "recovery".into(),
            Self::Veteran { .. } => "veteran".into(),
            Self::StableSpeed { .. } => "stableSpeed".into(),
            Self::NewTrait => "newTrait".into(),
            Self::AddTrait { trait_id } => format!("addTrait:{trait_id}"),
            Self::RemoveBadTrait => "removeBadTrait".into(),
            Self::OptimizeDistance => "optimizeDistance".into(),
            Self::StableRest => "stableRest".into(),
            Self::BuyHorse => "buyHorse".into(),
            Self::Breed => "breed".into(),
            Self::Miracle { .. } => "miracle".into(),
        }
    }

    /// Upgrades worth force-including for a struggling player.
    #[must_use]
    pub const fn is_strong(self) -> bool {
        matches!(
            self,
            Self::Speed { .. }
                | Self::Veteran { .. }
                | Self::Miracle { .. }
                | Self::NewTrait
                | Self::AddTrait { .. }
                | Self::RemoveBadTrait
                | Self::StableRest
        )
    }
}

/// A generated post-race upgrade offer; consumed once, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub name: String,
    pub desc: String,
    pub cost: i64,
    pub requires_horse_pick: bool,
}

impl Upgrade {
    fn new(kind: UpgradeKind, name: &str, desc: String, requires_horse_pick: bool) -> Self {
        Self {
            kind,
            name: name.into(),
            desc,
            cost: 0,
            requires_horse_pick,
        }
    }
}

/// Generate the post-race upgrade offers.
///
/// Numeric magnitudes scale with the comeback bonus, breeding appears only
/// with two or more horses, and the miracle option only in desperate
/// situations. When assistance is active one strong option is always
/// included; thriving players get a fully random set.
pub fn generate_upgrade_options<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    race_number: u32,
    wallet: i64,
    player_horse_count: usize,
) -> Vec<Upgrade> {
    let bonus = calculate_comeback_bonus(cfg, race_number, wallet);
    let pool = build_upgrade_pool(bonus, player_horse_count);
    select_upgrade_options(rng, pool, bonus)
}

fn scaled(base: f64, bonus: f64) -> i32 {
    round_f64_to_i32((base * bonus).floor())
}

fn build_upgrade_pool(bonus: f64, player_horse_count: usize) -> Vec<Upgrade> {
    let speed_value = scaled(UPGRADE_SPEED_BASE, bonus);
    let veteran_value = scaled(UPGRADE_VETERAN_BASE, bonus);
    let stable_value = scaled(UPGRADE_STABLE_SPEED_BASE, bonus);

    let mut pool = vec![
        Upgrade::new(
            UpgradeKind::Speed { value: speed_value },
            "Speed Training",
            format!("+{speed_value} Speed to selected horse"),
            true,
        ),
        Upgrade::new(
            UpgradeKind::Recovery,
            "Rest Day",
            "Remove all fatigue from selected horse".into(),
            true,
        ),
        Upgrade::new(
            UpgradeKind::Veteran {
                value: veteran_value,
            },
            "Veteran Bonus",
            format!("+{veteran_value} to all stats for selected horse"),
            true,
        ),
        Upgrade::new(
            UpgradeKind::StableSpeed {
                value: stable_value,
            },
            "Better Training",
            format!("+{stable_value} Speed to all horses"),
            false,
        ),
        Upgrade::new(
            UpgradeKind::NewTrait,
            "Trait Training",
            "Add a random trait to selected horse".into(),
            true,
        ),
        Upgrade::new(
            UpgradeKind::BuyHorse,
            "Buy New Horse",
            "Choose from 3 specialized horses".into(),
            false,
        ),
    ];

    if player_horse_count >= BREEDING_MIN_HORSES {
        pool.push(Upgrade::new(
            UpgradeKind::Breed,
            "Breed Horses",
            "Combine two horses to create offspring".into(),
            false,
        ));
    }

    if bonus >= COMEBACK_MAXIMUM {
        pool.push(Upgrade::new(
            UpgradeKind::Miracle {
                value: UPGRADE_MIRACLE_SPEED,
            },
            "Miracle Training",
            format!("+{UPGRADE_MIRACLE_SPEED} Speed to selected horse"),
            true,
        ));
    }

    for (trait_id, name, desc) in [
        (TraitId::Sprinter, "Sprint Training", "Add Sprinter trait to selected horse"),
        (TraitId::Closer, "Endurance Training", "Add Closer trait to selected horse"),
        (
            TraitId::Versatile,
            "Versatility Training",
            "Add Versatile trait to selected horse",
        ),
    ] {
        pool.push(Upgrade::new(
            UpgradeKind::AddTrait { trait_id },
            name,
            desc.into(),
            true,
        ));
    }

    pool.push(Upgrade::new(
        UpgradeKind::StableRest,
        "Spa Day",
        "Remove all fatigue from entire stable".into(),
        false,
    ));
    pool.push(Upgrade::new(
        UpgradeKind::RemoveBadTrait,
        "Behavioral Training",
        "Remove a negative trait from selected horse".into(),
        true,
    ));
    pool.push(Upgrade::new(
        UpgradeKind::OptimizeDistance,
        "Distance Optimization",
        "Optimize selected horse for current race distance".into(),
        true,
    ));

    pool
}

fn select_upgrade_options<R: Rng + ?Sized>(
    rng: &mut R,
    pool: Vec<Upgrade>,
    bonus: f64,
) -> Vec<Upgrade> {
    let mut selected: Vec<Upgrade> = Vec::new();

    if bonus > COMEBACK_NONE {
        let (strong, mut rest): (Vec<Upgrade>, Vec<Upgrade>) = pool
            .into_iter()
            .partition(|u| u.kind.is_strong() && u.cost == 0);
        if let Some(forced) = strong.choose(rng) {
            selected.push(forced.clone());
        }
        rest.shuffle(rng);
        selected.extend(rest.into_iter().take(UPGRADE_OPTION_COUNT - 1));
    } else {
        let mut pool = pool;
        pool.shuffle(rng);
        selected.extend(pool.into_iter().take(UPGRADE_OPTION_COUNT));
    }

    let mut deduped: Vec<Upgrade> = Vec::with_capacity(selected.len());
    for upgrade in selected {
        if !deduped
            .iter()
            .any(|kept| kept.kind.dedup_key() == upgrade.kind.dedup_key())
        {
            deduped.push(upgrade);
        }
    }
    deduped.truncate(UPGRADE_OPTION_COUNT);
    deduped
}

/// Apply an upgrade to one horse, returning the updated snapshot.
///
/// Every arm is a total transform: inapplicable upgrades (full trait
/// slots, duplicate named traits, no negative traits, stable-wide kinds)
/// return the horse unchanged.
pub fn apply_upgrade_to_horse<R: Rng + ?Sized>(
    cfg: &GameConfig,
    rng: &mut R,
    upgrade: &Upgrade,
    horse: &Horse,
    race_distance: u32,
) -> Horse {
    let mut updated = horse.clone();
    match upgrade.kind {
        UpgradeKind::Speed { value } | UpgradeKind::Veteran { value } | UpgradeKind::Miracle { value } => {
            updated.speed = (horse.speed + value).min(UPGRADE_STAT_CAP);
        }
        UpgradeKind::Recovery => {
            updated.fatigue = 0;
        }
        UpgradeKind::NewTrait => {
            if horse.traits.len() < MAX_TRAITS {
                let mut available: Vec<TraitId> = cfg
                    .traits
                    .keys()
                    .copied()
                    .filter(|t| !horse.has_trait(*t))
                    .collect();
                available.sort_unstable();
                if let Some(new_trait) = available.choose(rng) {
                    updated.traits.push(*new_trait);
                }
            }
        }
        UpgradeKind::AddTrait { trait_id } => {
            if horse.traits.len() < MAX_TRAITS && !horse.has_trait(trait_id) {
                updated.traits.push(trait_id);
            }
        }
        UpgradeKind::RemoveBadTrait => {
            let held = horse.negative_traits();
            if let Some(to_remove) = held.choose(rng) {
                updated.traits.retain(|t| t != to_remove);
            }
        }
        UpgradeKind::OptimizeDistance => {
            updated.distance_preference =
                i32::try_from(race_distance).unwrap_or(horse.distance_preference);
        }
        UpgradeKind::StableSpeed { .. }
        | UpgradeKind::StableRest
        | UpgradeKind::BuyHorse
        | UpgradeKind::Breed => {}
    }
    updated
}

/// Apply a stable-wide upgrade to every horse. Per-horse kinds return the
/// roster unchanged.
#[must_use]
pub fn apply_upgrade_to_all_horses(upgrade: &Upgrade, horses: &[Horse]) -> Vec<Horse> {
    match upgrade.kind {
        UpgradeKind::StableSpeed { value } => horses
            .iter()
            .map(|horse| {
                let mut updated = horse.clone();
                updated.speed = (horse.speed + value).min(UPGRADE_STAT_CAP);
                updated
            })
            .collect(),
        UpgradeKind::StableRest => horses
            .iter()
            .map(|horse| {
                let mut updated = horse.clone();
                updated.fatigue = 0;
                updated
            })
            .collect(),
        _ => horses.to_vec(),
    }
}

/// Why an upgrade cannot currently be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpgradeDenied {
    #[error("not enough money")]
    InsufficientFunds,
    #[error("need at least 2 horses to breed")]
    NeedsTwoHorses,
}

/// Advisory pre-check consulted by the caller before applying. The
/// transforms themselves never enforce it.
///
/// # Errors
///
/// Returns the first reason the upgrade cannot be taken.
pub fn can_apply_upgrade(
    upgrade: &Upgrade,
    wallet: i64,
    player_horse_count: usize,
) -> Result<(), UpgradeDenied> {
    if upgrade.cost > wallet {
        return Err(UpgradeDenied::InsufficientFunds);
    }
    if matches!(upgrade.kind, UpgradeKind::Breed) && player_horse_count < BREEDING_MIN_HORSES {
        return Err(UpgradeDenied::NeedsTwoHorses);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::horse::HorseId;
    use crate::rng::RngBundle;
    use smallvec::smallvec;

    fn cfg() -> GameConfig {
        GameConfig::default_config()
    }

    fn horse(traits: smallvec::SmallVec<[TraitId; 3]>) -> Horse {
        Horse {
            id: HorseId(42),
            name: "Test Horse".into(),
            speed: 95,
            booster_power: 60,
            distance_preference: 1200,
            color_hue: 180.0,
            is_player: true,
            fatigue: 60,
            traits,
            total_races: 0,
            total_wins: 0,
            total_seconds: 0,
            parents: None,
        }
    }

    #[test]
    fn comeback_tiers_match_affordability() {
        let cfg = cfg();
        // Race 1 has a minimum fee of 10.
        assert!((calculate_comeback_bonus(&cfg, 1, 5) - 3.0).abs() < f64::EPSILON);
        assert!((calculate_comeback_bonus(&cfg, 1, 15) - 2.0).abs() < f64::EPSILON);
        assert!((calculate_comeback_bonus(&cfg, 1, 35) - 1.5).abs() < f64::EPSILON);
        assert!((calculate_comeback_bonus(&cfg, 1, 100) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn comeback_is_monotone_in_wallet() {
        let cfg = cfg();
        let mut last = f64::INFINITY;
        for wallet in [0, 5, 11, 19, 25, 39, 40, 500] {
            let bonus = calculate_comeback_bonus(&cfg, 1, wallet);
            assert!(bonus <= last, "bonus rose as wallet grew");
            last = bonus;
        }
    }

    #[test]
    fn min_entry_fee_escalates() {
        let cfg = cfg();
        assert_eq!(min_entry_fee(&cfg, 1), 10);
        assert_eq!(min_entry_fee(&cfg, 2), 12);
        assert_eq!(min_entry_fee(&cfg, 5), 24);
        assert!(min_entry_fee(&cfg, 10) > min_entry_fee(&cfg, 9));
    }

    #[test]
    fn option_generation_respects_gates() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(31);
        let mut rng = bundle.economy();
        for _ in 0..40 {
            // One horse, thriving wallet: no breed option possible.
            let options = generate_upgrade_options(&cfg, &mut *rng, 1, 1_000, 1);
            assert!(options.len() <= UPGRADE_OPTION_COUNT);
            assert!(!options.iter().any(|u| matches!(u.kind, UpgradeKind::Breed)));
            assert!(
                !options
                    .iter()
                    .any(|u| matches!(u.kind, UpgradeKind::Miracle { .. }))
            );
            let mut keys: Vec<String> = options.iter().map(|u| u.kind.dedup_key()).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), options.len(), "duplicate option offered");
        }
    }

    #[test]
    fn struggling_players_always_see_a_strong_option() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(32);
        let mut rng = bundle.economy();
        for _ in 0..40 {
            let options = generate_upgrade_options(&cfg, &mut *rng, 1, 5, 3);
            assert!(options.iter().any(|u| u.kind.is_strong()));
        }
    }

    #[test]
    fn offers_are_seed_stable() {
        let cfg = cfg();
        let roll = |seed: u64| {
            let bundle = RngBundle::from_user_seed(seed);
            let mut rng = bundle.economy();
            generate_upgrade_options(&cfg, &mut *rng, 3, 40, 2)
        };
        assert_eq!(roll(9), roll(9), "seeded offer generation diverged");
    }

    #[test]
    fn upgrade_values_scale_with_comeback() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(33);
        let mut rng = bundle.economy();
        // Desperate wallet triples the base +8 speed training.
        let options = generate_upgrade_options(&cfg, &mut *rng, 1, 5, 2);
        for upgrade in options {
            if let UpgradeKind::Speed { value } = upgrade.kind {
                assert_eq!(value, 24);
            }
        }
    }

    #[test]
    fn stat_upgrades_clamp_at_cap() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(34);
        let mut rng = bundle.economy();
        let subject = horse(smallvec![TraitId::Mudder]);
        let upgrade = Upgrade::new(
            UpgradeKind::Speed { value: 24 },
            "Speed Training",
            String::new(),
            true,
        );
        let updated = apply_upgrade_to_horse(&cfg, &mut *rng, &upgrade, &subject, 1800);
        assert_eq!(updated.speed, UPGRADE_STAT_CAP);
    }

    #[test]
    fn trait_upgrades_honor_slots_and_duplicates() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(35);
        let mut rng = bundle.economy();

        let full = horse(smallvec![TraitId::Mudder, TraitId::Closer, TraitId::Lazy]);
        let add = Upgrade::new(
            UpgradeKind::AddTrait {
                trait_id: TraitId::Sprinter,
            },
            "Sprint Training",
            String::new(),
            true,
        );
        let unchanged = apply_upgrade_to_horse(&cfg, &mut *rng, &add, &full, 1800);
        assert_eq!(unchanged.traits, full.traits);

        let holder = horse(smallvec![TraitId::Sprinter]);
        let duplicate = apply_upgrade_to_horse(&cfg, &mut *rng, &add, &holder, 1800);
        assert_eq!(duplicate.traits, holder.traits);

        let open = horse(smallvec![TraitId::Mudder]);
        let grown = apply_upgrade_to_horse(&cfg, &mut *rng, &add, &open, 1800);
        assert!(grown.has_trait(TraitId::Sprinter));
    }

    #[test]
    fn bad_trait_removal_needs_a_negative_trait() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(36);
        let mut rng = bundle.economy();
        let remove = Upgrade::new(UpgradeKind::RemoveBadTrait, "Behavioral Training", String::new(), true);

        let moody = horse(smallvec![TraitId::Temperamental, TraitId::Sprinter]);
        let calmed = apply_upgrade_to_horse(&cfg, &mut *rng, &remove, &moody, 1800);
        assert!(!calmed.has_trait(TraitId::Temperamental));
        assert!(calmed.has_trait(TraitId::Sprinter));

        let steady = horse(smallvec![TraitId::Sprinter]);
        let untouched = apply_upgrade_to_horse(&cfg, &mut *rng, &remove, &steady, 1800);
        assert_eq!(untouched.traits, steady.traits);
    }

    #[test]
    fn distance_optimization_gives_perfect_fit() {
        let cfg = cfg();
        let bundle = RngBundle::from_user_seed(37);
        let mut rng = bundle.economy();
        let subject = horse(smallvec![TraitId::Mudder]);
        let optimize = Upgrade::new(UpgradeKind::OptimizeDistance, "Distance Optimization", String::new(), true);
        let tuned = apply_upgrade_to_horse(&cfg, &mut *rng, &optimize, &subject, 2400);
        assert_eq!(tuned.distance_preference, 2400);
        assert!(
            (crate::performance::calculate_distance_fit(&tuned, 2400) - 1.0).abs()
                < crate::constants::FLOAT_EPSILON
        );
    }

    #[test]
    fn stable_wide_upgrades_map_over_roster() {
        let roster = [
            horse(smallvec![TraitId::Mudder]),
            horse(smallvec![TraitId::Closer]),
        ];
        let spa = Upgrade::new(UpgradeKind::StableRest, "Spa Day", String::new(), false);
        let rested = apply_upgrade_to_all_horses(&spa, &roster);
        assert!(rested.iter().all(|h| h.fatigue == 0));

        let training = Upgrade::new(
            UpgradeKind::StableSpeed { value: 2 },
            "Better Training",
            String::new(),
            false,
        );
        let trained = apply_upgrade_to_all_horses(&training, &roster);
        assert!(trained.iter().all(|h| h.speed == 97));

        // Per-horse kinds are identity on the roster.
        let recovery = Upgrade::new(UpgradeKind::Recovery, "Rest Day", String::new(), true);
        assert_eq!(apply_upgrade_to_all_horses(&recovery, &roster), roster.to_vec());
    }

    #[test]
    fn advisory_check_reports_reasons() {
        let breed = Upgrade::new(UpgradeKind::Breed, "Breed Horses", String::new(), false);
        assert_eq!(
            can_apply_upgrade(&breed, 100, 1),
            Err(UpgradeDenied::NeedsTwoHorses)
        );
        assert_eq!(can_apply_upgrade(&breed, 100, 2), Ok(()));

        let mut paid = Upgrade::new(UpgradeKind::Recovery, "Rest Day", String::new(), true);
        paid.cost = 500;
        assert_eq!(
            can_apply_upgrade(&paid, 100, 1),
            Err(UpgradeDenied::InsufficientFunds)
        );
    }
}
