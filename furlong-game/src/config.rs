//! Game configuration: tunables, trait catalog, phase table, boost items.
//!
//! The orchestration layer owns loading; the core only ever sees an
//! immutable `GameConfig` passed into each function. There is no ambient
//! global configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors produced while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Classification of a race phase, driving momentum feedback and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Surge,
    Steady,
    Struggle,
}

impl PhaseKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Surge => "surge",
            Self::Steady => "steady",
            Self::Struggle => "struggle",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named race phases a trait can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseId {
    EarlyBurst,
    QuickStart,
    MidRaceSurge,
    FinalKick,
    DesperateCharge,
    Sprint,
    QuickBurst,
    PowerSurge,
    Amplify,
    SteadyPush,
    Grind,
    MaintainLead,
    Struggle,
    Fade,
    Tantrum,
    SlowStart,
    Panic,
    Stumble,
    Cramp,
    Slowdown,
}

impl PhaseId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EarlyBurst => "earlyBurst",
            Self::QuickStart => "quickStart",
            Self::MidRaceSurge => "midRaceSurge",
            Self::FinalKick => "finalKick",
            Self::DesperateCharge => "desperateCharge",
            Self::Sprint => "sprint",
            Self::QuickBurst => "quickBurst",
            Self::PowerSurge => "powerSurge",
            Self::Amplify => "amplify",
            Self::SteadyPush => "steadyPush",
            Self::Grind => "grind",
            Self::MaintainLead => "maintainLead",
            Self::Struggle => "struggle",
            Self::Fade => "fade",
            Self::Tantrum => "tantrum",
            Self::SlowStart => "slowStart",
            Self::Panic => "panic",
            Self::Stumble => "stumble",
            Self::Cramp => "cramp",
            Self::Slowdown => "slowdown",
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one phase: flat per-tick bonus and duration in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDef {
    pub base_bonus: f64,
    pub base_duration: u32,
    pub kind: PhaseKind,
}

/// The fixed trait catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraitId {
    EarlySpeed,
    Closer,
    Mudder,
    FrontRunner,
    Versatile,
    Sprinter,
    Temperamental,
    Lazy,
    Nervous,
    Brittle,
}

impl TraitId {
    pub const ALL: [Self; 10] = [
        Self::EarlySpeed,
        Self::Closer,
        Self::Mudder,
        Self::FrontRunner,
        Self::Versatile,
        Self::Sprinter,
        Self::Temperamental,
        Self::Lazy,
        Self::Nervous,
        Self::Brittle,
    ];

    /// Negative traits degrade racing and are removable by behavioral training.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(
            self,
            Self::Temperamental | Self::Lazy | Self::Nervous | Self::Brittle
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EarlySpeed => "earlySpeed",
            Self::Closer => "closer",
            Self::Mudder => "mudder",
            Self::FrontRunner => "frontRunner",
            Self::Versatile => "versatile",
            Self::Sprinter => "sprinter",
            Self::Temperamental => "temperamental",
            Self::Lazy => "lazy",
            Self::Nervous => "nervous",
            Self::Brittle => "brittle",
        }
    }
}

impl fmt::Display for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavioral description of one trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDef {
    pub name: String,
    pub description: String,
    /// Phases this trait can trigger during a race.
    pub phases: Vec<PhaseId>,
    /// Per-trait contribution to the per-tick phase trigger chance.
    pub phase_chance: f64,
    /// Scales both phase magnitude and duration.
    pub power_modifier: f64,
    /// Player-facing summary of the mechanical effect.
    pub summary: String,
}

/// One-race consumable boost items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    Energy,
    Focus,
    Luck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostItem {
    pub kind: BoostKind,
    pub name: String,
    pub desc: String,
    pub cost: i64,
}

/// Complete tunable surface for the simulation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_wallet: i64,
    pub win_condition: i64,
    pub base_speed: f64,
    pub speed_range: f64,
    pub fatigue_per_race: i32,
    /// Logical race length in ticks; progress fraction is measured against it.
    pub max_race_ticks: u32,
    pub race_speed_multiplier: f64,
    pub ai_horse_count: usize,
    pub min_entry_multiplier: f64,
    pub breed_cost: i64,
    pub ai_base_speed_bonus: f64,
    pub ai_speed_scaling: f64,
    pub ai_player_relative: f64,
    pub ai_speed_variability: f64,
    pub ai_trait_chance: f64,
    pub player_trait_chance: f64,
    pub ai_min_speed: i32,
    pub ai_max_speed: i32,
    pub speed_impact_scaling: f64,
    pub distance_impact_scaling: f64,
    pub event_power_scaling: f64,
    pub momentum_variance: f64,
    pub energy_variance: f64,
    /// Per-horse budget of phase triggers per race.
    pub target_phase_events: u32,
    pub race_distances: Vec<u32>,
    pub horse_names: Vec<String>,
    pub traits: HashMap<TraitId, TraitDef>,
    pub phases: HashMap<PhaseId, PhaseDef>,
    pub boosts: Vec<BoostItem>,
    /// Speed delta around a distance offer's anchor when shopping for horses.
    pub market_speed_spread: i32,
    /// Distance-preference spread around each offered race distance.
    pub market_distance_spread: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl GameConfig {
    /// Load a configuration from JSON, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate catalog completeness and tunable sanity.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.race_distances.is_empty() {
            return Err(ConfigError::Invalid("race_distances is empty".into()));
        }
        if self.horse_names.is_empty() {
            return Err(ConfigError::Invalid("horse_names is empty".into()));
        }
        if self.traits.is_empty() {
            return Err(ConfigError::Invalid("trait catalog is empty".into()));
        }
        if self.max_race_ticks == 0 {
            return Err(ConfigError::Invalid("max_race_ticks must be positive".into()));
        }
        for (id, def) in &self.traits {
            if !(0.0..=1.0).contains(&def.phase_chance) {
                return Err(ConfigError::Invalid(format!(
                    "trait {id} has phase_chance outside [0, 1]"
                )));
            }
            if def.power_modifier <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "trait {id} has non-positive power_modifier"
                )));
            }
            for phase in &def.phases {
                if !self.phases.contains_key(phase) {
                    return Err(ConfigError::Invalid(format!(
                        "trait {id} references unknown phase {phase}"
                    )));
                }
            }
        }
        for (id, def) in &self.phases {
            if def.base_duration == 0 {
                return Err(ConfigError::Invalid(format!(
                    "phase {id} has zero duration"
                )));
            }
        }
        Ok(())
    }

    /// Built-in default configuration mirroring the shipped balance.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            initial_wallet: 100,
            win_condition: 1000,
            base_speed: 45.0,
            speed_range: 15.0,
            fatigue_per_race: 20,
            max_race_ticks: 50,
            race_speed_multiplier: 0.7,
            ai_horse_count: 7,
            min_entry_multiplier: 1.25,
            breed_cost: 0,
            ai_base_speed_bonus: 0.0,
            ai_speed_scaling: 4.0,
            ai_player_relative: 0.3,
            ai_speed_variability: 5.0,
            ai_trait_chance: 0.3,
            player_trait_chance: 0.3,
            ai_min_speed: 30,
            ai_max_speed: 105,
            speed_impact_scaling: 0.3,
            distance_impact_scaling: 0.4,
            event_power_scaling: 0.8,
            momentum_variance: 0.2,
            energy_variance: 30.0,
            target_phase_events: 4,
            race_distances: vec![1000, 1800, 2400],
            horse_names: default_horse_names(),
            traits: default_trait_catalog(),
            phases: default_phase_table(),
            boosts: default_boosts(),
            market_speed_spread: 10,
            market_distance_spread: 400,
        }
    }
}

fn default_boosts() -> Vec<BoostItem> {
    vec![
        BoostItem {
            kind: BoostKind::Energy,
            name: "Energy Drink".into(),
            desc: "+30% performance this race".into(),
            cost: 25,
        },
        BoostItem {
            kind: BoostKind::Focus,
            name: "Focus Training".into(),
            desc: "+20% performance this race".into(),
            cost: 15,
        },
        BoostItem {
            kind: BoostKind::Luck,
            name: "Lucky Charm".into(),
            desc: "+10-40% random performance boost".into(),
            cost: 10,
        },
    ]
}

fn trait_def(
    name: &str,
    description: &str,
    phases: &[PhaseId],
    phase_chance: f64,
    power_modifier: f64,
    summary: &str,
) -> TraitDef {
    TraitDef {
        name: name.into(),
        description: description.into(),
        phases: phases.to_vec(),
        phase_chance,
        power_modifier,
        summary: summary.into(),
    }
}

fn default_trait_catalog() -> HashMap<TraitId, TraitDef> {
    use PhaseId as P;
    HashMap::from([
        (
            TraitId::EarlySpeed,
            trait_def(
                "Early Speed",
                "Quick out of the gate",
                &[P::EarlyBurst, P::QuickStart],
                0.45,
                1.2,
                "+20% speed boost in first 30% of race",
            ),
        ),
        (
            TraitId::Closer,
            trait_def(
                "Closer",
                "Strong finish",
                &[P::FinalKick, P::DesperateCharge],
                0.5,
                1.3,
                "+30% speed boost in final 30% of race",
            ),
        ),
        (
            TraitId::Mudder,
            trait_def(
                "Mudder",
                "Thrives in tough conditions",
                &[P::SteadyPush, P::Grind],
                0.30,
                1.1,
                "+10% consistent speed",
            ),
        ),
        (
            TraitId::FrontRunner,
            trait_def(
                "Front Runner",
                "Likes to lead",
                &[P::EarlyBurst, P::MaintainLead],
                0.5,
                1.15,
                "+15% speed when in 1st place",
            ),
        ),
        (
            TraitId::Versatile,
            trait_def(
                "Versatile",
                "Adapts to any situation",
                &[P::MidRaceSurge, P::SteadyPush],
                0.25,
                1.0,
                "No distance penalty, adapts to all tracks",
            ),
        ),
        (
            TraitId::Sprinter,
            trait_def(
                "Sprinter",
                "Explosive speed bursts",
                &[P::Sprint, P::QuickBurst],
                0.45,
                1.4,
                "+40% speed for short bursts",
            ),
        ),
        (
            TraitId::Temperamental,
            trait_def(
                "Temperamental",
                "Unpredictable and moody",
                &[P::Tantrum, P::Struggle],
                0.30,
                0.7,
                "-30% speed during negative phases",
            ),
        ),
        (
            TraitId::Lazy,
            trait_def(
                "Lazy",
                "Lacks drive and motivation",
                &[P::SlowStart, P::Fade],
                0.35,
                0.8,
                "-20% speed, more likely to fade late",
            ),
        ),
        (
            TraitId::Nervous,
            trait_def(
                "Nervous",
                "Easily spooked and anxious",
                &[P::Panic, P::Stumble],
                0.25,
                0.6,
                "-40% speed when panicked",
            ),
        ),
        (
            TraitId::Brittle,
            trait_def(
                "Brittle",
                "Prone to fatigue and injury",
                &[P::Cramp, P::Slowdown],
                0.20,
                0.5,
                "Gains fatigue faster",
            ),
        ),
    ])
}

fn default_phase_table() -> HashMap<PhaseId, PhaseDef> {
    use PhaseKind::{Steady, Struggle, Surge};
    let def = |base_bonus, base_duration, kind| PhaseDef {
        base_bonus,
        base_duration,
        kind,
    };
    HashMap::from([
        (PhaseId::EarlyBurst, def(0.6, 8, Surge)),
        (PhaseId::QuickStart, def(0.5, 6, Surge)),
        (PhaseId::MidRaceSurge, def(0.4, 10, Surge)),
        (PhaseId::FinalKick, def(0.7, 12, Surge)),
        (PhaseId::DesperateCharge, def(0.8, 10, Surge)),
        (PhaseId::Sprint, def(0.9, 5, Surge)),
        (PhaseId::QuickBurst, def(0.7, 4, Surge)),
        (PhaseId::PowerSurge, def(1.0, 8, Surge)),
        (PhaseId::Amplify, def(0.6, 15, Surge)),
        (PhaseId::SteadyPush, def(0.3, 15, Steady)),
        (PhaseId::Grind, def(0.25, 20, Steady)),
        (PhaseId::MaintainLead, def(0.35, 12, Steady)),
        (PhaseId::Struggle, def(-0.4, 8, Struggle)),
        (PhaseId::Fade, def(-0.3, 10, Struggle)),
        (PhaseId::Tantrum, def(-0.5, 6, Struggle)),
        (PhaseId::SlowStart, def(-0.4, 12, Struggle)),
        (PhaseId::Panic, def(-0.6, 8, Struggle)),
        (PhaseId::Stumble, def(-0.3, 4, Struggle)),
        (PhaseId::Cramp, def(-0.7, 10, Struggle)),
        (PhaseId::Slowdown, def(-0.2, 15, Struggle)),
    ])
}

fn default_horse_names() -> Vec<String> {
    [
        "Thunder Bolt",
        "Lightning Strike",
        "Wind Runner",
        "Storm Chaser",
        "Fire Spirit",
        "Golden Arrow",
        "Silver Bullet",
        "Midnight Express",
        "Royal Champion",
        "Swift Shadow",
        "Desert Storm",
        "Ocean Breeze",
        "Mountain King",
        "Star Dancer",
        "Wild Thunder",
        "Blazing Comet",
        "Dawn Rider",
        "Storm Cloud",
        "Flash Point",
        "Night Fury",
        "Crimson Flame",
        "Arctic Frost",
        "Copper Canyon",
        "Velvet Storm",
        "Diamond Dust",
        "Emerald Knight",
        "Sunset Warrior",
        "Morning Glory",
        "Iron Will",
        "Mystic Moon",
        "Thunder Heart",
        "Shadow Walker",
        "Phantom Rider",
        "Crystal Falls",
        "Burning Sky",
        "Steel Tempest",
        "Sapphire Dream",
        "Raging River",
        "Autumn Blaze",
        "Winters Edge",
        "Starlight Express",
        "Rebel Spirit",
        "Noble Quest",
        "Silver Storm",
        "Golden Thunder",
        "Dark Knight",
        "Blazing Trail",
        "Storm Rider",
        "Lightning Flash",
        "Wind Dancer",
        "Fire Storm",
        "Moonbeam",
        "Spirit Walker",
        "Thunder Strike",
        "Wildfire",
        "Storm King",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = GameConfig::default_config();
        cfg.validate().unwrap();
        assert_eq!(cfg.traits.len(), TraitId::ALL.len());
        assert_eq!(cfg.phases.len(), 20);
    }

    #[test]
    fn trait_phases_resolve_against_phase_table() {
        let cfg = GameConfig::default_config();
        for def in cfg.traits.values() {
            for phase in &def.phases {
                assert!(cfg.phases.contains_key(phase), "missing phase {phase}");
            }
        }
    }

    #[test]
    fn json_roundtrip_preserves_config() {
        let cfg = GameConfig::default_config();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = GameConfig::from_json(r#"{ "ai_horse_count": 5 }"#).unwrap();
        assert_eq!(cfg.ai_horse_count, 5);
        assert_eq!(cfg.win_condition, 1000);
    }

    #[test]
    fn invalid_trait_reference_is_rejected() {
        let mut cfg = GameConfig::default_config();
        cfg.phases.remove(&PhaseId::Sprint);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_traits_are_exactly_four() {
        let negatives: Vec<_> = TraitId::ALL.iter().filter(|t| t.is_negative()).collect();
        assert_eq!(negatives.len(), 4);
    }
}
