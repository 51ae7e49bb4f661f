//! Furlong Game Engine
//!
//! Platform-agnostic core logic for the Furlong horse-racing incremental
//! game: the tick-based race engine, the horse generation/breeding/
//! performance model, and the upgrade/comeback economy. This crate has no
//! UI or platform-specific dependencies; the presentation layer drives it
//! through plain function calls and reads back plain data.

pub mod breeding;
pub mod config;
pub mod constants;
pub mod economy;
pub mod horse;
pub mod numbers;
pub mod performance;
pub mod race;
pub mod results;
pub mod rng;
pub mod scout;
pub mod state;

// Re-export commonly used types
pub use breeding::breed_horses;
pub use config::{
    BoostItem, BoostKind, ConfigError, GameConfig, PhaseDef, PhaseId, PhaseKind, TraitDef, TraitId,
};
pub use economy::{
    ComebackInfo, ComebackLevel, Upgrade, UpgradeDenied, UpgradeKind, apply_upgrade_to_all_horses,
    apply_upgrade_to_horse, calculate_comeback_bonus, can_apply_upgrade, comeback_info,
    generate_upgrade_options, min_entry_fee,
};
pub use horse::{
    Horse, HorseId, HorseIdAllocator, SpecializationLevel, generate_horse, horse_buying_options,
};
pub use performance::{calculate_distance_fit, calculate_horse_performance, specialization_bonus};
pub use race::{
    ActivePhase, Participant, PhaseDescriptor, PositionUpdate, RaceEngine, RaceSnapshot,
    RaceStatus, run_race,
};
pub use results::{
    EntryFee, EntryTier, PlayerPlacement, PrizePool, calculate_prize_pool, entry_fee_options,
    process_player_winnings, process_race_results,
};
pub use rng::{CountingRng, RngBundle, normal, weighted_choice};
pub use scout::{
    DetailedAnalysis, Reputation, ScoutNote, ScoutVisibility, calculate_reputation,
    detailed_analysis, estimated_speed, find_best_player_horse, generate_scout_reports,
    visibility_for,
};
pub use state::GameState;
